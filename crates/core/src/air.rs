//! Air-quality records from the EPA open-data feed and the report sent to users.

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::store::{AirStateStore, StoreError};

const PUBLISH_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";
const NATURAL_KEY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";
const TAIPEI_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Asia/Taipei. No daylight saving, so a fixed offset is exact.
pub fn taipei() -> FixedOffset {
    FixedOffset::east_opt(TAIPEI_UTC_OFFSET_SECS).expect("UTC+8 is a valid offset")
}

/// Publish time of a feed record, `YYYY-MM-DD HH:MM` in Taipei local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublishTime(pub DateTime<FixedOffset>);

impl PublishTime {
    pub fn parse(raw: &str) -> Result<Self, chrono::ParseError> {
        let naive = NaiveDateTime::parse_from_str(raw.trim(), PUBLISH_TIME_FORMAT)?;
        Ok(Self::from_naive_local(naive))
    }

    pub fn from_naive_local(naive: NaiveDateTime) -> Self {
        let utc = naive - chrono::Duration::seconds(i64::from(TAIPEI_UTC_OFFSET_SECS));
        Self(taipei().from_utc_datetime(&utc))
    }

    pub fn from_utc(time: DateTime<chrono::Utc>) -> Self {
        Self(time.with_timezone(&taipei()))
    }
}

impl fmt::Display for PublishTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(PUBLISH_TIME_FORMAT))
    }
}

impl Serialize for PublishTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PublishTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        PublishTime::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// One monitoring-site reading. Pollutant values stay as the decimal strings
/// the feed publishes; some sites report empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirState {
    #[serde(rename = "County")]
    pub county: String,
    #[serde(rename = "SiteName")]
    pub site_name: String,
    #[serde(rename = "PSI", default)]
    pub psi: String,
    #[serde(rename = "PM10", default)]
    pub pm10: String,
    #[serde(rename = "PM2.5", default)]
    pub pm2_5: String,
    #[serde(rename = "O3", default)]
    pub o3: String,
    #[serde(rename = "CO", default)]
    pub co: String,
    #[serde(rename = "NO2", default)]
    pub no2: String,
    #[serde(rename = "SO2", default)]
    pub so2: String,
    #[serde(rename = "PublishTime")]
    pub publish_time: PublishTime,
}

impl AirState {
    /// `County|SiteName|YYYY-MM-DDTHH:MM`, unique per site and publish slot.
    pub fn natural_key(&self) -> String {
        format!(
            "{}|{}|{}",
            self.county,
            self.site_name,
            self.publish_time.0.format(NATURAL_KEY_TIME_FORMAT)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Green,
    Yellow,
    Red,
    Purple,
    Brown,
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Band::Green => "Green",
            Band::Yellow => "Yellow",
            Band::Red => "Red",
            Band::Purple => "Purple",
            Band::Brown => "Brown",
        };
        f.write_str(name)
    }
}

pub fn psi_band(psi: f64) -> Band {
    if psi <= 50.0 {
        Band::Green
    } else if psi <= 100.0 {
        Band::Yellow
    } else if psi <= 199.0 {
        Band::Red
    } else if psi <= 299.0 {
        Band::Purple
    } else {
        Band::Brown
    }
}

pub fn pm2_5_band(pm2_5: f64) -> Band {
    if pm2_5 <= 35.0 {
        Band::Green
    } else if pm2_5 <= 53.0 {
        Band::Yellow
    } else if pm2_5 <= 70.0 {
        Band::Red
    } else {
        Band::Purple
    }
}

/// Numeric view of the two readings the bot reports.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AirReading {
    pub psi: Option<f64>,
    pub pm2_5: Option<f64>,
}

impl AirReading {
    /// Two-line report; a missing reading leaves its line blank.
    pub fn report(&self) -> String {
        let psi = self
            .psi
            .map(|psi| format!("PSI: {:.0} ({})", psi, psi_band(psi)))
            .unwrap_or_default();
        let pm2_5 = self
            .pm2_5
            .map(|pm2_5| format!("PM2.5: {:.0} ({})", pm2_5, pm2_5_band(pm2_5)))
            .unwrap_or_default();
        format!("{}\n{}", psi, pm2_5)
    }
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("no air state recorded for {county}/{site}")]
    NotFound { county: String, site: String },
    #[error("invalid {field} value {value:?}: {source}")]
    InvalidNumber {
        field: &'static str,
        value: String,
        #[source]
        source: std::num::ParseFloatError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
}

fn parse_reading(field: &'static str, value: &str) -> Result<f64, LookupError> {
    value
        .trim()
        .parse::<f64>()
        .map_err(|source| LookupError::InvalidNumber {
            field,
            value: value.to_string(),
            source,
        })
}

/// Latest cached reading for one monitoring site.
pub async fn latest_reading(
    store: &dyn AirStateStore,
    county: &str,
    site: &str,
) -> Result<AirReading, LookupError> {
    let state = store
        .latest_for_site(county, site)
        .await?
        .ok_or_else(|| LookupError::NotFound {
            county: county.to_string(),
            site: site.to_string(),
        })?;

    Ok(AirReading {
        psi: Some(parse_reading("PSI", &state.psi)?),
        pm2_5: Some(parse_reading("PM2.5", &state.pm2_5)?),
    })
}

#[cfg(test)]
pub(crate) fn sample_state(
    county: &str,
    site: &str,
    time: &str,
    psi: &str,
    pm2_5: &str,
) -> AirState {
    AirState {
        county: county.to_string(),
        site_name: site.to_string(),
        psi: psi.to_string(),
        pm10: "40".to_string(),
        pm2_5: pm2_5.to_string(),
        o3: "30".to_string(),
        co: "0.4".to_string(),
        no2: "18".to_string(),
        so2: "3.1".to_string(),
        publish_time: PublishTime::parse(time).unwrap(),
    }
}
