use std::time::Duration;

pub const DEFAULT_LINE_ENDPOINT: &str = "https://trialbot-api.line.me";
pub const DEFAULT_LINE_TO_CHANNEL: i64 = 1383378250;
pub const DEFAULT_OPENDATA_URL: &str = "http://opendata2.epa.gov.tw/AQX.json?format=json";
pub const DEFAULT_AIR_COUNTY: &str = "臺北市";
pub const DEFAULT_AIR_SITE: &str = "大同";

/// Channel credentials sent with every outbound LINE request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineCredentials {
    pub channel_id: String,
    pub channel_secret: String,
    pub mid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineSettings {
    pub endpoint: String,
    pub to_channel: i64,
    pub credentials: LineCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub database_url: String,
    pub api_bind: String,
    pub line: LineSettings,
    pub opendata_url: String,
    pub air_county: String,
    pub air_site: String,
    pub http_timeout: Duration,
    pub refresh_interval: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, std::env::VarError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    /// Builds settings from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, std::env::VarError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|_| default.to_string());
        let parsed = |key: &str| var(key).ok().and_then(|v| v.parse::<u64>().ok());

        let database_url = var("DATABASE_URL").or_else(|_| var("AIRBOT_DATABASE_URL"))?;
        let api_bind = or("AIRBOT_API_BIND", "0.0.0.0:3000");

        let line = LineSettings {
            endpoint: or("AIRBOT_LINE_ENDPOINT", DEFAULT_LINE_ENDPOINT),
            to_channel: var("AIRBOT_LINE_TO_CHANNEL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_LINE_TO_CHANNEL),
            credentials: LineCredentials {
                channel_id: or("AIRBOT_LINE_CHANNEL_ID", ""),
                channel_secret: or("AIRBOT_LINE_CHANNEL_SECRET", ""),
                mid: or("AIRBOT_LINE_MID", ""),
            },
        };

        Ok(Self {
            database_url,
            api_bind,
            line,
            opendata_url: or("AIRBOT_OPENDATA_URL", DEFAULT_OPENDATA_URL),
            air_county: or("AIRBOT_AIR_COUNTY", DEFAULT_AIR_COUNTY),
            air_site: or("AIRBOT_AIR_SITE", DEFAULT_AIR_SITE),
            http_timeout: Duration::from_secs(parsed("AIRBOT_HTTP_TIMEOUT_SECS").unwrap_or(30)),
            refresh_interval: Duration::from_secs(
                parsed("AIRBOT_REFRESH_INTERVAL_SECS").unwrap_or(3600),
            ),
        })
    }
}
