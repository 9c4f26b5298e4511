use airbot_core::air::{AirState, PublishTime};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AirStateRow {
    pub natural_key: String,
    pub county: String,
    pub site_name: String,
    pub psi: String,
    pub pm10: String,
    pub pm2_5: String,
    pub o3: String,
    pub co: String,
    pub no2: String,
    pub so2: String,
    pub publish_time: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<AirStateRow> for AirState {
    fn from(row: AirStateRow) -> Self {
        AirState {
            county: row.county,
            site_name: row.site_name,
            psi: row.psi,
            pm10: row.pm10,
            pm2_5: row.pm2_5,
            o3: row.o3,
            co: row.co,
            no2: row.no2,
            so2: row.so2,
            publish_time: PublishTime::from_utc(row.publish_time),
        }
    }
}
