use airbot_core::air::AirState;
use airbot_core::store::{AirStateStore, StoreError};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::debug;

use crate::queries::air_states;

/// [`AirStateStore`] backed by the `air_states` table.
#[derive(Clone)]
pub struct PgAirStateStore {
    pool: PgPool,
}

impl PgAirStateStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(err: sqlx::Error) -> StoreError {
    StoreError::Database(err.to_string())
}

#[async_trait]
impl AirStateStore for PgAirStateStore {
    async fn insert_missing(&self, records: &[AirState]) -> Result<u64, StoreError> {
        let inserted = air_states::insert_missing(&self.pool, records)
            .await
            .map_err(database_error)?;
        debug!(offered = records.len(), inserted, "air states inserted");
        Ok(inserted)
    }

    async fn latest_for_site(
        &self,
        county: &str,
        site: &str,
    ) -> Result<Option<AirState>, StoreError> {
        let row = air_states::latest_for_site(&self.pool, county, site)
            .await
            .map_err(database_error)?;
        Ok(row.map(AirState::from))
    }
}
