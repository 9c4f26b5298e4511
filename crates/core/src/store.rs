//! Storage for air-state records.
//!
//! Records are keyed by [`AirState::natural_key`]. Writes are insert-if-absent:
//! a record whose key already exists is skipped, never overwritten.

use async_trait::async_trait;
use std::collections::BTreeMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::air::AirState;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
}

#[async_trait]
pub trait AirStateStore: Send + Sync {
    /// Insert every record whose natural key is not stored yet.
    ///
    /// Returns the number of rows actually written.
    async fn insert_missing(&self, records: &[AirState]) -> Result<u64, StoreError>;

    /// Most recently published record for a site, if any.
    async fn latest_for_site(
        &self,
        county: &str,
        site: &str,
    ) -> Result<Option<AirState>, StoreError>;
}

/// Process-local store, used by tests and local runs without Postgres.
#[derive(Default)]
pub struct InMemoryAirStateStore {
    records: RwLock<BTreeMap<String, AirState>>,
}

impl InMemoryAirStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// True when nothing has been stored yet.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Stored natural keys in ascending order.
    pub async fn keys(&self) -> Vec<String> {
        self.records.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl AirStateStore for InMemoryAirStateStore {
    async fn insert_missing(&self, records: &[AirState]) -> Result<u64, StoreError> {
        let mut stored = self.records.write().await;
        let mut inserted = 0;
        for record in records {
            stored.entry(record.natural_key()).or_insert_with(|| {
                inserted += 1;
                record.clone()
            });
        }
        Ok(inserted)
    }

    async fn latest_for_site(
        &self,
        county: &str,
        site: &str,
    ) -> Result<Option<AirState>, StoreError> {
        let stored = self.records.read().await;
        Ok(stored
            .values()
            .filter(|state| state.county == county && state.site_name == site)
            .max_by_key(|state| state.publish_time)
            .cloned())
    }
}
