//! Pulls the open-data feed and stores the records not seen before.

use thiserror::Error;
use tracing::{error, info};

use crate::opendata::{FeedError, OpenDataClient};
use crate::store::{AirStateStore, StoreError};

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("fetch air states: {0}")]
    Fetch(#[from] FeedError),
    #[error("store air states: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub fetched: usize,
    pub inserted: u64,
}

pub async fn refresh_air_state(
    feed: &OpenDataClient,
    store: &dyn AirStateStore,
) -> Result<RefreshSummary, RefreshError> {
    let states = feed.fetch_air_states().await.map_err(|err| {
        error!(error = %err, "air state fetch failed");
        err
    })?;

    let inserted = store.insert_missing(&states).await.map_err(|err| {
        error!(error = %err, fetched = states.len(), "air state upsert failed");
        err
    })?;

    let summary = RefreshSummary {
        fetched: states.len(),
        inserted,
    };
    info!(fetched = summary.fetched, inserted = summary.inserted, "air state refreshed");
    Ok(summary)
}
