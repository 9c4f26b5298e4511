//! Taiwan EPA open-data feed of current air quality per monitoring site.

use thiserror::Error;
use tracing::info;

use crate::air::AirState;

#[derive(Debug, Error)]
pub enum FeedError {
    #[error("feed request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("feed returned HTTP {status}")]
    Status { status: u16 },
    #[error("feed body is not valid: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct OpenDataClient {
    client: reqwest::Client,
    url: String,
}

impl OpenDataClient {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub async fn fetch_air_states(&self) -> Result<Vec<AirState>, FeedError> {
        let resp = self
            .client
            .get(&self.url)
            .header("Content-Type", "application/json")
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await?;
        let states: Vec<AirState> = serde_json::from_slice(&body)?;
        info!(count = states.len(), "fetched air states");
        Ok(states)
    }
}
