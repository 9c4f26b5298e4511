//! Outbound client for the LINE BOT events endpoint.

use thiserror::Error;
use tracing::{error, info};

use crate::config::{LineCredentials, LineSettings};
use crate::types::{Event, EventContent, EVENT_TYPE_SEND_MESSAGE};

#[derive(Debug, Error)]
pub enum LineError {
    #[error("line request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Result of a send that reached the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendOutcome {
    pub status: u16,
    pub body: String,
}

impl SendOutcome {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
pub struct LineClient {
    client: reqwest::Client,
    events_url: String,
    to_channel: i64,
    credentials: LineCredentials,
}

impl LineClient {
    pub fn new(client: reqwest::Client, settings: &LineSettings) -> Self {
        Self {
            client,
            events_url: format!("{}/v1/events", settings.endpoint.trim_end_matches('/')),
            to_channel: settings.to_channel,
            credentials: settings.credentials.clone(),
        }
    }

    pub async fn send_text(&self, to: Vec<String>, text: &str) -> Result<SendOutcome, LineError> {
        self.send_event(to, EventContent::text(text)).await
    }

    /// Posts one send-message event.
    ///
    /// Only transport failures are errors. A non-2xx answer from the platform
    /// is logged and handed back in the outcome.
    pub async fn send_event(
        &self,
        to: Vec<String>,
        content: EventContent,
    ) -> Result<SendOutcome, LineError> {
        let event = Event {
            to,
            to_channel: self.to_channel,
            event_type: EVENT_TYPE_SEND_MESSAGE.to_string(),
            content,
            ..Event::default()
        };

        let resp = self
            .client
            .post(&self.events_url)
            .header("X-Line-ChannelID", &self.credentials.channel_id)
            .header("X-Line-ChannelSecret", &self.credentials.channel_secret)
            .header("X-Line-Trusted-User-With-ACL", &self.credentials.mid)
            .json(&event)
            .send()
            .await?;

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let outcome = SendOutcome { status, body };

        if outcome.is_success() {
            info!(status, recipients = event.to.len(), "line event sent");
        } else {
            error!(status, body = %outcome.body, "line rejected event");
        }

        Ok(outcome)
    }
}
