//! Wire types for the LINE BOT trial API.
//!
//! Inbound callbacks and outbound sends share the same event shape. Every
//! field is optional on the wire and falls back to its zero value.

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Event type of an operation (add friend / block) callback.
pub const EVENT_TYPE_OPERATION: &str = "138311609100106403";
/// Event type of an inbound message callback.
pub const EVENT_TYPE_MESSAGE: &str = "138311609000106303";
/// Event type used when sending a message to users.
pub const EVENT_TYPE_SEND_MESSAGE: &str = "138311608800106203";

pub const CONTENT_TYPE_TEXT: i32 = 1;
pub const TO_TYPE_USER: i32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EventContent {
    #[serde(deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content_type: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub to_type: i32,
    #[serde(deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(deserialize_with = "null_as_default")]
    pub params: Vec<serde_json::Value>,
    #[serde(deserialize_with = "null_as_default")]
    pub original_content_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub preview_image_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Event {
    #[serde(deserialize_with = "null_as_default")]
    pub from: String,
    #[serde(deserialize_with = "null_as_default")]
    pub from_channel: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub to: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub to_channel: i64,
    #[serde(deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub content: EventContent,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CallbackEnvelope {
    #[serde(rename = "result", alias = "Result", deserialize_with = "null_as_default")]
    pub result: Vec<Event>,
}

/// Reads JSON `null` as the zero value, the same as an absent key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    #[error("missing field: params[{0}]")]
    Missing(usize),
    #[error("wrong type for params[{index}]: expected string, got {found}")]
    WrongType { index: usize, found: &'static str },
}

/// Kind of callback, decoded from the opaque event type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Operation,
    Message,
    Other,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self.event_type.as_str() {
            EVENT_TYPE_OPERATION => EventKind::Operation,
            EVENT_TYPE_MESSAGE => EventKind::Message,
            _ => EventKind::Other,
        }
    }
}

impl EventContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: CONTENT_TYPE_TEXT,
            to_type: TO_TYPE_USER,
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_text(&self) -> bool {
        self.content_type == CONTENT_TYPE_TEXT
    }

    /// Returns `params[index]` as a string.
    pub fn param_str(&self, index: usize) -> Result<&str, ParamError> {
        let value = self.params.get(index).ok_or(ParamError::Missing(index))?;
        value.as_str().ok_or(ParamError::WrongType {
            index,
            found: json_type_name(value),
        })
    }

    /// Id of the user behind an operation event.
    pub fn operation_target(&self) -> Result<&str, ParamError> {
        self.param_str(0)
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
