//! Wire types shared with the browser and the daemon.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::RelayError;

/// One message of the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

/// A chat turn as submitted by the browser: model choice plus ordered history.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChatTurn {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

impl ChatTurn {
    /// Decode an inbound request body. Unknown fields are ignored.
    pub fn from_json(body: &[u8]) -> Result<Self, RelayError> {
        serde_json::from_slice(body).map_err(RelayError::ClientInput)
    }
}

/// Payload for `POST /api/chat` on the daemon.
#[derive(Debug, Serialize)]
pub struct ChatPayload<'a> {
    pub model: &'a str,
    pub messages: &'a [ChatMessage],
    pub stream: bool,
}

impl<'a> ChatPayload<'a> {
    /// Streaming is always requested; the relay has no buffered mode.
    pub fn streaming(turn: &'a ChatTurn) -> Self {
        Self {
            model: &turn.model,
            messages: &turn.messages,
            stream: true,
        }
    }
}

/// One entry of the daemon's model inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub name: String,
    /// Timestamp string exactly as the daemon reported it. Must be RFC 3339.
    #[serde(deserialize_with = "rfc3339_string")]
    pub modified_at: String,
    pub size: i64,
}

/// Accept a timestamp only if it parses as RFC 3339, but keep the original
/// text so it re-encodes byte for byte (`Z` stays `Z`).
fn rfc3339_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    chrono::DateTime::parse_from_rfc3339(&raw).map_err(|e| {
        serde::de::Error::custom(format!("invalid modified_at {raw:?}: {e}"))
    })?;
    Ok(raw)
}

/// Response of `GET /api/tags` on the daemon.
#[derive(Debug, Deserialize)]
pub struct TagsResponse {
    #[serde(default)]
    pub models: Option<Vec<ModelSummary>>,
}
