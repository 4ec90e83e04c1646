//! Model inventory: fetch, validate, re-encode.

use tracing::{error, info};

use crate::error::RelayError;
use crate::upstream::client::UpstreamClient;
use crate::upstream::types::{ModelSummary, TagsResponse};

/// Fetch the daemon's model list.
///
/// The body is fully decoded rather than proxied so the relay's own
/// response shape stays independent of the daemon's. Any failure fails the
/// whole listing; there are no partial results.
pub async fn list_models(client: &UpstreamClient) -> Result<Vec<ModelSummary>, RelayError> {
    let response = client.tags().await.inspect_err(|e| {
        error!(error = %e, "Failed to connect to Ollama");
    })?;

    let body = response.bytes().await.map_err(|e| {
        error!(error = %e, "Failed to read Ollama response");
        RelayError::UpstreamProtocol(e.to_string())
    })?;

    let models = decode_inventory(&body)?;
    info!(count = models.len(), "Listed models");
    Ok(models)
}

/// Decode a `GET /api/tags` body. A missing or null list yields no models.
pub fn decode_inventory(body: &[u8]) -> Result<Vec<ModelSummary>, RelayError> {
    let tags: TagsResponse = serde_json::from_slice(body).map_err(|e| {
        error!(error = %e, "Failed to parse Ollama models");
        RelayError::InvalidInventory(e)
    })?;
    Ok(tags.models.unwrap_or_default())
}
