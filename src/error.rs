//! Error taxonomy for the relay and its mapping onto HTTP responses.
//!
//! Errors raised before the SSE headers are committed become a status code
//! with a plain-text body. Errors raised while streaming can only be logged.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    /// The inbound chat body was not a valid chat turn.
    #[error("Invalid chat request: {0}")]
    ClientInput(#[source] serde_json::Error),

    /// The daemon could not be reached, or failed before sending headers.
    #[error("Error connecting to Ollama: {0}")]
    UpstreamUnreachable(#[source] reqwest::Error),

    /// The daemon's response body could not be read to completion.
    #[error("Error reading stream from Ollama: {0}")]
    UpstreamProtocol(String),

    /// The model inventory did not have the expected shape.
    #[error("Failed to parse Ollama models: {0}")]
    InvalidInventory(#[source] serde_json::Error),

    /// The response writer cannot deliver frames incrementally.
    #[error("Streaming unsupported")]
    StreamingUnsupported,
}

impl RelayError {
    pub fn status(&self) -> StatusCode {
        match self {
            RelayError::ClientInput(_) => StatusCode::BAD_REQUEST,
            RelayError::UpstreamUnreachable(_)
            | RelayError::UpstreamProtocol(_)
            | RelayError::InvalidInventory(_)
            | RelayError::StreamingUnsupported => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client errors are the caller's fault and never point at the daemon.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}
