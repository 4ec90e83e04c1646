//! Plain HTTP client for the local inference daemon.
//!
//! No retries and no request timeout: a daemon that accepts the connection
//! but never answers holds the calling request open indefinitely.

use reqwest::Response;
use serde::Serialize;
use tracing::debug;

use crate::config::UpstreamConfig;
use crate::error::RelayError;
use crate::upstream::types::{ChatPayload, ChatTurn};

/// Model inventory endpoint on the daemon.
pub const TAGS_PATH: &str = "/api/tags";

/// Streaming chat endpoint on the daemon.
pub const CHAT_PATH: &str = "/api/chat";

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    /// Build a client for the configured daemon.
    ///
    /// Proxy environment variables are ignored; the daemon is always
    /// addressed directly.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().no_proxy();
        if let Some(timeout) = config.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `GET` a path. Resolves once response headers arrive.
    pub async fn get(&self, path: &str) -> Result<Response, RelayError> {
        let url = self.url(path);
        debug!(url = %url, "Upstream GET");
        self.http
            .get(&url)
            .send()
            .await
            .map_err(RelayError::UpstreamUnreachable)
    }

    /// `POST` a JSON payload. Resolves once response headers arrive; the body
    /// is left unread for the caller.
    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<Response, RelayError> {
        let url = self.url(path);
        debug!(url = %url, "Upstream POST");
        self.http
            .post(&url)
            .json(payload)
            .send()
            .await
            .map_err(RelayError::UpstreamUnreachable)
    }

    /// Fetch the raw model inventory response.
    pub async fn tags(&self) -> Result<Response, RelayError> {
        self.get(TAGS_PATH).await
    }

    /// Open a streaming chat exchange for the given turn.
    pub async fn chat(&self, turn: &ChatTurn) -> Result<Response, RelayError> {
        self.post_json(CHAT_PATH, &ChatPayload::streaming(turn)).await
    }
}
