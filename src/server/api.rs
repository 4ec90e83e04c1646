//! HTTP front: routes and handlers.
//!
//! - GET  /api/models — model inventory, re-encoded
//! - POST /api/chat   — chat turn relayed as `text/event-stream`
//! - GET  /*          — static UI assets

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info, info_span, warn, Instrument, Span};
use uuid::Uuid;

use crate::config::Config;
use crate::error::RelayError;
use crate::relay::{ensure_flushable, pump, RelayOutcome, RelayState};
use crate::server::streaming::{event_channel, event_stream_response};
use crate::upstream::client::UpstreamClient;
use crate::upstream::models::list_models;
use crate::upstream::types::ChatTurn;

/// Application state shared across handlers. Read-only after startup.
pub struct AppState {
    pub config: Arc<Config>,
    pub upstream: UpstreamClient,
}

impl AppState {
    pub fn new(config: Arc<Config>) -> Result<Self, reqwest::Error> {
        let upstream = UpstreamClient::new(&config.upstream)?;
        Ok(Self { config, upstream })
    }
}

/// Build the axum router with all API routes and the static fallback.
pub fn build_router(state: Arc<AppState>) -> Router {
    let assets = ServeDir::new(&state.config.server.static_dir);

    Router::new()
        .route("/api/models", get(models))
        // Chat histories are unbounded; the turn is decoded whatever its size.
        .route("/api/chat", post(chat).layer(DefaultBodyLimit::disable()))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─── Route Handlers ────────────────────────────────────────────────────────

async fn models(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, RelayError> {
    let models = list_models(&state.upstream).await?;
    Ok(Json(models))
}

async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Result<Response, RelayError> {
    let request_id = Uuid::new_v4().to_string();
    let span = info_span!("chat", %request_id);

    start_chat(state, body).instrument(span).await
}

/// Run the chat turn up to the point where streaming begins.
///
/// Everything here can still fail with a clean error response. Once the
/// response is returned the status line is committed and the pump task owns
/// the rest of the turn.
async fn start_chat(state: Arc<AppState>, body: Bytes) -> Result<Response, RelayError> {
    debug!(state = %RelayState::Pending, bytes = body.len(), "Chat request received");

    let turn = ChatTurn::from_json(&body).inspect_err(|e| {
        warn!(state = %RelayState::Pending, error = %e, "Rejected malformed chat request");
    })?;

    info!(
        model = %turn.model,
        messages = turn.messages.len(),
        "Chat request"
    );

    debug!(state = %RelayState::AwaitingUpstream, "Dispatching to upstream");
    let response = state.upstream.chat(&turn).await.inspect_err(|e| {
        error!(state = %RelayState::AwaitingUpstream, error = %e, "Upstream unreachable");
    })?;
    drop(turn);

    if !response.status().is_success() {
        warn!(status = %response.status(), "Upstream returned an error status, relaying body");
    }

    let (mut sink, rx) = event_channel(state.config.server.stream_buffer);
    if let Err(e) = ensure_flushable(&sink) {
        error!(error = %e, "Cannot stream to client");
        return Err(e);
    }

    let max_line_bytes = state.config.upstream.max_line_bytes;
    let body = Box::pin(response.bytes_stream());

    tokio::spawn(
        async move {
            let outcome = pump(body, &mut sink, max_line_bytes).await;
            log_outcome(&outcome);
        }
        .instrument(Span::current()),
    );

    Ok(event_stream_response(rx))
}

fn log_outcome(outcome: &RelayOutcome) {
    let state = outcome.state();
    match outcome {
        RelayOutcome::Clean { frames } => {
            info!(%state, frames, "Stream complete");
        }
        RelayOutcome::ClientGone { frames } => {
            info!(%state, frames, "Client disconnected, stopping stream");
        }
        RelayOutcome::UpstreamError { frames, error } => {
            error!(%state, frames, error = %error, "Upstream stream failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn router_without_daemon(static_dir: &std::path::Path) -> Router {
        // Nothing listens on port 9; any upstream call fails fast.
        let mut config = Config::default();
        config.upstream.base_url = "http://127.0.0.1:9".to_string();
        config.server.static_dir = static_dir.to_path_buf();
        build_router(Arc::new(AppState::new(Arc::new(config)).unwrap()))
    }

    #[tokio::test]
    async fn test_malformed_chat_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let response = router_without_daemon(dir.path())
            .oneshot(
                Request::post("/api/chat")
                    .body(Body::from("{\"model\":"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.starts_with(b"Invalid chat request"));
    }

    #[tokio::test]
    async fn test_chat_rejects_get() {
        let dir = tempfile::tempdir().unwrap();
        let response = router_without_daemon(dir.path())
            .oneshot(Request::get("/api/chat").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }

    #[tokio::test]
    async fn test_unknown_path_falls_through_to_assets() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "ui").unwrap();
        let router = router_without_daemon(dir.path());

        let index = router
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(index.status(), StatusCode::OK);

        let missing = router
            .oneshot(Request::get("/../Cargo.toml").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }
}
