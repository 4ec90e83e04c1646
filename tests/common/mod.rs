//! Shared fixtures: a fake Ollama daemon and a relay bound to it.

#![allow(dead_code)]

use std::convert::Infallible;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::body::{Body, Bytes};
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use ollama_relay::config::Config;
use ollama_relay::server::api::{build_router, AppState};

/// Serve `app` on an ephemeral local port.
pub async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub fn closed_addr() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

/// Start a relay pointed at `upstream`, serving assets from `static_dir`.
pub async fn start_relay(upstream: SocketAddr, static_dir: &Path) -> SocketAddr {
    let mut config = Config::default();
    config.upstream.base_url = format!("http://{upstream}");
    config.server.static_dir = static_dir.to_path_buf();

    let state = Arc::new(AppState::new(Arc::new(config)).unwrap());
    serve(build_router(state)).await
}

/// How the fake daemon answers `POST /api/chat`.
pub enum ChatReply {
    /// A fixed body, sent at once.
    Fixed(&'static str),
    /// Chunks fed by the test; the connection stays open until the sender drops.
    Live(mpsc::Receiver<Bytes>),
}

/// Observable side effects of the fake daemon.
#[derive(Default)]
pub struct Recorded {
    pub chat_hits: AtomicUsize,
    pub tags_hits: AtomicUsize,
    pub chat_payload: Mutex<Option<serde_json::Value>>,
    /// Set once the live chat body has been dropped by the server.
    pub body_dropped: AtomicBool,
}

struct FakeState {
    tags: &'static str,
    reply: Mutex<Option<ChatReply>>,
    recorded: Arc<Recorded>,
}

pub struct FakeDaemon {
    pub addr: SocketAddr,
    pub recorded: Arc<Recorded>,
}

impl FakeDaemon {
    pub async fn start(tags: &'static str, reply: ChatReply) -> Self {
        let recorded = Arc::new(Recorded::default());
        let state = Arc::new(FakeState {
            tags,
            reply: Mutex::new(Some(reply)),
            recorded: recorded.clone(),
        });

        let app = Router::new()
            .route("/api/tags", get(fake_tags))
            .route("/api/chat", post(fake_chat).layer(DefaultBodyLimit::disable()))
            .with_state(state);

        Self {
            addr: serve(app).await,
            recorded,
        }
    }
}

async fn fake_tags(State(state): State<Arc<FakeState>>) -> impl IntoResponse {
    state.recorded.tags_hits.fetch_add(1, Ordering::SeqCst);
    ([(CONTENT_TYPE, "application/json")], state.tags)
}

struct DropFlag(Arc<Recorded>);

impl Drop for DropFlag {
    fn drop(&mut self) {
        self.0.body_dropped.store(true, Ordering::SeqCst);
    }
}

async fn fake_chat(State(state): State<Arc<FakeState>>, body: Bytes) -> Response {
    state.recorded.chat_hits.fetch_add(1, Ordering::SeqCst);
    *state.recorded.chat_payload.lock().unwrap() = serde_json::from_slice(&body).ok();

    let reply = state.reply.lock().unwrap().take();
    match reply {
        Some(ChatReply::Fixed(text)) => {
            ([(CONTENT_TYPE, "application/x-ndjson")], text).into_response()
        }
        Some(ChatReply::Live(rx)) => {
            let flag = DropFlag(state.recorded.clone());
            let stream = ReceiverStream::new(rx).map(move |chunk| {
                let _ = &flag;
                Ok::<_, Infallible>(chunk)
            });
            Body::from_stream(stream).into_response()
        }
        None => (axum::http::StatusCode::GONE, "reply already used").into_response(),
    }
}
