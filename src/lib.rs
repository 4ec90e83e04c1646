//! ollama-relay: browser chat UI in front of a local Ollama daemon.
//!
//! Chat turns posted by the browser are forwarded to the daemon's streaming
//! chat endpoint; each newline-delimited JSON record it emits is relayed to
//! the browser as one Server-Sent Event, flushed as soon as it arrives.

pub mod config;
pub mod error;
pub mod relay;
pub mod server;
pub mod upstream;
