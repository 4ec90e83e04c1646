//! HTTP server fronting the chat UI.
//!
//! - [`api`]: Router and route handlers
//! - [`streaming`]: SSE response body fed by the relay

pub mod api;
pub mod streaming;
