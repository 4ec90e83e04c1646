//! Stream relay: pumps the daemon's NDJSON body to the client as SSE frames.
//!
//! A chat turn moves through
//! `Pending → AwaitingUpstream → Streaming → {CompletedClean | CompletedClientGone | CompletedUpstreamError}`.
//! The first two states live in the HTTP handler, where failures can still
//! become an error response. [`pump`] owns the `Streaming` state: from there
//! on the status line is committed and failures can only be logged.
//!
//! - [`lines`]: record splitting over chunked bodies
//! - [`frame`]: SSE `data:` framing

pub mod frame;
pub mod lines;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tracing::debug;

use crate::error::RelayError;
use crate::relay::frame::data_frame;
use crate::relay::lines::LineSplitter;

/// Lifecycle of one chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    Pending,
    AwaitingUpstream,
    Streaming,
    CompletedClean,
    CompletedClientGone,
    CompletedUpstreamError,
}

impl fmt::Display for RelayState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RelayState::Pending => "pending",
            RelayState::AwaitingUpstream => "awaiting_upstream",
            RelayState::Streaming => "streaming",
            RelayState::CompletedClean => "completed_clean",
            RelayState::CompletedClientGone => "completed_client_gone",
            RelayState::CompletedUpstreamError => "completed_upstream_error",
        };
        f.write_str(name)
    }
}

/// The client went away; no further frames can be delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientGone;

/// Destination for SSE frames.
#[async_trait]
pub trait FrameSink: Send {
    /// Whether each sent frame reaches the client without waiting for later
    /// frames. Checked once, before any frame is sent.
    fn supports_flush(&self) -> bool;

    /// Whether the client has cancelled. Polled once per upstream record.
    fn is_cancelled(&self) -> bool;

    /// Deliver one frame and flush it.
    async fn send_frame(&mut self, frame: Bytes) -> Result<(), ClientGone>;
}

/// Fail fast when the sink cannot stream. Must run before headers are sent.
pub fn ensure_flushable<K: FrameSink + ?Sized>(sink: &K) -> Result<(), RelayError> {
    if sink.supports_flush() {
        Ok(())
    } else {
        Err(RelayError::StreamingUnsupported)
    }
}

/// How a streaming relay ended.
#[derive(Debug)]
pub enum RelayOutcome {
    /// Upstream reached EOF and every record was forwarded.
    Clean { frames: usize },
    /// The client cancelled; upstream was abandoned.
    ClientGone { frames: usize },
    /// Upstream failed mid-body. Only loggable: headers are already out.
    UpstreamError { frames: usize, error: RelayError },
}

impl RelayOutcome {
    pub fn state(&self) -> RelayState {
        match self {
            RelayOutcome::Clean { .. } => RelayState::CompletedClean,
            RelayOutcome::ClientGone { .. } => RelayState::CompletedClientGone,
            RelayOutcome::UpstreamError { .. } => RelayState::CompletedUpstreamError,
        }
    }

    /// Frames delivered before the relay ended.
    pub fn frames(&self) -> usize {
        match self {
            RelayOutcome::Clean { frames }
            | RelayOutcome::ClientGone { frames }
            | RelayOutcome::UpstreamError { frames, .. } => *frames,
        }
    }
}

/// Forward one record, honouring cancellation first.
async fn forward<K: FrameSink + ?Sized>(
    sink: &mut K,
    record: Bytes,
    frames: &mut usize,
) -> Result<(), ClientGone> {
    if sink.is_cancelled() {
        return Err(ClientGone);
    }
    if record.is_empty() {
        return Ok(());
    }
    sink.send_frame(data_frame(&record)).await?;
    *frames += 1;
    Ok(())
}

/// Relay an upstream body to `sink` until EOF, cancellation, or read failure.
///
/// `body` is consumed and dropped on every exit path, which releases the
/// upstream connection. Cancellation is only observed between records: a
/// record is either forwarded whole or not at all.
pub async fn pump<S, E, K>(mut body: S, sink: &mut K, max_line_bytes: usize) -> RelayOutcome
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: fmt::Display,
    K: FrameSink + ?Sized,
{
    let mut lines = LineSplitter::new(max_line_bytes);
    let mut frames = 0;

    debug!(state = %RelayState::Streaming, "Relay started");

    loop {
        loop {
            match lines.next_line() {
                Ok(Some(record)) => {
                    if forward(sink, record, &mut frames).await.is_err() {
                        return RelayOutcome::ClientGone { frames };
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    return RelayOutcome::UpstreamError {
                        frames,
                        error: RelayError::UpstreamProtocol(e.to_string()),
                    };
                }
            }
        }

        match body.next().await {
            Some(Ok(chunk)) => lines.push(&chunk),
            Some(Err(e)) => {
                return RelayOutcome::UpstreamError {
                    frames,
                    error: RelayError::UpstreamProtocol(e.to_string()),
                };
            }
            None => break,
        }
    }

    if let Some(record) = lines.finish() {
        if forward(sink, record, &mut frames).await.is_err() {
            return RelayOutcome::ClientGone { frames };
        }
    }

    RelayOutcome::Clean { frames }
}
