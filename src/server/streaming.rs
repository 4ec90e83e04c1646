//! SSE response body backed by a bounded channel.
//!
//! The relay task writes frames into the channel; the HTTP body streams them
//! out. When the client disconnects the body is dropped, the receiver goes
//! with it, and the sender observes a closed channel: that is the relay's
//! cancellation signal.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;

use crate::relay::{ClientGone, FrameSink};

/// Sender half of an SSE response body.
pub struct ChannelSink {
    tx: mpsc::Sender<Bytes>,
}

#[async_trait]
impl FrameSink for ChannelSink {
    fn supports_flush(&self) -> bool {
        // Each received frame is yielded to hyper as its own body chunk.
        true
    }

    fn is_cancelled(&self) -> bool {
        self.tx.is_closed()
    }

    async fn send_frame(&mut self, frame: Bytes) -> Result<(), ClientGone> {
        self.tx.send(frame).await.map_err(|_| ClientGone)
    }
}

/// Create a sink and the receiver that feeds the response body.
///
/// `buffer` bounds how far the relay may run ahead of the client socket.
pub fn event_channel(buffer: usize) -> (ChannelSink, mpsc::Receiver<Bytes>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (ChannelSink { tx }, rx)
}

/// Build the `text/event-stream` response streaming every frame from `rx`.
pub fn event_stream_response(rx: mpsc::Receiver<Bytes>) -> Response {
    let stream = ReceiverStream::new(rx).map(Ok::<_, Infallible>);

    (
        [
            (CONTENT_TYPE, "text/event-stream"),
            (CACHE_CONTROL, "no-cache"),
            (CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}
