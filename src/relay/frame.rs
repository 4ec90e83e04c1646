//! SSE framing for upstream records.

use bytes::{BufMut, Bytes, BytesMut};

const DATA_PREFIX: &[u8] = b"data: ";
const FRAME_END: &[u8] = b"\n\n";

/// Wrap one record as a `data:` event: `data: <record>\n\n`.
///
/// The record is copied verbatim. Callers never pass records containing a
/// newline, so a single `data:` field is always enough.
pub fn data_frame(record: &[u8]) -> Bytes {
    let mut frame = BytesMut::with_capacity(DATA_PREFIX.len() + record.len() + FRAME_END.len());
    frame.put_slice(DATA_PREFIX);
    frame.put_slice(record);
    frame.put_slice(FRAME_END);
    frame.freeze()
}
