//! Newline-delimited record splitting over a chunked byte stream.
//!
//! Chunks from the HTTP body arrive with arbitrary boundaries; this buffers
//! them and yields one record per `\n`. A trailing `\r` is dropped from each
//! record, and a final record without a newline is still yielded at EOF.

use bytes::{Bytes, BytesMut};
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
#[error("upstream record exceeds {limit} bytes")]
pub struct LineTooLong {
    pub limit: usize,
}

/// Incremental line splitter with a bounded record length.
#[derive(Debug)]
pub struct LineSplitter {
    buf: BytesMut,
    max_line: usize,
    /// Bytes of `buf` already searched for a newline.
    scanned: usize,
}

impl LineSplitter {
    pub fn new(max_line: usize) -> Self {
        Self {
            buf: BytesMut::new(),
            max_line,
            scanned: 0,
        }
    }

    /// Append a chunk read from the body.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buf.extend_from_slice(chunk);
    }

    /// Take the next complete record, if one is buffered.
    pub fn next_line(&mut self) -> Result<Option<Bytes>, LineTooLong> {
        let found = self.buf[self.scanned..].iter().position(|&b| b == b'\n');
        match found {
            Some(offset) => {
                let end = self.scanned + offset;
                self.scanned = 0;
                if end > self.max_line {
                    return Err(LineTooLong {
                        limit: self.max_line,
                    });
                }
                let mut line = self.buf.split_to(end + 1);
                line.truncate(end);
                Ok(Some(trim_cr(line.freeze())))
            }
            None => {
                self.scanned = self.buf.len();
                if self.buf.len() > self.max_line {
                    return Err(LineTooLong {
                        limit: self.max_line,
                    });
                }
                Ok(None)
            }
        }
    }

    /// Take whatever remains once the body has ended.
    pub fn finish(&mut self) -> Option<Bytes> {
        self.scanned = 0;
        if self.buf.is_empty() {
            return None;
        }
        Some(trim_cr(self.buf.split().freeze()))
    }
}

fn trim_cr(mut line: Bytes) -> Bytes {
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    line
}
