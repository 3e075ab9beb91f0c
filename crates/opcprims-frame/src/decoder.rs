use bytes::BytesMut;
use tracing::trace;

use crate::codec::{decode_frame, Frame};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Incremental frame decoder.
///
/// Accepts byte chunks split at arbitrary boundaries and yields every frame
/// that becomes complete, in arrival order. Bytes that do not yet form a
/// complete frame (a partial header, or a header whose payload has not fully
/// arrived) are kept in a residual buffer and re-parsed when the next chunk
/// is fed. There is no expiry: a partial frame waits indefinitely.
///
/// One decoder must be driven by one caller at a time.
#[derive(Debug)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameDecoder {
    /// Create a decoder with an empty residual buffer.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Feed one chunk and collect every frame it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Frame> {
        let mut frames = Vec::new();
        self.feed_with(chunk, |frame| frames.push(frame));
        frames
    }

    /// Feed one chunk and hand each completed frame to `on_frame` before
    /// returning.
    pub fn feed_with<F>(&mut self, chunk: &[u8], mut on_frame: F)
    where
        F: FnMut(Frame),
    {
        self.buf.extend_from_slice(chunk);

        while let Some(frame) = decode_frame(&mut self.buf) {
            trace!(
                channel = frame.channel,
                command = frame.command.as_u8(),
                len = frame.payload.len(),
                "decoded frame"
            );
            on_frame(frame);
        }

        if !self.buf.is_empty() {
            trace!(residual = self.buf.len(), "waiting for more data");
        }
    }

    /// Number of residual bytes waiting for the rest of their frame.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Returns true if no partial frame is pending.
    pub fn is_idle(&self) -> bool {
        self.buf.is_empty()
    }

    /// Discard any partial frame.
    pub fn reset(&mut self) {
        self.buf.clear();
    }
}
