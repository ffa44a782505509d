use bytes::{Buf, BytesMut};

use crate::codec::{Frame, FRAME_LEN};

const INITIAL_BUFFER_CAPACITY: usize = 256;

/// Reassembles frames from arbitrarily chunked receives.
///
/// A receive call may end mid-frame; the odd trailing byte is kept here and
/// completed by the first byte of the next receive, so a frame split across
/// two reads is never lost. At most `FRAME_LEN - 1` bytes are ever buffered.
#[derive(Debug)]
pub struct FrameAssembler {
    buf: BytesMut,
}

impl FrameAssembler {
    /// Create an empty assembler.
    pub fn new() -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Append received bytes.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Take the next complete frame, if one is buffered.
    pub fn next_frame(&mut self) -> Option<Frame> {
        if self.buf.len() < FRAME_LEN {
            return None;
        }
        let frame = Frame::new(self.buf[0], self.buf[1]);
        self.buf.advance(FRAME_LEN);
        Some(frame)
    }

    /// Bytes buffered awaiting a frame boundary (0 or 1).
    pub fn pending(&self) -> usize {
        self.buf.len()
    }
}

impl Default for FrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}
