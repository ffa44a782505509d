use std::slice::ChunksExact;

/// Wire size of every frame: opcode byte + value byte.
pub const FRAME_LEN: usize = 2;

/// A single protocol frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// What the frame is about (see [`crate::ops`]).
    pub opcode: u8,
    /// Opcode-dependent value byte.
    pub value: u8,
}

impl Frame {
    /// Create a new frame.
    pub const fn new(opcode: u8, value: u8) -> Self {
        Self { opcode, value }
    }

    /// The frame in wire order.
    pub const fn to_bytes(self) -> [u8; FRAME_LEN] {
        [self.opcode, self.value]
    }
}

/// Encode a frame into the wire format.
pub const fn encode_frame(opcode: u8, value: u8) -> [u8; FRAME_LEN] {
    [opcode, value]
}

/// Decode a buffer into consecutive frames, in receipt order.
///
/// Lazy and restartable; each call covers only the bytes passed to it.
/// A trailing odd byte is not a complete frame and is not yielded — callers
/// that receive a stream in chunks should use [`crate::FrameAssembler`],
/// which carries the partial byte over to the next chunk.
pub fn decode_frames(bytes: &[u8]) -> Frames<'_> {
    Frames {
        chunks: bytes.chunks_exact(FRAME_LEN),
    }
}

/// Iterator over the frames of a byte buffer. See [`decode_frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    chunks: ChunksExact<'a, u8>,
}

impl Iterator for Frames<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        self.chunks.next().map(|pair| Frame::new(pair[0], pair[1]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.chunks.size_hint()
    }
}

impl ExactSizeIterator for Frames<'_> {}
