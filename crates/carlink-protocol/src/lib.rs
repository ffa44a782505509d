//! Two-byte command/telemetry frame codec.
//!
//! The car controllers speak a fixed-width protocol: every message is
//! exactly two bytes, an opcode followed by a value. No length prefix, no
//! escaping, no checksum — the stream is just back-to-back frames.
//!
//! - [`codec`] — [`Frame`], encode, and a lazy decode iterator
//! - [`assembler`] — [`FrameAssembler`], carrying partial bytes across reads
//! - [`ops`] — the opcode and value constant table

pub mod assembler;
pub mod codec;
pub mod ops;

pub use assembler::FrameAssembler;
pub use codec::{decode_frames, encode_frame, Frame, Frames, FRAME_LEN};
