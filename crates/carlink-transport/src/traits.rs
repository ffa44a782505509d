use std::io;

use crate::addr::DeviceAddr;
use crate::error::Result;

/// Readiness of a stream, as reported by a zero-timeout poll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Readiness {
    /// A receive call would not block.
    pub readable: bool,
    /// A send call would not block. For a stream whose connect is still
    /// in progress, becoming writable signals connect completion (resolve
    /// it with [`ByteStream::connect_result`]).
    pub writable: bool,
    /// The peer hung up or the socket is in an error state.
    pub hangup: bool,
}

/// Outcome of a non-blocking connect attempt.
///
/// Hard failures are returned as [`crate::TransportError::Connect`]; the
/// platform-specific "operation now in progress" condition is `Pending`,
/// never an error.
#[derive(Debug)]
pub enum ConnectAttempt<S> {
    /// The connection completed immediately.
    Established(S),
    /// The connect is in progress; the stream becomes writable once it
    /// completes (or reports hangup if it does not).
    Pending(S),
}

/// A connected (or connecting) bidirectional byte stream.
///
/// All operations are non-blocking: `readiness` polls with zero timeout,
/// and `recv`/`send` are only called by the multiplexer after the matching
/// readiness bit was observed. Closing is dropping.
pub trait ByteStream {
    /// Poll the stream for readiness without blocking.
    fn readiness(&self) -> io::Result<Readiness>;

    /// Receive up to `buf.len()` bytes. Returns `Ok(0)` when the peer has
    /// closed the connection.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Send up to `buf.len()` bytes, returning how many were accepted.
    fn send(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Resolve a pending connect after the stream first reported writable.
    ///
    /// Returns the deferred connect error, if any. Streams that were
    /// established immediately may keep the default no-op.
    fn connect_result(&self) -> io::Result<()> {
        Ok(())
    }
}

/// Initiates connections to devices.
///
/// This is the seam between the fleet core and the platform: the real
/// implementation speaks RFCOMM, tests substitute a scripted double.
pub trait Connector {
    type Stream: ByteStream;

    /// Attempt a non-blocking connect to `addr`.
    fn connect(&self, addr: &DeviceAddr) -> Result<ConnectAttempt<Self::Stream>>;
}

impl<C: Connector> Connector for std::sync::Arc<C> {
    type Stream = C::Stream;

    fn connect(&self, addr: &DeviceAddr) -> Result<ConnectAttempt<Self::Stream>> {
        (**self).connect(addr)
    }
}
