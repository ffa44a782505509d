use std::io;
use std::mem;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd};

use tracing::debug;

use crate::addr::DeviceAddr;
use crate::error::{Result, TransportError};
use crate::traits::{ByteStream, ConnectAttempt, Connector, Readiness};

/// Bluetooth protocol number for RFCOMM (not exposed by libc).
const BTPROTO_RFCOMM: libc::c_int = 3;

/// Default RFCOMM channel the car controllers listen on.
pub const DEFAULT_CHANNEL: u8 = 1;

/// `struct sockaddr_rc` from BlueZ `<bluetooth/rfcomm.h>`.
#[repr(C)]
struct SockaddrRc {
    rc_family: libc::sa_family_t,
    rc_bdaddr: [u8; 6],
    rc_channel: u8,
}

/// BlueZ stores `bdaddr_t` least-significant octet first, the reverse of
/// the textual form.
fn bdaddr_wire_order(addr: &DeviceAddr) -> [u8; 6] {
    let mut octets = addr.octets();
    octets.reverse();
    octets
}

/// A non-blocking RFCOMM stream socket.
///
/// The descriptor is closed on drop.
pub struct RfcommStream {
    fd: OwnedFd,
    addr: DeviceAddr,
}

impl RfcommStream {
    /// The device this stream is connected (or connecting) to.
    pub fn peer_addr(&self) -> DeviceAddr {
        self.addr
    }
}

impl std::fmt::Debug for RfcommStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RfcommStream")
            .field("addr", &self.addr)
            .field("fd", &self.fd.as_raw_fd())
            .finish()
    }
}

impl ByteStream for RfcommStream {
    fn readiness(&self) -> io::Result<Readiness> {
        let mut pfd = libc::pollfd {
            fd: self.fd.as_raw_fd(),
            events: libc::POLLIN | libc::POLLOUT,
            revents: 0,
        };

        // SAFETY: `pfd` is a valid pollfd for the duration of the call and
        // `fd` is an open descriptor owned by this stream. Zero timeout, so
        // this never blocks.
        let rc = unsafe { libc::poll(&mut pfd, 1, 0) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                return Ok(Readiness::default());
            }
            return Err(err);
        }

        Ok(Readiness {
            readable: pfd.revents & libc::POLLIN != 0,
            writable: pfd.revents & libc::POLLOUT != 0,
            hangup: pfd.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0,
        })
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is a valid writable region of `buf.len()` bytes
            // and `fd` is an open descriptor owned by this stream.
            let n = unsafe {
                libc::read(self.fd.as_raw_fd(), buf.as_mut_ptr().cast(), buf.len())
            };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            // SAFETY: `buf` is a valid readable region of `buf.len()` bytes
            // and `fd` is an open descriptor owned by this stream.
            let n = unsafe {
                libc::write(self.fd.as_raw_fd(), buf.as_ptr().cast(), buf.len())
            };
            if n >= 0 {
                return Ok(n as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }

    fn connect_result(&self) -> io::Result<()> {
        let mut code: libc::c_int = 0;
        let mut len = mem::size_of::<libc::c_int>() as libc::socklen_t;

        // SAFETY: `code` and `len` are valid writable pointers for the
        // provided sizes, and `fd` is an open socket descriptor owned by
        // this stream.
        let rc = unsafe {
            libc::getsockopt(
                self.fd.as_raw_fd(),
                libc::SOL_SOCKET,
                libc::SO_ERROR,
                (&mut code as *mut libc::c_int).cast::<libc::c_void>(),
                &mut len,
            )
        };
        if rc != 0 {
            return Err(io::Error::last_os_error());
        }
        if code != 0 {
            return Err(io::Error::from_raw_os_error(code));
        }
        Ok(())
    }
}

/// RFCOMM connector over BlueZ stream sockets.
///
/// Sockets are created non-blocking, so `connect(2)` returns either
/// immediately or with `EINPROGRESS`; completion is observed later through
/// write-readiness (the standard non-blocking-connect idiom).
#[derive(Debug, Clone)]
pub struct RfcommConnector {
    channel: u8,
}

impl RfcommConnector {
    pub fn new(channel: u8) -> Self {
        Self { channel }
    }

    /// The RFCOMM channel connect attempts target.
    pub fn channel(&self) -> u8 {
        self.channel
    }
}

impl Default for RfcommConnector {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}

impl Connector for RfcommConnector {
    type Stream = RfcommStream;

    fn connect(&self, addr: &DeviceAddr) -> Result<ConnectAttempt<RfcommStream>> {
        // SAFETY: plain socket(2) call; the returned descriptor is checked
        // before use and transferred into an OwnedFd.
        let raw = unsafe {
            libc::socket(
                libc::AF_BLUETOOTH,
                libc::SOCK_STREAM | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                BTPROTO_RFCOMM,
            )
        };
        if raw < 0 {
            return Err(TransportError::Connect {
                addr: *addr,
                source: io::Error::last_os_error(),
            });
        }
        // SAFETY: `raw` is a freshly created, open descriptor not owned by
        // anything else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        let sa = SockaddrRc {
            rc_family: libc::AF_BLUETOOTH as libc::sa_family_t,
            rc_bdaddr: bdaddr_wire_order(addr),
            rc_channel: self.channel,
        };

        // SAFETY: `sa` is a properly initialized sockaddr_rc and the length
        // matches its size; `fd` is an open socket descriptor.
        let rc = unsafe {
            libc::connect(
                fd.as_raw_fd(),
                (&sa as *const SockaddrRc).cast::<libc::sockaddr>(),
                mem::size_of::<SockaddrRc>() as libc::socklen_t,
            )
        };

        let stream = RfcommStream { fd, addr: *addr };

        if rc == 0 {
            debug!(%addr, channel = self.channel, "rfcomm connect completed immediately");
            return Ok(ConnectAttempt::Established(stream));
        }

        let err = io::Error::last_os_error();
        match err.raw_os_error() {
            Some(libc::EINPROGRESS) | Some(libc::EAGAIN) => {
                debug!(%addr, channel = self.channel, "rfcomm connect in progress");
                Ok(ConnectAttempt::Pending(stream))
            }
            _ => Err(TransportError::Connect {
                addr: *addr,
                source: err,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bdaddr_is_reversed_for_the_wire() {
        let addr: DeviceAddr = "00:06:66:49:89:E3".parse().unwrap();
        assert_eq!(
            bdaddr_wire_order(&addr),
            [0xE3, 0x89, 0x49, 0x66, 0x06, 0x00]
        );
    }

    #[test]
    fn connector_default_channel() {
        assert_eq!(RfcommConnector::default().channel(), DEFAULT_CHANNEL);
    }
}
