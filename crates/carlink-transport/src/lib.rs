//! RFCOMM byte-stream transport abstraction.
//!
//! Provides the socket boundary the rest of carlink builds on:
//! - [`DeviceAddr`] — 6-byte Bluetooth hardware address
//! - [`Connector`] / [`ByteStream`] — the transport seam (non-blocking
//!   connect classification, zero-timeout readiness, bounded send/recv)
//! - [`RfcommConnector`] — the real BlueZ RFCOMM implementation (Linux)
//!
//! This is the lowest layer of carlink. Everything else is written against
//! the traits here, so the fleet core never touches a raw socket directly.

pub mod addr;
pub mod error;
pub mod traits;

#[cfg(target_os = "linux")]
pub mod rfcomm;

pub use addr::{AddrParseError, DeviceAddr};
pub use error::{Result, TransportError};
pub use traits::{ByteStream, ConnectAttempt, Connector, Readiness};

#[cfg(target_os = "linux")]
pub use rfcomm::{RfcommConnector, RfcommStream};
