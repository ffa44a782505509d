use crate::addr::DeviceAddr;

/// Errors that can occur in transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// A connect attempt failed outright (in-progress is not an error;
    /// see [`crate::traits::ConnectAttempt`]).
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: DeviceAddr,
        source: std::io::Error,
    },

    /// An I/O error occurred on an established stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport is not available on this platform.
    #[error("transport unsupported on this platform: {0}")]
    Unsupported(&'static str),
}

pub type Result<T> = std::result::Result<T, TransportError>;
