/// Errors that can occur managing the fleet.
///
/// Per-connection I/O failures are deliberately not represented here: a
/// failing link is evicted and rediscovered, and the only user-visible
/// signal is the device dropping out of telemetry and broadcast.
#[derive(Debug, thiserror::Error)]
pub enum FleetError {
    /// No device addresses were configured.
    #[error("no device addresses configured")]
    NoDevices,

    /// A worker thread could not be spawned.
    #[error("failed to spawn {worker} worker: {source}")]
    Spawn {
        worker: &'static str,
        source: std::io::Error,
    },

    /// A worker thread panicked before shutdown completed.
    #[error("{0} worker panicked")]
    WorkerPanicked(&'static str),
}

pub type Result<T> = std::result::Result<T, FleetError>;
