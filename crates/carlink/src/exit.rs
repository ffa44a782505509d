use std::fmt;
use std::io;

use carlink_fleet::FleetError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 64;
#[allow(dead_code)] // only referenced on non-Linux targets
pub const UNSUPPORTED: i32 = 69;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => FAILURE,
        io::ErrorKind::ConnectionRefused => FAILURE,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn fleet_error(context: &str, err: FleetError) -> CliError {
    match err {
        FleetError::NoDevices => CliError::new(USAGE, format!("{context}: {err}")),
        FleetError::Spawn { source, .. } => io_error(context, source),
        FleetError::WorkerPanicked(_) => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}
