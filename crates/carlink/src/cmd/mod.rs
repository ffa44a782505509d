use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use carlink_transport::DeviceAddr;
use clap::{Args, Subcommand};

use crate::exit::{CliError, CliResult, INTERNAL, USAGE};
use crate::output::OutputFormat;

pub mod drive;
pub mod monitor;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect to the fleet and drive it from the keyboard.
    Drive(FleetArgs),
    /// Connect to the fleet and print telemetry only.
    Monitor(FleetArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Drive(args) => drive::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FleetArgs {
    /// Device addresses to connect to (XX:XX:XX:XX:XX:XX, as shown by
    /// `hcitool scan`).
    #[arg(required = true)]
    pub addresses: Vec<DeviceAddr>,

    /// RFCOMM channel the car controllers listen on.
    #[arg(long, short = 'c', default_value_t = 1)]
    pub channel: u8,

    /// Interval between reconnect passes (e.g. 1s, 500ms).
    #[arg(long, default_value = "1s")]
    pub discovery_interval: String,

    /// Interval between I/O polls (e.g. 10ms).
    #[arg(long, default_value = "10ms")]
    pub poll_interval: String,
}

#[derive(Args, Debug, Default)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let split = input
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(input.len());
    let (digits, unit) = input.split_at(split);

    let value: u64 = digits
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;
    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

/// Start the fleet over the real RFCOMM transport, printing telemetry to
/// stdout in the requested format.
#[cfg(target_os = "linux")]
pub(crate) fn spawn_fleet(
    args: &FleetArgs,
    format: OutputFormat,
) -> CliResult<carlink_fleet::Fleet<carlink_transport::RfcommConnector>> {
    use carlink_fleet::{Fleet, FleetConfig};
    use carlink_transport::RfcommConnector;

    use crate::exit::fleet_error;
    use crate::output::StdoutTelemetry;

    let config = FleetConfig {
        discovery_interval: parse_duration(&args.discovery_interval)?,
        poll_interval: parse_duration(&args.poll_interval)?,
        ..FleetConfig::default()
    };

    Fleet::spawn(
        RfcommConnector::new(args.channel),
        args.addresses.clone(),
        config,
        Arc::new(StdoutTelemetry::new(format)),
    )
    .map_err(|err| fleet_error("failed to start fleet", err))
}

pub(crate) fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
