use crate::cmd::FleetArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

/// Run the fleet for telemetry only: connect, print events, no command
/// input. Ctrl-C shuts down cleanly.
#[cfg(target_os = "linux")]
pub fn run(args: FleetArgs, format: OutputFormat) -> CliResult<i32> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use crate::cmd::install_ctrlc_handler;
    use crate::exit::{fleet_error, SUCCESS};

    let fleet = super::spawn_fleet(&args, format)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    while running.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(100));
    }

    fleet
        .shutdown()
        .map_err(|err| fleet_error("shutdown failed", err))?;
    Ok(SUCCESS)
}

#[cfg(not(target_os = "linux"))]
pub fn run(args: FleetArgs, _format: OutputFormat) -> CliResult<i32> {
    let _ = args;
    Err(crate::exit::CliError::new(
        crate::exit::UNSUPPORTED,
        "rfcomm transport requires Linux (BlueZ)",
    ))
}
