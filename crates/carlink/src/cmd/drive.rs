use crate::cmd::FleetArgs;
use crate::exit::CliResult;
use crate::output::OutputFormat;

/// Run the fleet and read single-character commands from stdin.
///
/// Input is line-buffered by the terminal, so each command takes effect
/// when Enter is pressed; newlines themselves are unrecognized tokens and
/// ignored. Ctrl-C (or EOF) shuts the fleet down cleanly.
#[cfg(target_os = "linux")]
pub fn run(args: FleetArgs, format: OutputFormat) -> CliResult<i32> {
    use std::io::Read;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use tracing::debug;

    use crate::cmd::install_ctrlc_handler;
    use crate::exit::{fleet_error, SUCCESS};
    use crate::keys::command_for_key;

    let fleet = super::spawn_fleet(&args, format)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut stdin = std::io::stdin().lock();
    let mut byte = [0u8; 1];
    while running.load(Ordering::SeqCst) {
        match stdin.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                if let Some(command) = command_for_key(byte[0]) {
                    let reached = fleet.broadcast(command);
                    debug!(?command, reached, "broadcast");
                }
            }
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => {
                // Shut the fleet down before surfacing the stdin failure.
                let _ = fleet.shutdown();
                return Err(crate::exit::io_error("stdin read failed", err));
            }
        }
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
