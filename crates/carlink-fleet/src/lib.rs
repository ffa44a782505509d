//! Connection management and I/O multiplexing for a fleet of car
//! controllers.
//!
//! Three units of work share one [`Registry`]:
//!
//! - the **discovery loop** ([`discovery`]) reconnects every configured
//!   address that has no live link, once per tick;
//! - the **I/O multiplexer** ([`mux`]) polls every live link for readiness,
//!   decodes inbound telemetry, flushes at most one queued frame per link
//!   per tick, and evicts links on any I/O error;
//! - the **command dispatcher** ([`Command`] + [`Registry::broadcast`])
//!   enqueues outbound frames on every live link from the control path,
//!   never touching a transport.
//!
//! [`Fleet::spawn`] wires the first two onto background threads with a
//! shared shutdown flag; broadcasting stays on the caller's thread.

pub mod command;
pub mod discovery;
pub mod error;
pub mod fleet;
pub mod mux;
pub mod registry;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod mock;

pub use command::Command;
pub use error::{FleetError, Result};
pub use fleet::{Fleet, FleetConfig};
pub use registry::{LinkState, Registry};
pub use telemetry::{TelemetryEvent, TelemetrySink};
