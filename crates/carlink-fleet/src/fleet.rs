use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use carlink_transport::{ByteStream, Connector, DeviceAddr};
use tracing::info;

use crate::command::Command;
use crate::error::{FleetError, Result};
use crate::mux::DEFAULT_RECV_BUFFER;
use crate::registry::Registry;
use crate::telemetry::TelemetrySink;
use crate::{discovery, mux};

/// Tunables for the fleet's two loops.
#[derive(Debug, Clone)]
pub struct FleetConfig {
    /// Interval between discovery passes.
    pub discovery_interval: Duration,
    /// Interval between multiplexer passes.
    pub poll_interval: Duration,
    /// Bound for a single receive call.
    pub recv_buffer: usize,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            discovery_interval: Duration::from_secs(1),
            poll_interval: Duration::from_millis(10),
            recv_buffer: DEFAULT_RECV_BUFFER,
        }
    }
}

/// Runs the discovery loop and I/O multiplexer on background threads,
/// sharing one [`Registry`] and one shutdown flag.
///
/// Commands are broadcast from the caller's thread and only enqueue work;
/// all socket I/O happens on the multiplexer thread. Dropping the fleet
/// without calling [`Fleet::shutdown`] signals the workers but does not
/// wait for them.
pub struct Fleet<C: Connector> {
    registry: Arc<Registry<C::Stream>>,
    shutdown: Arc<AtomicBool>,
    discovery: Option<JoinHandle<()>>,
    mux: Option<JoinHandle<()>>,
}

impl<C> Fleet<C>
where
    C: Connector + Send + 'static,
    C::Stream: ByteStream + Send + 'static,
{
    /// Start the fleet for a fixed set of device addresses.
    pub fn spawn(
        connector: C,
        addresses: Vec<DeviceAddr>,
        config: FleetConfig,
        sink: Arc<dyn TelemetrySink>,
    ) -> Result<Self> {
        if addresses.is_empty() {
            return Err(FleetError::NoDevices);
        }

        let registry = Arc::new(Registry::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let discovery = {
            let registry = Arc::clone(&registry);
            let shutdown = Arc::clone(&shutdown);
            let interval = config.discovery_interval;
            std::thread::Builder::new()
                .name("carlink-discovery".into())
                .spawn(move || {
                    discovery::run(&connector, &addresses, &registry, interval, &shutdown);
                })
                .map_err(|source| FleetError::Spawn {
                    worker: "discovery",
                    source,
                })?
        };

        let mux = {
            let registry = Arc::clone(&registry);
            let worker_shutdown = Arc::clone(&shutdown);
            let interval = config.poll_interval;
            let recv_buffer = config.recv_buffer;
            std::thread::Builder::new()
                .name("carlink-mux".into())
                .spawn(move || {
                    mux::run(
                        &registry,
                        sink.as_ref(),
                        interval,
                        recv_buffer,
                        &worker_shutdown,
                    );
                })
                .map_err(|source| {
                    // The discovery worker is already running; tell it to stop.
                    shutdown.store(true, Ordering::SeqCst);
                    FleetError::Spawn {
                        worker: "multiplexer",
                        source,
                    }
                })?
        };

        Ok(Self {
            registry,
            shutdown,
            discovery: Some(discovery),
            mux: Some(mux),
        })
    }

    /// Enqueue `command` on every live link. Returns how many links it
    /// reached. Never blocks on I/O.
    pub fn broadcast(&self, command: Command) -> usize {
        self.registry.broadcast(command.frame())
    }

    /// The shared link registry.
    pub fn registry(&self) -> &Registry<C::Stream> {
        &self.registry
    }

    /// Stop both loops after their current tick, wait for them, and close
    /// every open transport.
    pub fn shutdown(mut self) -> Result<()> {
        info!("shutting down fleet");
        self.shutdown.store(true, Ordering::SeqCst);

        if let Some(worker) = self.discovery.take() {
            worker
                .join()
                .map_err(|_| FleetError::WorkerPanicked("discovery"))?;
        }
        if let Some(worker) = self.mux.take() {
            worker
                .join()
                .map_err(|_| FleetError::WorkerPanicked("multiplexer"))?;
        }

        self.registry.clear();
        Ok(())
    }
}

impl<C: Connector> Drop for Fleet<C> {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
    }
}
