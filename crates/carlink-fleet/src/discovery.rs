use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use carlink_transport::{ConnectAttempt, Connector, DeviceAddr};
use tracing::{debug, info};

use crate::registry::{LinkState, Registry};

/// One discovery pass: attempt a non-blocking connect for every configured
/// address that has no live link.
///
/// Immediate success inserts a `Connected` link; connect-in-progress
/// inserts a `Connecting` link whose completion the multiplexer observes
/// via write-readiness. Hard failures are logged at debug and retried on
/// the next tick — an unreachable car is routine, not an error.
pub fn tick<C: Connector>(connector: &C, known: &[DeviceAddr], registry: &Registry<C::Stream>) {
    for addr in known {
        if registry.contains(addr) {
            continue;
        }
        match connector.connect(addr) {
            Ok(ConnectAttempt::Established(stream)) => {
                info!(%addr, "device connected");
                registry.insert(*addr, stream, LinkState::Connected);
            }
            Ok(ConnectAttempt::Pending(stream)) => {
                debug!(%addr, "connect in progress");
                registry.insert(*addr, stream, LinkState::Connecting);
            }
            Err(err) => {
                debug!(%addr, %err, "connect attempt failed; retrying next tick");
            }
        }
    }
}

/// Discovery loop: one [`tick`] per interval until shutdown.
///
/// The per-address connect attempts are non-blocking, so one unreachable
/// address never stalls the pass for the others.
pub fn run<C: Connector>(
    connector: &C,
    known: &[DeviceAddr],
    registry: &Registry<C::Stream>,
    interval: Duration,
    shutdown: &AtomicBool,
) {
    while !shutdown.load(Ordering::SeqCst) {
        tick(connector, known, registry);
        std::thread::sleep(interval);
    }
    debug!("discovery loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{addr, MockConnector, Script};

    #[test]
    fn tick_connects_every_unlinked_address() {
        let connector = MockConnector::new(Script::Established);
        let registry = Registry::new();
        let known = [addr(1), addr(2)];

        tick(&connector, &known, &registry);

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.state_of(&addr(1)), Some(LinkState::Connected));
        assert_eq!(registry.state_of(&addr(2)), Some(LinkState::Connected));
    }

    #[test]
    fn pending_connect_is_inserted_as_connecting() {
        let connector = MockConnector::new(Script::Pending);
        let registry = Registry::new();

        tick(&connector, &[addr(1)], &registry);

        assert_eq!(registry.state_of(&addr(1)), Some(LinkState::Connecting));
    }

    #[test]
    fn refused_connect_is_retried_next_tick() {
        let connector = MockConnector::new(Script::Established);
        connector.script(addr(1), [Script::Refuse]);
        let registry = Registry::new();

        tick(&connector, &[addr(1)], &registry);
        assert!(registry.is_empty());
        assert_eq!(connector.attempts(&addr(1)), 1);

        tick(&connector, &[addr(1)], &registry);
        assert_eq!(registry.len(), 1);
        assert_eq!(connector.attempts(&addr(1)), 2);
    }

    #[test]
    fn live_addresses_are_skipped() {
        let connector = MockConnector::new(Script::Established);
        let registry = Registry::new();
        let known = [addr(1)];

        tick(&connector, &known, &registry);
        tick(&connector, &known, &registry);
        tick(&connector, &known, &registry);

        assert_eq!(connector.attempts(&addr(1)), 1);
    }
}
