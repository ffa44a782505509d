use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use carlink_protocol::{Frame, FrameAssembler};
use carlink_transport::DeviceAddr;
use tracing::debug;

/// Connection state of a live link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// Non-blocking connect still in progress; resolved by the multiplexer
    /// once the socket first reports writable.
    Connecting,
    /// Connect completed; reads and writes are expected to succeed.
    Connected,
}

/// Everything the fleet tracks for one device: the exclusively owned
/// transport, the outbound frame queue, the connection state, and the
/// inbound frame assembler.
pub(crate) struct Link<S> {
    pub transport: S,
    pub state: LinkState,
    pub queue: VecDeque<Frame>,
    pub assembler: FrameAssembler,
}

impl<S> Link<S> {
    fn new(transport: S, state: LinkState) -> Self {
        Self {
            transport,
            state,
            queue: VecDeque::new(),
            assembler: FrameAssembler::new(),
        }
    }
}

/// The set of live device links, keyed by address.
///
/// Shared mutable state between the discovery loop (insertions), the
/// multiplexer (removals and I/O), and the dispatcher (queue pushes); all
/// access goes through one internal lock. Invariant: at most one link per
/// address at any instant — an insert never displaces an existing link.
pub struct Registry<S> {
    links: Mutex<HashMap<DeviceAddr, Link<S>>>,
}

impl<S> Registry<S> {
    pub fn new() -> Self {
        Self {
            links: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<DeviceAddr, Link<S>>> {
        // A worker that panicked mid-tick leaves the map in a usable state;
        // keep going rather than poisoning every other loop.
        self.links.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a link for `addr`. Returns `false` (dropping `transport`,
    /// which closes it) if the address already has a live link.
    pub fn insert(&self, addr: DeviceAddr, transport: S, state: LinkState) -> bool {
        match self.lock().entry(addr) {
            Entry::Occupied(_) => {
                debug!(%addr, "already have a live link; dropping duplicate");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(Link::new(transport, state));
                true
            }
        }
    }

    /// Remove the link for `addr`, closing its transport. Returns whether
    /// a link was present.
    pub fn remove(&self, addr: &DeviceAddr) -> bool {
        self.lock().remove(addr).is_some()
    }

    /// Drop every link, closing all transports.
    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn contains(&self, addr: &DeviceAddr) -> bool {
        self.lock().contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Addresses that currently have a live link.
    pub fn live_addrs(&self) -> Vec<DeviceAddr> {
        self.lock().keys().copied().collect()
    }

    /// Connection state of the link for `addr`, if live.
    pub fn state_of(&self, addr: &DeviceAddr) -> Option<LinkState> {
        self.lock().get(addr).map(|link| link.state)
    }

    /// Queued outbound frames for `addr`, if live.
    pub fn queued(&self, addr: &DeviceAddr) -> Option<usize> {
        self.lock().get(addr).map(|link| link.queue.len())
    }

    /// Enqueue `frame` on every live link. Returns how many links it was
    /// queued on. Pure queue production; no I/O happens here.
    pub fn broadcast(&self, frame: Frame) -> usize {
        let mut links = self.lock();
        for link in links.values_mut() {
            link.queue.push_back(frame);
        }
        links.len()
    }

    /// Run `f` with exclusive access to the link map. The multiplexer's
    /// per-tick entry point; everything inside must stay non-blocking.
    pub(crate) fn with_links<R>(&self, f: impl FnOnce(&mut HashMap<DeviceAddr, Link<S>>) -> R) -> R {
        f(&mut self.lock())
    }
}

impl<S> Default for Registry<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use carlink_protocol::ops::{THROTTLE, THROTTLE_STOP};

    use super::*;
    use crate::mock::{addr, MockHandle, MockStream};

    #[test]
    fn insert_is_unique_per_address() {
        let registry = Registry::new();
        let a = addr(1);

        assert!(registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connected));
        assert!(!registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connecting));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.state_of(&a), Some(LinkState::Connected));
    }

    #[test]
    fn remove_then_insert_again() {
        let registry = Registry::new();
        let a = addr(2);

        registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connected);
        assert!(registry.remove(&a));
        assert!(!registry.remove(&a));
        assert!(registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connecting));
    }

    #[test]
    fn broadcast_enqueues_one_frame_per_live_link() {
        let registry = Registry::new();
        let a = addr(1);
        let b = addr(2);
        let absent = addr(3);

        registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connected);
        registry.insert(b, MockStream::new(MockHandle::new()), LinkState::Connecting);

        let reached = registry.broadcast(Frame::new(THROTTLE, THROTTLE_STOP));

        assert_eq!(reached, 2);
        assert_eq!(registry.queued(&a), Some(1));
        assert_eq!(registry.queued(&b), Some(1));
        assert_eq!(registry.queued(&absent), None);
    }

    #[test]
    fn uniqueness_holds_under_concurrent_insert_and_remove() {
        let registry = Arc::new(Registry::new());
        let a = addr(7);

        let mut workers = Vec::new();
        for _ in 0..4 {
            let registry = Arc::clone(&registry);
            workers.push(std::thread::spawn(move || {
                for _ in 0..500 {
                    registry.insert(a, MockStream::new(MockHandle::new()), LinkState::Connected);
                    assert!(registry.len() <= 1);
                    registry.remove(&a);
                }
            }));
        }
        for worker in workers {
            worker.join().expect("worker should not panic");
        }

        assert!(registry.len() <= 1);
    }
}
