//! Scripted transport doubles for unit tests.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use carlink_transport::{
    ByteStream, ConnectAttempt, Connector, DeviceAddr, Readiness, Result as TransportResult,
    TransportError,
};

use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Test address in the fleet's vendor range.
pub(crate) fn addr(n: u8) -> DeviceAddr {
    DeviceAddr::new([0x00, 0x06, 0x66, 0x00, 0x00, n])
}

#[derive(Default)]
struct MockState {
    inbound: VecDeque<u8>,
    sent: Vec<u8>,
    writable: bool,
    hangup: bool,
    peer_closed: bool,
    recv_error: Option<io::ErrorKind>,
    send_error: Option<io::ErrorKind>,
    connect_error: Option<io::ErrorKind>,
}

/// Shared control handle for one [`MockStream`]; tests keep the handle,
/// the registry owns the stream.
#[derive(Clone)]
pub(crate) struct MockHandle {
    state: Arc<Mutex<MockState>>,
}

impl MockHandle {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                writable: true,
                ..MockState::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push_inbound(&self, bytes: &[u8]) {
        self.lock().inbound.extend(bytes.iter().copied());
    }

    pub fn sent(&self) -> Vec<u8> {
        self.lock().sent.clone()
    }

    pub fn set_writable(&self, writable: bool) {
        self.lock().writable = writable;
    }

    pub fn set_hangup(&self) {
        self.lock().hangup = true;
    }

    /// Make the next readiness report readable and the receive return 0
    /// bytes (peer closed).
    pub fn close_peer(&self) {
        self.lock().peer_closed = true;
    }

    pub fn fail_next_recv(&self, kind: io::ErrorKind) {
        self.lock().recv_error = Some(kind);
    }

    pub fn fail_next_send(&self, kind: io::ErrorKind) {
        self.lock().send_error = Some(kind);
    }

    pub fn set_connect_error(&self, kind: io::ErrorKind) {
        self.lock().connect_error = Some(kind);
    }
}

pub(crate) struct MockStream {
    handle: MockHandle,
}

impl MockStream {
    pub fn new(handle: MockHandle) -> Self {
        Self { handle }
    }
}

impl ByteStream for MockStream {
    fn readiness(&self) -> io::Result<Readiness> {
        let state = self.handle.lock();
        Ok(Readiness {
            readable: !state.inbound.is_empty()
                || state.peer_closed
                || state.recv_error.is_some(),
            writable: state.writable,
            hangup: state.hangup,
        })
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.handle.lock();
        if let Some(kind) = state.recv_error.take() {
            return Err(kind.into());
        }
        if state.inbound.is_empty() && state.peer_closed {
            return Ok(0);
        }
        let mut n = 0;
        while n < buf.len() {
            match state.inbound.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                }
                None => break,
            }
        }
        Ok(n)
    }

    fn send(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut state = self.handle.lock();
        if let Some(kind) = state.send_error.take() {
            return Err(kind.into());
        }
        state.sent.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn connect_result(&self) -> io::Result<()> {
        match self.handle.lock().connect_error.take() {
            Some(kind) => Err(kind.into()),
            None => Ok(()),
        }
    }
}

/// Outcome a [`MockConnector`] produces for one connect attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Script {
    Established,
    Pending,
    Refuse,
}

/// Connector double: per-address scripted outcomes with a default, plus
/// attempt counting and access to the handles of created streams.
pub(crate) struct MockConnector {
    default_script: Script,
    scripts: Mutex<HashMap<DeviceAddr, VecDeque<Script>>>,
    attempts: Mutex<HashMap<DeviceAddr, usize>>,
    handles: Mutex<HashMap<DeviceAddr, Vec<MockHandle>>>,
}

impl MockConnector {
    pub fn new(default_script: Script) -> Self {
        Self {
            default_script,
            scripts: Mutex::new(HashMap::new()),
            attempts: Mutex::new(HashMap::new()),
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Queue outcomes for `addr`; once exhausted the default applies.
    pub fn script(&self, addr: DeviceAddr, outcomes: impl IntoIterator<Item = Script>) {
        self.scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(addr)
            .or_default()
            .extend(outcomes);
    }

    pub fn attempts(&self, addr: &DeviceAddr) -> usize {
        self.attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(addr)
            .copied()
            .unwrap_or(0)
    }

    /// Control handle of the most recently created stream for `addr`.
    pub fn handle(&self, addr: &DeviceAddr) -> MockHandle {
        self.handles
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(addr)
            .and_then(|created| created.last())
            .expect("no stream created for address")
            .clone()
    }
}

impl Connector for MockConnector {
    type Stream = MockStream;

    fn connect(&self, addr: &DeviceAddr) -> TransportResult<ConnectAttempt<MockStream>> {
        *self
            .attempts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(*addr)
            .or_default() += 1;

        let script = self
            .scripts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(addr)
            .and_then(VecDeque::pop_front)
            .unwrap_or(self.default_script);

        match script {
            Script::Refuse => Err(TransportError::Connect {
                addr: *addr,
                source: io::ErrorKind::ConnectionRefused.into(),
            }),
            outcome => {
                let handle = MockHandle::new();
                self.handles
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .entry(*addr)
                    .or_default()
                    .push(handle.clone());
                let stream = MockStream::new(handle);
                Ok(match outcome {
                    Script::Established => ConnectAttempt::Established(stream),
                    _ => ConnectAttempt::Pending(stream),
                })
            }
        }
    }
}

/// Sink that records every delivered event.
#[derive(Default)]
pub(crate) struct RecordingSink {
    events: Mutex<Vec<(DeviceAddr, TelemetryEvent)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<(DeviceAddr, TelemetryEvent)> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TelemetrySink for RecordingSink {
    fn on_event(&self, addr: DeviceAddr, event: TelemetryEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((addr, event));
    }
}
