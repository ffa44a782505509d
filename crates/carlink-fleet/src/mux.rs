use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use carlink_protocol::FRAME_LEN;
use carlink_transport::{ByteStream, DeviceAddr};
use tracing::{debug, info, warn};

use crate::registry::{LinkState, Registry};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Default bound for a single receive call.
pub const DEFAULT_RECV_BUFFER: usize = 1024;

/// One multiplexer pass over every live link.
///
/// Fairness round: each link gets at most one readiness check, one receive,
/// and one outbound frame per tick. Flushing a single frame per link per
/// tick bounds per-tick latency across the fleet; batching queued frames
/// into one send is a deliberate non-goal.
///
/// Any I/O error, hangup, or zero-length receive evicts the link — the sole
/// eviction path. Reconnection is entirely the discovery loop's business.
pub fn tick<S: ByteStream>(registry: &Registry<S>, sink: &dyn TelemetrySink, buf: &mut [u8]) {
    registry.with_links(|links| {
        let mut evicted: Vec<DeviceAddr> = Vec::new();

        for (addr, link) in links.iter_mut() {
            let ready = match link.transport.readiness() {
                Ok(ready) => ready,
                Err(err) => {
                    warn!(%addr, %err, "readiness poll failed; evicting");
                    evicted.push(*addr);
                    continue;
                }
            };

            if ready.hangup {
                info!(%addr, "device hung up; evicting");
                evicted.push(*addr);
                continue;
            }

            if ready.readable {
                match link.transport.recv(buf) {
                    Ok(0) => {
                        info!(%addr, "device closed connection; evicting");
                        evicted.push(*addr);
                        continue;
                    }
                    Ok(n) => {
                        // A successful read doubles as connect completion.
                        if link.state == LinkState::Connecting {
                            info!(%addr, "device connected");
                            link.state = LinkState::Connected;
                        }
                        link.assembler.push(&buf[..n]);
                        while let Some(frame) = link.assembler.next_frame() {
                            if let Some(event) = TelemetryEvent::from_frame(frame) {
                                sink.on_event(*addr, event);
                            }
                        }
                    }
                    Err(err) if err.kind() == ErrorKind::WouldBlock => {}
                    Err(err) => {
                        warn!(%addr, %err, "receive failed; evicting");
                        evicted.push(*addr);
                        continue;
                    }
                }
            }

            if ready.writable {
                if link.state == LinkState::Connecting {
                    match link.transport.connect_result() {
                        Ok(()) => {
                            info!(%addr, "device connected");
                            link.state = LinkState::Connected;
                        }
                        Err(err) => {
                            debug!(%addr, %err, "pending connect failed; evicting");
                            evicted.push(*addr);
                            continue;
                        }
                    }
                }

                if let Some(frame) = link.queue.pop_front() {
                    let wire = frame.to_bytes();
                    match link.transport.send(&wire) {
                        Ok(FRAME_LEN) => {}
                        Ok(_) => {
                            // A short write would desynchronize the frame
                            // stream; treat it like any other I/O failure.
                            warn!(%addr, "short write; evicting");
                            evicted.push(*addr);
                        }
                        Err(err) if err.kind() == ErrorKind::WouldBlock => {
                            link.queue.push_front(frame);
                        }
                        Err(err) => {
                            warn!(%addr, %err, "send failed; evicting");
                            evicted.push(*addr);
                        }
                    }
                }
            }
        }

        for addr in evicted {
            links.remove(&addr);
        }
    });
}

/// Multiplexer loop: one [`tick`] per interval until shutdown.
pub fn run<S: ByteStream>(
    registry: &Registry<S>,
    sink: &dyn TelemetrySink,
    interval: Duration,
    recv_buffer: usize,
    shutdown: &AtomicBool,
) {
    let mut buf = vec![0u8; recv_buffer.max(FRAME_LEN)];
    while !shutdown.load(Ordering::SeqCst) {
        tick(registry, sink, &mut buf);
        std::thread::sleep(interval);
    }
    debug!("multiplexer loop stopped");
}
