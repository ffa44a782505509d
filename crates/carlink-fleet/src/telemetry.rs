use carlink_protocol::ops::{BATTERY, HALL_SENSOR, HALL_SENSOR_ON};
use carlink_protocol::Frame;
use carlink_transport::DeviceAddr;

/// A decoded inbound report from a device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TelemetryEvent {
    /// The car's hall sensor passed over a track magnet.
    MagnetDetected,
    /// Battery voltage reading, in volts.
    BatteryVoltage(f32),
}

impl TelemetryEvent {
    /// Classify an inbound frame. Frames that are not telemetry (or carry
    /// an inactive sensor value) yield `None` and are dropped silently.
    pub fn from_frame(frame: Frame) -> Option<Self> {
        match frame.opcode {
            HALL_SENSOR if frame.value == HALL_SENSOR_ON => Some(Self::MagnetDetected),
            BATTERY => Some(Self::BatteryVoltage(f32::from(frame.value) / 10.0)),
            _ => None,
        }
    }
}

/// Receives telemetry decoded by the multiplexer.
///
/// Implementations must be cheap and non-blocking; they run inline on the
/// multiplexer's tick.
pub trait TelemetrySink: Send + Sync {
    fn on_event(&self, addr: DeviceAddr, event: TelemetryEvent);
}

/// Discards everything. Useful when only command fan-out is wanted.
#[derive(Debug, Default)]
pub struct NullSink;

impl TelemetrySink for NullSink {
    fn on_event(&self, _addr: DeviceAddr, _event: TelemetryEvent) {}
}
