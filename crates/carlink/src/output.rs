use std::time::{SystemTime, UNIX_EPOCH};

use carlink_fleet::{TelemetryEvent, TelemetrySink};
use carlink_transport::DeviceAddr;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Serialize)]
struct EventOutput<'a> {
    device: String,
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    volts: Option<f32>,
    timestamp: u64,
}

/// Telemetry sink that prints one line per event to stdout.
pub struct StdoutTelemetry {
    format: OutputFormat,
}

impl StdoutTelemetry {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl TelemetrySink for StdoutTelemetry {
    fn on_event(&self, addr: DeviceAddr, event: TelemetryEvent) {
        match self.format {
            OutputFormat::Pretty => println!("{}", format_pretty(addr, event)),
            OutputFormat::Json => {
                let out = match event {
                    TelemetryEvent::MagnetDetected => EventOutput {
                        device: addr.to_string(),
                        event: "magnet_detected",
                        volts: None,
                        timestamp: now_unix_seconds(),
                    },
                    TelemetryEvent::BatteryVoltage(volts) => EventOutput {
                        device: addr.to_string(),
                        event: "battery_voltage",
                        volts: Some(volts),
                        timestamp: now_unix_seconds(),
                    },
                };
                println!(
                    "{}",
                    serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
                );
            }
        }
    }
}

fn format_pretty(addr: DeviceAddr, event: TelemetryEvent) -> String {
    match event {
        TelemetryEvent::MagnetDetected => format!("{addr} magnet detected"),
        TelemetryEvent::BatteryVoltage(volts) => format!("{addr} {volts:.1}V"),
    }
}

fn now_unix_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn battery_prints_one_decimal_place() {
        let addr: DeviceAddr = "00:06:66:49:89:E3".parse().unwrap();
        assert_eq!(
            format_pretty(addr, TelemetryEvent::BatteryVoltage(12.5)),
            "00:06:66:49:89:E3 12.5V"
        );
        assert_eq!(
            format_pretty(addr, TelemetryEvent::BatteryVoltage(9.0)),
            "00:06:66:49:89:E3 9.0V"
        );
    }

    #[test]
    fn magnet_event_names_the_device() {
        let addr: DeviceAddr = "00:06:66:61:AC:9E".parse().unwrap();
        assert_eq!(
            format_pretty(addr, TelemetryEvent::MagnetDetected),
            "00:06:66:61:AC:9E magnet detected"
        );
    }
}
