//! Opcode and value constants.
//!
//! These mirror the car controller firmware and are fixed inputs to the
//! rest of the system; nothing here is negotiated.

/// Motor control. Value is a signed-magnitude throttle setting.
pub const THROTTLE: u8 = 0x01;

/// Headlight control.
pub const HEADLIGHT: u8 = 0x02;

/// Hall-effect sensor report (car → host).
pub const HALL_SENSOR: u8 = 0x11;

/// Battery voltage report (car → host). Value is decivolts.
pub const BATTERY: u8 = 0x12;

/// Throttle value: stop.
pub const THROTTLE_STOP: u8 = 0x00;

/// Throttle value: reverse.
pub const THROTTLE_REVERSE: u8 = 0x10;

/// Throttle value: full forward.
pub const THROTTLE_FULL: u8 = 0x70;

/// Headlight value: off.
pub const HEADLIGHT_OFF: u8 = 0x00;

/// Headlight value: full brightness.
pub const HEADLIGHT_BRIGHT: u8 = 0xFF;

/// Hall sensor value reported while a track magnet is under the car.
pub const HALL_SENSOR_ON: u8 = 0x01;

/// Returns a human-readable name for an opcode.
pub fn opcode_name(opcode: u8) -> &'static str {
    match opcode {
        THROTTLE => "THROTTLE",
        HEADLIGHT => "HEADLIGHT",
        HALL_SENSOR => "HALL_SENSOR",
        BATTERY => "BATTERY",
        _ => "UNKNOWN",
    }
}
