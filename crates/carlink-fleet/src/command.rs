use carlink_protocol::ops::{
    HEADLIGHT, HEADLIGHT_BRIGHT, HEADLIGHT_OFF, THROTTLE, THROTTLE_FULL, THROTTLE_REVERSE,
    THROTTLE_STOP,
};
use carlink_protocol::Frame;

/// A discrete user command, broadcast to every live device.
///
/// Commands are not addressed: the dispatcher enqueues the corresponding
/// frame on every link currently in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    FullThrottle,
    Reverse,
    Stop,
    HeadlightOn,
    HeadlightOff,
}

impl Command {
    /// The wire frame for this command.
    pub fn frame(self) -> Frame {
        match self {
            Command::FullThrottle => Frame::new(THROTTLE, THROTTLE_FULL),
            Command::Reverse => Frame::new(THROTTLE, THROTTLE_REVERSE),
            Command::Stop => Frame::new(THROTTLE, THROTTLE_STOP),
            Command::HeadlightOn => Frame::new(HEADLIGHT, HEADLIGHT_BRIGHT),
            Command::HeadlightOff => Frame::new(HEADLIGHT, HEADLIGHT_OFF),
        }
    }
}
