use carlink_fleet::Command;

/// Map one input character to a broadcast command.
///
/// The layout matches the original controller bindings: `z` reverse,
/// `x` full throttle, `c` stop, `n`/`m` headlight on/off. Anything else
/// (including the newline that terminates each line of input) is ignored.
pub fn command_for_key(key: u8) -> Option<Command> {
    match key {
        b'z' => Some(Command::Reverse),
        b'x' => Some(Command::FullThrottle),
        b'c' => Some(Command::Stop),
        b'n' => Some(Command::HeadlightOn),
        b'm' => Some(Command::HeadlightOff),
        _ => None,
    }
}
