//! Actuator layer: turn/stop/go commands written to the drive controller.

use std::fmt;

use crate::error::Result;

mod mock;
mod serial;

pub use mock::MockActuator;
pub use serial::SerialActuator;

/// Commands understood by the drive controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActuatorCommand {
    GoStraight,
    Stop,
    TurnLeft,
    TurnRight,
    Turn180,
}

impl ActuatorCommand {
    /// Single ASCII byte sent over the serial line.
    pub const fn wire_byte(self) -> u8 {
        match self {
            Self::GoStraight => b'1',
            Self::Stop => b'2',
            Self::TurnLeft => b'3',
            Self::TurnRight => b'4',
            Self::Turn180 => b'5',
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::GoStraight => "go straight",
            Self::Stop => "stop",
            Self::TurnLeft => "turn left",
            Self::TurnRight => "turn right",
            Self::Turn180 => "turn 180",
        }
    }
}

impl fmt::Display for ActuatorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sink for actuator commands.
///
/// Writes are fire-and-forget: `Ok` means the command left the host, not that
/// the vehicle finished the manoeuvre.
pub trait ActuatorSink: Send {
    /// Send one command. `Err` means it was not sent.
    fn send(&mut self, command: ActuatorCommand) -> Result<()>;

    /// Whether the transport is open.
    fn is_ready(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_bytes() {
        assert_eq!(ActuatorCommand::GoStraight.wire_byte(), b'1');
        assert_eq!(ActuatorCommand::Stop.wire_byte(), b'2');
        assert_eq!(ActuatorCommand::TurnLeft.wire_byte(), b'3');
        assert_eq!(ActuatorCommand::TurnRight.wire_byte(), b'4');
        assert_eq!(ActuatorCommand::Turn180.wire_byte(), b'5');
    }
}
