//! Turn resolution from the current facing and the required axis move.

use std::cmp::Ordering;

use crate::actuator::ActuatorCommand;
use crate::grid::Direction;

/// Physical turn needed to go from one facing to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Turn {
    /// Same facing, no turn.
    Straight,
    Left,
    Right,
    /// Opposite facing.
    Around,
}

impl Turn {
    /// Actuator command for the turn, `None` when no turn is needed.
    pub fn command(self) -> Option<ActuatorCommand> {
        match self {
            Turn::Straight => None,
            Turn::Left => Some(ActuatorCommand::TurnLeft),
            Turn::Right => Some(ActuatorCommand::TurnRight),
            Turn::Around => Some(ActuatorCommand::Turn180),
        }
    }
}

/// Turn to apply and the facing it produces.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub turn: Turn,
    pub facing: Direction,
}

/// `TURN_TABLE[from][to]`, indexed in N, E, S, W order.
const TURN_TABLE: [[Turn; 4]; 4] = {
    use Turn::*;
    [
        // to:  North     East      South     West
        [Straight, Right, Around, Left], // from North
        [Left, Straight, Right, Around], // from East
        [Around, Left, Straight, Right], // from South
        [Right, Around, Left, Straight], // from West
    ]
};

/// Turn that takes the vehicle from `from` to `to`.
pub fn turn_between(from: Direction, to: Direction) -> Turn {
    TURN_TABLE[from as usize][to as usize]
}

/// Facing needed to reach the next cell.
///
/// `row` and `col` compare current against next (`Greater` = current is
/// larger). The row axis is evaluated first; the column axis only decides
/// when rows already match. `None` when both match.
pub fn target_facing(row: Ordering, col: Ordering) -> Option<Direction> {
    match (row, col) {
        (Ordering::Equal, Ordering::Equal) => None,
        (Ordering::Equal, Ordering::Less) => Some(Direction::East),
        (Ordering::Equal, Ordering::Greater) => Some(Direction::West),
        (Ordering::Less, _) => Some(Direction::South),
        (Ordering::Greater, _) => Some(Direction::North),
    }
}

/// Resolve the turn for the current facing and axis comparisons.
pub fn resolve(facing: Direction, row: Ordering, col: Ordering) -> Option<Resolution> {
    let target = target_facing(row, col)?;
    Some(Resolution {
        turn: turn_between(facing, target),
        facing: target,
    })
}
