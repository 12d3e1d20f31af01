//! Commands emitted to the game engine at the end of a turn.

use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::ids::UnitId;

/// A single command for the game engine.
///
/// The [`Display`](core::fmt::Display) form is the engine's text encoding
/// (`g`, `m <id> <dir>`, `m <id> o`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Spawn a new unit on the home base.
    Spawn,
    /// Move a unit one cell.
    Move {
        /// The unit being moved.
        unit: UnitId,
        /// The direction of travel.
        direction: Direction,
    },
    /// Keep a unit on its cell (and mine it).
    Stay {
        /// The unit staying put.
        unit: UnitId,
    },
}

impl Command {
    /// The unit this command is addressed to, if any.
    pub const fn unit(&self) -> Option<UnitId> {
        match self {
            Self::Spawn => None,
            Self::Move { unit, .. } | Self::Stay { unit } => Some(*unit),
        }
    }
}

impl core::fmt::Display for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Spawn => write!(f, "g"),
            Self::Move { unit, direction } => write!(f, "m {unit} {}", direction.code()),
            Self::Stay { unit } => write!(f, "m {unit} o"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_encoding() {
        let unit = UnitId::new(4);
        assert_eq!(Command::Spawn.to_string(), "g");
        assert_eq!(
            Command::Move {
                unit,
                direction: Direction::West
            }
            .to_string(),
            "m 4 w"
        );
        assert_eq!(Command::Stay { unit }.to_string(), "m 4 o");
    }

    #[test]
    fn unit_accessor() {
        assert_eq!(Command::Spawn.unit(), None);
        assert_eq!(
            Command::Stay {
                unit: UnitId::new(9)
            }
            .unit(),
            Some(UnitId::new(9))
        );
    }
}
