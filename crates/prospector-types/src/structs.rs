//! Core entity structs shared by every layer of the decision core.

use serde::{Deserialize, Serialize};

use crate::enums::Direction;
use crate::ids::UnitId;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A grid coordinate.
///
/// Positions are not normalised on construction; the grid wraps them into
/// bounds before they are used as keys (see `GameGrid::normalize`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Column.
    pub x: i32,
    /// Row (grows downward).
    pub y: i32,
}

impl Position {
    /// Create a position.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The un-normalised position one step away in `direction`.
    pub const fn directional_offset(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl core::fmt::Display for Position {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// Immutable per-turn view of one grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    /// Normalised position of the cell.
    pub position: Position,
    /// Resource currently lying on the cell.
    pub resource_level: u32,
}

// ---------------------------------------------------------------------------
// Unit
// ---------------------------------------------------------------------------

/// A unit of the controlled fleet as reported by the engine this turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Engine-assigned identifier.
    pub id: UnitId,
    /// Current (normalised) position.
    pub position: Position,
    /// Resource carried in the hold. Also pays for movement.
    pub carried: u32,
}

impl Unit {
    /// Create a unit snapshot.
    pub const fn new(id: UnitId, position: Position, carried: u32) -> Self {
        Self {
            id,
            position,
            carried,
        }
    }
}

// ---------------------------------------------------------------------------
// Game constants
// ---------------------------------------------------------------------------

/// Fixed game constants, supplied once at process start.
///
/// Defaults follow the standard two-player 32x32 ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConstants {
    /// Leaving a cell costs `resource / move_cost_ratio` of the cargo.
    #[serde(default = "default_move_cost_ratio")]
    pub move_cost_ratio: u32,

    /// Staying on a cell extracts `resource / extract_ratio` (rounded up).
    #[serde(default = "default_extract_ratio")]
    pub extract_ratio: u32,

    /// Maximum cargo a unit can carry.
    #[serde(default = "default_max_resource")]
    pub max_resource: u32,

    /// Balance spent to spawn one unit.
    #[serde(default = "default_spawn_cost")]
    pub spawn_cost: u32,

    /// Length of the game in turns.
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Grid width in cells.
    #[serde(default = "default_grid_side")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_grid_side")]
    pub height: u32,
}

impl GameConstants {
    /// Fuel paid to leave a cell holding `resource`.
    pub const fn burn(&self, resource: u32) -> u32 {
        match resource.checked_div(self.move_cost_ratio) {
            Some(burn) => burn,
            None => 0,
        }
    }

    /// Resource extracted by one turn of staying on a cell holding `resource`.
    pub const fn extraction(&self, resource: u32) -> u32 {
        match resource.checked_div(self.extract_ratio) {
            Some(base) => {
                let rounds_up = match resource.checked_rem(self.extract_ratio) {
                    Some(rem) => rem > 0,
                    None => false,
                };
                if rounds_up { base.saturating_add(1) } else { base }
            }
            None => 0,
        }
    }
}

impl Default for GameConstants {
    fn default() -> Self {
        Self {
            move_cost_ratio: default_move_cost_ratio(),
            extract_ratio: default_extract_ratio(),
            max_resource: default_max_resource(),
            spawn_cost: default_spawn_cost(),
            max_turns: default_max_turns(),
            width: default_grid_side(),
            height: default_grid_side(),
        }
    }
}

const fn default_move_cost_ratio() -> u32 {
    10
}

const fn default_extract_ratio() -> u32 {
    4
}

const fn default_max_resource() -> u32 {
    1000
}

const fn default_spawn_cost() -> u32 {
    1000
}

const fn default_max_turns() -> u32 {
    400
}

const fn default_grid_side() -> u32 {
    32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burn_floors() {
        let constants = GameConstants::default();
        assert_eq!(constants.burn(0), 0);
        assert_eq!(constants.burn(9), 0);
        assert_eq!(constants.burn(99), 9);
        assert_eq!(constants.burn(100), 10);
    }

    #[test]
    fn extraction_rounds_up() {
        let constants = GameConstants::default();
        assert_eq!(constants.extraction(0), 0);
        assert_eq!(constants.extraction(1), 1);
        assert_eq!(constants.extraction(8), 2);
        assert_eq!(constants.extraction(9), 3);
    }

    #[test]
    fn zero_ratio_does_not_panic() {
        let constants = GameConstants {
            move_cost_ratio: 0,
            extract_ratio: 0,
            ..GameConstants::default()
        };
        assert_eq!(constants.burn(500), 0);
        assert_eq!(constants.extraction(500), 0);
    }

    #[test]
    fn directional_offset_is_unwrapped() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.directional_offset(Direction::West), Position::new(-1, 0));
        assert_eq!(origin.directional_offset(Direction::South), Position::new(0, 1));
    }

    #[test]
    fn constants_fill_missing_fields() {
        let parsed: Result<GameConstants, _> = serde_json::from_str(r#"{"width": 8}"#);
        let parsed = parsed.unwrap_or_default();
        assert_eq!(parsed.width, 8);
        assert_eq!(parsed.height, 32);
        assert_eq!(parsed.move_cost_ratio, 10);
    }
}
