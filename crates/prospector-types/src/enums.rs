//! Enumeration types shared across the Prospector workspace.

use serde::{Deserialize, Serialize};

use crate::ids::UnitId;

// ---------------------------------------------------------------------------
// Movement
// ---------------------------------------------------------------------------

/// A cardinal movement direction on the grid.
///
/// The y axis grows downward: `North` is `(0, -1)` and `South` is `(0, +1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// One cell up (`y - 1`).
    North,
    /// One cell down (`y + 1`).
    South,
    /// One cell right (`x + 1`).
    East,
    /// One cell left (`x - 1`).
    West,
}

impl Direction {
    /// All cardinal directions in canonical iteration order.
    ///
    /// Every search and fallback in the workspace iterates in this order,
    /// which is what makes tie-breaking deterministic.
    pub const ALL: [Self; 4] = [Self::North, Self::South, Self::East, Self::West];

    /// The `(dx, dy)` offset for a single step in this direction.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::South => (0, 1),
            Self::East => (1, 0),
            Self::West => (-1, 0),
        }
    }

    /// The opposite direction.
    pub const fn invert(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::South => Self::North,
            Self::East => Self::West,
            Self::West => Self::East,
        }
    }

    /// Single-letter wire code used by the game protocol (`n`, `s`, `e`, `w`).
    pub const fn code(self) -> char {
        match self {
            Self::North => 'n',
            Self::South => 's',
            Self::East => 'e',
            Self::West => 'w',
        }
    }
}

// ---------------------------------------------------------------------------
// Occupancy
// ---------------------------------------------------------------------------

/// Who holds a cell in the per-turn occupancy ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Claimant {
    /// A unit moving into or holding the cell.
    Unit(UnitId),
    /// The shipyard, claiming its own cell for a spawn.
    Shipyard,
}

impl core::fmt::Display for Claimant {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Unit(id) => write!(f, "unit {id}"),
            Self::Shipyard => write!(f, "shipyard"),
        }
    }
}

// ---------------------------------------------------------------------------
// Search configuration
// ---------------------------------------------------------------------------

/// The movement cost model used by the step-toward-goal search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostModel {
    /// Cargo value lost to fuel burn, discounted by travel time.
    #[default]
    Discounted,
    /// Turns of extraction foregone on each cell stepped off.
    MiningTurns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deltas_cancel_with_inverse() {
        for dir in Direction::ALL {
            let (dx, dy) = dir.delta();
            let (ix, iy) = dir.invert().delta();
            assert_eq!(dx.saturating_add(ix), 0);
            assert_eq!(dy.saturating_add(iy), 0);
        }
    }

    #[test]
    fn cost_model_parses_snake_case() {
        let model: Result<CostModel, _> = serde_json::from_str("\"mining_turns\"");
        assert_eq!(model.ok(), Some(CostModel::MiningTurns));
    }

    #[test]
    fn claimant_display() {
        assert_eq!(Claimant::Unit(UnitId::new(3)).to_string(), "unit 3");
        assert_eq!(Claimant::Shipyard.to_string(), "shipyard");
    }
}
