//! Per-turn occupancy ledger.
//!
//! Every move, hold, and spawn command claims its destination cell before
//! it is emitted. A cell can be claimed once per turn; a second claimant is
//! refused unless it explicitly forces the claim (end-of-game recall into
//! the home base). Claims are first-come-first-served in the order the
//! turn's commands are resolved, which is what makes the emitted command
//! set collision-free.
//!
//! The ledger also keeps a history of every successful claim so that the
//! collision-freedom of a turn can be audited after the fact.

use std::collections::BTreeMap;

use prospector_types::{Claimant, Position};

use crate::grid::GameGrid;

/// One successful claim recorded in the ledger history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimRecord {
    /// The claimed (normalised) cell.
    pub position: Position,
    /// Who claimed it.
    pub claimant: Claimant,
    /// Whether the claim overrode collision safety.
    pub forced: bool,
}

/// Cells claimed this turn, keyed by normalised position.
#[derive(Debug, Clone, Default)]
pub struct OccupancyLedger {
    /// Current holder of each claimed cell.
    claims: BTreeMap<Position, Claimant>,
    /// Every successful claim, in claim order.
    history: Vec<ClaimRecord>,
}

impl OccupancyLedger {
    /// Create an empty ledger.
    pub const fn new() -> Self {
        Self {
            claims: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Try to claim `pos` for `claimant`.
    ///
    /// Succeeds if the cell is free or `force` is set. A refused claim
    /// leaves the ledger untouched.
    pub fn try_claim(
        &mut self,
        grid: &GameGrid,
        pos: Position,
        claimant: Claimant,
        force: bool,
    ) -> bool {
        let pos = grid.normalize(pos);
        if !force && self.claims.contains_key(&pos) {
            return false;
        }
        self.claims.insert(pos, claimant);
        self.history.push(ClaimRecord {
            position: pos,
            claimant,
            forced: force,
        });
        true
    }

    /// Whether `pos` is already claimed this turn.
    pub fn is_claimed(&self, grid: &GameGrid, pos: Position) -> bool {
        self.claims.contains_key(&grid.normalize(pos))
    }

    /// The current holder of `pos`, if any.
    pub fn holder(&self, grid: &GameGrid, pos: Position) -> Option<Claimant> {
        self.claims.get(&grid.normalize(pos)).copied()
    }

    /// Clear all claims. Called once at every turn boundary.
    pub fn reset(&mut self) {
        self.claims.clear();
        self.history.clear();
    }

    /// Number of claimed cells.
    pub fn len(&self) -> usize {
        self.claims.len()
    }

    /// Whether nothing has been claimed this turn.
    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }

    /// Every successful claim this turn, in order.
    pub fn history(&self) -> &[ClaimRecord] {
        &self.history
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prospector_types::UnitId;

    use super::*;

    fn grid() -> GameGrid {
        GameGrid::uniform(4, 4, 0).unwrap()
    }

    #[test]
    fn first_claim_wins() {
        let grid = grid();
        let mut ledger = OccupancyLedger::new();
        let a = Claimant::Unit(UnitId::new(1));
        let b = Claimant::Unit(UnitId::new(2));
        let cell = Position::new(1, 1);

        assert!(ledger.try_claim(&grid, cell, a, false));
        assert!(!ledger.try_claim(&grid, cell, b, false));
        assert_eq!(ledger.holder(&grid, cell), Some(a));
        assert_eq!(ledger.history().len(), 1);
    }

    #[test]
    fn claims_are_normalised() {
        let grid = grid();
        let mut ledger = OccupancyLedger::new();
        assert!(ledger.try_claim(&grid, Position::new(-1, 0), Claimant::Shipyard, false));
        assert!(ledger.is_claimed(&grid, Position::new(3, 0)));
        assert!(!ledger.try_claim(
            &grid,
            Position::new(3, 4),
            Claimant::Unit(UnitId::new(7)),
            false
        ));
    }

    #[test]
    fn forced_claim_overrides_and_is_flagged() {
        let grid = grid();
        let mut ledger = OccupancyLedger::new();
        let cell = Position::new(2, 2);
        let late = Claimant::Unit(UnitId::new(9));

        assert!(ledger.try_claim(&grid, cell, Claimant::Shipyard, false));
        assert!(ledger.try_claim(&grid, cell, late, true));
        assert_eq!(ledger.holder(&grid, cell), Some(late));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.history().last().is_some_and(|r| r.forced));
    }

    #[test]
    fn reset_clears_everything() {
        let grid = grid();
        let mut ledger = OccupancyLedger::new();
        assert!(ledger.try_claim(&grid, Position::new(0, 0), Claimant::Shipyard, false));
        ledger.reset();
        assert!(ledger.is_empty());
        assert!(ledger.history().is_empty());
        assert!(ledger.try_claim(&grid, Position::new(0, 0), Claimant::Shipyard, false));
    }
}
