//! The target board: every cell ranked as a mining target.
//!
//! The board holds one [`TargetEntry`] per grid cell. Each turn the scores
//! are refreshed against the home base and the entries re-sorted, best
//! first. Units claim targets exclusively: a cell is assigned to at most one
//! unit, and a unit holds at most one cell.
//!
//! Sorting is fully deterministic. Equal scores keep the order in which the
//! entries were first inserted (x-major over the grid).

use std::collections::BTreeMap;

use prospector_types::{Position, UnitId};
use prospector_world::GameGrid;

use crate::error::TargetError;

/// One cell on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetEntry {
    /// The cell.
    pub position: Position,
    /// `resource / (distance to home + 1)` as of the last refresh.
    pub score: f64,
    /// The unit mining this cell, if any.
    pub assigned_unit: Option<UnitId>,
    /// Insertion order, used to break score ties.
    pub ordinal: usize,
}

/// Ranked, exclusively-assigned mining targets.
#[derive(Debug, Clone, Default)]
pub struct TargetBoard {
    /// Entries in ranked order after [`sort_descending`](Self::sort_descending).
    entries: Vec<TargetEntry>,
    /// Position -> index into `entries`.
    index: BTreeMap<Position, usize>,
    /// Unit -> the cell it holds.
    assignments: BTreeMap<UnitId, Position>,
}

impl TargetBoard {
    /// Build a board with one unscored, unassigned entry per cell.
    pub fn new(grid: &GameGrid) -> Self {
        let entries: Vec<TargetEntry> = grid
            .positions()
            .enumerate()
            .map(|(ordinal, position)| TargetEntry {
                position,
                score: 0.0,
                assigned_unit: None,
                ordinal,
            })
            .collect();
        let mut board = Self {
            entries,
            index: BTreeMap::new(),
            assignments: BTreeMap::new(),
        };
        board.reindex();
        board
    }

    // -------------------------------------------------------------------
    // Ranking
    // -------------------------------------------------------------------

    /// Recompute every score against `home`.
    pub fn refresh_scores(&mut self, grid: &GameGrid, home: Position) {
        for entry in &mut self.entries {
            let resource = f64::from(grid.resource_at(entry.position));
            let distance = f64::from(grid.distance(home, entry.position).saturating_add(1));
            entry.score = resource / distance;
        }
    }

    /// Sort entries by score, best first; ties by insertion order.
    pub fn sort_descending(&mut self) {
        self.entries.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.ordinal.cmp(&b.ordinal))
        });
        self.reindex();
    }

    /// Refresh scores and re-sort.
    pub fn refresh(&mut self, grid: &GameGrid, home: Position) {
        self.refresh_scores(grid, home);
        self.sort_descending();
    }

    // -------------------------------------------------------------------
    // Claims
    // -------------------------------------------------------------------

    /// Assign `position` to `unit`, releasing the unit's previous target.
    ///
    /// Claiming a cell the unit already holds is a no-op.
    pub fn claim(&mut self, position: Position, unit: UnitId) -> Result<(), TargetError> {
        let slot = *self
            .index
            .get(&position)
            .ok_or(TargetError::UnknownCell { position })?;
        let current = self.entries.get(slot).and_then(|e| e.assigned_unit);
        match current {
            Some(holder) if holder == unit => return Ok(()),
            Some(holder) => return Err(TargetError::AlreadyClaimed { position, holder }),
            None => {}
        }
        self.release(unit);
        if let Some(entry) = self.entries.get_mut(slot) {
            entry.assigned_unit = Some(unit);
        }
        self.assignments.insert(unit, position);
        Ok(())
    }

    /// Release whatever `unit` holds and return that cell.
    pub fn release(&mut self, unit: UnitId) -> Option<Position> {
        let position = self.assignments.remove(&unit)?;
        if let Some(entry) = self.entry_mut(position) {
            entry.assigned_unit = None;
        }
        Some(position)
    }

    // -------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------

    /// The best-ranked unassigned entry.
    pub fn first_unclaimed(&self) -> Option<&TargetEntry> {
        self.first_unclaimed_where(|_| true)
    }

    /// The best-ranked unassigned entry whose cell passes `accept`.
    pub fn first_unclaimed_where(&self, accept: impl Fn(Position) -> bool) -> Option<&TargetEntry> {
        self.entries
            .iter()
            .find(|e| e.assigned_unit.is_none() && accept(e.position))
    }

    /// Whether `position` is assigned to some unit.
    pub fn is_claimed(&self, position: Position) -> bool {
        self.entry(position).is_some_and(|e| e.assigned_unit.is_some())
    }

    /// The cell `unit` holds, if any.
    pub fn assignment_of(&self, unit: UnitId) -> Option<Position> {
        self.assignments.get(&unit).copied()
    }

    /// The entry for `position`.
    pub fn entry(&self, position: Position) -> Option<&TargetEntry> {
        self.index.get(&position).and_then(|&i| self.entries.get(i))
    }

    /// All entries in ranked order.
    pub fn entries(&self) -> &[TargetEntry] {
        &self.entries
    }

    /// Number of assigned targets.
    pub fn assigned_count(&self) -> usize {
        self.assignments.len()
    }

    /// Check the exclusive-assignment invariant.
    ///
    /// Every assigned entry must be mirrored in the assignment map and no
    /// unit may appear on two entries.
    pub fn check_exclusive(&self) -> bool {
        let mut seen: BTreeMap<UnitId, Position> = BTreeMap::new();
        for entry in &self.entries {
            if let Some(unit) = entry.assigned_unit {
                if seen.insert(unit, entry.position).is_some() {
                    return false;
                }
                if self.assignments.get(&unit) != Some(&entry.position) {
                    return false;
                }
            }
        }
        seen.len() == self.assignments.len()
    }

    fn entry_mut(&mut self, position: Position) -> Option<&mut TargetEntry> {
        let slot = *self.index.get(&position)?;
        self.entries.get_mut(slot)
    }

    fn reindex(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.position, i))
            .collect();
    }
}
