//! Turn dispatch: claims cells and queues the commands that use them.
//!
//! Every command a unit emits goes through [`TurnDispatch`]. A move or a
//! stay first claims its destination in the [`OccupancyLedger`]; only a
//! successful claim queues the command. A refused claim leaves nothing
//! behind, so the caller can fall back to the next directive.

use prospector_types::{Claimant, Command, Direction, GameConstants, Position, Unit};
use prospector_world::{GameGrid, OccupancyLedger};
use rand::Rng;
use rand::seq::SliceRandom;

/// Per-turn command queue bound to the ledger.
#[derive(Debug)]
pub struct TurnDispatch<'t> {
    grid: &'t GameGrid,
    constants: &'t GameConstants,
    ledger: &'t mut OccupancyLedger,
    commands: Vec<Command>,
}

impl<'t> TurnDispatch<'t> {
    /// Start dispatching on an already-reset ledger.
    pub const fn new(
        grid: &'t GameGrid,
        constants: &'t GameConstants,
        ledger: &'t mut OccupancyLedger,
    ) -> Self {
        Self {
            grid,
            constants,
            ledger,
            commands: Vec::new(),
        }
    }

    /// Whether `unit` carries enough to pay the burn for leaving its cell.
    pub fn can_afford(&self, unit: &Unit) -> bool {
        unit.carried >= self.constants.burn(self.grid.resource_at(unit.position))
    }

    /// Move `unit` one step, claiming the destination.
    ///
    /// `force` overrides an existing claim on the destination.
    pub fn move_unit(&mut self, unit: &Unit, direction: Direction, force: bool) -> bool {
        if !self.can_afford(unit) {
            return false;
        }
        let destination = self.grid.offset(unit.position, direction);
        if !self
            .ledger
            .try_claim(self.grid, destination, Claimant::Unit(unit.id), force)
        {
            return false;
        }
        self.commands.push(Command::Move {
            unit: unit.id,
            direction,
        });
        true
    }

    /// Keep `unit` on its cell, claiming it.
    pub fn hold_unit(&mut self, unit: &Unit) -> bool {
        if !self
            .ledger
            .try_claim(self.grid, unit.position, Claimant::Unit(unit.id), false)
        {
            return false;
        }
        self.commands.push(Command::Stay { unit: unit.id });
        true
    }

    /// Step in the first affordable, unclaimed direction of a random order.
    pub fn random_step<R: Rng + ?Sized>(&mut self, unit: &Unit, rng: &mut R) -> bool {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        directions
            .into_iter()
            .any(|direction| self.move_unit(unit, direction, false))
    }

    /// Queue a spawn on `home` if the cell can be claimed for the shipyard.
    pub fn spawn(&mut self, home: Position) -> bool {
        if !self
            .ledger
            .try_claim(self.grid, home, Claimant::Shipyard, false)
        {
            return false;
        }
        self.commands.push(Command::Spawn);
        true
    }

    /// Finish the turn and hand back the queued commands.
    pub fn into_commands(self) -> Vec<Command> {
        self.commands
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prospector_types::UnitId;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn unit(id: u32, x: i32, y: i32, carried: u32) -> Unit {
        Unit::new(UnitId::new(id), Position::new(x, y), carried)
    }

    #[test]
    fn move_claims_destination() {
        let grid = GameGrid::uniform(5, 5, 0).unwrap();
        let constants = GameConstants::default();
        let mut ledger = OccupancyLedger::new();
        let mut dispatch = TurnDispatch::new(&grid, &constants, &mut ledger);

        let a = unit(1, 0, 0, 0);
        let b = unit(2, 2, 0, 0);
        assert!(dispatch.move_unit(&a, Direction::East, false));
        assert!(!dispatch.move_unit(&b, Direction::West, false));
        assert!(dispatch.hold_unit(&b));
        assert_eq!(dispatch.into_commands().len(), 2);
        assert!(ledger.is_claimed(&grid, Position::new(1, 0)));
        assert!(ledger.is_claimed(&grid, Position::new(2, 0)));
    }

    #[test]
    fn unaffordable_move_is_refused() {
        let grid = GameGrid::uniform(5, 5, 500).unwrap();
        let constants = GameConstants::default();
        let mut ledger = OccupancyLedger::new();
        let mut dispatch = TurnDispatch::new(&grid, &constants, &mut ledger);

        let poor = unit(1, 1, 1, 49);
        assert!(!dispatch.can_afford(&poor));
        assert!(!dispatch.move_unit(&poor, Direction::North, false));
        assert!(dispatch.can_afford(&unit(2, 1, 1, 50)));
        assert!(dispatch.into_commands().is_empty());
    }

    #[test]
    fn forced_move_overrides_claim() {
        let grid = GameGrid::uniform(3, 3, 0).unwrap();
        let constants = GameConstants::default();
        let mut ledger = OccupancyLedger::new();
        let mut dispatch = TurnDispatch::new(&grid, &constants, &mut ledger);

        assert!(dispatch.spawn(Position::new(1, 1)));
        let returning = unit(4, 1, 0, 300);
        assert!(!dispatch.move_unit(&returning, Direction::South, false));
        assert!(dispatch.move_unit(&returning, Direction::South, true));
        let commands = dispatch.into_commands();
        assert_eq!(commands.first(), Some(&Command::Spawn));
        assert_eq!(commands.len(), 2);
    }

    #[test]
    fn random_step_finds_the_only_free_cell() {
        let grid = GameGrid::uniform(5, 5, 0).unwrap();
        let constants = GameConstants::default();
        let mut ledger = OccupancyLedger::new();
        let mut dispatch = TurnDispatch::new(&grid, &constants, &mut ledger);
        let mut rng = SmallRng::seed_from_u64(42);

        for (id, x, y) in [(10, 2, 1), (11, 2, 3), (12, 3, 2)] {
            assert!(dispatch.hold_unit(&unit(id, x, y, 0)));
        }
        let mover = unit(1, 2, 2, 0);
        assert!(dispatch.random_step(&mover, &mut rng));
        assert_eq!(
            dispatch.into_commands().last(),
            Some(&Command::Move {
                unit: UnitId::new(1),
                direction: Direction::West
            })
        );
    }
}
