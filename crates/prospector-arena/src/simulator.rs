//! Local simulator of the game rules.
//!
//! The [`Arena`] holds the authoritative game state for a single-player
//! game and implements [`TurnSource`], so the core runner can play the
//! fleet controller against it exactly as it would against a real engine.
//!
//! Each submitted turn resolves in a fixed order: moves and mining, then
//! the spawn, then collisions, then deposits at the home base.

use std::collections::{BTreeMap, BTreeSet};

use prospector_core::{
    ArenaSettings, GameResult, ProspectorConfig, SourceError, TurnSource, TurnState,
};
use prospector_types::{Command, GameConstants, Position, Unit, UnitId};
use prospector_world::{GameGrid, WorldError};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Running totals kept while the game is played.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ArenaStats {
    /// Units spawned.
    pub spawns: u32,
    /// Cells where two or more units crashed.
    pub collisions: u32,
    /// Units lost to collisions.
    pub units_destroyed: u32,
    /// Cargo delivered to the home base.
    pub deposited: u64,
    /// Resource mined off the grid.
    pub extracted: u64,
    /// Cargo spent on movement.
    pub burned: u64,
    /// Largest fleet seen at the end of a turn.
    pub peak_fleet: usize,
}

/// Final outcome of an arena game, printed as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct ArenaReport {
    /// Grid width.
    pub width: u32,
    /// Grid height.
    pub height: u32,
    /// Turns decided by the controller.
    pub turns_played: u32,
    /// Balance after the last turn.
    pub final_balance: u32,
    /// Units alive after the last turn.
    pub fleet_size: usize,
    /// Commands issued by the controller.
    pub total_commands: usize,
    /// Anomalies reported by the controller.
    pub anomalies: usize,
    /// Resource on the grid before the first turn.
    pub initial_resource: u64,
    /// Resource left on the grid.
    pub remaining_resource: u64,
    /// Running totals.
    #[serde(flatten)]
    pub stats: ArenaStats,
}

// ---------------------------------------------------------------------------
// Arena
// ---------------------------------------------------------------------------

/// Authoritative state of one local game.
#[derive(Debug)]
pub struct Arena {
    constants: GameConstants,
    grid: GameGrid,
    home: Position,
    units: Vec<Unit>,
    balance: u32,
    turn: u32,
    last_turn: u32,
    next_id: u32,
    initial_resource: u64,
    stats: ArenaStats,
}

impl Arena {
    /// Build an arena with a procedurally generated resource field.
    pub fn new(config: &ProspectorConfig) -> Result<Self, WorldError> {
        let mut rng = SmallRng::seed_from_u64(config.arena.seed);
        let grid = generate_field(&config.game, &config.arena, &mut rng)?;
        let turns = config.arena.turns.unwrap_or(config.game.max_turns);
        Ok(Self::with_grid(
            config.game,
            grid,
            config.arena.starting_balance,
            turns,
        ))
    }

    /// Build an arena over an existing grid. The home base sits at the
    /// grid centre and starts empty.
    pub fn with_grid(
        constants: GameConstants,
        mut grid: GameGrid,
        balance: u32,
        turns: u32,
    ) -> Self {
        let home = centre(&grid);
        grid.set_resource(home, 0);
        let initial_resource = grid.total_resource();
        info!(
            width = grid.width(),
            height = grid.height(),
            home = %home,
            balance,
            turns,
            initial_resource,
            "Arena ready"
        );
        Self {
            constants,
            grid,
            home,
            units: Vec::new(),
            balance,
            turn: 0,
            last_turn: turns,
            next_id: 0,
            initial_resource,
            stats: ArenaStats::default(),
        }
    }

    /// The snapshot the controller sees this turn.
    pub fn state(&self) -> TurnState {
        TurnState {
            turn: self.turn,
            units: self.units.clone(),
            home: self.home,
            balance: self.balance,
            grid: self.grid.clone(),
        }
    }

    /// Summarize the game once the runner is done with it.
    pub fn report(&self, result: &GameResult) -> ArenaReport {
        ArenaReport {
            width: self.grid.width(),
            height: self.grid.height(),
            turns_played: result.turns_played,
            final_balance: self.balance,
            fleet_size: self.units.len(),
            total_commands: result.total_commands,
            anomalies: result.anomaly_count,
            initial_resource: self.initial_resource,
            remaining_resource: self.grid.total_resource(),
            stats: self.stats,
        }
    }

    /// Resolve one turn of commands.
    fn apply(&mut self, commands: &[Command]) -> Result<(), SourceError> {
        let (orders, spawn) = self.sort_commands(commands)?;

        for unit in &mut self.units {
            match orders.get(&unit.id) {
                Some(&Command::Move { direction, .. }) => {
                    let burn = self.constants.burn(self.grid.resource_at(unit.position));
                    if unit.carried < burn {
                        warn!(
                            turn = self.turn,
                            unit = %unit.id,
                            carried = unit.carried,
                            burn,
                            "Unaffordable move ignored"
                        );
                        continue;
                    }
                    unit.carried = unit.carried.saturating_sub(burn);
                    unit.position = self.grid.offset(unit.position, direction);
                    self.stats.burned = self.stats.burned.saturating_add(u64::from(burn));
                }
                Some(Command::Stay { .. }) => {
                    let room = self.constants.max_resource.saturating_sub(unit.carried);
                    let wanted = self
                        .constants
                        .extraction(self.grid.resource_at(unit.position))
                        .min(room);
                    let taken = self.grid.take_resource(unit.position, wanted);
                    unit.carried = unit.carried.saturating_add(taken);
                    self.stats.extracted = self.stats.extracted.saturating_add(u64::from(taken));
                }
                // Units without a command sit still without mining.
                Some(Command::Spawn) | None => {}
            }
        }

        if spawn {
            self.spawn();
        }
        self.resolve_collisions();
        self.deposit();

        self.stats.peak_fleet = self.stats.peak_fleet.max(self.units.len());
        self.turn = self.turn.saturating_add(1);
        Ok(())
    }

    /// Index unit commands by unit, rejecting anything the engine would refuse.
    fn sort_commands(
        &self,
        commands: &[Command],
    ) -> Result<(BTreeMap<UnitId, Command>, bool), SourceError> {
        let mut orders = BTreeMap::new();
        let mut spawn = false;
        for &command in commands {
            match command.unit() {
                None if spawn => return Err(self.reject("more than one spawn")),
                None => spawn = true,
                Some(id) => {
                    if !self.units.iter().any(|u| u.id == id) {
                        return Err(self.reject(format!("unknown unit {id}")));
                    }
                    if orders.insert(id, command).is_some() {
                        return Err(self.reject(format!("unit {id} commanded twice")));
                    }
                }
            }
        }
        Ok((orders, spawn))
    }

    fn spawn(&mut self) {
        let Some(balance) = self.balance.checked_sub(self.constants.spawn_cost) else {
            warn!(turn = self.turn, balance = self.balance, "Unaffordable spawn ignored");
            return;
        };
        let id = UnitId::new(self.next_id);
        self.balance = balance;
        self.next_id = self.next_id.saturating_add(1);
        self.units.push(Unit::new(id, self.home, 0));
        self.stats.spawns = self.stats.spawns.saturating_add(1);
        debug!(turn = self.turn, unit = %id, "Unit spawned");
    }

    /// Destroy every unit sharing a cell. Their cargo drops on the cell, or
    /// lands in the balance if the cell is the home base.
    fn resolve_collisions(&mut self) {
        let mut occupancy: BTreeMap<Position, u32> = BTreeMap::new();
        for unit in &self.units {
            let count = occupancy.entry(self.grid.normalize(unit.position)).or_default();
            *count = count.saturating_add(1);
        }
        let crashed: BTreeSet<Position> = occupancy
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(pos, _)| pos)
            .collect();
        if crashed.is_empty() {
            return;
        }

        let grid = &self.grid;
        let (wrecked, survivors): (Vec<Unit>, Vec<Unit>) = std::mem::take(&mut self.units)
            .into_iter()
            .partition(|u| crashed.contains(&grid.normalize(u.position)));
        self.units = survivors;

        for unit in &wrecked {
            let cell = self.grid.normalize(unit.position);
            if cell == self.home {
                self.balance = self.balance.saturating_add(unit.carried);
                self.stats.deposited = self.stats.deposited.saturating_add(u64::from(unit.carried));
            } else {
                self.grid.add_resource(cell, unit.carried);
            }
        }

        let lost = u32::try_from(wrecked.len()).unwrap_or(u32::MAX);
        let cells = u32::try_from(crashed.len()).unwrap_or(u32::MAX);
        self.stats.collisions = self.stats.collisions.saturating_add(cells);
        self.stats.units_destroyed = self.stats.units_destroyed.saturating_add(lost);
        warn!(turn = self.turn, cells, units = lost, "Collision");
    }

    fn deposit(&mut self) {
        for unit in &mut self.units {
            if self.grid.normalize(unit.position) != self.home || unit.carried == 0 {
                continue;
            }
            self.balance = self.balance.saturating_add(unit.carried);
            self.stats.deposited = self.stats.deposited.saturating_add(u64::from(unit.carried));
            debug!(turn = self.turn, unit = %unit.id, amount = unit.carried, "Cargo deposited");
            unit.carried = 0;
        }
    }

    fn reject(&self, reason: impl Into<String>) -> SourceError {
        SourceError::Rejected {
            turn: self.turn,
            reason: reason.into(),
        }
    }
}

impl TurnSource for Arena {
    fn next_turn(&mut self) -> Result<Option<TurnState>, SourceError> {
        if self.turn >= self.last_turn {
            return Ok(None);
        }
        Ok(Some(self.state()))
    }

    fn submit(&mut self, turn: u32, commands: &[Command]) -> Result<(), SourceError> {
        if turn != self.turn {
            return Err(self.reject(format!("commands are for turn {turn}")));
        }
        self.apply(commands)
    }
}

// ---------------------------------------------------------------------------
// Field generation
// ---------------------------------------------------------------------------

/// Fill a grid with uniformly random resource levels.
fn generate_field(
    constants: &GameConstants,
    settings: &ArenaSettings,
    rng: &mut SmallRng,
) -> Result<GameGrid, WorldError> {
    let low = settings.min_resource.min(settings.max_resource);
    let high = settings.min_resource.max(settings.max_resource);
    let mut grid = GameGrid::uniform(constants.width, constants.height, 0)?;
    let positions: Vec<Position> = grid.positions().collect();
    for pos in positions {
        grid.set_resource(pos, rng.random_range(low..=high));
    }
    Ok(grid)
}

fn centre(grid: &GameGrid) -> Position {
    let x = i32::try_from(grid.width() / 2).unwrap_or(0);
    let y = i32::try_from(grid.height() / 2).unwrap_or(0);
    Position::new(x, y)
}
