//! The fleet controller: one full decision pass per turn.
//!
//! The [`FleetController`] owns every piece of cross-turn state (the target
//! board, the order engine, the seeded RNG) and the per-turn occupancy
//! ledger. [`FleetController::run_turn`] runs the strictly ordered steps:
//!
//! 0. Validate the snapshot and reset the ledger.
//! 1. Reconcile the roster against last turn.
//! 2. Refresh and re-sort the target board.
//! 3. Run the order engine over every unit.
//! 4. Apply the spawn policy.
//!
//! Per-unit failures surface as anomalies in the [`TurnSummary`]. Only a
//! snapshot that does not match the configured game is an error.

use prospector_fleet::{
    FleetConfig, OrderEngine, StrategySettings, TargetBoard, TurnContext, TurnDispatch,
};
use prospector_types::{Directive, GameConstants, Position, UnitId};
use prospector_world::{GameGrid, OccupancyLedger, SearchSettings, WorldError};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use tracing::{debug, info};

use crate::config::ProspectorConfig;
use crate::turn::{TurnState, TurnSummary};

/// Errors that abort a whole turn.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// The snapshot grid does not match the configured dimensions.
    #[error("grid is {width}x{height}, expected {expected_width}x{expected_height}")]
    GridMismatch {
        /// Configured width.
        expected_width: u32,
        /// Configured height.
        expected_height: u32,
        /// Snapshot width.
        width: u32,
        /// Snapshot height.
        height: u32,
    },

    /// The configured dimensions cannot form a grid.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Per-game decision state for one fleet.
#[derive(Debug)]
pub struct FleetController {
    constants: GameConstants,
    strategy: StrategySettings,
    search: SearchSettings,
    board: TargetBoard,
    ledger: OccupancyLedger,
    engine: OrderEngine,
    rng: SmallRng,
}

impl FleetController {
    /// Build a controller for a game played under `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::World`] if the configured grid
    /// dimensions are unusable.
    pub fn new(config: &ProspectorConfig) -> Result<Self, ControllerError> {
        let constants = config.game;
        let layout = GameGrid::uniform(constants.width, constants.height, 0)?;
        let fleet = FleetConfig::resolve(&constants, &config.strategy);
        info!(
            width = constants.width,
            height = constants.height,
            mine_threshold = fleet.mine_threshold,
            return_threshold = fleet.return_threshold,
            cost_model = ?config.search.cost_model,
            seed = config.strategy.seed,
            "Fleet controller ready"
        );
        Ok(Self {
            constants,
            strategy: config.strategy.clone(),
            search: config.search.clone(),
            board: TargetBoard::new(&layout),
            ledger: OccupancyLedger::new(),
            engine: OrderEngine::new(fleet),
            rng: SmallRng::seed_from_u64(config.strategy.seed),
        })
    }

    /// Decide every command for one turn.
    ///
    /// # Errors
    ///
    /// Returns [`ControllerError::GridMismatch`] if the snapshot grid does
    /// not have the configured dimensions. No state changes in that case.
    pub fn run_turn(&mut self, state: &TurnState) -> Result<TurnSummary, ControllerError> {
        // --- 0. Validate and reset ---
        let grid = &state.grid;
        if grid.width() != self.constants.width || grid.height() != self.constants.height {
            return Err(ControllerError::GridMismatch {
                expected_width: self.constants.width,
                expected_height: self.constants.height,
                width: grid.width(),
                height: grid.height(),
            });
        }
        self.ledger.reset();
        let home = grid.normalize(state.home);

        // --- 1. Roster ---
        let change = self.engine.reconcile(&state.units, &mut self.board);
        if !change.joined.is_empty() || !change.departed.is_empty() {
            debug!(
                turn = state.turn,
                joined = ?change.joined,
                departed = ?change.departed,
                "Roster changed"
            );
        }

        // --- 2. Targets ---
        self.board.refresh(grid, home);

        // --- 3. Orders ---
        let ctx = TurnContext {
            turn: state.turn,
            home,
            grid,
            constants: &self.constants,
            search: &self.search,
        };
        let mut dispatch = TurnDispatch::new(grid, &self.constants, &mut self.ledger);
        let anomalies =
            self.engine
                .execute_turn(&ctx, &state.units, &mut self.board, &mut dispatch, &mut self.rng);

        // --- 4. Spawn ---
        let spawned = if spawn_allowed(&self.constants, &self.strategy, state.turn, state.balance) {
            let claimed = dispatch.spawn(home);
            if !claimed {
                debug!(turn = state.turn, home = %home, "Spawn suppressed, home cell claimed");
            }
            claimed
        } else {
            false
        };
        let commands = dispatch.into_commands();

        info!(
            turn = state.turn,
            units = state.units.len(),
            balance = state.balance,
            commands = commands.len(),
            spawned,
            active_orders = self.engine.active_orders(),
            assigned_targets = self.board.assigned_count(),
            anomalies = anomalies.len(),
            "Turn complete"
        );

        Ok(TurnSummary {
            turn: state.turn,
            commands,
            spawned,
            joined: change.joined,
            departed: change.departed,
            anomalies,
        })
    }

    /// Hand a unit an explicit directive chain for the next turn.
    pub fn issue(&mut self, unit: UnitId, chain: Vec<Directive>) {
        self.engine.issue(unit, chain);
    }

    /// The order engine.
    pub const fn engine(&self) -> &OrderEngine {
        &self.engine
    }

    /// The target board.
    pub const fn board(&self) -> &TargetBoard {
        &self.board
    }

    /// The ledger as left by the last turn.
    pub const fn ledger(&self) -> &OccupancyLedger {
        &self.ledger
    }

    /// The game constants in force.
    pub const fn constants(&self) -> &GameConstants {
        &self.constants
    }

    /// Where a unit's current target is, if it has one.
    pub fn target_of(&self, unit: UnitId) -> Option<Position> {
        self.board.assignment_of(unit)
    }
}

/// Spawn if affordable and still early enough in the game.
fn spawn_allowed(
    constants: &GameConstants,
    strategy: &StrategySettings,
    turn: u32,
    balance: u32,
) -> bool {
    if balance < constants.spawn_cost || constants.max_turns == 0 {
        return false;
    }
    f64::from(turn) / f64::from(constants.max_turns) < strategy.spawn_cutoff
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn spawn_policy_thresholds() {
        let constants = GameConstants::default();
        let strategy = StrategySettings::default();
        assert!(spawn_allowed(&constants, &strategy, 0, 1000));
        assert!(!spawn_allowed(&constants, &strategy, 0, 999));
        // 159 / 400 < 0.4, 160 / 400 is not.
        assert!(spawn_allowed(&constants, &strategy, 159, 5000));
        assert!(!spawn_allowed(&constants, &strategy, 160, 5000));
    }

    #[test]
    fn mismatched_grid_is_rejected() {
        let mut controller = FleetController::new(&ProspectorConfig::default()).unwrap();
        let state = TurnState {
            turn: 0,
            units: Vec::new(),
            home: Position::new(0, 0),
            balance: 0,
            grid: GameGrid::uniform(8, 8, 0).unwrap(),
        };
        assert!(matches!(
            controller.run_turn(&state),
            Err(ControllerError::GridMismatch { width: 8, .. })
        ));
    }
}
