//! Order engine: the per-unit state machine.
//!
//! Every tracked unit carries at most one [`Order`]. Its phase is derived
//! from the primary directive:
//!
//! | Primary            | Phase               |
//! |--------------------|---------------------|
//! | none               | [`Phase::Idle`]     |
//! | `Mine(t)`          | [`Phase::Mining`]   |
//! | `MoveTo(home)`     | [`Phase::Returning`]|
//! | `MoveTo(t)`        | [`Phase::Moving`]   |
//! | `Hold`             | [`Phase::Holding`]  |
//! | `ReturnHome`       | [`Phase::Recalled`] |
//! | anything else      | [`Phase::Other`]    |
//!
//! Each turn the engine first holds every unit that cannot afford to move,
//! then walks the remaining units in roster order. A unit is driven through
//! its transitions (assignment, carry cap, exhausted target, arrival home,
//! end-of-game recall) until its order is stable, and then the order's chain
//! is executed: the primary directive first, each backup in turn when the
//! previous one is blocked.
//!
//! Transitions per unit per turn are capped at [`MAX_TRANSITIONS`]; a unit
//! that exceeds the cap simply holds.

use std::collections::{BTreeMap, BTreeSet};

use prospector_types::{Directive, GameConstants, Order, Position, Unit, UnitId};
use prospector_world::{GameGrid, PathSearch, SearchSettings};
use rand::Rng;
use tracing::debug;

use crate::anomaly::Anomaly;
use crate::config::FleetConfig;
use crate::dispatch::TurnDispatch;
use crate::targets::TargetBoard;

/// Maximum order transitions for one unit in one turn.
pub const MAX_TRANSITIONS: u32 = 3;

/// Behavioural phase of a unit, derived from its primary directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No order; waiting for a target.
    Idle,
    /// Travelling to, or mining, the given cell.
    Mining(Position),
    /// Carrying cargo back to the home base.
    Returning,
    /// Travelling to a cell other than home.
    Moving(Position),
    /// Staying put.
    Holding,
    /// End-of-game recall toward home.
    Recalled,
    /// Any other primary directive.
    Other,
}

/// Read-only inputs shared by every unit in a turn.
#[derive(Debug, Clone, Copy)]
pub struct TurnContext<'t> {
    /// Current turn number.
    pub turn: u32,
    /// The home base (normalised).
    pub home: Position,
    /// This turn's grid snapshot.
    pub grid: &'t GameGrid,
    /// Fixed game rules.
    pub constants: &'t GameConstants,
    /// Path search settings.
    pub search: &'t SearchSettings,
}

/// Units that appeared or vanished since the previous turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterChange {
    /// Ids seen for the first time.
    pub joined: Vec<UnitId>,
    /// Ids that are no longer in the roster.
    pub departed: Vec<UnitId>,
}

/// What to do with a unit after inspecting its current order.
enum Decision {
    /// Run this chain now.
    Execute(Order),
    /// Hold on the current cell, falling back to this chain.
    HoldThen(Order),
    /// Store a new order and re-evaluate.
    Replace(Order),
    /// Drop the order and re-evaluate as idle.
    Clear,
}

/// Result of attempting a single directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    /// A command was queued.
    Issued,
    /// The directive could not act; try the next one.
    Blocked,
    /// The directive deliberately does nothing.
    Skipped,
}

impl Outcome {
    const fn from_issued(issued: bool) -> Self {
        if issued { Self::Issued } else { Self::Blocked }
    }
}

/// Borrowed state for one pass over the roster.
struct TurnPass<'p, 'd, 'g, R: ?Sized> {
    ctx: &'p TurnContext<'g>,
    board: &'p mut TargetBoard,
    dispatch: &'p mut TurnDispatch<'d>,
    search: PathSearch<'g>,
    rng: &'p mut R,
    anomalies: Vec<Anomaly>,
}

impl<R: Rng + ?Sized> TurnPass<'_, '_, '_, R> {
    fn report(&mut self, anomaly: Anomaly) {
        anomaly.log(self.ctx.turn);
        self.anomalies.push(anomaly);
    }

    /// Run one directive as a plain action, without transitions.
    fn act(&mut self, unit: &Unit, directive: Directive) -> Outcome {
        let grid = self.ctx.grid;
        let position = grid.normalize(unit.position);
        match directive {
            Directive::Mine { target } | Directive::MoveTo { target } => {
                let target = grid.normalize(target);
                if position == target {
                    return Outcome::from_issued(self.dispatch.hold_unit(unit));
                }
                match self.search.step_toward(position, target, unit.carried) {
                    Some(direction) => {
                        Outcome::from_issued(self.dispatch.move_unit(unit, direction, false))
                    }
                    None => Outcome::Blocked,
                }
            }
            Directive::Hold => Outcome::from_issued(self.dispatch.hold_unit(unit)),
            Directive::RandomStep => {
                Outcome::from_issued(self.dispatch.random_step(unit, &mut *self.rng))
            }
            Directive::ReturnHome => self.return_home(unit),
            Directive::BuildDropoff { target } => {
                debug!(
                    turn = self.ctx.turn,
                    unit = %unit.id,
                    target = %target,
                    "Dropoff construction not supported, skipping"
                );
                Outcome::Skipped
            }
        }
    }

    /// Head home, forcing the claim only on the home cell itself.
    fn return_home(&mut self, unit: &Unit) -> Outcome {
        let grid = self.ctx.grid;
        let home = self.ctx.home;
        for direction in grid.approach_directions(unit.position, home) {
            let force = grid.offset(unit.position, direction) == home;
            if self.dispatch.move_unit(unit, direction, force) {
                return Outcome::Issued;
            }
        }
        Outcome::from_issued(self.dispatch.hold_unit(unit))
    }

    /// Execute a chain, primary first, until one directive acts.
    fn run_chain(&mut self, unit: &Unit, order: &Order) {
        for &directive in order.directives() {
            match self.act(unit, directive) {
                Outcome::Issued | Outcome::Skipped => return,
                Outcome::Blocked => {
                    debug!(
                        turn = self.ctx.turn,
                        unit = %unit.id,
                        directive = directive.tag(),
                        "Directive blocked"
                    );
                }
            }
        }
        self.report(Anomaly::Stranded { unit: unit.id });
    }
}

/// Tracks orders for the whole fleet and turns them into commands.
#[derive(Debug, Clone, Default)]
pub struct OrderEngine {
    config: FleetConfig,
    /// Unit ids seen last turn.
    roster: BTreeSet<UnitId>,
    /// Current order per unit. Absent means idle.
    orders: BTreeMap<UnitId, Order>,
    /// Externally issued chains, validated at the start of the next turn.
    issued: BTreeMap<UnitId, Vec<Directive>>,
}

impl OrderEngine {
    /// Create an engine with resolved thresholds.
    pub const fn new(config: FleetConfig) -> Self {
        Self {
            config,
            roster: BTreeSet::new(),
            orders: BTreeMap::new(),
            issued: BTreeMap::new(),
        }
    }

    // -------------------------------------------------------------------
    // Roster and orders
    // -------------------------------------------------------------------

    /// Diff the roster against last turn's.
    ///
    /// New ids start idle. Vanished ids lose their order and their target.
    pub fn reconcile(&mut self, units: &[Unit], board: &mut TargetBoard) -> RosterChange {
        let current: BTreeSet<UnitId> = units.iter().map(|u| u.id).collect();
        let joined: Vec<UnitId> = current.difference(&self.roster).copied().collect();
        let departed: Vec<UnitId> = self.roster.difference(&current).copied().collect();
        for &unit in &departed {
            self.retire(unit, board);
        }
        self.roster = current;
        RosterChange { joined, departed }
    }

    /// Forget a unit entirely.
    pub fn retire(&mut self, unit: UnitId, board: &mut TargetBoard) {
        self.orders.remove(&unit);
        self.issued.remove(&unit);
        if let Some(target) = board.release(unit) {
            debug!(unit = %unit, target = %target, "Released target of departed unit");
        }
    }

    /// Hand a unit an explicit directive chain.
    ///
    /// The chain is validated when the next turn executes. A malformed
    /// chain is discarded with an [`Anomaly::IllegalOrder`] and the unit
    /// issues no command that turn.
    pub fn issue(&mut self, unit: UnitId, chain: Vec<Directive>) {
        self.issued.insert(unit, chain);
    }

    /// The order a unit currently follows.
    pub fn order_of(&self, unit: UnitId) -> Option<&Order> {
        self.orders.get(&unit)
    }

    /// The phase a unit is in.
    pub fn phase_of(&self, unit: UnitId, home: Position) -> Phase {
        let Some(order) = self.orders.get(&unit) else {
            return Phase::Idle;
        };
        match *order.primary() {
            Directive::Mine { target } => Phase::Mining(target),
            Directive::MoveTo { target } if target == home => Phase::Returning,
            Directive::MoveTo { target } => Phase::Moving(target),
            Directive::Hold => Phase::Holding,
            Directive::ReturnHome => Phase::Recalled,
            Directive::RandomStep | Directive::BuildDropoff { .. } => Phase::Other,
        }
    }

    /// Number of units holding an order.
    pub fn active_orders(&self) -> usize {
        self.orders.len()
    }

    // -------------------------------------------------------------------
    // Turn execution
    // -------------------------------------------------------------------

    /// Produce this turn's unit commands through `dispatch`.
    ///
    /// Returns the anomalies raised along the way.
    pub fn execute_turn<R: Rng + ?Sized>(
        &mut self,
        ctx: &TurnContext<'_>,
        units: &[Unit],
        board: &mut TargetBoard,
        dispatch: &mut TurnDispatch<'_>,
        rng: &mut R,
    ) -> Vec<Anomaly> {
        let mut pass = TurnPass {
            ctx,
            board,
            dispatch,
            search: PathSearch::new(
                ctx.grid,
                ctx.constants,
                ctx.search,
                self.config.mine_threshold,
            ),
            rng,
            anomalies: Vec::new(),
        };

        let mut silenced = BTreeSet::new();
        for unit in units {
            if let Some(chain) = self.issued.remove(&unit.id)
                && !self.adopt(unit.id, chain, &mut pass)
            {
                silenced.insert(unit.id);
            }
        }

        let (stuck, free): (Vec<&Unit>, Vec<&Unit>) = units
            .iter()
            .filter(|u| !silenced.contains(&u.id))
            .partition(|u| !pass.dispatch.can_afford(u));

        for unit in stuck {
            debug!(
                turn = ctx.turn,
                unit = %unit.id,
                carried = unit.carried,
                "Cannot afford to move, holding"
            );
            if !pass.dispatch.hold_unit(unit) {
                pass.report(Anomaly::Stranded { unit: unit.id });
            }
        }
        for unit in free {
            self.drive(unit, &mut pass);
        }

        debug_assert!(pass.board.check_exclusive(), "target board assignment is not exclusive");
        pass.anomalies
    }

    /// Validate an issued chain and make it the unit's order.
    fn adopt<R: Rng + ?Sized>(
        &mut self,
        unit: UnitId,
        chain: Vec<Directive>,
        pass: &mut TurnPass<'_, '_, '_, R>,
    ) -> bool {
        let order = match Order::from_chain(chain) {
            Ok(order) => order,
            Err(e) => {
                self.discard(unit, e.to_string(), pass);
                return false;
            }
        };
        if let Directive::Mine { target } = *order.primary() {
            let target = pass.ctx.grid.normalize(target);
            if let Err(e) = pass.board.claim(target, unit) {
                self.discard(unit, e.to_string(), pass);
                return false;
            }
        } else {
            pass.board.release(unit);
        }
        debug!(turn = pass.ctx.turn, unit = %unit, order = %order, "Adopted issued order");
        self.orders.insert(unit, order);
        true
    }

    fn discard<R: Rng + ?Sized>(
        &mut self,
        unit: UnitId,
        reason: String,
        pass: &mut TurnPass<'_, '_, '_, R>,
    ) {
        self.orders.remove(&unit);
        pass.board.release(unit);
        pass.report(Anomaly::IllegalOrder { unit, reason });
    }

    /// Run a unit's transitions, then execute its stable order.
    fn drive<R: Rng + ?Sized>(&mut self, unit: &Unit, pass: &mut TurnPass<'_, '_, '_, R>) {
        let mut transitions: u32 = 0;
        loop {
            match self.decide(unit, pass) {
                Decision::Execute(order) => {
                    pass.run_chain(unit, &order);
                    return;
                }
                Decision::HoldThen(order) => {
                    if !pass.dispatch.hold_unit(unit) {
                        pass.run_chain(unit, &order);
                    }
                    return;
                }
                Decision::Replace(order) => {
                    debug!(turn = pass.ctx.turn, unit = %unit.id, order = %order, "Order replaced");
                    self.orders.insert(unit.id, order);
                }
                Decision::Clear => {
                    debug!(turn = pass.ctx.turn, unit = %unit.id, "Order complete");
                    self.orders.remove(&unit.id);
                }
            }

            transitions = transitions.saturating_add(1);
            if transitions > MAX_TRANSITIONS {
                pass.report(Anomaly::TransitionLimit { unit: unit.id });
                if !pass.dispatch.hold_unit(unit) {
                    pass.report(Anomaly::Stranded { unit: unit.id });
                }
                return;
            }
        }
    }

    fn decide<R: Rng + ?Sized>(&self, unit: &Unit, pass: &mut TurnPass<'_, '_, '_, R>) -> Decision {
        let grid = pass.ctx.grid;
        let home = pass.ctx.home;
        let position = grid.normalize(unit.position);
        let phase = self.phase_of(unit.id, home);

        if phase != Phase::Recalled && self.recall_due(unit, pass.ctx) {
            pass.board.release(unit.id);
            return Decision::Replace(Order::recall());
        }

        let Some(order) = self.orders.get(&unit.id).cloned() else {
            return self.assign(unit, pass);
        };
        match phase {
            Phase::Mining(target) => self.decide_mining(unit, grid.normalize(target), order, pass),
            Phase::Returning if position == home => Decision::Clear,
            Phase::Moving(target) if position == grid.normalize(target) => Decision::Clear,
            _ => Decision::Execute(order),
        }
    }

    fn decide_mining<R: Rng + ?Sized>(
        &self,
        unit: &Unit,
        target: Position,
        order: Order,
        pass: &mut TurnPass<'_, '_, '_, R>,
    ) -> Decision {
        let grid = pass.ctx.grid;
        let home = pass.ctx.home;
        let position = grid.normalize(unit.position);
        let threshold = self.config.mine_threshold;

        if unit.carried >= self.config.return_threshold {
            pass.board.release(unit.id);
            return Decision::Replace(Order::returning(home));
        }

        if position == target {
            if grid.resource_at(position) >= threshold {
                return Decision::Execute(order);
            }
            let board = &*pass.board;
            let nearby = pass
                .search
                .nearby_best(position, threshold, |p| board.is_claimed(p));
            if let Some(next) = nearby
                && pass.board.claim(next, unit.id).is_ok()
            {
                return Decision::Replace(Order::mining(next));
            }
            pass.board.release(unit.id);
            return Decision::Replace(Order::returning(home));
        }

        if self.config.mine_en_route && grid.resource_at(position) >= threshold {
            return Decision::HoldThen(order);
        }
        if grid.resource_at(target) < threshold {
            pass.board.release(unit.id);
            return Decision::Replace(Order::returning(home));
        }
        Decision::Execute(order)
    }

    /// Claim the best unclaimed good target, or hold for the turn.
    fn assign<R: Rng + ?Sized>(&self, unit: &Unit, pass: &mut TurnPass<'_, '_, '_, R>) -> Decision {
        let grid = pass.ctx.grid;
        let threshold = self.config.mine_threshold;
        let candidate = pass
            .board
            .first_unclaimed_where(|p| grid.resource_at(p) >= threshold)
            .map(|entry| entry.position);
        if let Some(target) = candidate
            && pass.board.claim(target, unit.id).is_ok()
        {
            return Decision::Replace(Order::mining(target));
        }
        pass.report(Anomaly::NoTargetAvailable { unit: unit.id });
        Decision::Execute(Order::holding())
    }

    /// Whether a loaded unit must head home to beat the end of the game.
    fn recall_due(&self, unit: &Unit, ctx: &TurnContext<'_>) -> bool {
        let Some(margin) = self.config.recall_margin else {
            return false;
        };
        if unit.carried == 0 {
            return false;
        }
        let turns_left = ctx.constants.max_turns.saturating_sub(ctx.turn);
        let distance = ctx.grid.distance(unit.position, ctx.home);
        turns_left <= distance.saturating_add(margin)
    }
}
