//! Cost-aware path search over the toroidal grid.
//!
//! A [`PathSearch`] borrows the grid and game constants for one turn and owns
//! its memo tables ([`CostMemo`]). It answers two questions:
//!
//! - [`PathSearch::step_toward`]: which first step to take toward a goal,
//!   found by a bounded best-first search whose cost accounts for the fuel
//!   burnt leaving every cell on the way.
//! - [`PathSearch::nearby_best`]: which unclaimed cell within a small radius
//!   is the most attractive to mine next.
//!
//! Both searches are hard-bounded by [`SearchLimits`]. An unreachable goal,
//! or a goal not reached within the expansion cap, yields `None`; callers
//! fall back to their order's backup.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, BinaryHeap, VecDeque};

use prospector_types::{CostModel, Direction, GameConstants, Position};
use serde::Deserialize;
use tracing::trace;

use crate::grid::GameGrid;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Hard bounds on both searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchLimits {
    /// Maximum nodes expanded by the step search.
    pub max_expansions: usize,
    /// Maximum BFS depth of the nearby search.
    pub nearby_radius: u32,
}

/// The `search` section of the configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchSettings {
    /// Which edge cost the step search minimises.
    #[serde(default)]
    pub cost_model: CostModel,
    /// Per-turn discount applied to cargo under [`CostModel::Discounted`].
    #[serde(default = "default_growth")]
    pub growth: f64,
    /// Step search expansion cap.
    #[serde(default = "default_max_expansions")]
    pub max_expansions: usize,
    /// Nearby search radius in steps.
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius: u32,
    /// Heuristic weight per remaining step under [`CostModel::MiningTurns`].
    #[serde(default = "default_heuristic_weight")]
    pub heuristic_weight: u32,
}

const fn default_growth() -> f64 {
    1.0025
}

const fn default_max_expansions() -> usize {
    2048
}

const fn default_nearby_radius() -> u32 {
    10
}

const fn default_heuristic_weight() -> u32 {
    10
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            cost_model: CostModel::default(),
            growth: default_growth(),
            max_expansions: default_max_expansions(),
            nearby_radius: default_nearby_radius(),
            heuristic_weight: default_heuristic_weight(),
        }
    }
}

impl SearchSettings {
    /// The hard bounds implied by these settings.
    pub const fn limits(&self) -> SearchLimits {
        SearchLimits {
            max_expansions: self.max_expansions,
            nearby_radius: self.nearby_radius,
        }
    }
}

// ---------------------------------------------------------------------------
// Memo tables
// ---------------------------------------------------------------------------

/// Memoised cost terms, scoped to one [`PathSearch`].
#[derive(Debug, Clone, Default)]
pub struct CostMemo {
    /// `growth^n` at index `n`.
    growth_powers: Vec<f64>,
    /// Turns to mine a cell below the mine threshold, by resource level.
    mining_turns: BTreeMap<u32, u32>,
}

impl CostMemo {
    /// `growth^n`, extending the table as needed.
    pub fn growth_power(&mut self, growth: f64, n: u32) -> f64 {
        let Ok(index) = usize::try_from(n) else {
            return f64::INFINITY;
        };
        if self.growth_powers.is_empty() {
            self.growth_powers.push(1.0);
        }
        while self.growth_powers.len() <= index {
            let last = self.growth_powers.last().copied().unwrap_or(1.0);
            self.growth_powers.push(last * growth);
        }
        self.growth_powers.get(index).copied().unwrap_or(f64::INFINITY)
    }

    /// Turns needed to mine a cell holding `resource` below `threshold`.
    ///
    /// One turn if it is already below; otherwise one more than the decayed
    /// level, where each turn removes `1 / extract_ratio` of the cell.
    pub fn mining_turns(&mut self, resource: u32, threshold: u32, extract_ratio: u32) -> u32 {
        let mut chain = Vec::new();
        let mut level = resource;
        let mut base = loop {
            if let Some(&known) = self.mining_turns.get(&level) {
                break known;
            }
            if level < threshold {
                break 1;
            }
            let next = decay(level, extract_ratio);
            if next >= level {
                // Cells that never decay cost a single turn.
                break 1;
            }
            chain.push(level);
            level = next;
        };
        self.mining_turns.entry(level).or_insert(base);
        while let Some(level) = chain.pop() {
            base = base.saturating_add(1);
            self.mining_turns.insert(level, base);
        }
        self.mining_turns.get(&resource).copied().unwrap_or(base)
    }

    /// Number of memoised mining-turn entries.
    pub fn mining_entries(&self) -> usize {
        self.mining_turns.len()
    }
}

/// Level left after one turn of extraction: `floor(level * (1 - 1/ratio))`.
fn decay(level: u32, extract_ratio: u32) -> u32 {
    if extract_ratio == 0 {
        return level;
    }
    let kept = u64::from(level).saturating_mul(u64::from(extract_ratio.saturating_sub(1)));
    u32::try_from(kept.checked_div(u64::from(extract_ratio)).unwrap_or(0)).unwrap_or(u32::MAX)
}

// ---------------------------------------------------------------------------
// Frontier
// ---------------------------------------------------------------------------

/// A frontier entry. Ordered so that [`BinaryHeap`] pops the lowest
/// priority first, ties going to the earliest insertion.
#[derive(Debug, Clone, Copy)]
struct FrontierNode {
    priority: f64,
    seq: u64,
    position: Position,
    steps: u32,
    /// Fuel burnt so far (discounted model) or accumulated turns.
    spent: u32,
    first: Option<Direction>,
}

impl PartialEq for FrontierNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierNode {}

impl PartialOrd for FrontierNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierNode {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .total_cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

/// Per-turn path search over a borrowed grid.
#[derive(Debug)]
pub struct PathSearch<'g> {
    grid: &'g GameGrid,
    constants: &'g GameConstants,
    settings: &'g SearchSettings,
    mine_threshold: u32,
    memo: CostMemo,
}

impl<'g> PathSearch<'g> {
    /// Create a search for this turn's grid.
    ///
    /// `mine_threshold` is the minimum cell resource worth mining; it feeds
    /// both the heuristic and the mining-turns cost model.
    pub fn new(
        grid: &'g GameGrid,
        constants: &'g GameConstants,
        settings: &'g SearchSettings,
        mine_threshold: u32,
    ) -> Self {
        Self {
            grid,
            constants,
            settings,
            mine_threshold,
            memo: CostMemo::default(),
        }
    }

    /// Read access to the memo tables.
    pub const fn memo(&self) -> &CostMemo {
        &self.memo
    }

    /// First step of the cheapest path from `start` to `goal`.
    ///
    /// `carried` is the unit's cargo; it drives the discounted cost model.
    /// Returns `None` when `start == goal`, when the goal is unreachable, or
    /// when the expansion cap is hit first.
    pub fn step_toward(
        &mut self,
        start: Position,
        goal: Position,
        carried: u32,
    ) -> Option<Direction> {
        let start = self.grid.normalize(start);
        let goal = self.grid.normalize(goal);
        if start == goal {
            return None;
        }

        let limits = self.settings.limits();
        let mut frontier = BinaryHeap::new();
        let mut closed: BTreeSet<Position> = BTreeSet::new();
        let mut seq: u64 = 0;
        let mut expansions: usize = 0;

        let remaining = self.grid.distance(start, goal);
        frontier.push(FrontierNode {
            priority: self.priority(carried, 0, 0, remaining),
            seq,
            position: start,
            steps: 0,
            spent: 0,
            first: None,
        });

        while let Some(node) = frontier.pop() {
            if node.position == goal {
                trace!(
                    from = %start,
                    to = %goal,
                    expansions,
                    first = ?node.first,
                    "Step search reached goal"
                );
                return node.first;
            }
            if !closed.insert(node.position) {
                continue;
            }
            if expansions >= limits.max_expansions {
                trace!(from = %start, to = %goal, expansions, "Step search hit expansion cap");
                return None;
            }
            expansions = expansions.saturating_add(1);

            let leave_cost = self.leave_cost(node.position);
            let spent = node.spent.saturating_add(leave_cost);
            let steps = node.steps.saturating_add(1);
            for direction in Direction::ALL {
                let next = self.grid.offset(node.position, direction);
                if closed.contains(&next) {
                    continue;
                }
                let remaining = self.grid.distance(next, goal);
                seq = seq.saturating_add(1);
                frontier.push(FrontierNode {
                    priority: self.priority(carried, spent, steps, remaining),
                    seq,
                    position: next,
                    steps,
                    spent,
                    first: node.first.or(Some(direction)),
                });
            }
        }

        trace!(from = %start, to = %goal, expansions, "Step search exhausted frontier");
        None
    }

    /// Best unclaimed cell to mine within the nearby radius.
    ///
    /// Breadth-first from `start`; every visited cell that `is_claimed`
    /// rejects and whose resource is at least `min_resource` is scored
    /// `resource / (distance + 1)`. The first strictly-best cell in visit
    /// order wins. The start cell seeds the comparison with its own score,
    /// so `None` means nothing nearby beats staying put.
    pub fn nearby_best(
        &self,
        start: Position,
        min_resource: u32,
        is_claimed: impl Fn(Position) -> bool,
    ) -> Option<Position> {
        let start = self.grid.normalize(start);
        let radius = self.settings.nearby_radius;
        let mut visited: BTreeSet<Position> = BTreeSet::from([start]);
        let mut queue: VecDeque<(Position, u32)> = VecDeque::from([(start, 0)]);
        let mut best = start;
        let mut best_resource = self.grid.resource_at(start);
        let mut best_dist = 0;

        while let Some((pos, dist)) = queue.pop_front() {
            if pos != start && !is_claimed(pos) {
                let resource = self.grid.resource_at(pos);
                if resource >= min_resource
                    && better_score(resource, dist, best_resource, best_dist)
                {
                    (best, best_resource, best_dist) = (pos, resource, dist);
                }
            }
            if dist >= radius {
                continue;
            }
            for next in self.grid.neighbors(pos) {
                if visited.insert(next) {
                    queue.push_back((next, dist.saturating_add(1)));
                }
            }
        }

        (best != start).then_some(best)
    }

    /// Cost of stepping off `pos` under the active cost model.
    fn leave_cost(&mut self, pos: Position) -> u32 {
        let resource = self.grid.resource_at(pos);
        match self.settings.cost_model {
            CostModel::Discounted => self.constants.burn(resource),
            CostModel::MiningTurns => {
                self.memo
                    .mining_turns(resource, self.mine_threshold, self.constants.extract_ratio)
            }
        }
    }

    /// Priority of a frontier node: accumulated cost plus heuristic.
    fn priority(&mut self, carried: u32, spent: u32, steps: u32, remaining: u32) -> f64 {
        match self.settings.cost_model {
            CostModel::Discounted => {
                let expected = remaining.saturating_mul(self.expected_burn());
                let lost = f64::from(spent.saturating_add(expected));
                let horizon = steps.saturating_add(remaining);
                let discount = self.memo.growth_power(self.settings.growth, horizon);
                let cargo = f64::from(carried);
                cargo - (cargo - lost) / discount
            }
            CostModel::MiningTurns => {
                let heuristic = remaining.saturating_mul(self.settings.heuristic_weight);
                f64::from(spent.saturating_add(heuristic))
            }
        }
    }

    /// Burn expected per remaining step on an average mined-out cell.
    fn expected_burn(&self) -> u32 {
        // floor((t + t * (1 - 1/e)) / 2) == floor(t * (2e - 1) / 2e)
        let extract = u64::from(self.constants.extract_ratio);
        let numerator = u64::from(self.mine_threshold)
            .saturating_mul(extract.saturating_mul(2).saturating_sub(1));
        let expected_cell = numerator
            .checked_div(extract.saturating_mul(2))
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(0);
        self.constants.burn(expected_cell)
    }
}

/// Whether `resource / (dist + 1)` strictly beats `best_resource / (best_dist + 1)`.
fn better_score(resource: u32, dist: u32, best_resource: u32, best_dist: u32) -> bool {
    let lhs = u64::from(resource).saturating_mul(u64::from(best_dist).saturating_add(1));
    let rhs = u64::from(best_resource).saturating_mul(u64::from(dist).saturating_add(1));
    lhs > rhs
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn constants() -> GameConstants {
        GameConstants::default()
    }

    /// 5x5 grid with the South neighbour of (1, 1) rich and everything else empty.
    fn detour_grid() -> GameGrid {
        let mut grid = GameGrid::uniform(5, 5, 0).unwrap();
        grid.set_resource(Position::new(1, 2), 800);
        grid
    }

    #[test]
    fn start_equals_goal_yields_none() {
        let grid = GameGrid::uniform(5, 5, 100).unwrap();
        let constants = constants();
        let settings = SearchSettings::default();
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(search.step_toward(Position::new(2, 2), Position::new(7, -3), 100), None);
    }

    #[test]
    fn discounted_search_avoids_expensive_cell() {
        let grid = detour_grid();
        let constants = constants();
        let settings = SearchSettings::default();
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        let step = search.step_toward(Position::new(1, 1), Position::new(2, 2), 500);
        assert_eq!(step, Some(Direction::East));
    }

    #[test]
    fn mining_turns_search_avoids_expensive_cell() {
        let grid = detour_grid();
        let constants = constants();
        let settings = SearchSettings {
            cost_model: CostModel::MiningTurns,
            ..SearchSettings::default()
        };
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        let step = search.step_toward(Position::new(1, 1), Position::new(2, 2), 500);
        assert_eq!(step, Some(Direction::East));
        assert!(search.memo().mining_entries() > 0);
    }

    #[test]
    fn uniform_grid_step_reduces_distance() {
        let grid = GameGrid::uniform(8, 8, 100).unwrap();
        let constants = constants();
        let settings = SearchSettings::default();
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        let starts = [Position::new(0, 0), Position::new(3, 6), Position::new(7, 1)];
        let goals = [Position::new(5, 5), Position::new(1, 1), Position::new(4, 4)];
        for start in starts {
            for goal in goals {
                let step = search.step_toward(start, goal, 500).unwrap();
                let next = grid.offset(start, step);
                assert!(grid.distance(next, goal) < grid.distance(start, goal));
            }
        }
    }

    #[test]
    fn wraps_across_edges() {
        let grid = GameGrid::uniform(6, 6, 0).unwrap();
        let constants = constants();
        let settings = SearchSettings::default();
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(
            search.step_toward(Position::new(0, 3), Position::new(5, 3), 0),
            Some(Direction::West)
        );
    }

    #[test]
    fn expansion_cap_gives_up() {
        let grid = GameGrid::uniform(16, 16, 100).unwrap();
        let constants = constants();
        let settings = SearchSettings {
            max_expansions: 1,
            ..SearchSettings::default()
        };
        let mut search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(search.step_toward(Position::new(0, 0), Position::new(8, 8), 0), None);
    }

    #[test]
    fn mining_turns_memo_matches_decay() {
        let mut memo = CostMemo::default();
        assert_eq!(memo.mining_turns(43, 50, 4), 1);
        assert_eq!(memo.mining_turns(58, 50, 4), 2);
        assert_eq!(memo.mining_turns(800, 50, 4), 11);
        // Cached levels along the decay chain.
        assert_eq!(memo.mining_turns(450, 50, 4), 9);
        assert_eq!(memo.mining_turns(10, 50, 1), 1);
    }

    #[test]
    fn growth_powers_are_cumulative() {
        let mut memo = CostMemo::default();
        assert!((memo.growth_power(2.0, 0) - 1.0).abs() < f64::EPSILON);
        assert!((memo.growth_power(2.0, 3) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn nearby_on_uniform_grid_returns_nearest() {
        let mut grid = GameGrid::uniform(7, 7, 200).unwrap();
        let start = Position::new(3, 3);
        grid.set_resource(start, 0);
        let constants = constants();
        let settings = SearchSettings::default();
        let search = PathSearch::new(&grid, &constants, &settings, 50);
        let found = search.nearby_best(start, 50, |_| false).unwrap();
        assert_eq!(grid.distance(start, found), 1);
        // BFS visits North first.
        assert_eq!(found, Position::new(3, 2));
    }

    #[test]
    fn nearby_skips_claimed_and_poor_cells() {
        let mut grid = GameGrid::uniform(7, 7, 10).unwrap();
        grid.set_resource(Position::new(3, 2), 400);
        grid.set_resource(Position::new(5, 3), 900);
        let constants = constants();
        let settings = SearchSettings::default();
        let search = PathSearch::new(&grid, &constants, &settings, 50);
        let start = Position::new(3, 3);

        // 900 / 3 = 300 beats 400 / 2 = 200.
        assert_eq!(search.nearby_best(start, 50, |_| false), Some(Position::new(5, 3)));
        let claimed = Position::new(5, 3);
        assert_eq!(
            search.nearby_best(start, 50, |p| p == claimed),
            Some(Position::new(3, 2))
        );
        assert_eq!(search.nearby_best(start, 1000, |_| false), None);
    }

    #[test]
    fn nearby_yields_none_when_start_scores_best() {
        let mut grid = GameGrid::uniform(7, 7, 0).unwrap();
        let start = Position::new(3, 3);
        // 49 / 1 beats 60 / 2, even though only the neighbour qualifies.
        grid.set_resource(start, 49);
        grid.set_resource(Position::new(3, 2), 60);
        let constants = constants();
        let settings = SearchSettings::default();
        {
            let search = PathSearch::new(&grid, &constants, &settings, 50);
            assert_eq!(search.nearby_best(start, 50, |_| false), None);
        }

        // Once the neighbour clearly wins it is returned.
        grid.set_resource(Position::new(3, 2), 120);
        let search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(search.nearby_best(start, 50, |_| false), Some(Position::new(3, 2)));
    }

    #[test]
    fn nearby_keeps_rich_start() {
        let mut grid = GameGrid::uniform(3, 3, 0).unwrap();
        grid.set_resource(Position::new(1, 1), 1000);
        let constants = constants();
        let settings = SearchSettings::default();
        let search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(search.nearby_best(Position::new(1, 1), 50, |_| false), None);
    }

    #[test]
    fn nearby_respects_radius() {
        let mut grid = GameGrid::uniform(21, 21, 0).unwrap();
        grid.set_resource(Position::new(10, 4), 900);
        let constants = constants();
        let settings = SearchSettings {
            nearby_radius: 3,
            ..SearchSettings::default()
        };
        let search = PathSearch::new(&grid, &constants, &settings, 50);
        assert_eq!(search.nearby_best(Position::new(10, 10), 50, |_| false), None);
    }
}
