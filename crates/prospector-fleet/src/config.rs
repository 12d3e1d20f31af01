//! Strategy settings and the thresholds derived from them.
//!
//! [`StrategySettings`] is the `strategy` section of
//! `prospector-config.yaml`. Its factors are resolved against the
//! [`GameConstants`] once at game start into a [`FleetConfig`], which is
//! what the order engine consults every turn.

use prospector_types::GameConstants;
use serde::Deserialize;

/// Strategy knobs read from configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrategySettings {
    /// Mine threshold as a multiple of `move_cost_ratio` (default: 5).
    #[serde(default = "default_mine_threshold_factor")]
    pub mine_threshold_factor: u32,

    /// Fraction of `max_resource` at which a unit heads home (default: 0.8).
    #[serde(default = "default_return_fraction")]
    pub return_fraction: f64,

    /// Fraction of the game after which no unit is spawned (default: 0.4).
    #[serde(default = "default_spawn_cutoff")]
    pub spawn_cutoff: f64,

    /// Hold on good cells passed on the way to a target (default: true).
    #[serde(default = "default_true")]
    pub mine_en_route: bool,

    /// Recall loaded units home before the game ends (default: true).
    #[serde(default = "default_true")]
    pub recall_enabled: bool,

    /// Extra turns of slack kept for the end-of-game recall (default: 4).
    #[serde(default = "default_recall_margin")]
    pub recall_margin: u32,

    /// Seed for random steps (default: 0).
    #[serde(default)]
    pub seed: u64,
}

const fn default_mine_threshold_factor() -> u32 {
    5
}

const fn default_return_fraction() -> f64 {
    0.8
}

const fn default_spawn_cutoff() -> f64 {
    0.4
}

const fn default_true() -> bool {
    true
}

const fn default_recall_margin() -> u32 {
    4
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            mine_threshold_factor: default_mine_threshold_factor(),
            return_fraction: default_return_fraction(),
            spawn_cutoff: default_spawn_cutoff(),
            mine_en_route: default_true(),
            recall_enabled: default_true(),
            recall_margin: default_recall_margin(),
            seed: 0,
        }
    }
}

/// Thresholds resolved against the game constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FleetConfig {
    /// Minimum cell resource worth mining.
    pub mine_threshold: u32,
    /// Carried amount at which a unit heads home.
    pub return_threshold: u32,
    /// Hold on good cells passed on the way to a target.
    pub mine_en_route: bool,
    /// Recall slack in turns, or `None` when recall is disabled.
    pub recall_margin: Option<u32>,
}

impl FleetConfig {
    /// Resolve strategy factors into absolute thresholds.
    pub fn resolve(constants: &GameConstants, strategy: &StrategySettings) -> Self {
        Self {
            mine_threshold: constants
                .move_cost_ratio
                .saturating_mul(strategy.mine_threshold_factor),
            return_threshold: fraction_of(constants.max_resource, strategy.return_fraction),
            mine_en_route: strategy.mine_en_route,
            recall_margin: strategy.recall_enabled.then_some(strategy.recall_margin),
        }
    }
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self::resolve(&GameConstants::default(), &StrategySettings::default())
    }
}

/// `floor(total * fraction)`, clamped to `[0, total]`.
fn fraction_of(total: u32, fraction: f64) -> u32 {
    let scaled = (f64::from(total) * fraction.clamp(0.0, 1.0)).floor();
    // Clamped into [0, total] above, so the cast cannot wrap.
    #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
    let result = scaled as u32;
    result.min(total)
}
