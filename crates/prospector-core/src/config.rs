//! Configuration loading and typed config structures for Prospector.
//!
//! The configuration lives in `prospector-config.yaml`. Every section and
//! field is optional; missing values fall back to the standard ruleset and
//! the tuned strategy defaults. The loader parses with `serde_yml` and then
//! runs [`ProspectorConfig::validate`] so that a bad file is rejected before
//! the first turn.

use std::path::Path;

use prospector_fleet::StrategySettings;
use prospector_types::GameConstants;
use prospector_world::SearchSettings;
use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value parsed but is out of range.
    #[error("invalid config value for `{field}`: {reason}")]
    Invalid {
        /// Dotted path of the offending field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `prospector-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProspectorConfig {
    /// Fixed game rules.
    #[serde(default)]
    pub game: GameConstants,

    /// Strategy knobs.
    #[serde(default)]
    pub strategy: StrategySettings,

    /// Path search tuning.
    #[serde(default)]
    pub search: SearchSettings,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Local simulator settings.
    #[serde(default)]
    pub arena: ArenaSettings,
}

impl ProspectorConfig {
    /// Load and validate configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if a value is out of range.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] or [`ConfigError::Invalid`].
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the controller cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;
        for (field, value) in [
            ("game.move_cost_ratio", game.move_cost_ratio),
            ("game.extract_ratio", game.extract_ratio),
            ("game.max_resource", game.max_resource),
            ("game.max_turns", game.max_turns),
            ("game.width", game.width),
            ("game.height", game.height),
        ] {
            if value == 0 {
                return Err(invalid(field, "must be greater than zero"));
            }
        }

        for (field, value) in [
            ("strategy.return_fraction", self.strategy.return_fraction),
            ("strategy.spawn_cutoff", self.strategy.spawn_cutoff),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(invalid(field, format!("{value} is outside (0, 1]")));
            }
        }

        if !(self.search.growth.is_finite() && self.search.growth > 0.0) {
            return Err(invalid(
                "search.growth",
                format!("{} must be a positive number", self.search.growth),
            ));
        }
        if self.search.max_expansions == 0 {
            return Err(invalid("search.max_expansions", "must be greater than zero"));
        }

        if self.arena.min_resource > self.arena.max_resource {
            return Err(invalid(
                "arena.min_resource",
                format!(
                    "{} exceeds arena.max_resource {}",
                    self.arena.min_resource, self.arena.max_resource
                ),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}

/// Settings for the local arena simulator.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArenaSettings {
    /// Seed for the procedural resource field.
    #[serde(default = "default_arena_seed")]
    pub seed: u64,

    /// Balance available at turn zero.
    #[serde(default = "default_starting_balance")]
    pub starting_balance: u32,

    /// Lowest resource a generated cell can hold.
    #[serde(default)]
    pub min_resource: u32,

    /// Highest resource a generated cell can hold.
    #[serde(default = "default_arena_max_resource")]
    pub max_resource: u32,

    /// Play this many turns instead of `game.max_turns`.
    #[serde(default)]
    pub turns: Option<u32>,
}

const fn default_arena_seed() -> u64 {
    42
}

const fn default_starting_balance() -> u32 {
    5000
}

const fn default_arena_max_resource() -> u32 {
    1000
}

impl Default for ArenaSettings {
    fn default() -> Self {
        Self {
            seed: default_arena_seed(),
            starting_balance: default_starting_balance(),
            min_resource: 0,
            max_resource: default_arena_max_resource(),
            turns: None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use prospector_types::CostModel;

    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = ProspectorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.game.move_cost_ratio, 10);
        assert_eq!(config.strategy.mine_threshold_factor, 5);
        assert_eq!(config.search.cost_model, CostModel::Discounted);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.arena.turns, None);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
game:
  move_cost_ratio: 10
  extract_ratio: 4
  max_resource: 1000
  spawn_cost: 1000
  max_turns: 300
  width: 24
  height: 24

strategy:
  mine_threshold_factor: 4
  return_fraction: 0.9
  spawn_cutoff: 0.5
  mine_en_route: false
  recall_enabled: true
  recall_margin: 6
  seed: 9

search:
  cost_model: mining_turns
  growth: 1.01
  max_expansions: 512
  nearby_radius: 6
  heuristic_weight: 8

logging:
  level: debug

arena:
  seed: 3
  starting_balance: 4000
  min_resource: 10
  max_resource: 800
  turns: 50
";
        let config = ProspectorConfig::parse(yaml).unwrap();
        assert_eq!(config.game.max_turns, 300);
        assert_eq!(config.game.width, 24);
        assert_eq!(config.strategy.mine_threshold_factor, 4);
        assert!(!config.strategy.mine_en_route);
        assert_eq!(config.strategy.seed, 9);
        assert_eq!(config.search.cost_model, CostModel::MiningTurns);
        assert_eq!(config.search.nearby_radius, 6);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.arena.turns, Some(50));
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = ProspectorConfig::parse("strategy:\n  recall_margin: 1\n").unwrap();
        assert_eq!(config.strategy.recall_margin, 1);
        assert_eq!(config.game, GameConstants::default());
        assert!((config.search.growth - 1.0025).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            "game:\n  move_cost_ratio: 0\n",
            "strategy:\n  return_fraction: 1.5\n",
            "strategy:\n  spawn_cutoff: 0.0\n",
            "search:\n  growth: -1.0\n",
            "search:\n  max_expansions: 0\n",
            "arena:\n  min_resource: 900\n  max_resource: 100\n",
        ];
        for yaml in cases {
            assert!(
                matches!(ProspectorConfig::parse(yaml), Err(ConfigError::Invalid { .. })),
                "accepted: {yaml}"
            );
        }
    }

    #[test]
    fn rejects_malformed_yaml() {
        assert!(matches!(
            ProspectorConfig::parse("game: [unclosed"),
            Err(ConfigError::Yaml { .. })
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = ProspectorConfig::from_file(Path::new("/nonexistent/prospector-config.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
