//! Arena binary for Prospector.
//!
//! Plays one local single-player game with the fleet controller and prints
//! a JSON [`ArenaReport`](simulator::ArenaReport) to stdout. Logs go to
//! stderr so the report can be piped.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `PROSPECTOR_CONFIG` or `prospector-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Generate the resource field
//! 4. Build the fleet controller
//! 5. Run the game loop
//! 6. Print the report

mod error;
mod simulator;

use std::path::PathBuf;

use prospector_core::{FleetController, ProspectorConfig, run_game};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::ArenaError;
use crate::simulator::Arena;

/// Environment variable naming an alternative config file.
const CONFIG_ENV: &str = "PROSPECTOR_CONFIG";

/// Config file looked up in the working directory by default.
const DEFAULT_CONFIG_PATH: &str = "prospector-config.yaml";

fn main() -> Result<(), ArenaError> {
    // 1. Load configuration.
    let (config, source) = load_config()?;

    // 2. Initialize structured logging. RUST_LOG wins over the config file.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    info!(
        source = %source,
        width = config.game.width,
        height = config.game.height,
        max_turns = config.game.max_turns,
        arena_seed = config.arena.seed,
        strategy_seed = config.strategy.seed,
        "Configuration loaded"
    );

    // 3. Generate the field.
    let mut arena = Arena::new(&config)?;

    // 4. Build the controller.
    let mut controller = FleetController::new(&config)?;

    // 5. Play.
    let result = run_game(&mut controller, &mut arena)?;

    // 6. Report.
    let report = arena.report(&result);
    info!(
        final_balance = report.final_balance,
        fleet_size = report.fleet_size,
        collisions = report.stats.collisions,
        "prospector-arena finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Load configuration.
///
/// An explicit `PROSPECTOR_CONFIG` path must exist. The default path is
/// optional; defaults are used when it is absent. Returns the config and a
/// description of where it came from.
fn load_config() -> Result<(ProspectorConfig, String), ArenaError> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        let path = PathBuf::from(path);
        let config = ProspectorConfig::from_file(&path)?;
        return Ok((config, path.display().to_string()));
    }

    let path = PathBuf::from(DEFAULT_CONFIG_PATH);
    if path.exists() {
        let config = ProspectorConfig::from_file(&path)?;
        Ok((config, path.display().to_string()))
    } else {
        Ok((ProspectorConfig::default(), String::from("defaults")))
    }
}
