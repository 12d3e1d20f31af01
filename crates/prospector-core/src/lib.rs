//! Per-turn fleet controller, configuration, and game loop for Prospector.
//!
//! This crate owns the turn pipeline that drives the fleet: validate the
//! snapshot, reconcile the roster, rank targets, run the order engine, and
//! apply the spawn policy. It also loads `prospector-config.yaml` and runs
//! whole games against any [`TurnSource`].
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `prospector-config.yaml` into
//!   strongly-typed structs.
//! - [`controller`] -- [`FleetController`]: the strictly ordered per-turn
//!   decision pass.
//! - [`runner`] -- [`TurnSource`] trait and the [`run_game`] loop.
//! - [`turn`] -- [`TurnState`] input snapshot and [`TurnSummary`] output.
//!
//! [`TurnSource`]: runner::TurnSource
//! [`run_game`]: runner::run_game

pub mod config;
pub mod controller;
pub mod runner;
pub mod turn;

pub use config::{ArenaSettings, ConfigError, LoggingConfig, ProspectorConfig};
pub use controller::{ControllerError, FleetController};
pub use runner::{GameResult, RunnerError, SourceError, TurnSource, run_game};
pub use turn::{TurnState, TurnSummary};
