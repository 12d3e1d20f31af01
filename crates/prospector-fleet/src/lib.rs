//! Targets, orders, and per-turn dispatch for the Prospector fleet.
//!
//! This crate contains the decision layer: everything that turns a grid
//! snapshot and a roster into unit commands without touching I/O. It sits
//! between `prospector-world` (geometry and search) and `prospector-core`
//! (the per-turn controller and the game loop).
//!
//! # Modules
//!
//! - [`anomaly`] -- Recoverable per-unit problems ([`Anomaly`])
//! - [`config`] -- Strategy settings and resolved thresholds ([`FleetConfig`])
//! - [`dispatch`] -- Ledger-backed command queue ([`TurnDispatch`])
//! - [`error`] -- Error types for board claims ([`TargetError`])
//! - [`orders`] -- The per-unit state machine ([`OrderEngine`])
//! - [`targets`] -- Ranked, exclusively-assigned targets ([`TargetBoard`])

pub mod anomaly;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod orders;
pub mod targets;

// Re-export primary types at crate root for convenience.
pub use anomaly::Anomaly;
pub use config::{FleetConfig, StrategySettings};
pub use dispatch::TurnDispatch;
pub use error::TargetError;
pub use orders::{MAX_TRANSITIONS, OrderEngine, Phase, RosterChange, TurnContext};
pub use targets::{TargetBoard, TargetEntry};
