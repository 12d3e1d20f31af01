//! Shared type definitions for the Prospector fleet controller.
//!
//! This crate is the single source of truth for the vocabulary used across
//! the workspace: unit identifiers, grid positions and directions, the
//! commands sent to the game engine, unit orders, and the fixed game
//! constants.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe wrappers for engine-assigned identifiers
//! - [`enums`] -- Directions, ledger claimants, search cost models
//! - [`structs`] -- Positions, cells, units, game constants
//! - [`commands`] -- Commands emitted at the end of a turn
//! - [`orders`] -- Directive chains with validated backups

pub mod commands;
pub mod enums;
pub mod ids;
pub mod orders;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use commands::Command;
pub use enums::{Claimant, CostModel, Direction};
pub use ids::UnitId;
pub use orders::{Directive, MAX_ORDER_DEPTH, Order, OrderError, validate_chain};
pub use structs::{Cell, GameConstants, Position, Unit};
