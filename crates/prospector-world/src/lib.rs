//! Grid geometry, per-turn occupancy, and path search for the Prospector
//! fleet controller.
//!
//! This crate models the physical side of a turn: the toroidal resource
//! grid, the ledger of cells claimed by this turn's commands, and the
//! cost-aware searches that pick where units go next.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid construction.
//! - [`grid`] -- [`GameGrid`]: wrap-around coordinates, distances,
//!   neighbours, and cell resources.
//! - [`occupancy`] -- [`OccupancyLedger`]: first-come cell claims that keep
//!   a turn's commands collision-free.
//! - [`path`] -- [`PathSearch`]: bounded best-first step search and
//!   nearby-best BFS, with their memo tables.

pub mod error;
pub mod grid;
pub mod occupancy;
pub mod path;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::GameGrid;
pub use occupancy::{ClaimRecord, OccupancyLedger};
pub use path::{CostMemo, PathSearch, SearchLimits, SearchSettings};
