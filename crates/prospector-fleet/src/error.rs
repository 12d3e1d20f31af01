//! Error types for the `prospector-fleet` crate.
//!
//! Per-unit failures inside a turn are reported as
//! [`Anomaly`](crate::anomaly::Anomaly) values, never as errors. The only
//! error surfaced here is a rejected claim on the [`TargetBoard`].
//!
//! [`TargetBoard`]: crate::targets::TargetBoard

use prospector_types::{Position, UnitId};

/// Errors that can occur when claiming a target on the board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TargetError {
    /// The target is already assigned to another unit.
    #[error("target {position} is already claimed by unit {holder}")]
    AlreadyClaimed {
        /// The contested cell.
        position: Position,
        /// The unit holding it.
        holder: UnitId,
    },

    /// The position has no entry on the board.
    #[error("no target entry at {position}")]
    UnknownCell {
        /// The requested cell.
        position: Position,
    },
}
