//! Per-turn anomalies.
//!
//! An anomaly is a per-unit problem the fleet recovered from locally. It is
//! logged at `warn` level when raised and returned in the turn summary; it
//! never aborts a turn.

use prospector_types::UnitId;
use serde::Serialize;
use tracing::warn;

/// A recoverable per-unit problem raised during a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// Every directive in the unit's chain failed; it issued no command.
    Stranded {
        /// The unit left without a command.
        unit: UnitId,
    },
    /// No unclaimed target was worth mining when the unit needed one.
    NoTargetAvailable {
        /// The idle unit.
        unit: UnitId,
    },
    /// A malformed order reached execution and was discarded.
    IllegalOrder {
        /// The unit whose order was discarded.
        unit: UnitId,
        /// Why the order was rejected.
        reason: String,
    },
    /// The unit changed state too many times in one turn.
    TransitionLimit {
        /// The unit that hit the cap.
        unit: UnitId,
    },
}

impl Anomaly {
    /// The unit the anomaly concerns.
    pub const fn unit(&self) -> UnitId {
        match self {
            Self::Stranded { unit }
            | Self::NoTargetAvailable { unit }
            | Self::IllegalOrder { unit, .. }
            | Self::TransitionLimit { unit } => *unit,
        }
    }

    /// Short tag for logs and reports.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Stranded { .. } => "stranded",
            Self::NoTargetAvailable { .. } => "no_target_available",
            Self::IllegalOrder { .. } => "illegal_order",
            Self::TransitionLimit { .. } => "transition_limit",
        }
    }

    /// Emit the anomaly as a structured warning.
    pub fn log(&self, turn: u32) {
        match self {
            Self::IllegalOrder { unit, reason } => {
                warn!(turn, unit = %unit, kind = self.kind(), reason = %reason, "Order anomaly");
            }
            _ => warn!(turn, unit = %self.unit(), kind = self.kind(), "Order anomaly"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_kind_tag() {
        let anomaly = Anomaly::IllegalOrder {
            unit: UnitId::new(3),
            reason: String::from("order chain is empty"),
        };
        let json = serde_json::to_value(&anomaly).unwrap_or_default();
        assert_eq!(json.get("kind").and_then(|v| v.as_str()), Some("illegal_order"));
        assert_eq!(json.get("unit").and_then(serde_json::Value::as_u64), Some(3));
        assert_eq!(anomaly.unit(), UnitId::new(3));
    }
}
