//! Per-turn input snapshot and output summary.

use prospector_fleet::Anomaly;
use prospector_types::{Command, Position, Unit, UnitId};
use prospector_world::GameGrid;
use serde::{Deserialize, Serialize};

/// Everything the controller reads at the start of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number, starting at zero.
    pub turn: u32,
    /// Our units, in roster order.
    pub units: Vec<Unit>,
    /// The home base (shipyard).
    pub home: Position,
    /// Resource available for spawning.
    pub balance: u32,
    /// The grid snapshot.
    pub grid: GameGrid,
}

/// What the controller decided in one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnSummary {
    /// The turn this summary belongs to.
    pub turn: u32,
    /// Commands to submit, in dispatch order.
    pub commands: Vec<Command>,
    /// Whether a spawn command was issued.
    pub spawned: bool,
    /// Units seen for the first time this turn.
    pub joined: Vec<UnitId>,
    /// Units gone since last turn.
    pub departed: Vec<UnitId>,
    /// Per-unit problems recovered from this turn.
    pub anomalies: Vec<Anomaly>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_parses_from_engine_json() {
        let json = r#"{
            "turn": 3,
            "units": [{"id": 7, "position": {"x": 1, "y": 0}, "carried": 120}],
            "home": {"x": 0, "y": 0},
            "balance": 4000,
            "grid": {"width": 2, "height": 2, "resources": [0, 50, 60, 70]}
        }"#;
        let state: TurnState = serde_json::from_str(json).unwrap();
        assert_eq!(state.units.first().map(|u| u.id), Some(UnitId::new(7)));
        assert_eq!(state.grid.resource_at(Position::new(0, 1)), 60);
    }

    #[test]
    fn summary_serializes_tagged_commands_and_anomalies() {
        let summary = TurnSummary {
            turn: 1,
            commands: vec![Command::Spawn],
            spawned: true,
            joined: Vec::new(),
            departed: vec![UnitId::new(2)],
            anomalies: vec![Anomaly::Stranded { unit: UnitId::new(4) }],
        };
        let value = serde_json::to_value(&summary).unwrap();
        let command_type = value
            .get("commands")
            .and_then(|c| c.get(0))
            .and_then(|c| c.get("type"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(command_type, Some("spawn"));
        let anomaly_kind = value
            .get("anomalies")
            .and_then(|a| a.get(0))
            .and_then(|a| a.get("kind"))
            .and_then(serde_json::Value::as_str);
        assert_eq!(anomaly_kind, Some("stranded"));
    }
}
