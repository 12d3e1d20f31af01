//! Game loop runner.
//!
//! [`run_game`] drives a [`FleetController`] against any [`TurnSource`]:
//! read a turn, decide, submit, until the source reports the game is over.
//! The source is the only external interface; the arena binary implements
//! it with a local simulator and tests implement it with scripted states.

use prospector_types::Command;
use tracing::info;

use crate::controller::{ControllerError, FleetController};
use crate::turn::{TurnState, TurnSummary};

/// Errors raised by a [`TurnSource`].
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Reading or writing the game stream failed.
    #[error("source I/O failed: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// The source produced a state the controller cannot use.
    #[error("malformed turn state: {reason}")]
    Malformed {
        /// What was wrong with it.
        reason: String,
    },

    /// The source refused the submitted commands.
    #[error("commands for turn {turn} rejected: {reason}")]
    Rejected {
        /// The turn whose commands were refused.
        turn: u32,
        /// Why they were refused.
        reason: String,
    },
}

/// Errors that can occur during the game run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The turn source failed.
    #[error("turn source error: {source}")]
    Source {
        /// The underlying source error.
        #[from]
        source: SourceError,
    },

    /// A turn could not be decided.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: ControllerError,
    },
}

/// Where turns come from and where commands go.
pub trait TurnSource {
    /// The next turn's state, or `None` once the game is over.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the state cannot be produced.
    fn next_turn(&mut self) -> Result<Option<TurnState>, SourceError>;

    /// Submit the commands decided for `turn`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the commands cannot be delivered.
    fn submit(&mut self, turn: u32, commands: &[Command]) -> Result<(), SourceError>;
}

/// Result of a full game.
#[derive(Debug, Clone, Default)]
pub struct GameResult {
    /// Number of turns decided.
    pub turns_played: u32,
    /// Commands submitted across all turns.
    pub total_commands: usize,
    /// Spawn commands submitted.
    pub total_spawns: u32,
    /// Anomalies raised across all turns.
    pub anomaly_count: usize,
    /// The last turn's summary, if any turn was played.
    pub final_summary: Option<TurnSummary>,
}

/// Play a game to the end.
///
/// # Errors
///
/// Returns [`RunnerError`] on the first source or controller failure.
pub fn run_game(
    controller: &mut FleetController,
    source: &mut dyn TurnSource,
) -> Result<GameResult, RunnerError> {
    let mut result = GameResult::default();
    info!(max_turns = controller.constants().max_turns, "Game starting");

    while let Some(state) = source.next_turn()? {
        let summary = controller.run_turn(&state)?;
        source.submit(summary.turn, &summary.commands)?;

        result.turns_played = result.turns_played.saturating_add(1);
        result.total_commands = result.total_commands.saturating_add(summary.commands.len());
        if summary.spawned {
            result.total_spawns = result.total_spawns.saturating_add(1);
        }
        result.anomaly_count = result.anomaly_count.saturating_add(summary.anomalies.len());
        result.final_summary = Some(summary);
    }

    info!(
        turns_played = result.turns_played,
        total_commands = result.total_commands,
        total_spawns = result.total_spawns,
        anomalies = result.anomaly_count,
        "Game ended"
    );
    Ok(result)
}
