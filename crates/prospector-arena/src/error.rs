//! Error types for the arena binary.
//!
//! [`ArenaError`] wraps every failure mode of setting up and playing a
//! local game, so that `main` can propagate with `?`.

/// Top-level error for the arena binary.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: prospector_core::ConfigError,
    },

    /// The resource field could not be built.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: prospector_world::WorldError,
    },

    /// The controller could not be built.
    #[error("controller error: {source}")]
    Controller {
        /// The underlying controller error.
        #[from]
        source: prospector_core::ControllerError,
    },

    /// The game loop failed.
    #[error("runner error: {source}")]
    Runner {
        /// The underlying runner error.
        #[from]
        source: prospector_core::RunnerError,
    },

    /// The final report could not be serialized.
    #[error("report serialization failed: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },
}
