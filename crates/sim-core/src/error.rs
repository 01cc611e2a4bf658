//! Error types for the simulation engine.

use thiserror::Error;

/// Errors raised by [`crate::GameState`] mutations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("unknown player: {0}")]
    UnknownPlayer(String),

    #[error("player {0} is not alive")]
    NotAlive(String),

    #[error("player {0} is already a traitor")]
    AlreadyTraitor(String),

    #[error("the game is already over")]
    GameOver,
}

/// Errors returned by the game action tools.
///
/// These never cross the tool boundary as panics; [`crate::tools::dispatch`]
/// folds them into an error [`crate::tools::ToolOutcome`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ToolError {
    /// A required piece of call context (player id, game state, trust matrix) is absent.
    #[error("missing context: {0}")]
    MissingContext(&'static str),

    /// A malformed, missing or out-of-range argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The target is not allowed for this action.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The caller's role or status does not permit this action.
    #[error("not permitted: {0}")]
    Forbidden(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),
}

impl From<StateError> for ToolError {
    fn from(err: StateError) -> Self {
        match err {
            StateError::UnknownPlayer(id) => ToolError::InvalidTarget(format!("unknown player {}", id)),
            StateError::NotAlive(id) => ToolError::InvalidTarget(format!("player {} is not alive", id)),
            other => ToolError::Forbidden(other.to_string()),
        }
    }
}

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
