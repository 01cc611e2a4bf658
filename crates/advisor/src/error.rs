//! Error types for the advisory layer.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading the training corpus.
///
/// Only [`crate::TrainingData::load_strict`] returns these;
/// [`crate::TrainingData::load`] logs them and falls back to empty data.
#[derive(Debug, Error)]
pub enum TrainingDataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors that can occur during advisor configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}
