//! Error type of the replay harness.

use thiserror::Error;

use compass::CompassError;

use crate::config::ConfigError;

/// Everything that can abort a replay.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Compass(#[from] CompassError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid session file: {0}")]
    Session(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
