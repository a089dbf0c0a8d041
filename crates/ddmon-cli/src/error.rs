//! CLI error types.

use ddmon_core::MonitorError;
use thiserror::Error;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Engine, configuration or remote failure.
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    /// Output formatting error.
    #[error("format error: {0}")]
    Format(String),

    /// Invalid argument.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Interactive prompt failure.
    #[error("prompt failed: {0}")]
    Prompt(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
