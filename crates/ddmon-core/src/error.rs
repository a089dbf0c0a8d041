//! Error types for the ddmon-core crate.

use thiserror::Error;

/// Errors that can occur while resolving or mutating monitors.
#[derive(Debug, Error)]
pub enum MonitorError {
    /// Required configuration (credentials) is missing or invalid.
    #[error("configuration error: {reason}")]
    Config {
        /// What is missing.
        reason: String,
    },

    /// Mutually exclusive or missing selector/filter combination.
    #[error("invalid arguments: {reason}")]
    Validation {
        /// Which combination was rejected.
        reason: String,
    },

    /// The provider answered with a non-success status.
    #[error("{operation} failed: status {status}, body: {body}")]
    Remote {
        /// The repository operation that failed.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// A template file could not be read, parsed or converted.
    #[error("malformed template {source_name}: {reason}")]
    Template {
        /// File or template name.
        source_name: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Applying one template of a file failed.
    #[error("template {template}: {source}")]
    TemplateApply {
        /// Template name.
        template: String,
        /// Underlying failure.
        #[source]
        source: Box<MonitorError>,
    },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MonitorError {
    /// Creates a validation error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Creates a malformed-template error.
    pub fn template(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Template {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for MonitorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Result type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
