//! Error types for input source tracking.

use thiserror::Error;

/// Errors that can occur while reading or selecting input sources.
#[derive(Debug, Error)]
pub enum InputSourceError {
    /// No installed input source has this ID.
    #[error("input source not installed: {0}")]
    NotInstalled(String),

    /// The system refused to select the input source.
    #[error("failed to select input source {id}: status {status}")]
    SelectFailed { id: String, status: i32 },

    /// The current input source could not be read.
    #[error("failed to read current input source")]
    Unavailable,

    /// The thread that owns the system input source API did not answer.
    #[error("input source thread did not answer selecting {0}")]
    NoResponse(String),
}

pub type Result<T> = std::result::Result<T, InputSourceError>;
