//! Snapshot protocol error types

use thiserror::Error;

/// Errors raised while verifying or committing a database snapshot
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SnapshotError {
    /// Endpoint returned a structured rejection; the message is surfaced
    /// verbatim to the operator
    #[error("{0}")]
    Rejected(String),

    /// The call itself failed before a response was produced
    #[error("Transport error: {0}")]
    Transport(String),

    /// A protocol operation was requested in a state that does not allow it
    #[error("Operation not allowed in state '{0}'")]
    InvalidState(&'static str),
}

impl From<reqwest::Error> for SnapshotError {
    fn from(err: reqwest::Error) -> Self {
        SnapshotError::Transport(err.to_string())
    }
}
