//! Per-file import error types
//!
//! Every variant here is non-fatal to a batch: the batch importer records
//! the formatted message against the offending file and keeps going.

use thiserror::Error;

/// Errors raised while importing drawings or library files
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ImportError {
    /// Document parsed but is missing `elements` or `appState`
    #[error("Invalid file structure: {0}")]
    Structural(String),

    /// Input could not be parsed at all
    #[error("Parsing error: {0}")]
    Parse(String),

    /// Library file is neither an item envelope nor a bare item array
    #[error("Invalid library file format")]
    Format,

    /// Network or transport failure
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint returned a structured failure
    #[error("{0}")]
    RemoteRejection(String),

    /// Selection violated an import precondition
    #[error("{0}")]
    Precondition(String),
}

impl ImportError {
    /// Check if this error was caused by the input file itself
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ImportError::Structural(_) | ImportError::Parse(_) | ImportError::Format
        )
    }

    /// Check if this error came from the remote side
    pub fn is_remote_error(&self) -> bool {
        matches!(
            self,
            ImportError::Transport(_) | ImportError::RemoteRejection(_)
        )
    }
}

impl From<reqwest::Error> for ImportError {
    fn from(err: reqwest::Error) -> Self {
        ImportError::Transport(err.to_string())
    }
}
