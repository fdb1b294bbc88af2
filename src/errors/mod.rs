//! Domain-specific error types for the import pipeline
//!
//! Two domains: per-file import errors (batch drawings, libraries) and
//! snapshot protocol errors. Per-file errors are always recovered locally
//! and folded into the aggregated [`crate::outcome::ImportOutcome`];
//! snapshot errors are surfaced directly to the operator.

pub mod import;
pub mod snapshot;

pub use import::ImportError;
pub use snapshot::SnapshotError;

/// Result type alias for import operations
pub type ImportResult<T> = Result<T, ImportError>;

/// Result type alias for snapshot protocol operations
pub type SnapshotResult<T> = Result<T, SnapshotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_result_alias() {
        let result: ImportResult<()> = Err(ImportError::Format);
        assert!(result.is_err());
    }

    #[test]
    fn test_snapshot_result_alias() {
        let result: SnapshotResult<()> = Err(SnapshotError::Rejected("bad".to_string()));
        assert!(result.is_err());
    }
}
