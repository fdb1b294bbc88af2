//! Aggregated result of one import batch

use serde::Serialize;
use tokio::sync::Mutex;

/// Outcome of a batch import: counts plus a flat list of human-readable
/// per-file messages, each formatted `"<filename>: <message>"`.
///
/// Error entries are appended in completion order, which is
/// nondeterministic across a concurrent batch; consumers should treat the
/// list as unordered content.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportOutcome {
    pub success: usize,
    pub failed: usize,
    pub errors: Vec<String>,
}

impl ImportOutcome {
    /// The no-op outcome for a selection with no recognized files.
    pub fn no_supported_files() -> Self {
        Self {
            success: 0,
            failed: 0,
            errors: vec!["No supported files found.".to_string()],
        }
    }

    pub fn total(&self) -> usize {
        self.success + self.failed
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }
}

/// Append-only accumulator shared by all concurrently-completing per-file
/// pipelines of one batch.
#[derive(Debug, Default)]
pub(crate) struct OutcomeCollector {
    inner: Mutex<ImportOutcome>,
}

impl OutcomeCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn record_success(&self) {
        self.inner.lock().await.success += 1;
    }

    pub async fn record_failure(&self, file_name: &str, message: &str) {
        let mut outcome = self.inner.lock().await;
        outcome.failed += 1;
        outcome.errors.push(format!("{}: {}", file_name, message));
    }

    /// Consume the collector once every pipeline has settled.
    pub fn into_outcome(self) -> ImportOutcome {
        self.inner.into_inner()
    }
}
