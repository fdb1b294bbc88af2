//! Service layer for batch drawing import
//!
//! Orchestrates parse → preview → submit across many files. Every per-file
//! failure is recovered locally and folded into the aggregated outcome; one
//! bad input never aborts sibling work.

use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_MAX_CONCURRENT_IMPORTS;
use crate::dispatch::{classify, FileClass};
use crate::document::{DrawingDocument, DrawingPayload, DrawingRecord, SourceFile};
use crate::outcome::{ImportOutcome, OutcomeCollector};
use crate::preview::PreviewRenderer;
use crate::store::RemoteStore;

/// Awaited exactly once after the batch settles, if at least one file
/// succeeded. Callers use it to refresh derived views.
pub type CompletionCallback<'a> = BoxFuture<'a, ()>;

pub struct DrawingImportService {
    store: Arc<dyn RemoteStore>,
    renderer: Arc<dyn PreviewRenderer>,
    max_concurrent: usize,
}

impl DrawingImportService {
    pub fn new(store: Arc<dyn RemoteStore>, renderer: Arc<dyn PreviewRenderer>) -> Self {
        Self {
            store,
            renderer,
            max_concurrent: DEFAULT_MAX_CONCURRENT_IMPORTS,
        }
    }

    /// Bound the number of simultaneously in-flight per-file pipelines.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Import every recognized drawing file in the selection.
    ///
    /// Pipelines run concurrently up to the configured ceiling; the call
    /// returns only after the entire set has settled. Completion order is
    /// nondeterministic and does not affect the counts.
    pub async fn import_drawings(
        &self,
        files: &[SourceFile],
        target_collection_id: Option<&str>,
        on_success: Option<CompletionCallback<'_>>,
    ) -> ImportOutcome {
        let drawing_files: Vec<&SourceFile> = files
            .iter()
            .filter(|file| classify(&file.name) == FileClass::Drawing)
            .collect();
        if drawing_files.is_empty() {
            debug!("no recognized drawing files in selection");
            return ImportOutcome::no_supported_files();
        }

        info!(count = drawing_files.len(), "importing drawings");
        let semaphore = Semaphore::new(self.max_concurrent);
        let collector = OutcomeCollector::new();

        let pipelines = drawing_files.iter().map(|file| {
            let semaphore = &semaphore;
            let collector = &collector;
            async move {
                let _permit = semaphore.acquire().await.expect("import semaphore closed");
                match self.import_one(file, target_collection_id).await {
                    Ok(record) => {
                        debug!(file = %file.name, id = %record.id, "imported drawing");
                        collector.record_success().await;
                    }
                    Err(err) => {
                        warn!(file = %file.name, error = %err, "failed to import drawing");
                        collector.record_failure(&file.name, &err.to_string()).await;
                    }
                }
            }
        });
        join_all(pipelines).await;

        let outcome = collector.into_outcome();
        info!(
            success = outcome.success,
            failed = outcome.failed,
            "drawing import batch settled"
        );
        if outcome.success > 0 {
            if let Some(callback) = on_success {
                callback.await;
            }
        }
        outcome
    }

    async fn import_one(
        &self,
        file: &SourceFile,
        collection_id: Option<&str>,
    ) -> anyhow::Result<DrawingRecord> {
        let text = file.text()?;
        let document = DrawingDocument::parse(&file.name, text)?;
        let preview = self
            .renderer
            .render(&document.elements, &document.app_state, document.files.as_ref())
            .await?;
        let payload = DrawingPayload::from_document(&file.name, document, collection_id, preview);
        let record = self.store.create_drawing(&payload).await?;
        Ok(record)
    }
}
