//! Service layer for library merge import
//!
//! Fetch-existing → merge → persist for a single library file. The merge is
//! plain concatenation: existing items first, new items appended, order
//! preserved, no deduplication.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::document::SourceFile;
use crate::errors::{ImportError, ImportResult};
use crate::store::RemoteStore;

pub struct LibraryImportService {
    store: Arc<dyn RemoteStore>,
}

impl LibraryImportService {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self { store }
    }

    /// Import a library file, returning the number of newly added items.
    ///
    /// A failed fetch of the existing collection is treated as "no existing
    /// data" rather than a hard failure; a failed save is an error.
    pub async fn import_library(&self, file: &SourceFile) -> ImportResult<usize> {
        let text = file.text()?;
        let value: Value =
            serde_json::from_str(text).map_err(|err| ImportError::Parse(err.to_string()))?;
        let new_items = library_items_from_value(value)?;

        let existing = match self.store.fetch_library().await {
            Ok(items) => items,
            Err(err) => {
                warn!(error = %err, "library fetch failed, merging into empty collection");
                Vec::new()
            }
        };
        debug!(
            existing = existing.len(),
            new = new_items.len(),
            "merging library items"
        );

        let mut merged = existing;
        merged.extend(new_items.iter().cloned());
        self.store.save_library(&merged).await?;

        info!(
            added = new_items.len(),
            total = merged.len(),
            "library import complete"
        );
        Ok(new_items.len())
    }
}

/// A library file carries either a named item collection or a bare item
/// array as its top-level content. Anything else is a format error.
fn library_items_from_value(value: Value) -> ImportResult<Vec<Value>> {
    match value {
        Value::Object(mut map) => match map.remove("libraryItems") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ImportError::Format),
        },
        Value::Array(items) => Ok(items),
        _ => Err(ImportError::Format),
    }
}
