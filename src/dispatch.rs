//! File-class detection and batch routing
//!
//! A selection routes to exactly one importer. Database snapshots are
//! mutually exclusive with every other class in the same selection; that is
//! a hard precondition checked before any network activity.

use crate::document::SourceFile;
use crate::errors::{ImportError, ImportResult};

pub const DRAWING_EXTENSIONS: &[&str] = &["json", "excalidraw"];
pub const SNAPSHOT_EXTENSION: &str = "sqlite";
pub const LIBRARY_EXTENSION: &str = "excalidrawlib";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileClass {
    Drawing,
    Snapshot,
    Library,
    Unrecognized,
}

pub fn classify(file_name: &str) -> FileClass {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, extension)| extension)
        .unwrap_or("");
    if DRAWING_EXTENSIONS.contains(&extension) {
        FileClass::Drawing
    } else if extension == SNAPSHOT_EXTENSION {
        FileClass::Snapshot
    } else if extension == LIBRARY_EXTENSION {
        FileClass::Library
    } else {
        FileClass::Unrecognized
    }
}

/// A routed file selection, bound for exactly one importer.
#[derive(Debug)]
pub enum ImportRequest {
    /// Batch drawing import; unrecognized files are filtered out by the
    /// importer itself
    Drawings(Vec<SourceFile>),
    Library(SourceFile),
    Snapshot(SourceFile),
}

/// Route a file selection to one importer, enforcing the mixed-selection
/// preconditions.
pub fn route(mut files: Vec<SourceFile>) -> ImportResult<ImportRequest> {
    let has_snapshot = files
        .iter()
        .any(|file| classify(&file.name) == FileClass::Snapshot);
    if has_snapshot {
        if files.len() > 1 {
            return Err(ImportError::Precondition(
                "Please import database files separately from other files.".to_string(),
            ));
        }
        return Ok(ImportRequest::Snapshot(files.remove(0)));
    }

    let has_library = files
        .iter()
        .any(|file| classify(&file.name) == FileClass::Library);
    if has_library {
        if files.len() > 1 {
            return Err(ImportError::Precondition(
                "Please import library files separately from other files.".to_string(),
            ));
        }
        return Ok(ImportRequest::Library(files.remove(0)));
    }

    Ok(ImportRequest::Drawings(files))
}
