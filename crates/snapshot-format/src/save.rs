use std::fs;
use std::path::Path;

use propsync_types::SnapshotDocument;

use crate::errors::SaveError;

/// Serialize a snapshot document to pretty-printed JSON.
pub fn save_snapshot(doc: &SnapshotDocument) -> Result<String, SaveError> {
    serde_json::to_string_pretty(doc).map_err(|e| SaveError::Serialize {
        reason: e.to_string(),
    })
}

/// Serialize a snapshot document and write it to `path`.
pub fn write_snapshot(path: &Path, doc: &SnapshotDocument) -> Result<(), SaveError> {
    let json = save_snapshot(doc)?;
    fs::write(path, json).map_err(|e| SaveError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}
