use std::fs;
use std::path::Path;

use propsync_types::{SnapshotDocument, SNAPSHOT_VERSION};
use tracing::{debug, warn};

use crate::errors::LoadError;

/// Deserialize a snapshot document from a JSON string.
///
/// Documents written before versioning load as the current version.
/// Documents from a newer writer are rejected.
pub fn load_snapshot(json: &str) -> Result<SnapshotDocument, LoadError> {
    let doc: SnapshotDocument = serde_json::from_str(json).map_err(|e| LoadError::Parse {
        reason: e.to_string(),
    })?;

    if doc.version > SNAPSHOT_VERSION {
        return Err(LoadError::FutureVersion {
            file_version: doc.version,
            supported_version: SNAPSHOT_VERSION,
        });
    }

    if doc.total_geometries != doc.geometries.len() {
        warn!(
            declared = doc.total_geometries,
            found = doc.geometries.len(),
            "total_geometries does not match geometry records"
        );
    }
    if let Some(total) = doc.total_interactions {
        if total != doc.interactions.len() {
            warn!(
                declared = total,
                found = doc.interactions.len(),
                "total_interactions does not match interaction records"
            );
        }
    }

    debug!(
        geometries = doc.geometries.len(),
        interactions = doc.interactions.len(),
        timestamp = %doc.timestamp,
        "snapshot loaded"
    );
    Ok(doc)
}

/// Read and deserialize a snapshot document from disk.
pub fn read_snapshot(path: &Path) -> Result<SnapshotDocument, LoadError> {
    let json = fs::read_to_string(path).map_err(|e| LoadError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    load_snapshot(&json)
}
