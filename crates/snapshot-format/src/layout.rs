use std::fs;
use std::path::{Path, PathBuf};

use propsync_types::SnapshotDocument;
use tracing::{debug, info};

use crate::errors::{LayoutError, LoadError, SaveError};
use crate::load::read_snapshot;
use crate::save::write_snapshot;

/// File name of the snapshot document inside a snapshot folder.
pub const SNAPSHOT_FILE: &str = "snapshot.json";

/// Directory holding one exchange file per captured geometry.
pub const GEOMETRY_DIR: &str = "Geometries";

/// Extensions the import driver picks up, compared case-insensitively.
pub const EXCHANGE_EXTENSIONS: [&str; 5] = ["stp", "step", "iges", "igs", "brep"];

/// A snapshot folder: `snapshot.json` next to a `Geometries/` directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotLayout {
    root: PathBuf,
}

impl SnapshotLayout {
    /// Create the folder and its geometry directory if they do not exist.
    pub fn create(root: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let layout = Self { root: root.into() };
        let dir = layout.geometry_dir();
        fs::create_dir_all(&dir).map_err(|e| io_error(&dir, e))?;
        info!(root = %layout.root.display(), "snapshot folder ready");
        Ok(layout)
    }

    /// Open an existing folder. Fails when the snapshot document or the
    /// geometry directory is missing.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, LayoutError> {
        let layout = Self { root: root.into() };
        let snapshot = layout.snapshot_path();
        if !snapshot.is_file() {
            return Err(LayoutError::MissingSnapshot {
                path: snapshot.display().to_string(),
            });
        }
        let dir = layout.geometry_dir();
        if !dir.is_dir() {
            return Err(LayoutError::MissingGeometryDir {
                path: dir.display().to_string(),
            });
        }
        Ok(layout)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root.join(SNAPSHOT_FILE)
    }

    pub fn geometry_dir(&self) -> PathBuf {
        self.root.join(GEOMETRY_DIR)
    }

    pub fn read(&self) -> Result<SnapshotDocument, LoadError> {
        read_snapshot(&self.snapshot_path())
    }

    pub fn write(&self, doc: &SnapshotDocument) -> Result<(), SaveError> {
        write_snapshot(&self.snapshot_path(), doc)
    }

    /// Exchange files in the geometry directory, sorted by path.
    pub fn exchange_files(&self) -> Result<Vec<PathBuf>, LayoutError> {
        discover_exchange_files(&self.geometry_dir())
    }
}

/// File stem a geometry is exported under: `geom_<id>_<name>`, keeping only
/// alphanumerics, spaces, `-` and `_` from the name.
pub fn export_stem(id: u32, name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let safe = kept.trim();
    if safe.is_empty() {
        format!("geom_{id}_geometry_{id}")
    } else {
        format!("geom_{id}_{safe}")
    }
}

/// Exchange files directly inside `dir`, sorted by path.
pub fn discover_exchange_files(dir: &Path) -> Result<Vec<PathBuf>, LayoutError> {
    if !dir.is_dir() {
        return Err(LayoutError::MissingGeometryDir {
            path: dir.display().to_string(),
        });
    }
    let entries = fs::read_dir(dir).map_err(|e| io_error(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| io_error(dir, e))?.path();
        if path.is_file() && is_exchange_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    debug!(dir = %dir.display(), count = files.len(), "exchange files discovered");
    Ok(files)
}

fn is_exchange_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| EXCHANGE_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
}

fn io_error(path: &Path, e: std::io::Error) -> LayoutError {
    LayoutError::Io {
        path: path.display().to_string(),
        reason: e.to_string(),
    }
}
