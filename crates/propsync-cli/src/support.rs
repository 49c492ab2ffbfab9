use std::fs;
use std::path::Path;

use host_model::MemoryDocument;
use reconcile_engine::{CaptureError, ReconcileConfig};
use snapshot_format::{LayoutError, LoadError, SaveError};

/// Everything that stops a command before or after the engine runs.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("failed to write {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("invalid JSON in {path}: {reason}")]
    Json { path: String, reason: String },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Capture(#[from] CaptureError),
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = fs::read_to_string(path).map_err(|e| CliError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&text).map_err(|e| CliError::Json {
        path: path.display().to_string(),
        reason: e.to_string(),
    })
}

pub fn read_document(path: &Path) -> Result<MemoryDocument, CliError> {
    read_json(path)
}

pub fn write_document(path: &Path, doc: &MemoryDocument) -> Result<(), CliError> {
    let write_error = |reason: String| CliError::Write {
        path: path.display().to_string(),
        reason,
    };
    let json = serde_json::to_string_pretty(doc).map_err(|e| write_error(e.to_string()))?;
    fs::write(path, json).map_err(|e| write_error(e.to_string()))
}

/// Settings from `--config`, or the defaults.
pub fn read_config(path: Option<&Path>) -> Result<ReconcileConfig, CliError> {
    match path {
        Some(path) => read_json(path),
        None => Ok(ReconcileConfig::default()),
    }
}
