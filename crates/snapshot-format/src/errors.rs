/// Errors while reading a snapshot document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {reason}")]
    Io { path: String, reason: String },

    #[error("failed to parse snapshot: {reason}")]
    Parse { reason: String },

    #[error("snapshot version {file_version} is newer than supported version {supported_version}")]
    FutureVersion {
        file_version: u32,
        supported_version: u32,
    },
}

/// Errors while writing a snapshot document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize snapshot: {reason}")]
    Serialize { reason: String },

    #[error("failed to write {path}: {reason}")]
    Io { path: String, reason: String },
}

/// Preconditions of a snapshot folder. Reported before any reconciliation
/// work starts.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error("snapshot document not found: {path}")]
    MissingSnapshot { path: String },

    #[error("geometry directory not found: {path}")]
    MissingGeometryDir { path: String },

    #[error("{path}: {reason}")]
    Io { path: String, reason: String },
}
