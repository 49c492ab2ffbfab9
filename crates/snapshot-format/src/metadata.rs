use chrono::{Local, NaiveDateTime};
use propsync_types::SnapshotDocument;
use serde::Serialize;

/// Format of the snapshot `timestamp` field.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time in snapshot timestamp format.
pub fn now_timestamp() -> String {
    Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Parse a snapshot timestamp. `None` when the field is not in the
/// expected format.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).ok()
}

/// Overview of a snapshot document, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotInfo {
    pub version: u32,
    pub captured: Option<NaiveDateTime>,
    pub geometries: usize,
    pub assignments: usize,
    pub interactions: usize,
    /// Geometries whose capture recorded at least one error.
    pub geometries_with_errors: usize,
}

impl SnapshotInfo {
    pub fn of(doc: &SnapshotDocument) -> Self {
        Self {
            version: doc.version,
            captured: parse_timestamp(&doc.timestamp),
            geometries: doc.geometries.len(),
            assignments: doc.assignment_count(),
            interactions: doc.interactions.len(),
            geometries_with_errors: doc.geometries.iter().filter(|g| !g.errors.is_empty()).count(),
        }
    }
}
