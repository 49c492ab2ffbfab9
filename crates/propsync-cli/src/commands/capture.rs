use std::path::Path;
use std::process::ExitCode;

use reconcile_engine::capture_snapshot;
use snapshot_format::{export_stem, now_timestamp, SnapshotLayout};
use tracing::{info, warn};

use crate::support::{read_document, CliError};

/// Capture a document into a new snapshot folder and list the exchange file
/// stems the host should export each geometry to.
pub fn run(document: &Path, out: &Path) -> Result<ExitCode, CliError> {
    let doc = read_document(document)?;
    let report = capture_snapshot(&doc, &now_timestamp())?;

    let mut snapshot = report.snapshot;
    for geometry in &mut snapshot.geometries {
        geometry.exported_file = Some(export_stem(geometry.id, &geometry.name));
    }

    let layout = SnapshotLayout::create(out)?;
    layout.write(&snapshot)?;
    info!(
        path = %layout.snapshot_path().display(),
        geometries = snapshot.geometries.len(),
        "snapshot written"
    );

    for (short, long) in &report.conflicts {
        warn!(%short, %long, "name conflict may confuse correlation");
        println!("warning: \"{short}\" is contained in \"{long}\"");
    }
    for geometry in &snapshot.geometries {
        if let Some(stem) = &geometry.exported_file {
            println!("{stem}");
        }
    }
    Ok(ExitCode::SUCCESS)
}
