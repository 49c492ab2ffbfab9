use std::path::{Path, PathBuf};

use host_model::{GeometryId, GeometryImporter, HostError};
use tracing::{info, instrument, warn};

/// Outcome of importing a set of exchange files.
#[derive(Debug, Default)]
pub struct ImportReport {
    /// Geometries created, in import order.
    pub imported: Vec<GeometryId>,
    pub failures: Vec<(PathBuf, HostError)>,
}

impl ImportReport {
    pub fn failed(&self) -> usize {
        self.failures.len()
    }
}

/// Import each file in order. A failing file is recorded and the remaining
/// files are still imported.
#[instrument(skip_all, fields(files = files.len()))]
pub fn import_all<P: AsRef<Path>>(
    importer: &mut dyn GeometryImporter,
    files: &[P],
) -> ImportReport {
    let mut report = ImportReport::default();
    for file in files {
        let path = file.as_ref();
        match importer.import_geometry(path) {
            Ok(ids) => report.imported.extend(ids),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "import failed");
                report.failures.push((path.to_path_buf(), e));
            }
        }
    }
    info!(
        imported = report.imported.len(),
        failed = report.failed(),
        "import complete"
    );
    report
}
