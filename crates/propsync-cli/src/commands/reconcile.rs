use std::path::PathBuf;
use std::process::ExitCode;

use snapshot_format::{SnapshotInfo, SnapshotLayout};
use tracing::info;

use crate::support::{read_config, read_document, write_document, CliError};

pub struct Args {
    pub snapshot_dir: PathBuf,
    pub document: PathBuf,
    pub out: Option<PathBuf>,
    pub config: Option<PathBuf>,
    pub tolerance: Option<f64>,
    pub strict: bool,
    pub json: bool,
}

/// Replay a snapshot folder onto a re-imported document.
///
/// A missing snapshot file or geometry folder aborts before the document is
/// touched. Everything after that is reported in the run summary.
pub fn run(args: Args) -> Result<ExitCode, CliError> {
    let layout = SnapshotLayout::open(&args.snapshot_dir)?;
    let snapshot = layout.read()?;
    let exchange_files = layout.exchange_files()?;
    info!(
        files = exchange_files.len(),
        dir = %layout.geometry_dir().display(),
        "exchange files available"
    );

    let mut config = read_config(args.config.as_deref())?;
    if let Some(tolerance) = args.tolerance {
        config.tolerance = tolerance;
    }
    if args.strict {
        config.broadcast_on_unresolved = false;
    }

    let mut doc = read_document(&args.document)?;
    let summary = reconcile_engine::reconcile(&mut doc, &snapshot, &config);

    let out = args.out.as_ref().unwrap_or(&args.document);
    write_document(out, &doc)?;

    if args.json {
        let json = serde_json::to_string_pretty(&summary).map_err(|e| CliError::Write {
            path: "stdout".to_string(),
            reason: e.to_string(),
        })?;
        println!("{json}");
    } else {
        let snapshot_info = SnapshotInfo::of(&snapshot);
        println!(
            "Snapshot v{}: {} geometries, {} assignments, {} interactions",
            snapshot_info.version,
            snapshot_info.geometries,
            snapshot_info.assignments,
            snapshot_info.interactions
        );
        print!("{}", summary.to_text());
    }
    Ok(ExitCode::SUCCESS)
}
