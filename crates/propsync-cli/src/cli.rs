use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "propsync",
    about = "Carry property assignments across a geometry export/re-import round trip",
    version
)]
pub struct Cli {
    /// Raise log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record every geometry, assignment and interaction of a document
    Capture {
        /// Host document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Snapshot folder to create
        #[arg(long)]
        out: PathBuf,
    },

    /// Replay a snapshot onto a re-imported document
    Reconcile {
        /// Snapshot folder holding snapshot.json and Geometries/
        #[arg(long)]
        snapshot_dir: PathBuf,

        /// Re-imported host document (JSON)
        #[arg(long)]
        document: PathBuf,

        /// Where to write the reconciled document (defaults to --document)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Reconciliation settings (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Coordinate tolerance, overriding the config
        #[arg(long)]
        tolerance: Option<f64>,

        /// Fail unresolved split bodies instead of broadcasting
        #[arg(long)]
        strict: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report duplicate and contained geometry names
    CheckNames {
        /// Host document (JSON)
        #[arg(long)]
        document: PathBuf,
    },
}
