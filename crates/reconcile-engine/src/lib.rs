pub mod assign;
pub mod capture;
pub mod import;
pub mod interactions;
pub mod materialize;
pub mod summary;
pub mod types;

use host_model::HostDocument;
use propsync_types::SnapshotDocument;
use tracing::{info, instrument};

pub use assign::{reassign, AssignState, GeometryState};
pub use capture::{capture_snapshot, CaptureError, CaptureReport};
pub use import::{import_all, ImportReport};
pub use interactions::{reconstruct_interactions, resolve_interaction_type, InteractionState};
pub use materialize::{apply_parameter, Materializer};
pub use summary::RunSummary;
pub use types::*;

/// The reconciliation engine.
///
/// Replays a snapshot onto a live document that was rebuilt from exchange
/// files: materializes the recorded properties, correlates geometries,
/// re-locates every assignment by coordinates and rebuilds interactions.
pub struct Reconciler {
    pub config: ReconcileConfig,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileConfig::default())
    }
}

impl Reconciler {
    pub fn new(config: ReconcileConfig) -> Self {
        Self { config }
    }

    /// Run every phase against `doc`. Never aborts: every problem ends up
    /// as a counter and a diagnostic in the returned summary.
    #[instrument(skip_all, fields(geometries = snapshot.geometries.len()))]
    pub fn run(&self, doc: &mut dyn HostDocument, snapshot: &SnapshotDocument) -> RunSummary {
        let mut summary = RunSummary::new();
        let mut materializer = Materializer::new();

        materializer.materialize_all(doc, snapshot);

        let assigned = reassign(doc, snapshot, &mut materializer, &self.config);
        summary.correlation = assigned.correlation;
        summary.disambiguation = assigned.disambiguation;
        summary.assignments = assigned.assignments;

        let mut interaction_diagnostics = Diagnostics::default();
        if self.config.replay_interactions {
            let rebuilt = reconstruct_interactions(doc, snapshot, &materializer, &self.config);
            summary.couplings = rebuilt.tally;
            interaction_diagnostics = rebuilt.diagnostics;
        }

        summary.properties = materializer.tally;
        summary.diagnostics.extend(materializer.diagnostics);
        summary.diagnostics.extend(assigned.diagnostics);
        summary.diagnostics.extend(interaction_diagnostics);

        info!(
            run_id = %summary.run_id,
            assigned = summary.assigned(),
            failed = summary.failed(),
            diagnostics = summary.diagnostics.len(),
            "reconciliation complete"
        );
        summary
    }
}

/// Reconcile `snapshot` onto `doc` with the given configuration.
pub fn reconcile(
    doc: &mut dyn HostDocument,
    snapshot: &SnapshotDocument,
    config: &ReconcileConfig,
) -> RunSummary {
    Reconciler::new(config.clone()).run(doc, snapshot)
}
