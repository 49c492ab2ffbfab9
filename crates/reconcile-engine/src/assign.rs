use host_model::{GeometryId, HostDocument, HostError};
use matching::{best_snapshot_for_live, disambiguate, locate_subshape, Disambiguation};
use propsync_types::{
    AssignmentRecord, GeometryRecord, PropertyKind, SnapshotDocument, SubshapeKind,
};
use tracing::{debug, error, info, instrument, warn};

use crate::materialize::Materializer;
use crate::summary::{AssignmentTally, CorrelationTally, DisambiguationTally};
use crate::types::{Diagnostics, MissSide, Phase, ReconcileConfig, ReconcileIssue};

/// Progress of one live geometry through the replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryState {
    Unmatched,
    Correlated,
    Disambiguated,
    Replaying,
    Done,
}

/// State after replaying the assignments of a snapshot.
#[derive(Debug, Default)]
pub struct AssignState {
    pub correlation: CorrelationTally,
    pub disambiguation: DisambiguationTally,
    pub assignments: AssignmentTally,
    /// Final state and correlated snapshot geometry of every live geometry.
    pub geometries: Vec<(GeometryId, GeometryState, Option<usize>)>,
    pub diagnostics: Diagnostics,
}

/// One record planned for replay, with the live subshape it was located on.
struct PlannedWrite<'a> {
    property_kind: PropertyKind,
    subshape_kind: SubshapeKind,
    record: &'a AssignmentRecord,
    located: Result<usize, ReconcileIssue>,
}

/// Replay every recorded assignment onto the live document.
///
/// Each live geometry is correlated to its best-scoring snapshot geometry by
/// name, so several split bodies can draw from one snapshot record. Records
/// that cannot be located are counted as failed and the run continues.
#[instrument(skip_all, fields(geometries = snapshot.geometries.len()))]
pub fn reassign(
    doc: &mut dyn HostDocument,
    snapshot: &SnapshotDocument,
    materializer: &mut Materializer,
    config: &ReconcileConfig,
) -> AssignState {
    let mut state = AssignState::default();
    let snapshot_names: Vec<&str> = snapshot.geometries.iter().map(|g| g.name.as_str()).collect();
    let mut claimed = vec![false; snapshot.geometries.len()];

    for id in doc.geometry_ids() {
        let name = doc.geometry_name(id).unwrap_or_default().to_string();
        let mut geometry_state = GeometryState::Unmatched;

        let Some(correlation) = best_snapshot_for_live(&name, &snapshot_names) else {
            warn!(geometry = %name, "no snapshot geometry correlates");
            state.correlation.skipped += 1;
            state.diagnostics.push(
                Phase::Correlate,
                ReconcileIssue::CorrelationMiss {
                    side: MissSide::Live,
                    name,
                },
            );
            state.geometries.push((id, GeometryState::Done, None));
            continue;
        };
        let record = &snapshot.geometries[correlation.index];
        claimed[correlation.index] = true;
        state.correlation.correlated += 1;
        geometry_state = advance(geometry_state, GeometryState::Correlated);
        info!(
            live = %name,
            snapshot = %record.name,
            score = correlation.score,
            "geometry correlated"
        );

        let plan = plan_geometry(doc, id, &name, record, config, &mut state);
        geometry_state = advance(geometry_state, GeometryState::Disambiguated);

        geometry_state = advance(geometry_state, GeometryState::Replaying);
        for write in plan {
            let (property_kind, subshape_kind) = (write.property_kind, write.subshape_kind);
            let ok = replay(doc, id, &name, write, materializer, &mut state.diagnostics);
            state.assignments.record(property_kind, subshape_kind, ok);
        }

        if config.commit_per_geometry {
            doc.commit_changes();
        }
        geometry_state = advance(geometry_state, GeometryState::Done);
        state.geometries.push((id, geometry_state, Some(correlation.index)));
    }

    if !config.commit_per_geometry {
        doc.commit_changes();
    }

    for (record, _) in snapshot
        .geometries
        .iter()
        .zip(&claimed)
        .filter(|(_, claimed)| !**claimed)
    {
        warn!(snapshot = %record.name, "snapshot geometry matched no live geometry");
        state.correlation.unclaimed += 1;
        state.diagnostics.push(
            Phase::Correlate,
            ReconcileIssue::CorrelationMiss {
                side: MissSide::Snapshot,
                name: record.name.clone(),
            },
        );
    }

    info!(
        assigned = state.assignments.assigned(),
        failed = state.assignments.failed(),
        "assignment replay complete"
    );
    state
}

fn advance(from: GeometryState, to: GeometryState) -> GeometryState {
    debug!(?from, ?to, "geometry state");
    to
}

/// Disambiguate the live shape and locate every admitted record on it.
fn plan_geometry<'a>(
    doc: &dyn HostDocument,
    id: GeometryId,
    name: &str,
    record: &'a GeometryRecord,
    config: &ReconcileConfig,
    state: &mut AssignState,
) -> Vec<PlannedWrite<'a>> {
    let tol = config.tolerance();
    let Some(shape) = doc.shape(id) else {
        error!(geometry = name, "live geometry has no shape");
        return record
            .assignments()
            .map(|(property_kind, subshape_kind, assignment)| PlannedWrite {
                property_kind,
                subshape_kind,
                record: assignment,
                located: Err(HostError::GeometryNotFound { id }.into()),
            })
            .collect();
    };

    let disambiguation = disambiguate(record, shape, &tol);
    // Set when an unresolved split body must not be broadcast.
    let mut withheld = None;
    match &disambiguation {
        Disambiguation::NotApplicable => state.disambiguation.not_applicable += 1,
        Disambiguation::Resolved { kind, index, .. } => {
            info!(geometry = name, %kind, index, "split body resolved");
            state.disambiguation.resolved += 1;
        }
        Disambiguation::Unresolved { kind, groups } => {
            warn!(
                geometry = name,
                %kind,
                groups,
                broadcast = config.broadcast_on_unresolved,
                "split body unresolved"
            );
            state.disambiguation.unresolved += 1;
            state.diagnostics.push(
                Phase::Disambiguate,
                ReconcileIssue::Ambiguous {
                    geometry: name.to_string(),
                    kind: *kind,
                    groups: *groups,
                },
            );
            if !config.broadcast_on_unresolved {
                withheld = Some((*kind, *groups));
            }
        }
    }

    let mut plan = Vec::new();
    for (property_kind, subshape_kind, assignment) in record.assignments() {
        let target = assignment.target_points(subshape_kind);
        if !disambiguation.admits(
            subshape_kind,
            assignment.subshape_index(subshape_kind),
            &target,
            &tol,
        ) {
            state.disambiguation.filtered += 1;
            continue;
        }

        let located = match withheld {
            Some((kind, groups)) if subshape_kind != SubshapeKind::Vertex => {
                Err(ReconcileIssue::Ambiguous {
                    geometry: name.to_string(),
                    kind,
                    groups,
                })
            }
            _ => locate_subshape(shape, subshape_kind, &target, &tol).ok_or_else(|| {
                ReconcileIssue::NotFound {
                    geometry: name.to_string(),
                    property: assignment.property_name.clone(),
                    kind: subshape_kind,
                }
            }),
        };

        plan.push(PlannedWrite {
            property_kind,
            subshape_kind,
            record: assignment,
            located,
        });
    }
    plan
}

fn replay(
    doc: &mut dyn HostDocument,
    id: GeometryId,
    name: &str,
    write: PlannedWrite<'_>,
    materializer: &mut Materializer,
    diagnostics: &mut Diagnostics,
) -> bool {
    let property_name = write.record.property_name.as_str();

    let index = match write.located {
        Ok(index) => index,
        Err(issue) => {
            warn!(
                geometry = name,
                property = property_name,
                kind = %write.subshape_kind,
                "subshape not found"
            );
            diagnostics.push(Phase::Assign, issue);
            return false;
        }
    };

    let Some(property) =
        materializer.get_or_create(doc, write.property_kind, write.record.property())
    else {
        // Creation failure is already reported by the materializer.
        return false;
    };

    match doc.assign_property(id, write.property_kind, write.subshape_kind, index, property) {
        Ok(()) => {
            debug!(
                geometry = name,
                property = property_name,
                kind = %write.subshape_kind,
                index,
                "assigned"
            );
            true
        }
        Err(e) => {
            error!(geometry = name, property = property_name, error = %e, "assignment failed");
            diagnostics.push(Phase::Assign, e);
            false
        }
    }
}
