use host_model::{
    CouplingSide, HostDocument, Interaction, InteractionId, InteractionItem, InteractionType,
};
use matching::{locate_subshape, Tolerance};
use propsync_types::{Attachment, InteractionRecord, PropertyKind, SnapshotDocument};
use tracing::{debug, info, instrument, warn};

use crate::materialize::Materializer;
use crate::summary::CouplingTally;
use crate::types::{Diagnostics, Phase, ReconcileConfig, ReconcileIssue};

/// State after rebuilding the recorded interactions.
#[derive(Debug, Default)]
pub struct InteractionState {
    pub tally: CouplingTally,
    pub diagnostics: Diagnostics,
}

/// Find or create every recorded interaction and re-attach its masters and
/// slaves by geometry name and corner coordinates. Property references are
/// only set on interactions created by this run.
///
/// An attachment may land on any live geometry whose name equals or contains
/// the recorded name, so couplings survive bodies split on import.
#[instrument(skip_all, fields(interactions = snapshot.interactions.len()))]
pub fn reconstruct_interactions(
    doc: &mut dyn HostDocument,
    snapshot: &SnapshotDocument,
    materializer: &Materializer,
    config: &ReconcileConfig,
) -> InteractionState {
    let mut state = InteractionState::default();
    let tol = config.tolerance();

    for record in &snapshot.interactions {
        let Some((id, created)) = find_or_create(doc, record, config, &mut state) else {
            let attachments = record.masters.len() + record.slaves.len();
            state.tally.failed += attachments;
            continue;
        };

        // An existing interaction keeps its property references.
        if created {
            bind_properties(doc, id, record, materializer, &mut state.diagnostics);
        }

        for side in [CouplingSide::Master, CouplingSide::Slave] {
            for attachment in record.attachments(side) {
                let Some(item) = resolve_attachment(doc, attachment, &tol) else {
                    warn!(
                        interaction = %record.name,
                        geometry = %attachment.geometry_name,
                        "attachment not located"
                    );
                    state.tally.failed += 1;
                    state.diagnostics.push(
                        Phase::Interactions,
                        ReconcileIssue::UnresolvedAttachment {
                            geometry: attachment.geometry_name.clone(),
                            subshape: attachment.subshape_type.clone(),
                        },
                    );
                    continue;
                };
                if let Some(interaction) = doc.interaction_mut(id) {
                    if !interaction.attach(side, item) {
                        debug!(interaction = %record.name, ?item, "already attached");
                    }
                    state.tally.attached += 1;
                }
            }
        }

        doc.commit_changes();
    }

    info!(
        created = state.tally.created,
        reused = state.tally.reused,
        attached = state.tally.attached,
        failed = state.tally.failed,
        "interaction replay complete"
    );
    state
}

/// Resolve a recorded type string (`Kind` or `Enum.Kind`) against the host.
pub fn resolve_interaction_type(
    doc: &dyn HostDocument,
    raw: Option<&str>,
) -> Option<InteractionType> {
    let short = raw?.rsplit('.').next()?;
    doc.interaction_type(short)
}

fn find_or_create(
    doc: &mut dyn HostDocument,
    record: &InteractionRecord,
    config: &ReconcileConfig,
    state: &mut InteractionState,
) -> Option<(InteractionId, bool)> {
    if let Some(id) = doc.find_interaction_by_name(&record.name) {
        state.tally.reused += 1;
        return Some((id, false));
    }

    let interaction_type = match resolve_interaction_type(doc, record.interaction_type.as_deref()) {
        Some(t) => t,
        None => {
            let fallback = config.default_interaction_type;
            warn!(
                interaction = %record.name,
                raw = ?record.interaction_type,
                %fallback,
                "unknown interaction type"
            );
            state.diagnostics.push(
                Phase::Interactions,
                ReconcileIssue::UnknownInteractionType {
                    raw: record.interaction_type.clone(),
                    fallback,
                },
            );
            fallback
        }
    };

    let id = InteractionId(doc.last_interaction_id().map_or(1, |last| last.0 + 1));
    match doc.add_interaction(Interaction::new(id, record.name.clone(), interaction_type)) {
        Ok(()) => {
            info!(interaction = %record.name, id = id.0, %interaction_type, "interaction created");
            state.tally.created += 1;
            Some((id, true))
        }
        Err(e) => {
            warn!(interaction = %record.name, error = %e, "interaction creation failed");
            state.diagnostics.push(Phase::Interactions, e);
            None
        }
    }
}

/// Point the interaction at the materialized properties it referenced.
fn bind_properties(
    doc: &mut dyn HostDocument,
    id: InteractionId,
    record: &InteractionRecord,
    materializer: &Materializer,
    diagnostics: &mut Diagnostics,
) {
    for kind in PropertyKind::ALL {
        let Some(reference) = record.property_ref(kind) else {
            continue;
        };
        let resolved = materializer
            .lookup(kind, &reference.property_name)
            .or_else(|| doc.find_property_by_name(kind, &reference.property_name));
        match resolved {
            Some(property) => {
                if let Some(interaction) = doc.interaction_mut(id) {
                    interaction.set_property(kind, Some(property));
                }
            }
            None => diagnostics.push(
                Phase::Interactions,
                ReconcileIssue::MissingReference {
                    interaction: record.name.clone(),
                    kind,
                    name: reference.property_name.clone(),
                },
            ),
        }
    }
}

/// First live geometry, in id order, whose name equals or contains the
/// recorded name and holds a subshape with the recorded corners.
fn resolve_attachment(
    doc: &dyn HostDocument,
    attachment: &Attachment,
    tol: &Tolerance,
) -> Option<InteractionItem> {
    let kind = attachment.kind()?;
    let target = attachment.target_points();
    doc.geometry_ids()
        .into_iter()
        .filter(|&id| {
            doc.geometry_name(id)
                .is_some_and(|name| name.contains(attachment.geometry_name.as_str()))
        })
        .find_map(|id| {
            let shape = doc.shape(id)?;
            let subshape = locate_subshape(shape, kind, &target, tol)?;
            Some(InteractionItem {
                geometry: id,
                kind,
                subshape,
            })
        })
}
