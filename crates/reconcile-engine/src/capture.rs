//! Capture pass: record the live document as a snapshot before export.

use host_model::{CouplingSide, GeometryId, HostDocument, Interaction, ShapeIntrospect};
use matching::{duplicate_names, name_conflicts};
use propsync_types::{
    AssignmentRecord, Attachment, Coordinates, GeometryRecord, InteractionRecord, PropertyKind,
    PropertyRef, ShapeType, SnapshotDocument, SubshapeKind, TopologyCounts, VertexRecord,
};
use tracing::{info, instrument, warn};

/// Conditions that stop a capture before anything is recorded.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CaptureError {
    #[error("duplicate geometry names: {}", names.join(", "))]
    DuplicateNames { names: Vec<String> },
}

/// A captured snapshot plus the name pairs that may confuse correlation.
#[derive(Debug, Clone)]
pub struct CaptureReport {
    pub snapshot: SnapshotDocument,
    /// Distinct names where one contains the other, shorter first.
    pub conflicts: Vec<(String, String)>,
}

/// Record every geometry and interaction of the document.
///
/// Fails when two geometries share a name, since the names are the only key
/// available after re-import. Per-geometry extraction problems are stored in
/// the record's `errors` list.
#[instrument(skip_all)]
pub fn capture_snapshot(
    doc: &dyn HostDocument,
    timestamp: &str,
) -> Result<CaptureReport, CaptureError> {
    let ids = doc.geometry_ids();
    let names: Vec<&str> = ids
        .iter()
        .map(|&id| doc.geometry_name(id).unwrap_or_default())
        .collect();

    let duplicates = duplicate_names(&names);
    if !duplicates.is_empty() {
        return Err(CaptureError::DuplicateNames { names: duplicates });
    }
    let conflicts = name_conflicts(&names);
    for (short, long) in &conflicts {
        warn!(%short, %long, "geometry name contained in another name");
    }

    let mut snapshot = SnapshotDocument::new(timestamp);
    for (&id, name) in ids.iter().zip(&names) {
        snapshot.push_geometry(capture_geometry(doc, id, name));
    }
    for id in doc.interaction_ids() {
        if let Some(interaction) = doc.interaction(id) {
            snapshot.push_interaction(capture_interaction(doc, interaction));
        }
    }

    info!(
        geometries = snapshot.total_geometries,
        assignments = snapshot.assignment_count(),
        interactions = snapshot.interactions.len(),
        "capture complete"
    );
    Ok(CaptureReport { snapshot, conflicts })
}

fn capture_geometry(doc: &dyn HostDocument, id: GeometryId, name: &str) -> GeometryRecord {
    let Some(shape) = doc.shape(id) else {
        let mut record = GeometryRecord::new(id.0, name, ShapeType::Unknown);
        record.errors.push("shape unavailable".to_string());
        return record;
    };

    let mut record = GeometryRecord::new(id.0, name, shape.shape_type());
    let mut topology = TopologyCounts::default();
    for kind in SubshapeKind::ALL {
        topology.set(kind, shape.subshape_count(kind));
    }
    record.topology = topology;

    record.vertices = (0..topology.num_vertices)
        .map(|v| VertexRecord {
            id: v,
            coordinates: Coordinates::from(shape.vertex_position(v)),
        })
        .collect();

    for property_kind in PropertyKind::ALL {
        for subshape_kind in SubshapeKind::ALL {
            for index in 0..topology.count(subshape_kind) {
                let Some(pid) = doc.assigned_property(id, property_kind, subshape_kind, index)
                else {
                    continue;
                };
                let Some(property) = doc.property(property_kind, pid) else {
                    record
                        .errors
                        .push(format!(
                            "{property_kind} property {pid} on {subshape_kind} {index} not found"
                        ));
                    continue;
                };

                let mut assignment =
                    AssignmentRecord::new(property.name.clone(), subshape_kind, index);
                assignment.property_id = Some(pid.0);
                assignment.property_type = property.type_name().map(str::to_string);
                if let Some(object) = &property.object {
                    assignment.parameters = object.parameters();
                }
                match corners(shape, subshape_kind, index) {
                    Ok(points) if subshape_kind == SubshapeKind::Vertex => {
                        assignment.coordinates = points.first().copied();
                    }
                    Ok(points) => assignment.vertex_coordinates = points,
                    Err(e) => record.errors.push(e),
                }
                record.push_assignment(property_kind, subshape_kind, assignment);
            }
        }
    }
    record
}

fn capture_interaction(doc: &dyn HostDocument, interaction: &Interaction) -> InteractionRecord {
    let mut record = InteractionRecord::new(interaction.id.0, interaction.name.clone());
    record.interaction_type = Some(interaction.interaction_type.name().to_string());

    for kind in PropertyKind::ALL {
        let reference = interaction
            .property(kind)
            .and_then(|pid| doc.property(kind, pid))
            .map(|p| PropertyRef {
                property_id: p.id.0,
                property_name: p.name.clone(),
            });
        match kind {
            PropertyKind::Physical => record.physical_property = reference,
            PropertyKind::Element => record.element_property = reference,
        }
    }

    for side in [CouplingSide::Master, CouplingSide::Slave] {
        for item in interaction.items(side) {
            let geometry_name = doc.geometry_name(item.geometry).unwrap_or_default();
            let mut attachment = Attachment::new(geometry_name, item.kind, &[]);
            attachment.geometry_id = Some(item.geometry.0);
            attachment.subshape_id = Some(item.subshape);
            match doc.shape(item.geometry) {
                Some(shape) => match corners(shape, item.kind, item.subshape) {
                    Ok(points) => attachment.vertex_coordinates = points,
                    Err(e) => record.errors.push(e),
                },
                None => record
                    .errors
                    .push(format!("geometry {} of {side:?} not found", item.geometry)),
            }
            match side {
                CouplingSide::Master => record.masters.push(attachment),
                CouplingSide::Slave => record.slaves.push(attachment),
            }
        }
    }
    record
}

fn corners(
    shape: &dyn ShapeIntrospect,
    kind: SubshapeKind,
    index: usize,
) -> Result<Vec<Coordinates>, String> {
    shape
        .subshape_points(kind, index)
        .map(|points| points.into_iter().map(Coordinates::from).collect())
        .map_err(|e| e.to_string())
}
