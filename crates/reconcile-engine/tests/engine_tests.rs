use std::collections::HashMap;
use std::path::Path;

use approx::assert_relative_eq;
use host_model::{
    AttributeValue, GeometryId, GeometryImporter, HostDocument, HostError, Interaction,
    InteractionId, InteractionType, MemoryDocument, MemoryShape, Property, PropertyId,
};
use propsync_types::{
    AssignmentRecord, Attachment, Coordinates, GeometryRecord, InteractionRecord, ParamValue,
    Point3, PropertyKind, PropertyRef, ShapeType, SnapshotDocument, SubshapeKind,
};
use reconcile_engine::{
    capture_snapshot, import_all, reconcile, CaptureError, Materializer, MissSide, Phase,
    ReconcileConfig, ReconcileIssue, Reconciler,
};

fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

fn corners_of(points: &[Point3]) -> Vec<Coordinates> {
    points.iter().copied().map(Coordinates::from).collect()
}

fn square() -> [Point3; 4] {
    [p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]
}

fn box_corners(origin: Point3) -> Vec<Point3> {
    [
        (0.0, 0.0, 0.0),
        (1.0, 0.0, 0.0),
        (1.0, 1.0, 0.0),
        (0.0, 1.0, 0.0),
        (0.0, 0.0, 1.0),
        (1.0, 0.0, 1.0),
        (1.0, 1.0, 1.0),
        (0.0, 1.0, 1.0),
    ]
    .iter()
    .map(|&(dx, dy, dz)| origin.offset(dx, dy, dz))
    .collect()
}

fn steel_on(kind: SubshapeKind, index: usize, corners: &[Point3]) -> AssignmentRecord {
    let mut record = AssignmentRecord::new("Steel-S1", kind, index);
    record.property_type = Some("ElasticIsotropic".to_string());
    record.parameters.insert("E".to_string(), ParamValue::Integer(210000));
    record.parameters.insert("nu".to_string(), ParamValue::Real(0.3));
    record.vertex_coordinates = corners_of(corners);
    record
}

fn named(
    name: &str,
    type_name: &str,
    kind: SubshapeKind,
    index: usize,
    corners: &[Point3],
) -> AssignmentRecord {
    let mut record = AssignmentRecord::new(name, kind, index);
    record.property_type = Some(type_name.to_string());
    if kind == SubshapeKind::Vertex {
        record.coordinates = corners.first().copied().map(Coordinates::from);
    } else {
        record.vertex_coordinates = corners_of(corners);
    }
    record
}

fn slab_snapshot() -> SnapshotDocument {
    let mut geometry = GeometryRecord::new(1, "Slab", ShapeType::Face);
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Face,
        steel_on(SubshapeKind::Face, 0, &square()),
    );
    let mut snapshot = SnapshotDocument::new("2026-01-01 00:00:00");
    snapshot.push_geometry(geometry);
    snapshot
}

/// Compound `Block` with two unit boxes, each with its own solid property
/// and a painted bottom face.
fn block_snapshot() -> SnapshotDocument {
    let near = box_corners(p(0.0, 0.0, 0.0));
    let far = box_corners(p(3.0, 0.0, 0.0));
    let mut geometry = GeometryRecord::new(1, "Block", ShapeType::Compound);
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Solid,
        named("Concrete", "ElasticIsotropic", SubshapeKind::Solid, 0, &near),
    );
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Solid,
        named("Steel", "Steel01", SubshapeKind::Solid, 1, &far),
    );
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Face,
        named("Paint", "ElasticIsotropic", SubshapeKind::Face, 0, &near[..4]),
    );
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Face,
        named("Paint", "ElasticIsotropic", SubshapeKind::Face, 6, &far[..4]),
    );
    let mut snapshot = SnapshotDocument::new("2026-01-01 00:00:00");
    snapshot.push_geometry(geometry);
    snapshot
}

fn property_name(
    doc: &MemoryDocument,
    kind: PropertyKind,
    id: Option<PropertyId>,
) -> Option<String> {
    id.and_then(|id| doc.property(kind, id)).map(|p| p.name.clone())
}

fn scalar(value: Option<&AttributeValue>) -> f64 {
    match value {
        Some(AttributeValue::QuantityScalar(v)) | Some(AttributeValue::Real(v)) => *v,
        other => panic!("expected a scalar attribute, got {other:?}"),
    }
}

// ── Property Materializer ──────────────────────────────────────────────────

#[test]
fn materializer_creates_once_per_name() {
    let mut doc = MemoryDocument::new();
    let snapshot = slab_snapshot();
    let record = &snapshot.geometries[0].properties.physical.faces[0];
    let mut materializer = Materializer::new();

    let first = materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property());
    let second = materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property());

    assert_eq!(first, Some(PropertyId(1)));
    assert_eq!(first, second);
    assert_eq!(doc.properties(PropertyKind::Physical).len(), 1);
    assert_eq!(materializer.tally.created, 1);

    let object = doc.properties(PropertyKind::Physical)[0].object.as_ref().unwrap();
    assert_relative_eq!(scalar(object.attribute("E")), 210000.0);
    assert_relative_eq!(scalar(object.attribute("nu")), 0.3);
}

#[test]
fn materializer_reuses_live_property_by_name() {
    let mut doc = MemoryDocument::new();
    doc.add_property(
        PropertyKind::Physical,
        Property {
            id: PropertyId(4),
            name: "Steel-S1".to_string(),
            object: None,
        },
    )
    .unwrap();
    let snapshot = slab_snapshot();
    let record = &snapshot.geometries[0].properties.physical.faces[0];
    let mut materializer = Materializer::new();

    let id = materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property());
    assert_eq!(id, Some(PropertyId(4)));
    assert_eq!(materializer.tally.reused, 1);
    assert_eq!(materializer.tally.created, 0);
    // Same name in the other family is a different property.
    let element = materializer.get_or_create(&mut doc, PropertyKind::Element, record.property());
    assert_eq!(element, None);
}

#[test]
fn new_property_id_follows_max() {
    let mut doc = MemoryDocument::new();
    doc.add_property(
        PropertyKind::Physical,
        Property {
            id: PropertyId(5),
            name: "Existing".to_string(),
            object: None,
        },
    )
    .unwrap();
    let snapshot = slab_snapshot();
    let record = &snapshot.geometries[0].properties.physical.faces[0];
    let id = Materializer::new().get_or_create(&mut doc, PropertyKind::Physical, record.property());
    assert_eq!(id, Some(PropertyId(6)));
}

#[test]
fn unknown_type_fails_once() {
    let mut doc = MemoryDocument::new();
    let mut record = steel_on(SubshapeKind::Face, 0, &square());
    record.property_type = Some("NoSuchMaterial".to_string());
    let mut materializer = Materializer::new();

    assert_eq!(
        materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property()),
        None
    );
    assert_eq!(
        materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property()),
        None
    );
    assert_eq!(materializer.tally.failed, 1);
    assert_eq!(materializer.diagnostics.len(), 1);
    assert!(matches!(
        materializer.diagnostics.iter().next().map(|d| &d.issue),
        Some(ReconcileIssue::CreationFailed { .. })
    ));
}

#[test]
fn missing_type_fails() {
    let mut doc = MemoryDocument::new();
    let mut record = steel_on(SubshapeKind::Face, 0, &square());
    record.property_type = None;
    let mut materializer = Materializer::new();
    assert_eq!(
        materializer.get_or_create(&mut doc, PropertyKind::Physical, record.property()),
        None
    );
}

#[test]
fn bad_parameter_is_skipped_not_fatal() {
    let mut doc = MemoryDocument::new();
    let mut record = steel_on(SubshapeKind::Face, 0, &square());
    record.parameters.insert("density".to_string(), ParamValue::Real(7850.0));
    record.parameters.insert("rho".to_string(), ParamValue::Text("heavy".to_string()));
    let mut materializer = Materializer::new();

    let id = materializer
        .get_or_create(&mut doc, PropertyKind::Physical, record.property())
        .unwrap();
    let skipped = materializer
        .diagnostics
        .iter()
        .filter(|d| matches!(d.issue, ReconcileIssue::ParameterSkipped { .. }))
        .count();
    assert_eq!(skipped, 2);
    let object = doc.property(PropertyKind::Physical, id).unwrap().object.as_ref().unwrap();
    assert_relative_eq!(scalar(object.attribute("E")), 210000.0);
}

// ── Reassignment Orchestrator ──────────────────────────────────────────────

#[test]
fn face_assignment_survives_renumbering() {
    let mut doc = MemoryDocument::new();
    let slab = doc.add_geometry("Slab", MemoryShape::unit_square().renumbered());
    let summary = reconcile(&mut doc, &slab_snapshot(), &ReconcileConfig::default());

    assert_eq!(summary.assigned(), 1);
    assert_eq!(summary.failed(), 0);
    assert_eq!(summary.assignments.physical.faces.assigned, 1);
    assert_eq!(
        property_name(
            &doc,
            PropertyKind::Physical,
            doc.assigned_property(slab, PropertyKind::Physical, SubshapeKind::Face, 0)
        ),
        Some("Steel-S1".to_string())
    );
}

#[test]
fn uncorrelated_geometries_are_reported() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Column", MemoryShape::unit_square());
    let summary = reconcile(&mut doc, &slab_snapshot(), &ReconcileConfig::default());

    assert_eq!(summary.correlation.skipped, 1);
    assert_eq!(summary.correlation.unclaimed, 1);
    let misses: Vec<_> = summary
        .diagnostics
        .in_phase(Phase::Correlate)
        .map(|d| d.issue.clone())
        .collect();
    assert_eq!(
        misses,
        vec![
            ReconcileIssue::CorrelationMiss {
                side: MissSide::Live,
                name: "Column".to_string()
            },
            ReconcileIssue::CorrelationMiss {
                side: MissSide::Snapshot,
                name: "Slab".to_string()
            },
        ]
    );
    // The property is still materialized.
    assert_eq!(doc.properties(PropertyKind::Physical).len(), 1);
    assert_eq!(summary.assigned() + summary.failed(), 0);
}

#[test]
fn split_bodies_take_their_own_group() {
    let mut doc = MemoryDocument::new();
    let near = doc.add_geometry(
        "Block_1",
        MemoryShape::box_solid(p(0.0, 0.0, 0.0), 1.0, 1.0, 1.0).renumbered(),
    );
    let far = doc.add_geometry("Block_2", MemoryShape::box_solid(p(3.0, 0.0, 0.0), 1.0, 1.0, 1.0));
    let summary = reconcile(&mut doc, &block_snapshot(), &ReconcileConfig::default());

    assert_eq!(summary.correlation.correlated, 2);
    assert_eq!(summary.disambiguation.resolved, 2);
    assert_eq!(summary.disambiguation.filtered, 4);
    assert_eq!(summary.assigned(), 4);
    assert_eq!(summary.failed(), 0);

    let solid_of = |id: GeometryId| {
        property_name(
            &doc,
            PropertyKind::Physical,
            doc.assigned_property(id, PropertyKind::Physical, SubshapeKind::Solid, 0),
        )
    };
    assert_eq!(solid_of(near), Some("Concrete".to_string()));
    assert_eq!(solid_of(far), Some("Steel".to_string()));

    // Bottom face of the renumbered box is its last face.
    assert_eq!(
        property_name(
            &doc,
            PropertyKind::Physical,
            doc.assigned_property(near, PropertyKind::Physical, SubshapeKind::Face, 5)
        ),
        Some("Paint".to_string())
    );
    assert_eq!(summary.properties.created, 3);
}

#[test]
fn unresolved_compound_broadcasts_every_group() {
    let mut doc = MemoryDocument::new();
    let block = doc.add_geometry(
        "Block",
        MemoryShape::compound(&[
            MemoryShape::box_solid(p(0.0, 0.0, 0.0), 1.0, 1.0, 1.0),
            MemoryShape::box_solid(p(3.0, 0.0, 0.0), 1.0, 1.0, 1.0),
        ]),
    );
    let summary = reconcile(&mut doc, &block_snapshot(), &ReconcileConfig::default());

    assert_eq!(summary.disambiguation.unresolved, 1);
    assert_eq!(summary.assigned(), 4);
    assert!(doc
        .assigned_property(block, PropertyKind::Physical, SubshapeKind::Solid, 1)
        .is_some());
    assert_eq!(summary.diagnostics.in_phase(Phase::Disambiguate).count(), 1);
}

#[test]
fn strict_mode_counts_unresolved_groups_as_failed() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry(
        "Block",
        MemoryShape::compound(&[
            MemoryShape::box_solid(p(0.0, 0.0, 0.0), 1.0, 1.0, 1.0),
            MemoryShape::box_solid(p(3.0, 0.0, 0.0), 1.0, 1.0, 1.0),
        ]),
    );
    let summary = reconcile(&mut doc, &block_snapshot(), &ReconcileConfig::strict());

    assert_eq!(summary.assigned(), 0);
    assert_eq!(summary.failed(), 4);
    assert!(summary
        .diagnostics
        .in_phase(Phase::Assign)
        .all(|d| matches!(d.issue, ReconcileIssue::Ambiguous { .. })));
    assert_eq!(doc.assignment_count(), 0);
}

#[test]
fn vertex_records_use_single_point() {
    let mut geometry = GeometryRecord::new(1, "Slab", ShapeType::Face);
    geometry.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Vertex,
        named("Mass", "Steel01", SubshapeKind::Vertex, 2, &[p(1.0, 1.0, 0.0)]),
    );
    let mut unreadable = named("Mass", "Steel01", SubshapeKind::Vertex, 3, &[]);
    unreadable.coordinates = Some(Coordinates::missing());
    geometry.push_assignment(PropertyKind::Physical, SubshapeKind::Vertex, unreadable);
    let mut snapshot = SnapshotDocument::new("2026-01-01 00:00:00");
    snapshot.push_geometry(geometry);

    let mut doc = MemoryDocument::new();
    let slab = doc.add_geometry("Slab", MemoryShape::unit_square().renumbered());
    let summary = reconcile(&mut doc, &snapshot, &ReconcileConfig::default());

    assert_eq!(summary.assignments.physical.vertices.assigned, 1);
    assert_eq!(summary.assignments.physical.vertices.failed, 1);
    assert!(doc
        .assigned_property(slab, PropertyKind::Physical, SubshapeKind::Vertex, 1)
        .is_some());
}

#[test]
fn commits_once_per_geometry() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Slab", MemoryShape::unit_square());
    doc.add_geometry("Slab_2", MemoryShape::unit_square().translated(5.0, 0.0, 0.0));
    reconcile(&mut doc, &slab_snapshot(), &ReconcileConfig::default());
    assert_eq!(doc.commit_count(), 2);

    let mut batched = MemoryDocument::new();
    batched.add_geometry("Slab", MemoryShape::unit_square());
    batched.add_geometry("Slab_2", MemoryShape::unit_square());
    let config = ReconcileConfig {
        commit_per_geometry: false,
        ..ReconcileConfig::default()
    };
    reconcile(&mut batched, &slab_snapshot(), &config);
    assert_eq!(batched.commit_count(), 1);
}

#[test]
fn tolerance_is_configurable() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Slab", MemoryShape::unit_square().translated(0.0, 0.0, 0.001));
    let default = reconcile(&mut doc.clone(), &slab_snapshot(), &ReconcileConfig::default());
    assert_eq!(default.failed(), 1);
    let loose = reconcile(
        &mut doc,
        &slab_snapshot(),
        &ReconcileConfig::default().with_tolerance(0.01),
    );
    assert_eq!(loose.assigned(), 1);
}

// ── Interaction Reconstructor ──────────────────────────────────────────────

fn coupling_snapshot(interaction_type: Option<&str>) -> SnapshotDocument {
    let mut beam = GeometryRecord::new(1, "Beam", ShapeType::Edge);
    beam.push_assignment(
        PropertyKind::Physical,
        SubshapeKind::Edge,
        named("Spring", "Steel01", SubshapeKind::Edge, 0, &[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]),
    );
    let column = GeometryRecord::new(2, "Column", ShapeType::Edge);

    let mut link = InteractionRecord::new(1, "Link");
    link.interaction_type = interaction_type.map(str::to_string);
    link.physical_property = Some(PropertyRef {
        property_id: 9,
        property_name: "Spring".to_string(),
    });
    link.masters
        .push(Attachment::new("Beam", SubshapeKind::Vertex, &[p(1.0, 0.0, 0.0)]));
    link.slaves
        .push(Attachment::new("Column", SubshapeKind::Vertex, &[p(1.0, 0.0, 0.0)]));

    let mut snapshot = SnapshotDocument::new("2026-01-01 00:00:00");
    snapshot.push_geometry(beam);
    snapshot.push_geometry(column);
    snapshot.push_interaction(link);
    snapshot
}

fn coupling_doc() -> (MemoryDocument, GeometryId, GeometryId) {
    let mut doc = MemoryDocument::new();
    let beam = doc.add_geometry("Beam_1", MemoryShape::line(p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)));
    let column = doc.add_geometry("Column", MemoryShape::line(p(1.0, 0.0, 0.0), p(1.0, 0.0, 1.0)));
    (doc, beam, column)
}

#[test]
fn interaction_rebuilt_on_split_names() {
    let (mut doc, beam, column) = coupling_doc();
    let summary = reconcile(
        &mut doc,
        &coupling_snapshot(Some("MpcInteractionType.NodeToElement")),
        &ReconcileConfig::default(),
    );

    assert_eq!(summary.couplings.created, 1);
    assert_eq!(summary.couplings.attached, 2);
    assert_eq!(summary.couplings.failed, 0);

    let link = &doc.interactions()[0];
    assert_eq!(link.name, "Link");
    assert_eq!(link.interaction_type, InteractionType::NodeToElement);
    assert_eq!(link.masters.len(), 1);
    assert_eq!(link.masters[0].geometry, beam);
    assert_eq!(link.masters[0].subshape, 1);
    assert_eq!(link.slaves[0].geometry, column);
    assert_eq!(link.slaves[0].subshape, 0);
    assert_eq!(
        property_name(&doc, PropertyKind::Physical, link.physical_property),
        Some("Spring".to_string())
    );
}

#[test]
fn unknown_interaction_type_falls_back() {
    let (mut doc, _, _) = coupling_doc();
    let summary = reconcile(
        &mut doc,
        &coupling_snapshot(Some("Glue")),
        &ReconcileConfig::default(),
    );

    assert_eq!(doc.interactions()[0].interaction_type, InteractionType::NodeToNode);
    assert!(summary
        .diagnostics
        .iter()
        .any(|d| matches!(d.issue, ReconcileIssue::UnknownInteractionType { .. })));
}

#[test]
fn interaction_replay_is_idempotent() {
    let (mut doc, _, _) = coupling_doc();
    let snapshot = coupling_snapshot(Some("NodeToNode"));
    reconcile(&mut doc, &snapshot, &ReconcileConfig::default());
    let second = reconcile(&mut doc, &snapshot, &ReconcileConfig::default());

    assert_eq!(second.couplings.created, 0);
    assert_eq!(second.couplings.reused, 1);
    assert_eq!(doc.interactions().len(), 1);
    assert_eq!(doc.interactions()[0].masters.len(), 1);
    assert_eq!(doc.interactions()[0].slaves.len(), 1);
}

#[test]
fn reused_interaction_keeps_its_properties() {
    let (mut doc, _, _) = coupling_doc();
    doc.add_interaction(Interaction::new(InteractionId(1), "Link", InteractionType::NodeToNode))
        .unwrap();
    let summary = reconcile(
        &mut doc,
        &coupling_snapshot(Some("NodeToNode")),
        &ReconcileConfig::default(),
    );

    assert_eq!(summary.couplings.reused, 1);
    assert_eq!(summary.couplings.created, 0);
    assert_eq!(summary.couplings.attached, 2);
    let link = &doc.interactions()[0];
    assert_eq!(link.physical_property, None);
    assert_eq!(link.element_property, None);
    // the referenced property is still materialized
    assert!(doc.find_property_by_name(PropertyKind::Physical, "Spring").is_some());
}

#[test]
fn unlocated_attachment_counts_as_failure() {
    let (mut doc, _, _) = coupling_doc();
    let mut snapshot = coupling_snapshot(None);
    snapshot.interactions[0]
        .slaves
        .push(Attachment::new("Ghost", SubshapeKind::Vertex, &[p(9.0, 9.0, 9.0)]));
    let summary = reconcile(&mut doc, &snapshot, &ReconcileConfig::default());

    assert_eq!(summary.couplings.attached, 2);
    assert_eq!(summary.couplings.failed, 1);
}

#[test]
fn interactions_can_be_disabled() {
    let (mut doc, _, _) = coupling_doc();
    let config = ReconcileConfig {
        replay_interactions: false,
        ..ReconcileConfig::default()
    };
    Reconciler::new(config).run(&mut doc, &coupling_snapshot(None));
    assert!(doc.interactions().is_empty());
}

// ── Capture ────────────────────────────────────────────────────────────────

fn captured_doc() -> MemoryDocument {
    let mut doc = MemoryDocument::new();
    let slab = doc.add_geometry("Slab", MemoryShape::unit_square());

    let mut steel = doc.instantiate(PropertyKind::Physical, "ElasticIsotropic").unwrap();
    steel.set_attribute("E", AttributeValue::QuantityScalar(210000.0)).unwrap();
    let mass = doc.instantiate(PropertyKind::Physical, "Steel01").unwrap();
    let shell = doc.instantiate(PropertyKind::Element, "ShellMITC4").unwrap();
    for (kind, id, name, object) in [
        (PropertyKind::Physical, 1, "Steel", steel),
        (PropertyKind::Physical, 2, "Mass", mass),
        (PropertyKind::Element, 1, "Shell", shell),
    ] {
        doc.add_property(
            kind,
            Property {
                id: PropertyId(id),
                name: name.to_string(),
                object: Some(object),
            },
        )
        .unwrap();
    }
    doc.assign_property(slab, PropertyKind::Physical, SubshapeKind::Face, 0, PropertyId(1))
        .unwrap();
    doc.assign_property(slab, PropertyKind::Physical, SubshapeKind::Vertex, 2, PropertyId(2))
        .unwrap();
    doc.assign_property(slab, PropertyKind::Element, SubshapeKind::Face, 0, PropertyId(1))
        .unwrap();
    doc
}

#[test]
fn capture_records_assignments_with_corners() {
    let report = capture_snapshot(&captured_doc(), "2026-01-01 00:00:00").unwrap();
    let slab = &report.snapshot.geometries[0];

    assert_eq!(slab.shape_type, Some(ShapeType::Face));
    assert_eq!(slab.topology.num_vertices, 4);
    assert_eq!(slab.topology.num_faces, 1);
    assert_eq!(slab.vertices.len(), 4);

    let face = &slab.properties.physical.faces[0];
    assert_eq!(face.property_name, "Steel");
    assert_eq!(face.property_type.as_deref(), Some("ElasticIsotropic"));
    assert_eq!(face.face_id, Some(0));
    assert_eq!(face.vertex_coordinates.len(), 4);
    assert_eq!(face.parameters.get("E"), Some(&ParamValue::Real(210000.0)));

    let vertex = &slab.properties.physical.vertices[0];
    assert_eq!(vertex.vertex_id, Some(2));
    assert_eq!(vertex.coordinates, Some(Coordinates::from(p(1.0, 1.0, 0.0))));
    assert!(vertex.vertex_coordinates.is_empty());

    assert_eq!(slab.properties.element.faces[0].property_name, "Shell");
    assert!(report.conflicts.is_empty());
}

#[test]
fn capture_then_replay_onto_renumbered_import() {
    let report = capture_snapshot(&captured_doc(), "2026-01-01 00:00:00").unwrap();

    let mut imported = MemoryDocument::new();
    let slab = imported.add_geometry("Slab", MemoryShape::unit_square().renumbered());
    let summary = reconcile(&mut imported, &report.snapshot, &ReconcileConfig::default());

    assert_eq!(summary.assigned(), 3);
    assert_eq!(summary.failed(), 0);
    let steel = imported
        .assigned_property(slab, PropertyKind::Physical, SubshapeKind::Face, 0)
        .and_then(|id| imported.property(PropertyKind::Physical, id))
        .unwrap();
    assert_eq!(steel.name, "Steel");
    assert_relative_eq!(scalar(steel.object.as_ref().unwrap().attribute("E")), 210000.0);
    assert_eq!(
        property_name(
            &imported,
            PropertyKind::Physical,
            imported.assigned_property(slab, PropertyKind::Physical, SubshapeKind::Vertex, 1)
        ),
        Some("Mass".to_string())
    );
}

#[test]
fn capture_refuses_duplicate_names() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Wall", MemoryShape::unit_square());
    doc.add_geometry("Wall", MemoryShape::unit_square());
    let result = capture_snapshot(&doc, "2026-01-01 00:00:00");
    assert_eq!(
        result.unwrap_err(),
        CaptureError::DuplicateNames {
            names: vec!["Wall".to_string()]
        }
    );
}

#[test]
fn capture_reports_substring_conflicts() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Beam_2", MemoryShape::unit_square());
    doc.add_geometry("Beam", MemoryShape::unit_square());
    let report = capture_snapshot(&doc, "2026-01-01 00:00:00").unwrap();
    assert_eq!(report.conflicts, vec![("Beam".to_string(), "Beam_2".to_string())]);
}

#[test]
fn capture_writes_null_for_unreadable_vertex() {
    let mut shape = MemoryShape::unit_square();
    shape.vertices[0] = None;
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Slab", shape);
    let report = capture_snapshot(&doc, "2026-01-01 00:00:00").unwrap();
    assert_eq!(
        report.snapshot.geometries[0].vertices[0].coordinates,
        Coordinates::missing()
    );
}

#[test]
fn capture_records_interactions() {
    let (mut doc, _, _) = coupling_doc();
    reconcile(&mut doc, &coupling_snapshot(Some("NodeToElement")), &ReconcileConfig::default());
    let report = capture_snapshot(&doc, "2026-01-01 00:00:00").unwrap();

    assert_eq!(report.snapshot.total_interactions, Some(1));
    let link = &report.snapshot.interactions[0];
    assert_eq!(link.interaction_type.as_deref(), Some("NodeToElement"));
    assert_eq!(
        link.physical_property.as_ref().map(|r| r.property_name.as_str()),
        Some("Spring")
    );
    assert_eq!(link.masters[0].geometry_name, "Beam_1");
    assert_eq!(link.masters[0].subshape_type, "VERTEX");
    assert_eq!(link.masters[0].vertex_coordinates, vec![Coordinates::from(p(1.0, 0.0, 0.0))]);
}

// ── Import driver ──────────────────────────────────────────────────────────

/// Imports fixture shapes keyed by file name into a memory document.
struct FixtureImporter {
    doc: MemoryDocument,
    shapes: HashMap<String, (String, MemoryShape)>,
}

impl GeometryImporter for FixtureImporter {
    fn import_geometry(&mut self, path: &Path) -> Result<Vec<GeometryId>, HostError> {
        let key = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let (name, shape) = self.shapes.get(&key).cloned().ok_or(HostError::ImportFailed {
            path: path.display().to_string(),
            reason: "unreadable".to_string(),
        })?;
        Ok(vec![self.doc.add_geometry(name, shape)])
    }
}

#[test]
fn import_continues_after_failed_file() {
    let mut importer = FixtureImporter {
        doc: MemoryDocument::new(),
        shapes: HashMap::from([
            ("geom_1_Slab.stp".to_string(), ("Slab".to_string(), MemoryShape::unit_square())),
            (
                "geom_2_Wall.stp".to_string(),
                ("Wall".to_string(), MemoryShape::unit_square().translated(0.0, 0.0, 3.0)),
            ),
        ]),
    };
    let files = ["geom_1_Slab.stp", "broken.stp", "geom_2_Wall.stp"];
    let report = import_all(&mut importer, &files);

    assert_eq!(report.imported, vec![GeometryId(1), GeometryId(2)]);
    assert_eq!(report.failed(), 1);
    assert_eq!(report.failures[0].0, Path::new("broken.stp"));
    assert_eq!(importer.doc.geometry_name(GeometryId(2)), Some("Wall"));
}

// ── Run summary ────────────────────────────────────────────────────────────

#[test]
fn summary_text_and_json() {
    let mut doc = MemoryDocument::new();
    doc.add_geometry("Slab", MemoryShape::unit_square());
    doc.add_geometry("Roof", MemoryShape::unit_square());
    let summary = reconcile(&mut doc, &slab_snapshot(), &ReconcileConfig::default());

    let text = summary.to_text();
    assert!(text.contains("Total: 1 assigned, 0 failed"));
    assert!(text.contains("physical face: 1 assigned, 0 failed"));
    assert!(text.contains("live geometry Roof has no counterpart"));

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["run_id"], summary.run_id.to_string());
    assert_eq!(json["assignments"]["physical"]["faces"]["assigned"], 1);
    assert_eq!(json["diagnostics"][0]["phase"], "correlate");
}
