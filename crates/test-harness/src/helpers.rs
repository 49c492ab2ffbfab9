//! Helper functions: error type, point sets, snapshot record builders.

use propsync_types::{
    AssignmentRecord, Attachment, Coordinates, GeometryRecord, InteractionRecord, ParamValue,
    Point3, PropertyKind, PropertyRef, ShapeType, SnapshotDocument, SubshapeKind,
};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("geometry not found: {name}")]
    GeometryNotFound { name: String },

    #[error("property not found: {kind} {name}")]
    PropertyNotFound { kind: PropertyKind, name: String },

    #[error("no snapshot captured yet")]
    NoSnapshot,

    #[error("no live document; call reimport first")]
    NoLiveDocument,

    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("oracle failure ({oracle}): {detail}")]
    OracleFailure { oracle: String, detail: String },

    #[error("host error: {0}")]
    Host(#[from] host_model::HostError),

    #[error("capture error: {0}")]
    Capture(#[from] reconcile_engine::CaptureError),

    #[error("snapshot format error: {0}")]
    Format(String),
}

// ── Point Sets ──────────────────────────────────────────────────────────────

pub fn p(x: f64, y: f64, z: f64) -> Point3 {
    Point3::new(x, y, z)
}

/// Corners of the unit square in the z = 0 plane, counter-clockwise.
pub fn unit_square_corners() -> Vec<Point3> {
    vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(1.0, 1.0, 0.0), p(0.0, 1.0, 0.0)]
}

/// The eight corners of an axis-aligned box, bottom ring then top ring.
pub fn box_corners(origin: Point3, w: f64, h: f64, d: f64) -> Vec<Point3> {
    let mut corners = Vec::with_capacity(8);
    for z in [0.0, d] {
        for (x, y) in [(0.0, 0.0), (w, 0.0), (w, h), (0.0, h)] {
            corners.push(origin.offset(x, y, z));
        }
    }
    corners
}

/// Shift every point by the same offset.
pub fn shifted(points: &[Point3], dx: f64, dy: f64, dz: f64) -> Vec<Point3> {
    points.iter().map(|q| q.offset(dx, dy, dz)).collect()
}

// ── Record Builders ─────────────────────────────────────────────────────────

/// An assignment record of `property` (of type `type_name`) on subshape
/// `index`, located by `corners`. Vertex records use the first corner.
pub fn record(
    property: &str,
    type_name: &str,
    kind: SubshapeKind,
    index: usize,
    corners: &[Point3],
) -> AssignmentRecord {
    let mut r = AssignmentRecord::new(property, kind, index);
    r.property_type = Some(type_name.to_string());
    if kind == SubshapeKind::Vertex {
        r.coordinates = Some(
            corners
                .first()
                .copied()
                .map_or_else(Coordinates::missing, Coordinates::from),
        );
    } else {
        r.vertex_coordinates = corners.iter().copied().map(Coordinates::from).collect();
    }
    r
}

/// Add parameters to a record.
pub fn with_params(mut r: AssignmentRecord, params: &[(&str, ParamValue)]) -> AssignmentRecord {
    for (name, value) in params {
        r.parameters.insert(name.to_string(), value.clone());
    }
    r
}

/// The subshape kind a record was captured on.
pub fn record_kind(r: &AssignmentRecord) -> Option<SubshapeKind> {
    SubshapeKind::ALL
        .into_iter()
        .find(|&kind| r.subshape_index(kind).is_some())
}

/// Fluent builder for hand-written snapshot documents.
#[derive(Debug, Clone)]
pub struct SnapshotBuilder {
    doc: SnapshotDocument,
}

impl Default for SnapshotBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self {
            doc: SnapshotDocument::new("2026-01-01 00:00:00"),
        }
    }

    /// Add a geometry holding the given records. Each record is filed under
    /// the kind it was built for.
    pub fn geometry(
        mut self,
        name: &str,
        shape_type: ShapeType,
        records: Vec<(PropertyKind, AssignmentRecord)>,
    ) -> Self {
        let id = self.doc.geometries.len() as u32 + 1;
        let mut geometry = GeometryRecord::new(id, name, shape_type);
        for (property_kind, r) in records {
            if let Some(kind) = record_kind(&r) {
                geometry.push_assignment(property_kind, kind, r);
            }
        }
        self.doc.push_geometry(geometry);
        self
    }

    /// Add a coupling with one master and one slave attachment.
    pub fn interaction(
        mut self,
        name: &str,
        type_name: Option<&str>,
        physical: Option<&str>,
        master: Attachment,
        slave: Attachment,
    ) -> Self {
        let id = self.doc.interactions.len() as u32 + 1;
        let mut r = InteractionRecord::new(id, name);
        r.interaction_type = type_name.map(str::to_string);
        r.physical_property = physical.map(|name| PropertyRef {
            property_id: 0,
            property_name: name.to_string(),
        });
        r.masters.push(master);
        r.slaves.push(slave);
        self.doc.push_interaction(r);
        self
    }

    pub fn build(self) -> SnapshotDocument {
        self.doc
    }
}
