use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::params::ParamValue;
use crate::point::{Coordinates, Point3};
use crate::topo::{PropertyKind, ShapeType, SubshapeKind, TopologyCounts};

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 1;

fn default_version() -> u32 {
    SNAPSHOT_VERSION
}

/// The persisted capture of a whole model, taken before the export/import
/// round trip. Treated as immutable ground truth during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotDocument {
    /// Document version. Absent in documents written before versioning.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Capture time, `%Y-%m-%d %H:%M:%S` local time.
    pub timestamp: String,
    pub total_geometries: usize,
    pub geometries: Vec<GeometryRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_interactions: Option<usize>,
    #[serde(default)]
    pub interactions: Vec<InteractionRecord>,
}

impl SnapshotDocument {
    /// An empty document stamped with the given capture time.
    pub fn new(timestamp: impl Into<String>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            timestamp: timestamp.into(),
            total_geometries: 0,
            geometries: Vec::new(),
            total_interactions: Some(0),
            interactions: Vec::new(),
        }
    }

    pub fn push_geometry(&mut self, geometry: GeometryRecord) {
        self.geometries.push(geometry);
        self.total_geometries = self.geometries.len();
    }

    pub fn push_interaction(&mut self, interaction: InteractionRecord) {
        self.interactions.push(interaction);
        self.total_interactions = Some(self.interactions.len());
    }

    /// Find a geometry record by its exact captured name.
    pub fn geometry_by_name(&self, name: &str) -> Option<&GeometryRecord> {
        self.geometries.iter().find(|g| g.name == name)
    }

    /// Number of assignment records across all geometries.
    pub fn assignment_count(&self) -> usize {
        self.geometries.iter().map(|g| g.assignments().count()).sum()
    }
}

/// Snapshot of one geometry: topology, vertex positions and every property
/// assignment with the corner coordinates of the subshape it was applied to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub shape_type: Option<ShapeType>,
    #[serde(default)]
    pub topology: TopologyCounts,
    #[serde(default)]
    pub vertices: Vec<VertexRecord>,
    #[serde(default)]
    pub properties: PropertySections,
    /// Problems encountered while capturing this geometry.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Exchange-file stem this geometry was exported to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_file: Option<String>,
}

impl GeometryRecord {
    pub fn new(id: u32, name: impl Into<String>, shape_type: ShapeType) -> Self {
        Self {
            id,
            name: name.into(),
            shape_type: Some(shape_type),
            topology: TopologyCounts::default(),
            vertices: Vec::new(),
            properties: PropertySections::default(),
            errors: Vec::new(),
            exported_file: None,
        }
    }

    /// Recorded assignments of one property family on one subshape kind.
    pub fn assignments_of(
        &self,
        kind: PropertyKind,
        subshape: SubshapeKind,
    ) -> &[AssignmentRecord] {
        self.properties.section(kind).bucket(subshape)
    }

    /// Every assignment in replay order: physical before element, and within
    /// each family vertices, edges, faces, solids.
    pub fn assignments(
        &self,
    ) -> impl Iterator<Item = (PropertyKind, SubshapeKind, &AssignmentRecord)> + '_ {
        PropertyKind::ALL.into_iter().flat_map(move |pk| {
            SubshapeKind::ALL.into_iter().flat_map(move |sk| {
                self.assignments_of(pk, sk)
                    .iter()
                    .map(move |record| (pk, sk, record))
            })
        })
    }

    pub fn push_assignment(
        &mut self,
        kind: PropertyKind,
        subshape: SubshapeKind,
        record: AssignmentRecord,
    ) {
        self.properties
            .section_mut(kind)
            .bucket_mut(subshape)
            .push(record);
    }
}

/// A captured vertex position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
    pub id: usize,
    pub coordinates: Coordinates,
}

/// Assignments split by property family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PropertySections {
    #[serde(default)]
    pub physical: SubshapeBuckets,
    #[serde(default)]
    pub element: SubshapeBuckets,
}

impl PropertySections {
    pub fn section(&self, kind: PropertyKind) -> &SubshapeBuckets {
        match kind {
            PropertyKind::Physical => &self.physical,
            PropertyKind::Element => &self.element,
        }
    }

    pub fn section_mut(&mut self, kind: PropertyKind) -> &mut SubshapeBuckets {
        match kind {
            PropertyKind::Physical => &mut self.physical,
            PropertyKind::Element => &mut self.element,
        }
    }
}

/// Assignments of one family split by subshape kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubshapeBuckets {
    #[serde(default)]
    pub vertices: Vec<AssignmentRecord>,
    #[serde(default)]
    pub edges: Vec<AssignmentRecord>,
    #[serde(default)]
    pub faces: Vec<AssignmentRecord>,
    #[serde(default)]
    pub solids: Vec<AssignmentRecord>,
}

impl SubshapeBuckets {
    pub fn bucket(&self, kind: SubshapeKind) -> &[AssignmentRecord] {
        match kind {
            SubshapeKind::Vertex => &self.vertices,
            SubshapeKind::Edge => &self.edges,
            SubshapeKind::Face => &self.faces,
            SubshapeKind::Solid => &self.solids,
        }
    }

    pub fn bucket_mut(&mut self, kind: SubshapeKind) -> &mut Vec<AssignmentRecord> {
        match kind {
            SubshapeKind::Vertex => &mut self.vertices,
            SubshapeKind::Edge => &mut self.edges,
            SubshapeKind::Face => &mut self.faces,
            SubshapeKind::Solid => &mut self.solids,
        }
    }
}

/// "This property was applied to the subshape with these corners."
///
/// The subshape index fields are provenance from the captured geometry and
/// are only used to group records; they never address a re-imported shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(default)]
    pub property_id: Option<u32>,
    pub property_name: String,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub parameters: BTreeMap<String, ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertex_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub face_id: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solid_id: Option<usize>,
    /// Position of the vertex, for vertex assignments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
    /// Corner positions of the subshape, for edge/face/solid assignments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vertex_coordinates: Vec<Coordinates>,
}

impl AssignmentRecord {
    /// A record for `property_name` on subshape `index` of the given kind.
    pub fn new(property_name: impl Into<String>, kind: SubshapeKind, index: usize) -> Self {
        let mut record = Self {
            property_id: None,
            property_name: property_name.into(),
            property_type: None,
            parameters: BTreeMap::new(),
            vertex_id: None,
            edge_id: None,
            face_id: None,
            solid_id: None,
            coordinates: None,
            vertex_coordinates: Vec::new(),
        };
        *record.index_slot(kind) = Some(index);
        record
    }

    fn index_slot(&mut self, kind: SubshapeKind) -> &mut Option<usize> {
        match kind {
            SubshapeKind::Vertex => &mut self.vertex_id,
            SubshapeKind::Edge => &mut self.edge_id,
            SubshapeKind::Face => &mut self.face_id,
            SubshapeKind::Solid => &mut self.solid_id,
        }
    }

    /// The captured subshape index for the given kind.
    pub fn subshape_index(&self, kind: SubshapeKind) -> Option<usize> {
        match kind {
            SubshapeKind::Vertex => self.vertex_id,
            SubshapeKind::Edge => self.edge_id,
            SubshapeKind::Face => self.face_id,
            SubshapeKind::Solid => self.solid_id,
        }
    }

    /// Points the live subshape must match. Vertex records carry a single
    /// point; the others carry their corner set.
    pub fn target_points(&self, kind: SubshapeKind) -> Vec<Option<Point3>> {
        match kind {
            SubshapeKind::Vertex => self.coordinates.iter().map(Coordinates::point).collect(),
            _ => self.vertex_coordinates.iter().map(Coordinates::point).collect(),
        }
    }

    /// The property definition carried by this record.
    pub fn property(&self) -> PropertyRecord<'_> {
        PropertyRecord {
            name: &self.property_name,
            type_identifier: self.property_type.as_deref(),
            parameters: &self.parameters,
        }
    }
}

/// Borrowed view of the property definition embedded in an assignment.
#[derive(Debug, Clone, Copy)]
pub struct PropertyRecord<'a> {
    /// Sole deduplication key.
    pub name: &'a str,
    pub type_identifier: Option<&'a str>,
    pub parameters: &'a BTreeMap<String, ParamValue>,
}

/// Which side of a coupling an attachment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouplingSide {
    Master,
    Slave,
}

/// A captured master/slave coupling between geometries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub id: u32,
    pub name: String,
    /// Host interaction type, either `Kind` or `Enum.Kind`.
    #[serde(rename = "type", default)]
    pub interaction_type: Option<String>,
    #[serde(default)]
    pub physical_property: Option<PropertyRef>,
    #[serde(default)]
    pub element_property: Option<PropertyRef>,
    #[serde(default)]
    pub masters: Vec<Attachment>,
    #[serde(default)]
    pub slaves: Vec<Attachment>,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl InteractionRecord {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            interaction_type: None,
            physical_property: None,
            element_property: None,
            masters: Vec::new(),
            slaves: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn attachments(&self, side: CouplingSide) -> &[Attachment] {
        match side {
            CouplingSide::Master => &self.masters,
            CouplingSide::Slave => &self.slaves,
        }
    }

    pub fn property_ref(&self, kind: PropertyKind) -> Option<&PropertyRef> {
        match kind {
            PropertyKind::Physical => self.physical_property.as_ref(),
            PropertyKind::Element => self.element_property.as_ref(),
        }
    }
}

/// Reference to a property by id and name at capture time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRef {
    pub property_id: u32,
    pub property_name: String,
}

/// One end of a coupling: a subshape of some geometry, identified by corners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub geometry_id: Option<u32>,
    pub geometry_name: String,
    #[serde(default)]
    pub subshape_id: Option<usize>,
    pub subshape_type: String,
    #[serde(default)]
    pub vertex_coordinates: Vec<Coordinates>,
}

impl Attachment {
    pub fn new(geometry_name: impl Into<String>, kind: SubshapeKind, corners: &[Point3]) -> Self {
        Self {
            geometry_id: None,
            geometry_name: geometry_name.into(),
            subshape_id: None,
            subshape_type: kind.name().to_string(),
            vertex_coordinates: corners.iter().copied().map(Coordinates::from).collect(),
        }
    }

    /// The subshape kind, or `None` when the capture recorded an unknown type.
    pub fn kind(&self) -> Option<SubshapeKind> {
        SubshapeKind::from_name(&self.subshape_type)
    }

    pub fn target_points(&self) -> Vec<Option<Point3>> {
        self.vertex_coordinates.iter().map(Coordinates::point).collect()
    }
}
