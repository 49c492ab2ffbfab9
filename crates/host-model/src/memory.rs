//! MemoryDocument: deterministic in-memory host document.
//!
//! Holds geometries with explicit vertex/edge/face/solid topology, the two
//! property tables, per-subshape assignment tables and interactions. It is
//! serde-serializable so a whole document can be written to and read from
//! JSON. Used by the engine tests, the scenario harness and the CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::traits::{HostDocument, ShapeIntrospect};
use crate::types::*;

/// Explicit shape topology. Every subshape is stored as the list of vertex
/// indices bounding it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryShape {
    pub shape_type: ShapeType,
    /// Vertex positions. `None` models a vertex the host cannot evaluate.
    pub vertices: Vec<Option<Point3>>,
    #[serde(default)]
    pub edges: Vec<Vec<usize>>,
    #[serde(default)]
    pub faces: Vec<Vec<usize>>,
    #[serde(default)]
    pub solids: Vec<Vec<usize>>,
}

impl MemoryShape {
    fn subshapes(&self, kind: SubshapeKind) -> Option<&[Vec<usize>]> {
        match kind {
            SubshapeKind::Vertex => None,
            SubshapeKind::Edge => Some(&self.edges),
            SubshapeKind::Face => Some(&self.faces),
            SubshapeKind::Solid => Some(&self.solids),
        }
    }
}

impl ShapeIntrospect for MemoryShape {
    fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    fn subshape_count(&self, kind: SubshapeKind) -> usize {
        match self.subshapes(kind) {
            Some(list) => list.len(),
            None => self.vertices.len(),
        }
    }

    fn subshape_vertices(&self, kind: SubshapeKind, index: usize) -> Result<Vec<usize>, HostError> {
        let count = self.subshape_count(kind);
        let out_of_range = HostError::SubshapeOutOfRange { kind, index, count };
        let Some(list) = self.subshapes(kind) else {
            return if index < count {
                Ok(vec![index])
            } else {
                Err(out_of_range)
            };
        };
        let vertices = list.get(index).ok_or(out_of_range)?;
        if let Some(&vertex) = vertices.iter().find(|&&v| v >= self.vertices.len()) {
            return Err(HostError::BrokenTopology {
                kind,
                index,
                vertex,
            });
        }
        Ok(vertices.clone())
    }

    fn vertex_position(&self, index: usize) -> Option<Point3> {
        self.vertices.get(index).copied().flatten()
    }
}

/// Assigned property ids of one family, keyed by subshape index.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotTable {
    #[serde(default)]
    pub vertices: BTreeMap<usize, PropertyId>,
    #[serde(default)]
    pub edges: BTreeMap<usize, PropertyId>,
    #[serde(default)]
    pub faces: BTreeMap<usize, PropertyId>,
    #[serde(default)]
    pub solids: BTreeMap<usize, PropertyId>,
}

impl SlotTable {
    pub fn slots(&self, kind: SubshapeKind) -> &BTreeMap<usize, PropertyId> {
        match kind {
            SubshapeKind::Vertex => &self.vertices,
            SubshapeKind::Edge => &self.edges,
            SubshapeKind::Face => &self.faces,
            SubshapeKind::Solid => &self.solids,
        }
    }

    fn slots_mut(&mut self, kind: SubshapeKind) -> &mut BTreeMap<usize, PropertyId> {
        match kind {
            SubshapeKind::Vertex => &mut self.vertices,
            SubshapeKind::Edge => &mut self.edges,
            SubshapeKind::Face => &mut self.faces,
            SubshapeKind::Solid => &mut self.solids,
        }
    }

    pub fn len(&self) -> usize {
        SubshapeKind::ALL.iter().map(|&k| self.slots(k).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Both assignment tables of a geometry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AssignmentTables {
    #[serde(default)]
    pub physical: SlotTable,
    #[serde(default)]
    pub element: SlotTable,
}

impl AssignmentTables {
    pub fn table(&self, kind: PropertyKind) -> &SlotTable {
        match kind {
            PropertyKind::Physical => &self.physical,
            PropertyKind::Element => &self.element,
        }
    }

    fn table_mut(&mut self, kind: PropertyKind) -> &mut SlotTable {
        match kind {
            PropertyKind::Physical => &mut self.physical,
            PropertyKind::Element => &mut self.element,
        }
    }
}

/// A named geometry in the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryGeometry {
    pub id: GeometryId,
    pub name: String,
    pub shape: MemoryShape,
    #[serde(default)]
    pub assignments: AssignmentTables,
}

/// Attribute layout of one host property type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeDefinition {
    pub attributes: BTreeMap<String, AttributeKind>,
}

impl TypeDefinition {
    pub fn new<'a>(attributes: impl IntoIterator<Item = (&'a str, AttributeKind)>) -> Self {
        Self {
            attributes: attributes
                .into_iter()
                .map(|(name, kind)| (name.to_string(), kind))
                .collect(),
        }
    }

    fn instantiate(&self, type_name: &str) -> PropertyObject {
        PropertyObject {
            type_name: type_name.to_string(),
            attributes: self
                .attributes
                .iter()
                .map(|(name, &kind)| (name.clone(), AttributeValue::default_for(kind)))
                .collect(),
        }
    }
}

/// The property types a host knows how to instantiate, per family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TypeCatalog {
    #[serde(default)]
    pub physical: BTreeMap<String, TypeDefinition>,
    #[serde(default)]
    pub element: BTreeMap<String, TypeDefinition>,
}

impl TypeCatalog {
    /// A small structural catalogue covering every attribute kind.
    pub fn structural() -> Self {
        use AttributeKind::*;

        let mut catalog = Self::default();
        catalog.register(
            PropertyKind::Physical,
            "ElasticIsotropic",
            TypeDefinition::new([("E", QuantityScalar), ("nu", Real), ("rho", QuantityScalar)]),
        );
        catalog.register(
            PropertyKind::Physical,
            "Steel01",
            TypeDefinition::new([("Fy", QuantityScalar), ("E0", QuantityScalar), ("b", Real)]),
        );
        catalog.register(
            PropertyKind::Physical,
            "ElasticSection",
            TypeDefinition::new([
                ("E", QuantityScalar),
                ("A", QuantityScalar),
                ("Iy", QuantityScalar),
                ("Iz", QuantityScalar),
                ("G", QuantityScalar),
                ("J", QuantityScalar),
            ]),
        );
        catalog.register(
            PropertyKind::Element,
            "ElasticBeamColumn",
            TypeDefinition::new([
                ("vecxz", QuantityVector3),
                ("transfType", Text),
                ("cMass", Boolean),
            ]),
        );
        catalog.register(
            PropertyKind::Element,
            "ShellMITC4",
            TypeDefinition::new([("integrationPoints", Integer), ("updateBasis", Boolean)]),
        );
        catalog.register(
            PropertyKind::Element,
            "ZeroLength",
            TypeDefinition::new([
                ("dirs", IndexVector),
                ("orientation", Index),
                ("doRayleigh", Boolean),
            ]),
        );
        catalog
    }

    pub fn register(&mut self, kind: PropertyKind, type_name: &str, definition: TypeDefinition) {
        self.family_mut(kind).insert(type_name.to_string(), definition);
    }

    fn family(&self, kind: PropertyKind) -> &BTreeMap<String, TypeDefinition> {
        match kind {
            PropertyKind::Physical => &self.physical,
            PropertyKind::Element => &self.element,
        }
    }

    fn family_mut(&mut self, kind: PropertyKind) -> &mut BTreeMap<String, TypeDefinition> {
        match kind {
            PropertyKind::Physical => &mut self.physical,
            PropertyKind::Element => &mut self.element,
        }
    }

    /// Look up a type by exact name, then by the last segment of a dotted
    /// name (`materials.nD.ElasticIsotropic`).
    pub fn lookup(&self, kind: PropertyKind, type_name: &str) -> Option<&TypeDefinition> {
        let family = self.family(kind);
        family.get(type_name).or_else(|| {
            let short = type_name.rsplit('.').next()?;
            family.get(short)
        })
    }
}

/// Deterministic in-memory host document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    #[serde(default)]
    geometries: Vec<MemoryGeometry>,
    #[serde(default)]
    physical_properties: Vec<Property>,
    #[serde(default)]
    element_properties: Vec<Property>,
    #[serde(default)]
    interactions: Vec<Interaction>,
    #[serde(default = "TypeCatalog::structural")]
    catalog: TypeCatalog,
    #[serde(skip)]
    commits: usize,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// An empty document with the structural type catalogue.
    pub fn new() -> Self {
        Self::with_catalog(TypeCatalog::structural())
    }

    pub fn with_catalog(catalog: TypeCatalog) -> Self {
        Self {
            geometries: Vec::new(),
            physical_properties: Vec::new(),
            element_properties: Vec::new(),
            interactions: Vec::new(),
            catalog,
            commits: 0,
        }
    }

    /// Add a geometry with the next free id.
    pub fn add_geometry(&mut self, name: impl Into<String>, shape: MemoryShape) -> GeometryId {
        let next = self.geometries.iter().map(|g| g.id.0).max().unwrap_or(0) + 1;
        let id = GeometryId(next);
        self.geometries.push(MemoryGeometry {
            id,
            name: name.into(),
            shape,
            assignments: AssignmentTables::default(),
        });
        id
    }

    pub fn geometry(&self, id: GeometryId) -> Option<&MemoryGeometry> {
        self.geometries.iter().find(|g| g.id == id)
    }

    fn geometry_mut(&mut self, id: GeometryId) -> Option<&mut MemoryGeometry> {
        self.geometries.iter_mut().find(|g| g.id == id)
    }

    pub fn geometries(&self) -> &[MemoryGeometry] {
        &self.geometries
    }

    /// First geometry with exactly this name.
    pub fn geometry_by_name(&self, name: &str) -> Option<&MemoryGeometry> {
        self.geometries.iter().find(|g| g.name == name)
    }

    pub fn properties(&self, kind: PropertyKind) -> &[Property] {
        match kind {
            PropertyKind::Physical => &self.physical_properties,
            PropertyKind::Element => &self.element_properties,
        }
    }

    fn properties_mut(&mut self, kind: PropertyKind) -> &mut Vec<Property> {
        match kind {
            PropertyKind::Physical => &mut self.physical_properties,
            PropertyKind::Element => &mut self.element_properties,
        }
    }

    pub fn interactions(&self) -> &[Interaction] {
        &self.interactions
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut TypeCatalog {
        &mut self.catalog
    }

    /// Number of `commit_changes` calls since the document was created.
    pub fn commit_count(&self) -> usize {
        self.commits
    }

    /// Total assignments across all geometries and both families.
    pub fn assignment_count(&self) -> usize {
        self.geometries
            .iter()
            .map(|g| g.assignments.physical.len() + g.assignments.element.len())
            .sum()
    }
}

impl HostDocument for MemoryDocument {
    fn geometry_ids(&self) -> Vec<GeometryId> {
        let mut ids: Vec<GeometryId> = self.geometries.iter().map(|g| g.id).collect();
        ids.sort();
        ids
    }

    fn geometry_name(&self, id: GeometryId) -> Option<&str> {
        self.geometry(id).map(|g| g.name.as_str())
    }

    fn shape(&self, id: GeometryId) -> Option<&dyn ShapeIntrospect> {
        self.geometry(id).map(|g| &g.shape as &dyn ShapeIntrospect)
    }

    fn property_ids(&self, kind: PropertyKind) -> Vec<PropertyId> {
        let mut ids: Vec<PropertyId> = self.properties(kind).iter().map(|p| p.id).collect();
        ids.sort();
        ids
    }

    fn property(&self, kind: PropertyKind, id: PropertyId) -> Option<&Property> {
        self.properties(kind).iter().find(|p| p.id == id)
    }

    fn instantiate(
        &self,
        kind: PropertyKind,
        type_name: &str,
    ) -> Result<PropertyObject, HostError> {
        self.catalog
            .lookup(kind, type_name)
            .map(|definition| definition.instantiate(type_name))
            .ok_or_else(|| HostError::UnknownPropertyType {
                kind,
                type_name: type_name.to_string(),
            })
    }

    fn add_property(&mut self, kind: PropertyKind, property: Property) -> Result<(), HostError> {
        if self.property(kind, property.id).is_some() {
            return Err(HostError::DuplicateId {
                what: "property",
                id: property.id.0,
            });
        }
        debug!(%kind, id = property.id.0, name = %property.name, "property added");
        self.properties_mut(kind).push(property);
        Ok(())
    }

    fn assigned_property(
        &self,
        geometry: GeometryId,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
    ) -> Option<PropertyId> {
        self.geometry(geometry)?
            .assignments
            .table(kind)
            .slots(subshape)
            .get(&index)
            .copied()
    }

    fn assign_property(
        &mut self,
        geometry: GeometryId,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
        property: PropertyId,
    ) -> Result<(), HostError> {
        if self.property(kind, property).is_none() {
            return Err(HostError::PropertyNotFound { kind, id: property });
        }
        let target = self
            .geometry_mut(geometry)
            .ok_or(HostError::GeometryNotFound { id: geometry })?;
        let count = target.shape.subshape_count(subshape);
        if index >= count {
            return Err(HostError::SubshapeOutOfRange {
                kind: subshape,
                index,
                count,
            });
        }
        target
            .assignments
            .table_mut(kind)
            .slots_mut(subshape)
            .insert(index, property);
        Ok(())
    }

    fn interaction_ids(&self) -> Vec<InteractionId> {
        let mut ids: Vec<InteractionId> = self.interactions.iter().map(|i| i.id).collect();
        ids.sort();
        ids
    }

    fn interaction(&self, id: InteractionId) -> Option<&Interaction> {
        self.interactions.iter().find(|i| i.id == id)
    }

    fn interaction_mut(&mut self, id: InteractionId) -> Option<&mut Interaction> {
        self.interactions.iter_mut().find(|i| i.id == id)
    }

    fn add_interaction(&mut self, interaction: Interaction) -> Result<(), HostError> {
        if self.interaction(interaction.id).is_some() {
            return Err(HostError::DuplicateId {
                what: "interaction",
                id: interaction.id.0,
            });
        }
        self.interactions.push(interaction);
        Ok(())
    }

    fn commit_changes(&mut self) {
        self.commits += 1;
        debug!(commits = self.commits, "changes committed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_face() -> (MemoryDocument, GeometryId) {
        let mut doc = MemoryDocument::new();
        let id = doc.add_geometry("Slab", MemoryShape::unit_square());
        (doc, id)
    }

    #[test]
    fn test_geometry_ids_are_sequential() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_geometry("A", MemoryShape::unit_square());
        let b = doc.add_geometry("B", MemoryShape::unit_square());
        assert_eq!(a, GeometryId(1));
        assert_eq!(b, GeometryId(2));
        assert_eq!(doc.geometry_ids(), vec![a, b]);
        assert_eq!(doc.geometry_name(b), Some("B"));
    }

    #[test]
    fn test_instantiate_known_type_has_default_attributes() {
        let doc = MemoryDocument::new();
        let obj = doc
            .instantiate(PropertyKind::Physical, "ElasticIsotropic")
            .unwrap();
        assert_eq!(obj.type_name, "ElasticIsotropic");
        assert_eq!(obj.attribute("E"), Some(&AttributeValue::QuantityScalar(0.0)));
        assert_eq!(obj.attribute("nu"), Some(&AttributeValue::Real(0.0)));
    }

    #[test]
    fn test_instantiate_dotted_type_name() {
        let doc = MemoryDocument::new();
        let obj = doc
            .instantiate(PropertyKind::Physical, "materials.nD.ElasticIsotropic")
            .unwrap();
        assert_eq!(obj.type_name, "materials.nD.ElasticIsotropic");
        assert!(obj.attribute("rho").is_some());
    }

    #[test]
    fn test_instantiate_unknown_type_fails() {
        let doc = MemoryDocument::new();
        let result = doc.instantiate(PropertyKind::Element, "ElasticIsotropic");
        assert!(matches!(result, Err(HostError::UnknownPropertyType { .. })));
    }

    #[test]
    fn test_set_attribute_rejects_kind_mismatch() {
        let doc = MemoryDocument::new();
        let mut obj = doc.instantiate(PropertyKind::Physical, "Steel01").unwrap();
        let result = obj.set_attribute("b", AttributeValue::Text("x".into()));
        assert!(matches!(result, Err(HostError::AttributeRejected { .. })));
        let result = obj.set_attribute("missing", AttributeValue::Real(1.0));
        assert!(matches!(result, Err(HostError::UnknownAttribute { .. })));
    }

    #[test]
    fn test_add_property_rejects_duplicate_id() {
        let mut doc = MemoryDocument::new();
        let p = Property {
            id: PropertyId(1),
            name: "Steel".into(),
            object: None,
        };
        doc.add_property(PropertyKind::Physical, p.clone()).unwrap();
        let result = doc.add_property(PropertyKind::Physical, p.clone());
        assert!(matches!(result, Err(HostError::DuplicateId { .. })));
        // Element ids are a separate space.
        doc.add_property(PropertyKind::Element, p).unwrap();
        assert_eq!(doc.last_property_id(PropertyKind::Physical), Some(PropertyId(1)));
        assert_eq!(
            doc.find_property_by_name(PropertyKind::Element, "Steel"),
            Some(PropertyId(1))
        );
    }

    #[test]
    fn test_assign_property_overwrites_slot() {
        let (mut doc, geom) = doc_with_face();
        for id in [1, 2] {
            doc.add_property(
                PropertyKind::Physical,
                Property {
                    id: PropertyId(id),
                    name: format!("P{id}"),
                    object: None,
                },
            )
            .unwrap();
        }
        doc.assign_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0, PropertyId(1))
            .unwrap();
        doc.assign_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0, PropertyId(2))
            .unwrap();
        assert_eq!(
            doc.assigned_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0),
            Some(PropertyId(2))
        );
        assert_eq!(doc.assignment_count(), 1);
    }

    #[test]
    fn test_assign_property_out_of_range() {
        let (mut doc, geom) = doc_with_face();
        doc.add_property(
            PropertyKind::Element,
            Property {
                id: PropertyId(1),
                name: "Shell".into(),
                object: None,
            },
        )
        .unwrap();
        let result =
            doc.assign_property(geom, PropertyKind::Element, SubshapeKind::Face, 3, PropertyId(1));
        assert!(matches!(result, Err(HostError::SubshapeOutOfRange { count: 1, .. })));
        let result =
            doc.assign_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0, PropertyId(1));
        assert!(matches!(result, Err(HostError::PropertyNotFound { .. })));
    }

    #[test]
    fn test_broken_topology_is_reported() {
        let mut shape = MemoryShape::unit_square();
        shape.faces[0].push(42);
        let result = shape.subshape_vertices(SubshapeKind::Face, 0);
        assert!(matches!(result, Err(HostError::BrokenTopology { vertex: 42, .. })));
    }

    #[test]
    fn test_unreadable_vertex_has_no_position() {
        let mut shape = MemoryShape::unit_square();
        shape.vertices[2] = None;
        assert_eq!(shape.vertex_position(2), None);
        assert_eq!(shape.vertex_points().len(), 3);
        let points = shape.subshape_points(SubshapeKind::Face, 0).unwrap();
        assert_eq!(points.iter().filter(|p| p.is_none()).count(), 1);
    }

    #[test]
    fn test_commit_counter() {
        let (mut doc, _) = doc_with_face();
        doc.commit_changes();
        doc.commit_changes();
        assert_eq!(doc.commit_count(), 2);
    }

    #[test]
    fn test_document_json_roundtrip_keeps_assignments() {
        let (mut doc, geom) = doc_with_face();
        doc.add_property(
            PropertyKind::Physical,
            Property {
                id: PropertyId(7),
                name: "Steel".into(),
                object: Some(doc.instantiate(PropertyKind::Physical, "Steel01").unwrap()),
            },
        )
        .unwrap();
        doc.assign_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0, PropertyId(7))
            .unwrap();

        let json = serde_json::to_string(&doc).unwrap();
        let back: MemoryDocument = serde_json::from_str(&json).unwrap();
        assert_eq!(
            back.assigned_property(geom, PropertyKind::Physical, SubshapeKind::Face, 0),
            Some(PropertyId(7))
        );
        assert_eq!(back, doc);
    }
}
