use std::path::Path;

use crate::types::*;

/// Read-only topology queries on one geometry's shape.
/// Implemented by `MemoryShape` and by any adapter over a real host kernel.
pub trait ShapeIntrospect {
    /// Top-level type of the shape.
    fn shape_type(&self) -> ShapeType;

    /// Number of subshapes of the given kind. Indices run `0..count`.
    fn subshape_count(&self, kind: SubshapeKind) -> usize;

    /// Vertex indices bounding subshape `index` of `kind`.
    /// For `SubshapeKind::Vertex` this is the vertex itself.
    fn subshape_vertices(&self, kind: SubshapeKind, index: usize) -> Result<Vec<usize>, HostError>;

    /// Position of a vertex, or `None` when the host cannot evaluate it.
    fn vertex_position(&self, index: usize) -> Option<Point3>;

    /// Corner positions of a subshape, in the host's vertex order.
    fn subshape_points(
        &self,
        kind: SubshapeKind,
        index: usize,
    ) -> Result<Vec<Option<Point3>>, HostError> {
        Ok(self
            .subshape_vertices(kind, index)?
            .into_iter()
            .map(|v| self.vertex_position(v))
            .collect())
    }

    /// Every vertex position the host can report.
    fn vertex_points(&self) -> Vec<Point3> {
        (0..self.subshape_count(SubshapeKind::Vertex))
            .filter_map(|v| self.vertex_position(v))
            .collect()
    }
}

/// The live host document: geometries, the two property tables, per-subshape
/// assignment tables and interactions.
///
/// The document is always passed explicitly; nothing in the engine holds a
/// global handle to it.
pub trait HostDocument {
    /// Geometry ids in ascending order.
    fn geometry_ids(&self) -> Vec<GeometryId>;

    fn geometry_name(&self, id: GeometryId) -> Option<&str>;

    fn shape(&self, id: GeometryId) -> Option<&dyn ShapeIntrospect>;

    /// Property ids of one family in ascending order.
    fn property_ids(&self, kind: PropertyKind) -> Vec<PropertyId>;

    fn property(&self, kind: PropertyKind, id: PropertyId) -> Option<&Property>;

    /// Instantiate an empty property object of the named host type.
    fn instantiate(&self, kind: PropertyKind, type_name: &str) -> Result<PropertyObject, HostError>;

    /// Register a new property. Fails if the id is already taken.
    fn add_property(&mut self, kind: PropertyKind, property: Property) -> Result<(), HostError>;

    /// The property currently assigned to a subshape, if any.
    fn assigned_property(
        &self,
        geometry: GeometryId,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
    ) -> Option<PropertyId>;

    /// Write a property into a geometry's assignment table. Overwrites any
    /// previous assignment of the same family on that subshape.
    fn assign_property(
        &mut self,
        geometry: GeometryId,
        kind: PropertyKind,
        subshape: SubshapeKind,
        index: usize,
        property: PropertyId,
    ) -> Result<(), HostError>;

    /// Interaction ids in ascending order.
    fn interaction_ids(&self) -> Vec<InteractionId>;

    fn interaction(&self, id: InteractionId) -> Option<&Interaction>;

    fn interaction_mut(&mut self, id: InteractionId) -> Option<&mut Interaction>;

    /// Register a new interaction. Fails if the id is already taken.
    fn add_interaction(&mut self, interaction: Interaction) -> Result<(), HostError>;

    /// Flush pending changes to the host. Called once per geometry and once
    /// per interaction during reconciliation.
    fn commit_changes(&mut self);

    /// First property of the family with exactly this name.
    fn find_property_by_name(&self, kind: PropertyKind, name: &str) -> Option<PropertyId> {
        self.property_ids(kind)
            .into_iter()
            .find(|&id| self.property(kind, id).is_some_and(|p| p.name == name))
    }

    /// Highest property id of the family, or `None` for an empty table.
    fn last_property_id(&self, kind: PropertyKind) -> Option<PropertyId> {
        self.property_ids(kind).into_iter().max()
    }

    fn find_interaction_by_name(&self, name: &str) -> Option<InteractionId> {
        self.interaction_ids()
            .into_iter()
            .find(|&id| self.interaction(id).is_some_and(|i| i.name == name))
    }

    fn last_interaction_id(&self) -> Option<InteractionId> {
        self.interaction_ids().into_iter().max()
    }

    /// Resolve a host interaction type by its short name.
    fn interaction_type(&self, name: &str) -> Option<InteractionType> {
        InteractionType::from_name(name)
    }
}

/// Brings exchange files into a host document.
pub trait GeometryImporter {
    /// Import one file, returning the ids of the geometries it produced.
    fn import_geometry(&mut self, path: &Path) -> Result<Vec<GeometryId>, HostError>;
}
