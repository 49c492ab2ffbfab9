use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of topological constituent a property can be assigned to,
/// ordered by topological dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SubshapeKind {
    Vertex,
    Edge,
    Face,
    Solid,
}

impl SubshapeKind {
    /// All kinds in replay order (vertices first).
    pub const ALL: [SubshapeKind; 4] = [
        SubshapeKind::Vertex,
        SubshapeKind::Edge,
        SubshapeKind::Face,
        SubshapeKind::Solid,
    ];

    pub fn dimension(self) -> u8 {
        match self {
            SubshapeKind::Vertex => 0,
            SubshapeKind::Edge => 1,
            SubshapeKind::Face => 2,
            SubshapeKind::Solid => 3,
        }
    }

    /// Upper-case name used in snapshot documents.
    pub fn name(self) -> &'static str {
        match self {
            SubshapeKind::Vertex => "VERTEX",
            SubshapeKind::Edge => "EDGE",
            SubshapeKind::Face => "FACE",
            SubshapeKind::Solid => "SOLID",
        }
    }

    /// Parse a snapshot name. Unknown names (including `UNKNOWN`) yield `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "VERTEX" => Some(SubshapeKind::Vertex),
            "EDGE" => Some(SubshapeKind::Edge),
            "FACE" => Some(SubshapeKind::Face),
            "SOLID" => Some(SubshapeKind::Solid),
            _ => None,
        }
    }
}

impl fmt::Display for SubshapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SubshapeKind::Vertex => "vertex",
            SubshapeKind::Edge => "edge",
            SubshapeKind::Face => "face",
            SubshapeKind::Solid => "solid",
        };
        f.write_str(label)
    }
}

/// Top-level shape type of a geometry, as reported by the host kernel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ShapeType {
    Vertex,
    Edge,
    Wire,
    Face,
    Shell,
    Solid,
    CompSolid,
    Compound,
    Unknown,
}

impl ShapeType {
    /// The subshape kind whose recorded groups must be disambiguated when a
    /// geometry of this type is re-imported, or `None` for whole-shape replay.
    pub fn disambiguation_kind(self) -> Option<SubshapeKind> {
        match self {
            ShapeType::Solid | ShapeType::CompSolid | ShapeType::Compound => {
                Some(SubshapeKind::Solid)
            }
            ShapeType::Edge => Some(SubshapeKind::Edge),
            ShapeType::Face => Some(SubshapeKind::Face),
            _ => None,
        }
    }
}

/// Which of the two property families an assignment belongs to.
///
/// Physical properties carry material data, element properties carry the
/// finite-element formulation. The two are never cross-matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Physical,
    Element,
}

impl PropertyKind {
    pub const ALL: [PropertyKind; 2] = [PropertyKind::Physical, PropertyKind::Element];
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKind::Physical => f.write_str("physical"),
            PropertyKind::Element => f.write_str("element"),
        }
    }
}

/// Subshape counts of a geometry at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TopologyCounts {
    pub num_vertices: usize,
    pub num_edges: usize,
    pub num_faces: usize,
    pub num_solids: usize,
}

impl TopologyCounts {
    pub fn count(&self, kind: SubshapeKind) -> usize {
        match kind {
            SubshapeKind::Vertex => self.num_vertices,
            SubshapeKind::Edge => self.num_edges,
            SubshapeKind::Face => self.num_faces,
            SubshapeKind::Solid => self.num_solids,
        }
    }

    pub fn set(&mut self, kind: SubshapeKind, count: usize) {
        match kind {
            SubshapeKind::Vertex => self.num_vertices = count,
            SubshapeKind::Edge => self.num_edges = count,
            SubshapeKind::Face => self.num_faces = count,
            SubshapeKind::Solid => self.num_solids = count,
        }
    }
}
