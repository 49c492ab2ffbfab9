//! Shape builders for the in-memory host.
//!
//! Each builder produces explicit topology with a fixed subshape order, so
//! tests can reason about indices. `renumbered` and `translated` model what a
//! geometry kernel does to a shape on an export/import round trip.

use crate::memory::MemoryShape;
use crate::types::{Point3, ShapeType};

impl MemoryShape {
    /// A single vertex.
    pub fn point(p: Point3) -> Self {
        Self {
            shape_type: ShapeType::Vertex,
            vertices: vec![Some(p)],
            edges: Vec::new(),
            faces: Vec::new(),
            solids: Vec::new(),
        }
    }

    /// A straight edge from `a` to `b`.
    pub fn line(a: Point3, b: Point3) -> Self {
        Self {
            shape_type: ShapeType::Edge,
            vertices: vec![Some(a), Some(b)],
            edges: vec![vec![0, 1]],
            faces: Vec::new(),
            solids: Vec::new(),
        }
    }

    /// A planar quadrilateral face bounded by four edges.
    pub fn quad(corners: [Point3; 4]) -> Self {
        Self {
            shape_type: ShapeType::Face,
            vertices: corners.iter().copied().map(Some).collect(),
            edges: vec![vec![0, 1], vec![1, 2], vec![2, 3], vec![3, 0]],
            faces: vec![vec![0, 1, 2, 3]],
            solids: Vec::new(),
        }
    }

    /// The unit square in the z = 0 plane.
    pub fn unit_square() -> Self {
        Self::quad([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ])
    }

    /// An axis-aligned box with 8 vertices, 12 edges and 6 faces.
    /// Extends from `origin` to `origin + (w, h, d)`.
    pub fn box_solid(origin: Point3, w: f64, h: f64, d: f64) -> Self {
        let positions = [
            origin,
            origin.offset(w, 0.0, 0.0),
            origin.offset(w, h, 0.0),
            origin.offset(0.0, h, 0.0),
            origin.offset(0.0, 0.0, d),
            origin.offset(w, 0.0, d),
            origin.offset(w, h, d),
            origin.offset(0.0, h, d),
        ];

        // 4 bottom, 4 top, 4 vertical
        let edge_pairs = [
            (0, 1),
            (1, 2),
            (2, 3),
            (3, 0),
            (4, 5),
            (5, 6),
            (6, 7),
            (7, 4),
            (0, 4),
            (1, 5),
            (2, 6),
            (3, 7),
        ];

        // bottom, top, front (y=0), back (y=h), left (x=0), right (x=w)
        let faces = vec![
            vec![0, 1, 2, 3],
            vec![4, 5, 6, 7],
            vec![0, 1, 5, 4],
            vec![3, 2, 6, 7],
            vec![0, 3, 7, 4],
            vec![1, 2, 6, 5],
        ];

        Self {
            shape_type: ShapeType::Solid,
            vertices: positions.iter().copied().map(Some).collect(),
            edges: edge_pairs.iter().map(|&(a, b)| vec![a, b]).collect(),
            faces,
            solids: vec![(0..8).collect()],
        }
    }

    /// Several shapes merged into one compound. Vertices are not shared
    /// between parts.
    pub fn compound(parts: &[MemoryShape]) -> Self {
        let mut shape = Self {
            shape_type: ShapeType::Compound,
            vertices: Vec::new(),
            edges: Vec::new(),
            faces: Vec::new(),
            solids: Vec::new(),
        };
        for part in parts {
            let base = shape.vertices.len();
            let shift = |list: &[Vec<usize>]| -> Vec<Vec<usize>> {
                list.iter()
                    .map(|vs| vs.iter().map(|v| v + base).collect())
                    .collect()
            };
            shape.edges.extend(shift(&part.edges));
            shape.faces.extend(shift(&part.faces));
            shape.solids.extend(shift(&part.solids));
            shape.vertices.extend(part.vertices.iter().copied());
        }
        shape
    }

    /// Same shape with a different top-level type.
    pub fn with_shape_type(mut self, shape_type: ShapeType) -> Self {
        self.shape_type = shape_type;
        self
    }

    /// Same geometry with every subshape list and every corner list
    /// reversed, as a kernel that renumbers on import would produce.
    pub fn renumbered(&self) -> Self {
        let n = self.vertices.len();
        let remap = |list: &[Vec<usize>]| -> Vec<Vec<usize>> {
            list.iter()
                .rev()
                .map(|vs| vs.iter().rev().map(|v| n - 1 - v).collect())
                .collect()
        };
        Self {
            shape_type: self.shape_type,
            vertices: self.vertices.iter().rev().copied().collect(),
            edges: remap(&self.edges),
            faces: remap(&self.faces),
            solids: remap(&self.solids),
        }
    }

    /// Same topology moved by the given offsets.
    pub fn translated(&self, dx: f64, dy: f64, dz: f64) -> Self {
        let mut shape = self.clone();
        for p in shape.vertices.iter_mut().flatten() {
            *p = p.offset(dx, dy, dz);
        }
        shape
    }
}
