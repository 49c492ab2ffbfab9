//! Subshape lookup by corner coordinates.
//!
//! Every lookup scans the subshapes of one kind in ascending index order and
//! returns the first whose vertex set matches the target, so the lowest index
//! wins among geometrically identical subshapes.

use host_model::ShapeIntrospect;
use propsync_types::{Point3, SubshapeKind};
use tracing::debug;

use crate::compare::Tolerance;

/// Find the subshape of `kind` whose corners match `target`.
///
/// Returns `None` when the target is empty or no subshape matches. Vertex
/// lookups compare the single target point against each vertex position.
/// A candidate whose vertices cannot be enumerated is skipped.
pub fn locate_subshape(
    shape: &dyn ShapeIntrospect,
    kind: SubshapeKind,
    target: &[Option<Point3>],
    tol: &Tolerance,
) -> Option<usize> {
    match kind {
        SubshapeKind::Vertex => match target {
            [point] => find_vertex(shape, *point, tol),
            _ => None,
        },
        SubshapeKind::Edge => find_edge(shape, target, tol),
        SubshapeKind::Face => find_face(shape, target, tol),
        SubshapeKind::Solid => find_solid(shape, target, tol),
    }
}

/// First vertex at `target`.
pub fn find_vertex(
    shape: &dyn ShapeIntrospect,
    target: Option<Point3>,
    tol: &Tolerance,
) -> Option<usize> {
    target?;
    (0..shape.subshape_count(SubshapeKind::Vertex))
        .find(|&v| tol.points_match(shape.vertex_position(v), target))
}

/// First edge whose end points match `target`.
pub fn find_edge(
    shape: &dyn ShapeIntrospect,
    target: &[Option<Point3>],
    tol: &Tolerance,
) -> Option<usize> {
    scan(shape, SubshapeKind::Edge, target, tol)
}

/// First face whose corners match `target`.
pub fn find_face(
    shape: &dyn ShapeIntrospect,
    target: &[Option<Point3>],
    tol: &Tolerance,
) -> Option<usize> {
    scan(shape, SubshapeKind::Face, target, tol)
}

/// First solid whose vertex set matches `target`.
pub fn find_solid(
    shape: &dyn ShapeIntrospect,
    target: &[Option<Point3>],
    tol: &Tolerance,
) -> Option<usize> {
    scan(shape, SubshapeKind::Solid, target, tol)
}

fn scan(
    shape: &dyn ShapeIntrospect,
    kind: SubshapeKind,
    target: &[Option<Point3>],
    tol: &Tolerance,
) -> Option<usize> {
    if target.is_empty() {
        return None;
    }
    (0..shape.subshape_count(kind)).find(|&index| match shape.subshape_points(kind, index) {
        Ok(corners) => tol.corners_match(&corners, target),
        Err(err) => {
            debug!(%kind, index, error = %err, "skipping candidate");
            false
        }
    })
}
