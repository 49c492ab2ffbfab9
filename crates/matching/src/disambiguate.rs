//! Which recorded sub-solid (or edge, or face) a re-imported shape is.
//!
//! A snapshot geometry that held several solids with different properties
//! may come back from the exchange file as several separate geometries with
//! the same base name. Each one is compared, by its full vertex set, against
//! the groups recorded in the snapshot.

use host_model::ShapeIntrospect;
use propsync_types::{GeometryRecord, Point3, PropertyKind, ShapeType, SubshapeKind};
use tracing::debug;

use crate::compare::Tolerance;

/// The recorded vertex set of one captured subshape.
#[derive(Debug, Clone, PartialEq)]
pub struct SubshapeGroup {
    /// Captured subshape index, used only as a grouping key.
    pub index: usize,
    pub points: Vec<Option<Point3>>,
}

/// Result of matching a live shape against the recorded groups.
#[derive(Debug, Clone, PartialEq)]
pub enum Disambiguation {
    /// The shape type is not composite, or no groups were recorded.
    NotApplicable,
    /// The live shape is the recorded group with this index.
    Resolved {
        kind: SubshapeKind,
        index: usize,
        points: Vec<Option<Point3>>,
    },
    /// No group matched. Every group is replayed.
    Unresolved { kind: SubshapeKind, groups: usize },
}

impl Disambiguation {
    /// Whether an assignment record should be replayed onto the live shape.
    ///
    /// Vertex records always pass. Records of the disambiguated kind pass when
    /// they carry the resolved index. Records of other kinds pass when all of
    /// their corners lie on the resolved group.
    pub fn admits(
        &self,
        kind: SubshapeKind,
        recorded_index: Option<usize>,
        corners: &[Option<Point3>],
        tol: &Tolerance,
    ) -> bool {
        let Disambiguation::Resolved {
            kind: group_kind,
            index,
            points,
        } = self
        else {
            return true;
        };
        if kind == SubshapeKind::Vertex {
            return true;
        }
        if kind == *group_kind {
            return recorded_index == Some(*index);
        }
        !corners.is_empty()
            && corners
                .iter()
                .all(|&c| points.iter().any(|&p| tol.points_match(c, p)))
    }
}

/// The groups recorded for `kind`: physical then element records, keyed by
/// subshape index in first-seen order. Each group takes the first non-empty
/// vertex set recorded for its index.
pub fn recorded_groups(record: &GeometryRecord, kind: SubshapeKind) -> Vec<SubshapeGroup> {
    let mut groups: Vec<SubshapeGroup> = Vec::new();
    for pk in PropertyKind::ALL {
        for assignment in record.assignments_of(pk, kind) {
            let Some(index) = assignment.subshape_index(kind) else {
                continue;
            };
            if groups.iter().any(|g| g.index == index) {
                continue;
            }
            let points = assignment.target_points(kind);
            if !points.is_empty() {
                groups.push(SubshapeGroup { index, points });
            }
        }
    }
    groups
}

/// Decide which recorded group a live shape corresponds to.
///
/// The composite kind comes from the recorded shape type, falling back to
/// the live shape type when the snapshot did not record one. A group matches
/// when its size equals the number of live vertices and every recorded point
/// is found among them.
pub fn disambiguate(
    record: &GeometryRecord,
    shape: &dyn ShapeIntrospect,
    tol: &Tolerance,
) -> Disambiguation {
    let shape_type = record
        .shape_type
        .filter(|t| *t != ShapeType::Unknown)
        .unwrap_or_else(|| shape.shape_type());
    let Some(kind) = shape_type.disambiguation_kind() else {
        return Disambiguation::NotApplicable;
    };

    let groups = recorded_groups(record, kind);
    if groups.is_empty() {
        return Disambiguation::NotApplicable;
    }

    let live: Vec<Option<Point3>> = shape.vertex_points().into_iter().map(Some).collect();
    for group in &groups {
        if group.points.len() != live.len() {
            continue;
        }
        if group
            .points
            .iter()
            .all(|&p| live.iter().any(|&l| tol.points_match(p, l)))
        {
            debug!(%kind, index = group.index, "group resolved");
            return Disambiguation::Resolved {
                kind,
                index: group.index,
                points: group.points.clone(),
            };
        }
    }

    Disambiguation::Unresolved {
        kind,
        groups: groups.len(),
    }
}
