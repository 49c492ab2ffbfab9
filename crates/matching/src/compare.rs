use propsync_types::Point3;
use serde::{Deserialize, Serialize};

/// Default per-axis coordinate tolerance, in model units.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Per-axis tolerance for deciding that two recorded points are the same.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    /// Points whose coordinates all differ by less than this coincide.
    pub coincidence: f64,
}

impl Default for Tolerance {
    fn default() -> Self {
        Self {
            coincidence: DEFAULT_TOLERANCE,
        }
    }
}

impl Tolerance {
    pub fn new(coincidence: f64) -> Self {
        Self { coincidence }
    }

    /// True iff both points are present and every axis differs by less
    /// than the tolerance. Absent points never match.
    pub fn points_match(&self, a: Option<Point3>, b: Option<Point3>) -> bool {
        match (a, b) {
            (Some(a), Some(b)) => points_equal(&a, &b, self.coincidence),
            _ => false,
        }
    }

    /// Cardinality gate plus containment: the sets have the same size and
    /// every target point matches some candidate point. Order is ignored.
    pub fn corners_match(&self, candidate: &[Option<Point3>], target: &[Option<Point3>]) -> bool {
        candidate.len() == target.len()
            && target
                .iter()
                .all(|&t| candidate.iter().any(|&c| self.points_match(t, c)))
    }
}

/// Per-axis strict comparison. NaN coordinates never match.
pub fn points_equal(a: &Point3, b: &Point3, eps: f64) -> bool {
    (a.x - b.x).abs() < eps && (a.y - b.y).abs() < eps && (a.z - b.z).abs() < eps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_tolerance_matches() {
        let tol = Tolerance::default();
        let a = Point3::new(1.0, 2.0, 3.0);
        assert!(tol.points_match(Some(a), Some(a.offset(5e-7, -5e-7, 0.0))));
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let tol = Tolerance::new(0.5);
        let a = Point3::new(0.0, 0.0, 0.0);
        assert!(!tol.points_match(Some(a), Some(Point3::new(0.5, 0.0, 0.0))));
        assert!(tol.points_match(Some(a), Some(Point3::new(0.25, 0.25, 0.25))));
    }

    #[test]
    fn test_absent_never_matches() {
        let tol = Tolerance::default();
        let a = Point3::new(0.0, 0.0, 0.0);
        assert!(!tol.points_match(None, Some(a)));
        assert!(!tol.points_match(Some(a), None));
        assert!(!tol.points_match(None, None));
    }

    #[test]
    fn test_nan_never_matches() {
        let a = Point3::new(f64::NAN, 0.0, 0.0);
        assert!(!points_equal(&a, &a, 1.0));
    }

    #[test]
    fn test_corners_require_same_cardinality() {
        let tol = Tolerance::default();
        let p = Some(Point3::new(0.0, 0.0, 0.0));
        let q = Some(Point3::new(1.0, 0.0, 0.0));
        assert!(tol.corners_match(&[q, p], &[p, q]));
        assert!(!tol.corners_match(&[p, q, q], &[p, q]));
        assert!(!tol.corners_match(&[p], &[p, q]));
    }
}
