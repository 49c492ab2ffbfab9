use serde::{Deserialize, Serialize};

/// A position in the model's working units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Copy of this point shifted by the given offsets.
    pub fn offset(&self, dx: f64, dy: f64, dz: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.z + dz)
    }
}

impl From<[f64; 3]> for Point3 {
    fn from(p: [f64; 3]) -> Self {
        Self::new(p[0], p[1], p[2])
    }
}

/// Vertex coordinates as written to a snapshot.
///
/// An axis is null when the host could not report the vertex position at
/// capture time. Such coordinates never match anything.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coordinates {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub z: Option<f64>,
}

impl Coordinates {
    /// Coordinates for a vertex whose position could not be read.
    pub fn missing() -> Self {
        Self::default()
    }

    /// The recorded point, if all three axes are present.
    pub fn point(&self) -> Option<Point3> {
        Some(Point3::new(self.x?, self.y?, self.z?))
    }
}

impl From<Point3> for Coordinates {
    fn from(p: Point3) -> Self {
        Self {
            x: Some(p.x),
            y: Some(p.y),
            z: Some(p.z),
        }
    }
}

impl From<Option<Point3>> for Coordinates {
    fn from(p: Option<Point3>) -> Self {
        p.map(Coordinates::from).unwrap_or_default()
    }
}
