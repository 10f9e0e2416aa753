use std::fmt;

/// Ellipse fitted to a contour, in working-grid pixel units
///
/// Axis lengths are full lengths (not semi-axes) with `major_axis >= minor_axis`.
/// `angle` is the orientation of the major axis in degrees, in `[0, 180)`,
/// measured from the +x (column) axis towards +y (row).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipse {
    pub center: (f64, f64),
    pub major_axis: f64,
    pub minor_axis: f64,
    pub angle: f64,
}

impl Ellipse {
    /// Point on the ellipse boundary at parameter `t` (radians)
    pub fn point_at(&self, t: f64) -> (f64, f64) {
        let (sin_a, cos_a) = self.angle.to_radians().sin_cos();
        let a = self.major_axis / 2.0;
        let b = self.minor_axis / 2.0;
        let (x, y) = (a * t.cos(), b * t.sin());
        (
            self.center.0 + x * cos_a - y * sin_a,
            self.center.1 + x * sin_a + y * cos_a,
        )
    }
}

impl fmt::Display for Ellipse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ellipse at ({:.1}, {:.1}), axes {:.1} x {:.1} px, angle {:.1} deg",
            self.center.0, self.center.1, self.major_axis, self.minor_axis, self.angle
        )
    }
}

/// Axis-aligned bounding rectangle, in working-grid pixels
///
/// `width`/`height` count pixels inclusively, so a single pixel has size 1x1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "box at ({}, {}), {} x {} px",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Geometric primitive derived from exactly one contour
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "json", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "json", serde(tag = "shape", rename_all = "snake_case"))]
pub enum GeometricFit {
    Ellipse(Ellipse),
    BoundingBox(BoundingBox),
}

impl GeometricFit {
    pub fn as_ellipse(&self) -> Option<&Ellipse> {
        match self {
            GeometricFit::Ellipse(e) => Some(e),
            GeometricFit::BoundingBox(_) => None,
        }
    }

    pub fn as_bounding_box(&self) -> Option<&BoundingBox> {
        match self {
            GeometricFit::BoundingBox(b) => Some(b),
            GeometricFit::Ellipse(_) => None,
        }
    }
}

impl fmt::Display for GeometricFit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeometricFit::Ellipse(e) => write!(f, "{}", e),
            GeometricFit::BoundingBox(b) => write!(f, "{}", b),
        }
    }
}
