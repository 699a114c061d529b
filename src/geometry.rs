// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Planar geometry helpers used by the pose analyzers

/// A point in image pixel coordinates (y grows downwards).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point, in pixels.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.hypot(dy)
    }

    /// Direction of the ray `self → to`, in radians.
    #[must_use]
    pub fn heading(self, to: Self) -> f64 {
        (f64::from(to.y) - f64::from(self.y)).atan2(f64::from(to.x) - f64::from(self.x))
    }
}

/// A point with depth, as reported by detectors that estimate 3-D pose.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    /// Create a new point.
    #[must_use]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Angle at vertex `b` between rays `b → a` and `b → c`, in degrees.
///
/// The raw difference of headings is made positive and folded so that the result
/// always lies in `[0, 180]`: values above 180 are reported as `360 - angle`.
/// The result is symmetric in `a` and `c`.
///
/// # Arguments
///
/// * `a` - End of the first ray
/// * `b` - Vertex
/// * `c` - End of the second ray
#[must_use]
pub fn vertex_angle(a: Point2, b: Point2, c: Point2) -> f64 {
    let angle = (b.heading(c) - b.heading(a)).to_degrees().abs();
    if angle > 180.0 {
        360.0 - angle
    } else {
        angle
    }
}

/// Signed angle from the heading of `reference` to the heading of `ray`, in degrees,
/// normalized into `[0, 360)`.
///
/// Both arguments are `(from, to)` pairs.
#[must_use]
pub fn heading_difference(ray: (Point2, Point2), reference: (Point2, Point2)) -> f64 {
    let angle = (ray.0.heading(ray.1) - reference.0.heading(reference.1)).to_degrees();
    normalize_degrees(angle)
}

/// Bring a heading difference in `(-360, 360)` into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(angle: f64) -> f64 {
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}
