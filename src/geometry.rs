//! Basic geometry primitives and pure helper functions.

use std::f64::consts::PI;

/// Representation of a 2D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Representation of a 3D point.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// Calculates the Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Returns the heading from `a` to `b` in radians within (-pi, pi].
pub fn bearing(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x)
}

/// Rotates `p` around `origin` by `angle` radians.
pub fn rotate(p: Point, angle: f64, origin: Point) -> Point {
    let (x, y) = (p.x - origin.x, p.y - origin.y);
    let (sa, ca) = angle.sin_cos();
    Point::new(x * ca - y * sa + origin.x, x * sa + y * ca + origin.y)
}

/// Normalizes an angle to the interval (-pi, pi].
pub fn normalize_angle(a: f64) -> f64 {
    let mut a = a % (2.0 * PI);
    if a <= -PI {
        a += 2.0 * PI;
    } else if a > PI {
        a -= 2.0 * PI;
    }
    a
}

/// Projects `p` onto the segment from `a` to `b` and returns the projected
/// point together with the interpolation parameter `t`. When `clamp` is true
/// `t` is limited to [0, 1], otherwise it may fall outside the segment. A
/// zero-length segment yields `(a, 0.0)`.
pub fn project_point_onto_segment(p: Point, a: Point, b: Point, clamp: bool) -> (Point, f64) {
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let len2 = dx * dx + dy * dy;
    if len2 == 0.0 {
        return (a, 0.0);
    }
    let t = ((p.x - a.x) * dx + (p.y - a.y) * dy) / len2;
    let t = if clamp { t.clamp(0.0, 1.0) } else { t };
    (Point::new(a.x + t * dx, a.y + t * dy), t)
}

/// Representation of a series of connected line segments.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Polyline {
    pub vertices: Vec<Point>,
}

impl Polyline {
    /// Creates a new polyline from a list of vertices.
    pub fn new(vertices: Vec<Point>) -> Self {
        Self { vertices }
    }

    /// Returns the total length of all segments in the polyline.
    pub fn length(&self) -> f64 {
        self.vertices
            .windows(2)
            .map(|pair| distance(pair[0], pair[1]))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_3_4_5() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert_eq!(distance(a, b), 5.0);
    }

    #[test]
    fn bearing_quadrants() {
        let o = Point::new(0.0, 0.0);
        assert!((bearing(o, Point::new(1.0, 1.0)) - PI / 4.0).abs() < 1e-12);
        assert!((bearing(o, Point::new(-1.0, 0.0)) - PI).abs() < 1e-12);
        assert!((bearing(o, Point::new(0.0, -1.0)) + PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_about_origin() {
        let p = rotate(Point::new(1.0, 0.0), PI / 2.0, Point::new(0.0, 0.0));
        assert!(p.x.abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rotate_about_offset_origin() {
        let p = rotate(Point::new(2.0, 1.0), PI, Point::new(1.0, 1.0));
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y - 1.0).abs() < 1e-12);
    }

    #[test]
    fn normalize_angle_interval() {
        assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
        assert!((normalize_angle(PI / 4.0) - PI / 4.0).abs() < 1e-12);
        assert!((normalize_angle(-3.0 * PI / 2.0) - PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn projection_clamped_and_free() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        let (p, t) = project_point_onto_segment(Point::new(12.0, 3.0), a, b, true);
        assert_eq!(p, b);
        assert_eq!(t, 1.0);
        let (p, t) = project_point_onto_segment(Point::new(12.0, 3.0), a, b, false);
        assert!((p.x - 12.0).abs() < 1e-12);
        assert!((t - 1.2).abs() < 1e-12);
    }

    #[test]
    fn projection_degenerate_segment() {
        let a = Point::new(2.0, 2.0);
        let (p, t) = project_point_onto_segment(Point::new(5.0, 5.0), a, a, true);
        assert_eq!(p, a);
        assert_eq!(t, 0.0);
    }

    #[test]
    fn polyline_length() {
        let pl = Polyline::new(vec![
            Point::new(0.0, 0.0),
            Point::new(3.0, 4.0),
            Point::new(6.0, 8.0),
        ]);
        assert!((pl.length() - 10.0).abs() < 1e-6);
    }
}
