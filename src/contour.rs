//! Elevation contour extraction from a triangulated surface.

use serde::{Deserialize, Serialize};

use crate::dtm::Triangle;
use crate::geometry::{distance, Point};

/// All contour segments found at one elevation level.
///
/// Segments are an unordered bag of independent edge crossings; assembling
/// them into connected polylines is left to consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelContour {
    pub level: f64,
    pub segments: Vec<(Point, Point)>,
}

fn round_level(level: f64) -> f64 {
    (level * 1e9).round() / 1e9
}

/// Computes the elevation levels for a surface spanning `min_z..=max_z`.
///
/// Main levels start at `floor(min_z / main_interval) * main_interval` and
/// step by `main_interval` through `max_z` (inclusive within a small
/// epsilon). When `sub_divisions > 0` that many evenly spaced intermediate
/// levels are woven between each consecutive pair of main levels; none are
/// added past the last main level.
pub fn contour_levels(
    min_z: f64,
    max_z: f64,
    main_interval: f64,
    sub_divisions: usize,
) -> Vec<f64> {
    if main_interval <= 0.0 || min_z == max_z {
        return Vec::new();
    }
    let mut levels = Vec::new();
    let mut level = (min_z / main_interval).floor() * main_interval;
    while level <= max_z + 1e-9 {
        levels.push(round_level(level));
        level += main_interval;
    }
    if sub_divisions > 0 && levels.len() > 1 {
        let mut woven = Vec::new();
        for pair in levels.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            woven.push(a);
            let step = (b - a) / (sub_divisions as f64 + 1.0);
            for j in 1..=sub_divisions {
                woven.push(round_level(a + j as f64 * step));
            }
        }
        woven.push(*levels.last().unwrap());
        levels = woven;
    }
    levels
}

/// Intersects each elevation level plane with the mesh edges and collects
/// the resulting iso-line segments per level.
///
/// A flat mesh yields an empty result, as does a non-positive interval.
pub fn contour_segments(
    triangles: &[Triangle],
    main_interval: f64,
    sub_divisions: usize,
) -> Vec<LevelContour> {
    if triangles.is_empty() || main_interval <= 0.0 {
        return Vec::new();
    }
    let min_z = triangles
        .iter()
        .flat_map(|t| t.0.iter().map(|v| v.z))
        .fold(f64::INFINITY, f64::min);
    let max_z = triangles
        .iter()
        .flat_map(|t| t.0.iter().map(|v| v.z))
        .fold(f64::NEG_INFINITY, f64::max);
    let levels = contour_levels(min_z, max_z, main_interval, sub_divisions);

    let mut out: Vec<LevelContour> = levels
        .iter()
        .map(|&level| LevelContour {
            level,
            segments: Vec::new(),
        })
        .collect();
    for tri in triangles {
        for entry in &mut out {
            if let Some(seg) = triangle_crossing(tri, entry.level) {
                entry.segments.push(seg);
            }
        }
    }
    out
}

/// Returns the segment where `level` crosses the triangle, if any.
///
/// An edge whose endpoints straddle the level contributes one linearly
/// interpolated crossing point; edges lying in the level plane (|dz| below
/// epsilon) are skipped to avoid a degenerate division.
fn triangle_crossing(tri: &Triangle, level: f64) -> Option<(Point, Point)> {
    let mut crossings = Vec::new();
    for i in 0..3 {
        let a = tri.0[i];
        let b = tri.0[(i + 1) % 3];
        if (a.z < level && b.z < level) || (a.z > level && b.z > level) {
            continue;
        }
        if (b.z - a.z).abs() < 1e-12 {
            continue;
        }
        let t = (level - a.z) / (b.z - a.z);
        if (0.0..=1.0).contains(&t) {
            crossings.push(Point::new(a.x + (b.x - a.x) * t, a.y + (b.y - a.y) * t));
        }
    }
    if crossings.len() >= 2 && distance(crossings[0], crossings[1]) > 1e-9 {
        Some((crossings[0], crossings[1]))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point3;

    fn tilted_quad() -> Vec<Triangle> {
        // two triangles over a unit square, z rising linearly with y
        vec![
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
            ),
            Triangle::new(
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 1.0),
                Point3::new(0.0, 1.0, 1.0),
            ),
        ]
    }

    #[test]
    fn flat_mesh_yields_no_contours() {
        let tris = vec![Triangle::new(
            Point3::new(0.0, 0.0, 2.0),
            Point3::new(1.0, 0.0, 2.0),
            Point3::new(0.0, 1.0, 2.0),
        )];
        assert!(contour_segments(&tris, 0.5, 0).is_empty());
    }

    #[test]
    fn level_count_matches_span() {
        let levels = contour_levels(0.0, 1.0, 0.25, 0);
        assert_eq!(levels.len(), 5);
        assert!((levels[0] - 0.0).abs() < 1e-12);
        assert!((levels[4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn levels_start_below_min() {
        let levels = contour_levels(0.3, 1.0, 0.5, 0);
        assert!((levels[0] - 0.0).abs() < 1e-12);
        assert!((levels[1] - 0.5).abs() < 1e-12);
        assert!((levels[2] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn sub_divisions_weave_between_mains() {
        let levels = contour_levels(0.0, 1.0, 1.0, 1);
        assert_eq!(levels.len(), 3);
        assert!((levels[1] - 0.5).abs() < 1e-12);
        // none past the last main level
        assert!((levels.last().unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tilted_mesh_produces_segments_per_level() {
        let contours = contour_segments(&tilted_quad(), 0.25, 0);
        assert_eq!(contours.len(), 5);
        let mid = contours.iter().find(|c| (c.level - 0.5).abs() < 1e-9).unwrap();
        assert!(!mid.segments.is_empty());
        // iso-line of z = y at 0.5 lies on y == 0.5
        for (a, b) in &mid.segments {
            assert!((a.y - 0.5).abs() < 1e-9);
            assert!((b.y - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn non_positive_interval_is_degenerate() {
        assert!(contour_segments(&tilted_quad(), 0.0, 2).is_empty());
        assert!(contour_levels(0.0, 1.0, -1.0, 0).is_empty());
    }

    #[test]
    fn edge_on_level_is_skipped() {
        // bottom edge lies exactly on level 0; it must not divide by dz == 0.
        // The two side edges still cross at the base corners.
        let tris = vec![Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.5, 1.0, 1.0),
        )];
        let contours = contour_segments(&tris, 0.5, 0);
        let at_zero = contours.iter().find(|c| c.level == 0.0).unwrap();
        assert_eq!(at_zero.segments.len(), 1);
        let (a, b) = at_zero.segments[0];
        assert!(a.y.abs() < 1e-9 && b.y.abs() < 1e-9);
    }
}
