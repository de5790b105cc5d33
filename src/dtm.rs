//! Triangulated terrain surface built from scattered survey points.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, project_point_onto_segment, Point, Point3};
use crate::point_database::SurveyPoint;

/// A surface triangle carrying coordinate and elevation corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Triangle(pub [Point3; 3]);

impl Triangle {
    pub fn new(a: Point3, b: Point3, c: Point3) -> Self {
        Self([a, b, c])
    }

    /// Plan-view (XY) area of the triangle.
    pub fn planar_area(&self) -> f64 {
        let [a, b, c] = self.0;
        0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)).abs()
    }

    /// A triangle is degenerate when its corners are collinear in plan view.
    /// Degenerate triangles are tolerated in the mesh but excluded from
    /// area-dependent computation.
    pub fn is_degenerate(&self) -> bool {
        self.planar_area() < 1e-12
    }
}

fn barycentric(x: f64, y: f64, tri: &Triangle) -> Option<(f64, f64, f64)> {
    let [a, b, c] = tri.0;
    let det = (b.y - c.y) * (a.x - c.x) + (c.x - b.x) * (a.y - c.y);
    if det.abs() < 1e-12 {
        return None;
    }
    let u = ((b.y - c.y) * (x - c.x) + (c.x - b.x) * (y - c.y)) / det;
    let v = ((c.y - a.y) * (x - c.x) + (a.x - c.x) * (y - c.y)) / det;
    Some((u, v, 1.0 - u - v))
}

#[derive(Debug, Clone, Default)]
struct TriangulationCache {
    fingerprint: Option<u64>,
    triangles: Vec<Triangle>,
}

/// Terrain surface model owning its point set, optional boundary polylines
/// and a list of manually drawn triangles.
///
/// The automatic mesh is memoized against a fingerprint of the point set and
/// rebuilt only when a mutation changes it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurfaceModel {
    #[serde(default)]
    points: Vec<SurveyPoint>,
    #[serde(default)]
    boundaries: Vec<Vec<usize>>,
    #[serde(rename = "triangles", default)]
    manual_triangles: Vec<[usize; 3]>,
    #[serde(skip)]
    cache: TriangulationCache,
}

impl SurfaceModel {
    /// Creates a surface model from survey points.
    pub fn new(points: Vec<SurveyPoint>) -> Self {
        Self {
            points,
            ..Default::default()
        }
    }

    /// Returns a slice of the surface points.
    pub fn points(&self) -> &[SurveyPoint] {
        &self.points
    }

    /// Returns the boundary index polylines.
    pub fn boundaries(&self) -> &[Vec<usize>] {
        &self.boundaries
    }

    /// Replaces the boundary index polylines.
    pub fn set_boundaries(&mut self, boundaries: Vec<Vec<usize>>) {
        self.boundaries = boundaries;
    }

    /// Returns the manually drawn triangles as point-index triples.
    pub fn manual_triangles(&self) -> &[[usize; 3]] {
        &self.manual_triangles
    }

    /// Adds a point and returns its index.
    pub fn add_point(&mut self, point: SurveyPoint) -> usize {
        self.points.push(point);
        self.invalidate();
        self.points.len() - 1
    }

    /// Updates an existing point.
    pub fn update_point(&mut self, index: usize, point: SurveyPoint) -> bool {
        if let Some(p) = self.points.get_mut(index) {
            *p = point;
            self.invalidate();
            true
        } else {
            false
        }
    }

    /// Removes the point at the given index. Manual triangles referencing the
    /// removed point are left as-is; materialization skips them.
    pub fn remove_point(&mut self, index: usize) -> Option<SurveyPoint> {
        if index >= self.points.len() {
            return None;
        }
        self.invalidate();
        Some(self.points.remove(index))
    }

    /// Adds a manual triangle over three existing point indices. Returns
    /// `false` when a triangle over the same vertex set already exists.
    pub fn add_triangle(&mut self, a: usize, b: usize, c: usize) -> bool {
        let exists = self.manual_triangles.iter().any(|t| {
            let mut lhs = [t[0], t[1], t[2]];
            let mut rhs = [a, b, c];
            lhs.sort_unstable();
            rhs.sort_unstable();
            lhs == rhs
        });
        if exists {
            return false;
        }
        self.manual_triangles.push([a, b, c]);
        self.invalidate();
        true
    }

    /// Removes the manual triangle at `index` if it exists.
    pub fn remove_triangle(&mut self, index: usize) -> Option<[usize; 3]> {
        if index >= self.manual_triangles.len() {
            return None;
        }
        self.invalidate();
        Some(self.manual_triangles.remove(index))
    }

    /// Finds the manual triangle whose nearest edge lies within `max_dist`
    /// of `p`, for edge-targeted deletion.
    pub fn triangle_near_edge(&self, p: Point, max_dist: f64) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        for (idx, tri) in self.manual_triangles.iter().enumerate() {
            let Some(t) = self.materialize(tri) else {
                continue;
            };
            for i in 0..3 {
                let a = t.0[i];
                let b = t.0[(i + 1) % 3];
                let (proj, _) = project_point_onto_segment(
                    p,
                    Point::new(a.x, a.y),
                    Point::new(b.x, b.y),
                    true,
                );
                let d = distance(p, proj);
                if best.map_or(true, |(_, bd)| d < bd) {
                    best = Some((idx, d));
                }
            }
        }
        best.filter(|&(_, d)| d <= max_dist).map(|(idx, _)| idx)
    }

    /// Removes the manual triangle whose nearest edge lies within `max_dist`
    /// of `p`.
    pub fn remove_triangle_near_edge(&mut self, p: Point, max_dist: f64) -> Option<[usize; 3]> {
        let index = self.triangle_near_edge(p, max_dist)?;
        self.remove_triangle(index)
    }

    /// Returns the triangulated mesh: the automatic triangulation of the
    /// point set concatenated with the manual triangles. The result is
    /// cached against a fingerprint of the point coordinates.
    pub fn triangulation(&mut self) -> &[Triangle] {
        let fp = self.fingerprint();
        if self.cache.fingerprint == Some(fp) {
            log::debug!("surface mesh served from cache");
            return &self.cache.triangles;
        }
        log::debug!("rebuilding surface mesh for {} points", self.points.len());
        let mut triangles = self.triangulate_auto();
        triangles.extend(self.manual_triangles.iter().filter_map(|t| self.materialize(t)));
        self.cache = TriangulationCache {
            fingerprint: Some(fp),
            triangles,
        };
        &self.cache.triangles
    }

    /// Interpolated surface elevation at `(x, y)`.
    ///
    /// Barycentric interpolation inside the containing triangle; when the
    /// location falls outside the mesh the average elevation of the nearest
    /// triangle is used, then the nearest point's elevation.
    pub fn elevation_at(&mut self, x: f64, y: f64) -> Option<f64> {
        let mut best: Option<(f64, f64)> = None;
        for tri in self.triangulation() {
            let [a, b, c] = tri.0;
            if let Some((u, v, w)) = barycentric(x, y, tri) {
                if u >= -1e-9 && v >= -1e-9 && w >= -1e-9 {
                    return Some(u * a.z + v * b.z + w * c.z);
                }
            }
            let mx = (a.x + b.x + c.x) / 3.0;
            let my = (a.y + b.y + c.y) / 3.0;
            let d = (mx - x).powi(2) + (my - y).powi(2);
            if best.map_or(true, |(bd, _)| d < bd) {
                best = Some((d, (a.z + b.z + c.z) / 3.0));
            }
        }
        if let Some((_, z)) = best {
            return Some(z);
        }
        self.points
            .iter()
            .map(|p| ((p.x - x).powi(2) + (p.y - y).powi(2), p.z))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, z)| z)
    }

    /// Total plan-view area covered by the mesh, excluding degenerate
    /// triangles.
    pub fn planar_area(&mut self) -> f64 {
        self.triangulation()
            .iter()
            .filter(|t| !t.is_degenerate())
            .map(Triangle::planar_area)
            .sum()
    }

    fn invalidate(&mut self) {
        self.cache = TriangulationCache::default();
    }

    fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        for p in &self.points {
            p.x.to_bits().hash(&mut hasher);
            p.y.to_bits().hash(&mut hasher);
            p.z.to_bits().hash(&mut hasher);
        }
        hasher.finish()
    }

    fn materialize(&self, tri: &[usize; 3]) -> Option<Triangle> {
        let a = self.points.get(tri[0])?;
        let b = self.points.get(tri[1])?;
        let c = self.points.get(tri[2])?;
        Some(Triangle::new(
            Point3::new(a.x, a.y, a.z),
            Point3::new(b.x, b.y, b.z),
            Point3::new(c.x, c.y, c.z),
        ))
    }

    fn triangulate_auto(&self) -> Vec<Triangle> {
        if self.points.len() < 3 {
            return Vec::new();
        }
        let coords: Vec<delaunator::Point> = self
            .points
            .iter()
            .map(|p| delaunator::Point { x: p.x, y: p.y })
            .collect();
        let triangulation = delaunator::triangulate(&coords);
        if triangulation.triangles.is_empty() {
            return self.fan_fallback();
        }
        triangulation
            .triangles
            .chunks(3)
            .map(|c| {
                let v = |i: usize| {
                    let p = &self.points[i];
                    Point3::new(p.x, p.y, p.z)
                };
                Triangle::new(v(c[0]), v(c[1]), v(c[2]))
            })
            .collect()
    }

    /// Fan triangulation anchored at the centroid, used when the Delaunay
    /// pass produces no triangles (degenerate plan footprint). Each fan
    /// vertex takes the elevation of its nearest source point, a documented
    /// degraded-accuracy path.
    fn fan_fallback(&self) -> Vec<Triangle> {
        let n = self.points.len();
        let cx = self.points.iter().map(|p| p.x).sum::<f64>() / n as f64;
        let cy = self.points.iter().map(|p| p.y).sum::<f64>() / n as f64;
        let nearest_z = |x: f64, y: f64| {
            self.points
                .iter()
                .map(|p| ((p.x - x).powi(2) + (p.y - y).powi(2), p.z))
                .min_by(|a, b| a.0.total_cmp(&b.0))
                .map(|(_, z)| z)
                .unwrap_or(0.0)
        };
        (0..n)
            .map(|i| {
                let a = &self.points[i];
                let b = &self.points[(i + 1) % n];
                Triangle::new(
                    Point3::new(cx, cy, nearest_z(cx, cy)),
                    Point3::new(a.x, a.y, nearest_z(a.x, a.y)),
                    Point3::new(b.x, b.y, nearest_z(b.x, b.y)),
                )
            })
            .collect()
    }
}
