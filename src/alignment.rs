//! Horizontal alignment elements and their ordered container.

use std::collections::HashSet;
use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

use crate::geometry::{distance, normalize_angle, Point, Polyline};

/// Geometric infeasibility detected while constructing an element.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("arc endpoints coincide; chord length is zero")]
    ZeroChord,
    #[error("radius {radius} is too small for chord length {chord}")]
    ChordExceedsDiameter { chord: f64, radius: f64 },
}

/// Which side of the chord a curve bows toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    #[default]
    Left,
    Right,
}

impl<'de> Deserialize<'de> for Side {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        // anything other than "right" degrades to the left side
        let s = String::deserialize(deserializer)?;
        Ok(if s == "right" { Side::Right } else { Side::Left })
    }
}

/// Serializes a [`Point`] as a two-element `[x, y]` array.
mod point_pair {
    use super::Point;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(p: &Point, serializer: S) -> Result<S::Ok, S::Error> {
        [p.x, p.y].serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Point, D::Error> {
        let [x, y] = <[f64; 2]>::deserialize(deserializer)?;
        Ok(Point::new(x, y))
    }
}

/// Straight tangent between two points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LineSpec")]
pub struct LineElement {
    #[serde(rename = "A", with = "point_pair")]
    pub a: Point,
    #[serde(rename = "B", with = "point_pair")]
    pub b: Point,
    pub length: f64,
}

#[derive(Deserialize)]
struct LineSpec {
    #[serde(rename = "A", with = "point_pair")]
    a: Point,
    #[serde(rename = "B", with = "point_pair")]
    b: Point,
}

impl From<LineSpec> for LineElement {
    fn from(spec: LineSpec) -> Self {
        LineElement::new(spec.a, spec.b)
    }
}

impl LineElement {
    pub fn new(a: Point, b: Point) -> Self {
        Self {
            a,
            b,
            length: distance(a, b),
        }
    }

    /// Samples the tangent in `ceil(length / step)` uniform intervals,
    /// including both endpoints. A zero-length tangent yields its start
    /// point only.
    pub fn sample(&self, step: f64) -> Vec<Point> {
        if self.length <= 0.0 {
            return vec![self.a];
        }
        if step <= 0.0 {
            return vec![self.a, self.b];
        }
        let n = ((self.length / step).ceil() as usize).max(1);
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                Point::new(
                    self.a.x + (self.b.x - self.a.x) * t,
                    self.a.y + (self.b.y - self.a.y) * t,
                )
            })
            .collect()
    }
}

/// Circular curve between two tangent points with a given radius.
///
/// The center is derived from the two-point/radius construction: the chord
/// midpoint offset perpendicular to the chord, toward the requested side.
/// The rotation sense always selects the shorter of the two arcs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ArcSpec")]
pub struct ArcElement {
    #[serde(rename = "A", with = "point_pair")]
    pub a: Point,
    #[serde(rename = "B", with = "point_pair")]
    pub b: Point,
    pub radius: f64,
    pub side: Side,
    #[serde(with = "point_pair")]
    pub center: Point,
    pub start_angle: f64,
    pub end_angle: f64,
    pub ccw: bool,
    pub length: f64,
}

#[derive(Deserialize)]
struct ArcSpec {
    #[serde(rename = "A", with = "point_pair")]
    a: Point,
    #[serde(rename = "B", with = "point_pair")]
    b: Point,
    radius: f64,
    #[serde(default)]
    side: Side,
}

impl TryFrom<ArcSpec> for ArcElement {
    type Error = GeometryError;

    fn try_from(spec: ArcSpec) -> Result<Self, Self::Error> {
        ArcElement::new(spec.a, spec.b, spec.radius, spec.side)
    }
}

impl ArcElement {
    pub fn new(a: Point, b: Point, radius: f64, side: Side) -> Result<Self, GeometryError> {
        let chord = distance(a, b);
        if chord == 0.0 {
            return Err(GeometryError::ZeroChord);
        }
        if radius.abs() < chord / 2.0 {
            return Err(GeometryError::ChordExceedsDiameter { chord, radius });
        }
        let mid = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        let h = (radius * radius - (chord / 2.0).powi(2)).max(0.0).sqrt();
        let ux = -(b.y - a.y) / chord;
        let uy = (b.x - a.x) / chord;
        let center = match side {
            Side::Left => Point::new(mid.x + ux * h, mid.y + uy * h),
            Side::Right => Point::new(mid.x - ux * h, mid.y - uy * h),
        };
        let start_angle = (a.y - center.y).atan2(a.x - center.x);
        let end_angle = (b.y - center.y).atan2(b.x - center.x);
        let delta = normalize_angle(end_angle - start_angle);
        let mut ccw = delta > 0.0;
        if delta.abs() > PI {
            // the shorter arc runs the opposite way round
            ccw = !ccw;
        }
        let mut sweep = delta;
        if ccw && sweep < 0.0 {
            sweep += 2.0 * PI;
        }
        if !ccw && sweep > 0.0 {
            sweep -= 2.0 * PI;
        }
        let length = (radius * sweep).abs();
        Ok(Self {
            a,
            b,
            radius,
            side,
            center,
            start_angle,
            end_angle,
            ccw,
            length,
        })
    }

    /// Magnitude of the swept angle in (0, 2*PI].
    pub fn angular_span(&self) -> f64 {
        let mut span = if self.ccw {
            normalize_angle(self.end_angle - self.start_angle)
        } else {
            normalize_angle(self.start_angle - self.end_angle)
        };
        if span <= 0.0 {
            span += 2.0 * PI;
        }
        span
    }

    /// Samples the arc in `ceil(length / step)` uniform angular steps.
    pub fn sample(&self, step: f64) -> Vec<Point> {
        if self.length <= 0.0 || step <= 0.0 {
            return vec![self.a, self.b];
        }
        let n = ((self.length / step).ceil() as usize).max(1);
        let span = self.angular_span();
        (0..=n)
            .map(|i| {
                let t = i as f64 / n as f64;
                let ang = if self.ccw {
                    self.start_angle + span * t
                } else {
                    self.start_angle - span * t
                };
                Point::new(
                    self.center.x + self.radius * ang.cos(),
                    self.center.y + self.radius * ang.sin(),
                )
            })
            .collect()
    }
}

/// Cosmetic transition-curve approximation between two points.
///
/// Not a true clothoid: the chord is bent by a lateral `sin(pi*t)` offset
/// whose depth follows the requested spiral length and central radius. Its
/// length is the cumulative length of the cached polyline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ClothoidSpec")]
pub struct ClothoidElement {
    #[serde(rename = "P0", with = "point_pair")]
    pub p0: Point,
    #[serde(rename = "P1", with = "point_pair")]
    pub p1: Point,
    pub radius: f64,
    pub spiral_length: f64,
    pub samples: usize,
    pub side: Side,
    #[serde(skip)]
    poly: Vec<Point>,
    #[serde(skip)]
    pub length: f64,
}

#[derive(Deserialize)]
struct ClothoidSpec {
    #[serde(rename = "P0", with = "point_pair")]
    p0: Point,
    #[serde(rename = "P1", with = "point_pair")]
    p1: Point,
    radius: f64,
    #[serde(default = "default_spiral_length")]
    spiral_length: f64,
    #[serde(default = "default_samples")]
    samples: usize,
    #[serde(default)]
    side: Side,
}

fn default_spiral_length() -> f64 {
    10.0
}

fn default_samples() -> usize {
    64
}

impl From<ClothoidSpec> for ClothoidElement {
    fn from(spec: ClothoidSpec) -> Self {
        ClothoidElement::new(
            spec.p0,
            spec.p1,
            spec.radius,
            spec.spiral_length,
            spec.samples,
            spec.side,
        )
    }
}

impl ClothoidElement {
    pub fn new(
        p0: Point,
        p1: Point,
        radius: f64,
        spiral_length: f64,
        samples: usize,
        side: Side,
    ) -> Self {
        let mut element = Self {
            p0,
            p1,
            radius,
            spiral_length: spiral_length.max(0.0),
            samples: samples.max(4),
            side,
            poly: Vec::new(),
            length: 0.0,
        };
        element.poly = element.build_poly();
        element.length = Polyline::new(element.poly.clone()).length();
        element
    }

    /// Returns the cached approximation polyline.
    pub fn polyline(&self) -> &[Point] {
        &self.poly
    }

    fn build_poly(&self) -> Vec<Point> {
        let l = distance(self.p0, self.p1);
        if l <= 1e-9 {
            return vec![self.p0];
        }
        let mut ux = -(self.p1.y - self.p0.y) / l;
        let mut uy = (self.p1.x - self.p0.x) / l;
        if self.side == Side::Right {
            ux = -ux;
            uy = -uy;
        }
        let offset_scale = (self.spiral_length / l.max(1.0)) * (1.0 / self.radius.abs().max(1.0)) * 0.5;
        (0..=self.samples)
            .map(|i| {
                let t = i as f64 / self.samples as f64;
                let off = (PI * t).sin() * l * offset_scale;
                Point::new(
                    self.p0.x + (self.p1.x - self.p0.x) * t + ux * off,
                    self.p0.y + (self.p1.y - self.p0.y) * t + uy * off,
                )
            })
            .collect()
    }

    /// Re-samples the cached polyline at fixed arc-length intervals. The
    /// final vertex is always included, even on a partial last interval.
    pub fn sample(&self, step: f64) -> Vec<Point> {
        if self.poly.len() <= 1 {
            return vec![self.p0];
        }
        if step <= 0.0 {
            return self.poly.clone();
        }
        let mut out = vec![self.poly[0]];
        let mut prev = self.poly[0];
        let mut acc = 0.0;
        for &cur in &self.poly[1..] {
            let mut seg = distance(prev, cur);
            if seg <= 1e-12 {
                prev = cur;
                continue;
            }
            while acc + seg >= step {
                let r = (step - acc) / seg;
                let p = Point::new(prev.x + (cur.x - prev.x) * r, prev.y + (cur.y - prev.y) * r);
                out.push(p);
                prev = p;
                seg = distance(prev, cur);
                acc = 0.0;
            }
            acc += seg;
            prev = cur;
        }
        let last = *self.poly.last().unwrap();
        if out.last() != Some(&last) {
            out.push(last);
        }
        out
    }
}

/// Individual elements of a horizontal alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AlignmentElement {
    #[serde(rename = "line")]
    Line(LineElement),
    #[serde(rename = "arc")]
    Arc(ArcElement),
    #[serde(rename = "clothoid_poly", alias = "clothoid")]
    Clothoid(ClothoidElement),
}

impl AlignmentElement {
    pub fn length(&self) -> f64 {
        match self {
            AlignmentElement::Line(line) => line.length,
            AlignmentElement::Arc(arc) => arc.length,
            AlignmentElement::Clothoid(clothoid) => clothoid.length,
        }
    }

    pub fn sample(&self, step: f64) -> Vec<Point> {
        match self {
            AlignmentElement::Line(line) => line.sample(step),
            AlignmentElement::Arc(arc) => arc.sample(step),
            AlignmentElement::Clothoid(clothoid) => clothoid.sample(step),
        }
    }

    fn endpoints(&self) -> (Point, Point) {
        match self {
            AlignmentElement::Line(line) => (line.a, line.b),
            AlignmentElement::Arc(arc) => (arc.a, arc.b),
            AlignmentElement::Clothoid(clothoid) => {
                let poly = clothoid.polyline();
                (poly[0], *poly.last().unwrap())
            }
        }
    }
}

/// Ordered sequence of alignment elements with a cached total length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    pub name: String,
    elements: Vec<AlignmentElement>,
    #[serde(skip)]
    total_length: f64,
}

impl Alignment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            total_length: 0.0,
        }
    }

    pub fn elements(&self) -> &[AlignmentElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Total length of all elements, cached across mutations.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    fn rebuild_cache(&mut self) {
        self.total_length = self.elements.iter().map(AlignmentElement::length).sum();
    }

    /// Appends a tangent element.
    pub fn add_line(&mut self, a: Point, b: Point) {
        self.elements.push(AlignmentElement::Line(LineElement::new(a, b)));
        self.rebuild_cache();
    }

    /// Appends an arc defined by its tangent points and radius. Infeasible
    /// geometry is reported immediately and leaves the alignment unchanged.
    pub fn add_arc(
        &mut self,
        a: Point,
        b: Point,
        radius: f64,
        side: Side,
    ) -> Result<(), GeometryError> {
        let arc = ArcElement::new(a, b, radius, side)?;
        self.elements.push(AlignmentElement::Arc(arc));
        self.rebuild_cache();
        Ok(())
    }

    /// Appends a transition-curve approximation.
    pub fn add_clothoid(
        &mut self,
        p0: Point,
        p1: Point,
        radius: f64,
        spiral_length: f64,
        samples: usize,
        side: Side,
    ) {
        self.elements.push(AlignmentElement::Clothoid(ClothoidElement::new(
            p0,
            p1,
            radius,
            spiral_length,
            samples,
            side,
        )));
        self.rebuild_cache();
    }

    /// Inserts an element, clamping an out-of-range index to the end.
    pub fn insert_element(&mut self, index: usize, element: AlignmentElement) {
        let index = index.min(self.elements.len());
        self.elements.insert(index, element);
        self.rebuild_cache();
    }

    /// Removes the element at `index`; an invalid index is a no-op.
    pub fn remove_element(&mut self, index: usize) {
        if index < self.elements.len() {
            self.elements.remove(index);
            self.rebuild_cache();
        }
    }

    /// Moves an element between positions, clamping both indices.
    pub fn move_element(&mut self, from: usize, to: usize) {
        if self.elements.is_empty() {
            return;
        }
        let from = from.min(self.elements.len() - 1);
        let element = self.elements.remove(from);
        let to = to.min(self.elements.len());
        self.elements.insert(to, element);
        self.rebuild_cache();
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.rebuild_cache();
    }

    /// Samples the whole alignment with the given step. A boundary point
    /// shared between adjacent elements is emitted once only when the two
    /// samples agree exactly.
    pub fn sample(&self, step: f64) -> Vec<Point> {
        let mut points: Vec<Point> = Vec::new();
        for element in &self.elements {
            let sampled = element.sample(step);
            if sampled.is_empty() {
                continue;
            }
            if points.last() == Some(&sampled[0]) {
                points.extend_from_slice(&sampled[1..]);
            } else {
                points.extend_from_slice(&sampled);
            }
        }
        points
    }

    /// Returns the element endpoints, de-duplicated by position rounded to
    /// 1e-9 while preserving first-seen order.
    pub fn flatten_vertices(&self) -> Vec<Point> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for element in &self.elements {
            let (start, end) = element.endpoints();
            for p in [start, end] {
                let key = ((p.x * 1e9).round() as i64, (p.y * 1e9).round() as i64);
                if seen.insert(key) {
                    out.push(p);
                }
            }
        }
        out
    }

    /// Finds the flattened vertex closest to `p` within `max_dist`.
    pub fn nearest_vertex(&self, p: Point, max_dist: f64) -> Option<(usize, Point)> {
        let vertices = self.flatten_vertices();
        let best = vertices
            .iter()
            .enumerate()
            .map(|(i, &v)| (i, v, distance(p, v)))
            .min_by(|a, b| a.2.total_cmp(&b.2))?;
        if best.2 > max_dist {
            None
        } else {
            Some((best.0, best.1))
        }
    }

    /// Serializes the alignment to its JSON value form.
    pub fn to_json_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        serde_json::to_value(self)
    }

    /// Rebuilds an alignment from its JSON value form. Malformed or
    /// unknown-typed elements are skipped so one bad entry never discards
    /// the rest of the alignment.
    pub fn from_json_value(value: &serde_json::Value) -> Self {
        let name = value
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("alignment");
        let mut alignment = Alignment::new(name);
        if let Some(entries) = value.get("elements").and_then(|v| v.as_array()) {
            for entry in entries {
                match serde_json::from_value::<AlignmentElement>(entry.clone()) {
                    Ok(element) => alignment.elements.push(element),
                    Err(err) => log::warn!("skipping malformed alignment element: {err}"),
                }
            }
        }
        alignment.rebuild_cache();
        alignment
    }
}
