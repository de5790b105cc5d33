//! In-memory storage for survey points.

use serde::{Deserialize, Serialize};

/// A surveyed point with its label, coordinates and field code.
///
/// `id` is an opaque label assigned in the field; uniqueness is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurveyPoint {
    #[serde(default)]
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    #[serde(default)]
    pub code: String,
}

impl SurveyPoint {
    /// Creates a new survey point.
    pub fn new(id: impl Into<String>, x: f64, y: f64, z: f64, code: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            x,
            y,
            z,
            code: code.into(),
        }
    }
}

/// Simple in-memory database for survey points.
#[derive(Debug, Clone, Default)]
pub struct PointDatabase {
    points: Vec<SurveyPoint>,
}

impl std::ops::Deref for PointDatabase {
    type Target = Vec<SurveyPoint>;
    fn deref(&self) -> &Self::Target {
        &self.points
    }
}

impl PointDatabase {
    /// Creates a new empty database.
    pub fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Returns a slice of all points.
    pub fn points(&self) -> &[SurveyPoint] {
        &self.points
    }

    /// Adds a point and returns its index.
    pub fn add_point(&mut self, point: SurveyPoint) -> usize {
        self.points.push(point);
        self.points.len() - 1
    }

    /// Updates an existing point.
    pub fn update_point(&mut self, index: usize, point: SurveyPoint) -> bool {
        if let Some(p) = self.points.get_mut(index) {
            *p = point;
            true
        } else {
            false
        }
    }

    /// Removes the point at the given index.
    pub fn remove_point(&mut self, index: usize) -> Option<SurveyPoint> {
        if index >= self.points.len() {
            return None;
        }
        Some(self.points.remove(index))
    }

    /// Returns an iterator over all points with their indices.
    pub fn iter_points(&self) -> impl Iterator<Item = (usize, &SurveyPoint)> {
        self.points.iter().enumerate()
    }

    /// Returns the points whose code matches `code`.
    pub fn points_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a SurveyPoint> {
        self.points.iter().filter(move |p| p.code == code)
    }

    /// Clears all points.
    pub fn clear(&mut self) {
        self.points.clear();
    }
}
