use serde::{Deserialize, Serialize};

use crate::point::Point;

/// Axis aligned planar bounding rectangle.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    x_min: f64,
    y_min: f64,
    x_max: f64,
    y_max: f64,
}

impl Rect {
    /// Creates a new rectangle.
    pub fn new(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    /// Minimum X.
    pub fn x_min(&self) -> f64 {
        self.x_min
    }

    /// Maximum X.
    pub fn x_max(&self) -> f64 {
        self.x_max
    }

    /// Minimum Y.
    pub fn y_min(&self) -> f64 {
        self.y_min
    }

    /// Maximum Y.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    /// Size along X.
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Size along Y.
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Smallest rectangle containing both rectangles.
    pub fn merge(&self, other: Self) -> Self {
        Self {
            x_min: self.x_min.min(other.x_min),
            y_min: self.y_min.min(other.y_min),
            x_max: self.x_max.max(other.x_max),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Bounding rectangle of the points. Empty points are skipped.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut points = points.into_iter().filter(|p| !p.is_empty());
        let first = points.next()?;
        let mut rect = Self::new(first.x(), first.y(), first.x(), first.y());

        for p in points {
            rect.x_min = rect.x_min.min(p.x());
            rect.y_min = rect.y_min.min(p.y());
            rect.x_max = rect.x_max.max(p.x());
            rect.y_max = rect.y_max.max(p.y());
        }

        Some(rect)
    }

    /// Merges an optional sequence of rectangles into one.
    pub fn merge_all(rects: impl IntoIterator<Item = Option<Rect>>) -> Option<Rect> {
        rects
            .into_iter()
            .flatten()
            .reduce(|acc, rect| acc.merge(rect))
    }
}
