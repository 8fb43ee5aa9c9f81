use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

use crate::wkb_type::Dimensions;

/// A vertex with X and Y ordinates and optional elevation (Z) and measure (M).
///
/// An empty point (`POINT EMPTY`) has `NaN` for both X and Y.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
pub struct Point {
    x: f64,
    y: f64,
    z: Option<f64>,
    m: Option<f64>,
}

impl Point {
    /// Creates a 2D point.
    pub const fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: None,
        }
    }

    /// Creates a point with elevation.
    pub const fn new_z(x: f64, y: f64, z: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: None,
        }
    }

    /// Creates a point with measure.
    pub const fn new_m(x: f64, y: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: None,
            m: Some(m),
        }
    }

    /// Creates a point with elevation and measure.
    pub const fn new_zm(x: f64, y: f64, z: f64, m: f64) -> Self {
        Self {
            x,
            y,
            z: Some(z),
            m: Some(m),
        }
    }

    /// Creates an empty point with the given dimensions.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self {
            x: f64::NAN,
            y: f64::NAN,
            z: dimensions.has_z().then_some(f64::NAN),
            m: dimensions.has_m().then_some(f64::NAN),
        }
    }

    /// X ordinate.
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Y ordinate.
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Elevation, if the point has one.
    pub fn z(&self) -> Option<f64> {
        self.z
    }

    /// Measure, if the point has one.
    pub fn m(&self) -> Option<f64> {
        self.m
    }

    /// Sets the X ordinate.
    pub fn set_x(&mut self, x: f64) {
        self.x = x;
    }

    /// Sets the Y ordinate.
    pub fn set_y(&mut self, y: f64) {
        self.y = y;
    }

    /// Sets or removes the elevation.
    pub fn set_z(&mut self, z: Option<f64>) {
        self.z = z;
    }

    /// Sets or removes the measure.
    pub fn set_m(&mut self, m: Option<f64>) {
        self.m = m;
    }

    /// True for `POINT EMPTY`.
    pub fn is_empty(&self) -> bool {
        self.x.is_nan() && self.y.is_nan()
    }

    /// Ordinates present on the point.
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.z.is_some(), self.m.is_some())
    }

    /// Returns the point with exactly the given ordinates: missing ones are set to `0`, extra ones are dropped.
    pub fn with_dimensions(self, dimensions: Dimensions) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: dimensions.has_z().then(|| self.z.unwrap_or(0.0)),
            m: dimensions.has_m().then(|| self.m.unwrap_or(0.0)),
        }
    }

    /// Squared planar distance to the other point.
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Planar distance to the other point.
    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    /// True if X and Y of the points are exactly the same.
    pub fn equal_2d(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }

    pub(crate) fn swap_xy(&mut self) {
        std::mem::swap(&mut self.x, &mut self.y);
    }

    /// Linear interpolation of all ordinates, `t` in `0..=1`.
    pub(crate) fn lerp(&self, other: &Point, t: f64) -> Point {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Point {
            x: mix(self.x, other.x),
            y: mix(self.y, other.y),
            z: self.z.zip(other.z).map(|(a, b)| mix(a, b)),
            m: self.m.zip(other.m).map(|(a, b)| mix(a, b)),
        }
    }
}

fn same(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn same_opt(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => same(a, b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        same(self.x, other.x)
            && same(self.y, other.y)
            && same_opt(self.z, other.z)
            && same_opt(self.m, other.m)
    }
}

impl AbsDiffEq for Point {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        let opt_eq = |a: Option<f64>, b: Option<f64>| match (a, b) {
            (Some(a), Some(b)) => a.abs_diff_eq(&b, epsilon),
            (None, None) => true,
            _ => false,
        };

        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && opt_eq(self.z, other.z)
            && opt_eq(self.m, other.m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_points_are_equal() {
        assert_eq!(Point::empty(Dimensions::Xy), Point::empty(Dimensions::Xy));
        assert_ne!(Point::empty(Dimensions::Xy), Point::empty(Dimensions::Xyz));
        assert!(Point::empty(Dimensions::Xym).is_empty());
    }

    #[test]
    fn dimensions_are_part_of_equality() {
        assert_ne!(Point::new(1.0, 2.0), Point::new_z(1.0, 2.0, 0.0));
        assert_eq!(
            Point::new(1.0, 2.0).with_dimensions(Dimensions::Xyzm),
            Point::new_zm(1.0, 2.0, 0.0, 0.0)
        );
        assert_eq!(
            Point::new_zm(1.0, 2.0, 3.0, 4.0).with_dimensions(Dimensions::Xym),
            Point::new_m(1.0, 2.0, 4.0)
        );
    }

    #[test]
    fn lerp_interpolates_z_and_m() {
        let a = Point::new_zm(0.0, 0.0, 0.0, 10.0);
        let b = Point::new_zm(2.0, 4.0, 6.0, 20.0);
        assert_eq!(a.lerp(&b, 0.5), Point::new_zm(1.0, 2.0, 3.0, 15.0));
    }
}
