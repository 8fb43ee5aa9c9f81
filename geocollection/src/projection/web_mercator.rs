use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use crate::point::Point;
use crate::projection::Projection;

/// Semi-major axis of the WGS84 ellipsoid in meters.
const WGS84_SEMIMAJOR: f64 = 6_378_137.0;

/// Spherical Web Mercator (EPSG:3857) over the WGS84 semi-major axis.
///
/// Forward projection converts longitude/latitude in degrees to meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WebMercator {
    semimajor: f64,
}

impl WebMercator {
    /// Creates a projection with a custom sphere radius.
    pub fn new(semimajor: f64) -> Self {
        Self { semimajor }
    }
}

impl Default for WebMercator {
    fn default() -> Self {
        Self::new(WGS84_SEMIMAJOR)
    }
}

impl Projection for WebMercator {
    fn project(&self, input: &Point) -> Option<Point> {
        let x = self.semimajor * input.x().to_radians();
        let y = self.semimajor * (FRAC_PI_4 + input.y().to_radians() / 2.0).tan().ln();

        if !x.is_finite() || !y.is_finite() {
            return None;
        }

        let mut output = *input;
        output.set_x(x);
        output.set_y(y);
        Some(output)
    }

    fn unproject(&self, input: &Point) -> Option<Point> {
        let lat = 2.0 * (input.y() / self.semimajor).exp().atan() - FRAC_PI_2;
        let lon = input.x() / self.semimajor;

        if !lat.is_finite() || !lon.is_finite() {
            return None;
        }

        let mut output = *input;
        output.set_x(lon.to_degrees());
        output.set_y(lat.to_degrees());
        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn round_trip() {
        let projection = WebMercator::default();
        let moscow = Point::new_z(37.6, 55.75, 150.0);
        let projected = projection.project(&moscow).unwrap();
        assert_abs_diff_eq!(projected.x(), 4_185_612.854, epsilon = 1e-3);
        assert_abs_diff_eq!(projected.y(), 7_508_807.851, epsilon = 1e-3);
        assert_eq!(projected.z(), Some(150.0));

        let back = projection.unproject(&projected).unwrap();
        assert_abs_diff_eq!(back, moscow, epsilon = 1e-9);
    }

    #[test]
    fn pole_is_not_projected() {
        assert!(WebMercator::default()
            .project(&Point::new(0.0, 90.0))
            .is_none());
    }
}
