use geodesy::prelude::*;

use crate::point::Point;
use crate::projection::Projection;

/// Projection defined by a `geodesy` operator pipeline, e.g. `"utm zone=32"`.
///
/// Forward direction takes longitude/latitude in degrees. Z and M of the input are kept.
pub struct GeodesyProjection {
    context: Minimal,
    op: OpHandle,
}

impl GeodesyProjection {
    /// Creates the projection. Returns `None` if the definition cannot be parsed.
    pub fn new(definition: &str) -> Option<Self> {
        let mut context = Minimal::new();
        let op = context.op(definition).ok()?;
        Some(Self { context, op })
    }
}

impl std::fmt::Debug for GeodesyProjection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeodesyProjection").finish_non_exhaustive()
    }
}

impl Projection for GeodesyProjection {
    fn project(&self, input: &Point) -> Option<Point> {
        let mut data = [Coor2D::geo(input.y(), input.x())];
        self.context.apply(self.op, Fwd, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        let mut output = *input;
        output.set_x(data[0].0[0]);
        output.set_y(data[0].0[1]);
        Some(output)
    }

    fn unproject(&self, input: &Point) -> Option<Point> {
        let mut data = [Coor2D([input.x(), input.y()])];
        self.context.apply(self.op, Inv, &mut data).ok()?;

        if !data[0].0[0].is_finite() || !data[0].0[1].is_finite() {
            return None;
        }

        let mut output = *input;
        output.set_x(data[0].0[0].to_degrees());
        output.set_y(data[0].0[1].to_degrees());
        Some(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn utm_round_trip() {
        let projection = GeodesyProjection::new("utm zone=32").unwrap();
        let point = Point::new_m(9.0, 52.0, 7.0);
        let projected = projection.project(&point).unwrap();
        assert_abs_diff_eq!(projected.x(), 500_000.0, epsilon = 1e-3);
        assert_eq!(projected.m(), Some(7.0));

        let back = projection.unproject(&projected).unwrap();
        assert_abs_diff_eq!(back.x(), 9.0, epsilon = 1e-9);
        assert_abs_diff_eq!(back.y(), 52.0, epsilon = 1e-9);
    }

    #[test]
    fn invalid_definition() {
        assert!(GeodesyProjection::new("no_such_operator").is_none());
    }
}
