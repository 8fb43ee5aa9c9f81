use crate::point::Point;
use crate::projection::Projection;

/// Projection that returns its input unchanged.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IdentityProjection;

impl Projection for IdentityProjection {
    fn project(&self, input: &Point) -> Option<Point> {
        Some(*input)
    }

    fn unproject(&self, input: &Point) -> Option<Point> {
        Some(*input)
    }
}
