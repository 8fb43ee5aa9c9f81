//! Coordinate transformations applied by [`GeometryCollection::transform`](crate::GeometryCollection::transform).

mod identity;
mod inverted;
mod web_mercator;

pub use identity::IdentityProjection;
pub use inverted::InvertedProjection;
pub use web_mercator::WebMercator;

#[cfg(feature = "geodesy")]
mod geodesy;
#[cfg(feature = "geodesy")]
pub use self::geodesy::GeodesyProjection;

use crate::point::Point;

/// Conversion of vertices between two coordinate systems.
///
/// Geographic coordinates are passed as `x = longitude`, `y = latitude` in degrees. Implementations return `None`
/// if the point cannot be converted.
pub trait Projection {
    /// Converts a point from the source to the target system.
    fn project(&self, input: &Point) -> Option<Point>;

    /// Converts a point from the target back to the source system.
    fn unproject(&self, input: &Point) -> Option<Point>;
}

/// Which way a [`Projection`] is applied.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum TransformDirection {
    /// Source to target ([`Projection::project`]).
    #[default]
    Forward,
    /// Target to source ([`Projection::unproject`]).
    Reverse,
}

impl TransformDirection {
    pub(crate) fn apply(&self, projection: &dyn Projection, point: &Point) -> Option<Point> {
        match self {
            Self::Forward => projection.project(point),
            Self::Reverse => projection.unproject(point),
        }
    }
}
