use crate::point::Point;
use crate::projection::Projection;

/// Swaps the directions of the wrapped projection.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct InvertedProjection<P> {
    inner: P,
}

impl<P: Projection> InvertedProjection<P> {
    /// Wraps the projection.
    pub fn new(inner: P) -> Self {
        Self { inner }
    }

    /// The wrapped projection.
    pub fn inner(&self) -> &P {
        &self.inner
    }
}

impl<P: Projection> Projection for InvertedProjection<P> {
    fn project(&self, input: &Point) -> Option<Point> {
        self.inner.unproject(input)
    }

    fn unproject(&self, input: &Point) -> Option<Point> {
        self.inner.project(input)
    }
}
