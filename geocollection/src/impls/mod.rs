//! Concrete geometry types that can be stored in a collection.

mod circular_string;
mod compound_curve;
mod curve;
mod line_string;
mod point;
mod polygon;
pub(crate) mod sequence;

pub use circular_string::CircularString;
pub use compound_curve::CompoundCurve;
pub use curve::Curve;
pub use line_string::LineString;
pub use polygon::{CurvePolygon, Polygon, Ring};
