use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CircularString, CompoundCurve, LineString};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::{line_angle, SegmentHit};
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Any one-dimensional geometry.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Straight segments.
    LineString(LineString),
    /// Circular arcs.
    CircularString(CircularString),
    /// Chain of linear and circular pieces.
    CompoundCurve(CompoundCurve),
}

impl Default for Curve {
    fn default() -> Self {
        Self::LineString(LineString::default())
    }
}

macro_rules! curve_dispatch {
    ($self:ident, $c:ident => $body:expr) => {
        match $self {
            Curve::LineString($c) => $body,
            Curve::CircularString($c) => $body,
            Curve::CompoundCurve($c) => $body,
        }
    };
}

impl Curve {
    /// Empty line string with the given dimensions.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self::LineString(LineString::empty(dimensions))
    }

    /// Base kind of the curve.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Curve::LineString(_) => GeometryKind::LineString,
            Curve::CircularString(_) => GeometryKind::CircularString,
            Curve::CompoundCurve(_) => GeometryKind::CompoundCurve,
        }
    }

    /// Ordinates of the curve.
    pub fn dimensions(&self) -> Dimensions {
        curve_dispatch!(self, c => c.dimensions())
    }

    /// First vertex.
    pub fn start_point(&self) -> Option<Point> {
        self.vertex_at(0, 0)
    }

    /// Last vertex.
    pub fn end_point(&self) -> Option<Point> {
        self.vertex_at(0, self.vertex_count(0).checked_sub(1)?)
    }

    /// True if the first and the last vertices coincide.
    pub fn is_closed(&self) -> bool {
        curve_dispatch!(self, c => c.is_closed())
    }

    /// Connects the end of the curve to its start with a straight segment if the curve is not closed.
    ///
    /// A circular string is turned into a compound curve for that.
    pub fn close(&mut self) {
        if self.is_empty() || self.is_closed() {
            return;
        }

        match self {
            Curve::LineString(line) => line.close(),
            Curve::CircularString(cs) => {
                let mut compound = CompoundCurve::from(std::mem::take(cs));
                compound.close();
                *self = Curve::CompoundCurve(compound);
            }
            Curve::CompoundCurve(compound) => compound.close(),
        }
    }

    /// Signed enclosed area, positive for counter-clockwise curves.
    pub fn signed_area(&self) -> f64 {
        curve_dispatch!(self, c => c.signed_area())
    }

    /// Vertices of the linear approximation of the curve.
    pub fn segmentized_points(&self, tolerance: SegmentationTolerance) -> Vec<Point> {
        match self {
            Curve::LineString(line) => line.points().to_vec(),
            Curve::CircularString(cs) => cs.segmentized_points(tolerance),
            Curve::CompoundCurve(compound) => compound.segmentized_points(tolerance),
        }
    }

    /// Linear approximation of the curve.
    pub fn to_line_string(&self, tolerance: SegmentationTolerance) -> LineString {
        match self {
            Curve::LineString(line) => line.clone(),
            _ => LineString::with_dimensions(self.dimensions(), self.segmentized_points(tolerance)),
        }
    }

    pub(crate) fn set_dimensions(&mut self, dimensions: Dimensions) {
        curve_dispatch!(self, c => c.set_dimensions(dimensions))
    }

    pub(crate) fn start_direction(&self) -> Option<f64> {
        match self {
            Curve::LineString(line) => {
                let points = line.points();
                (points.len() >= 2).then(|| line_angle(&points[0], &points[1]))
            }
            Curve::CircularString(cs) => cs.start_direction(),
            Curve::CompoundCurve(compound) => compound.curves().first()?.start_direction(),
        }
    }

    pub(crate) fn end_direction(&self) -> Option<f64> {
        match self {
            Curve::LineString(line) => {
                let points = line.points();
                let n = points.len();
                (n >= 2).then(|| line_angle(&points[n - 2], &points[n - 1]))
            }
            Curve::CircularString(cs) => cs.end_direction(),
            Curve::CompoundCurve(compound) => compound.curves().last()?.end_direction(),
        }
    }
}

impl Geometry for Curve {
    fn wkb_type(&self) -> WkbType {
        curve_dispatch!(self, c => c.wkb_type())
    }

    fn is_empty(&self) -> bool {
        curve_dispatch!(self, c => c.is_empty())
    }

    fn dimension(&self) -> u8 {
        1
    }

    fn ring_count(&self) -> usize {
        curve_dispatch!(self, c => c.ring_count())
    }

    fn vertex_count(&self, ring: usize) -> usize {
        curve_dispatch!(self, c => c.vertex_count(ring))
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        curve_dispatch!(self, c => c.vertex_at(ring, vertex))
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        curve_dispatch!(self, c => c.insert_vertex_at(ring, vertex, point))
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        curve_dispatch!(self, c => c.move_vertex_at(ring, vertex, point))
    }

    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        curve_dispatch!(self, c => c.delete_vertex_at(ring, vertex))
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        curve_dispatch!(self, c => c.vertex_angle_at(ring, vertex))
    }

    fn swap_xy(&mut self) {
        curve_dispatch!(self, c => c.swap_xy())
    }

    fn drop_z_value(&mut self) -> bool {
        curve_dispatch!(self, c => c.drop_z_value())
    }

    fn drop_m_value(&mut self) -> bool {
        curve_dispatch!(self, c => c.drop_m_value())
    }

    fn add_z_value(&mut self, z: f64) -> bool {
        curve_dispatch!(self, c => c.add_z_value(z))
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        curve_dispatch!(self, c => c.add_m_value(m))
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        curve_dispatch!(self, c => c.transform_vertices(f))
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        curve_dispatch!(self, c => c.try_transform_vertices(f))
    }

    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        curve_dispatch!(self, c => c.filter_vertices(predicate))
    }

    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        curve_dispatch!(self, c => c.remove_duplicate_nodes(tolerance, use_z))
    }

    fn has_curved_segments(&self) -> bool {
        curve_dispatch!(self, c => c.has_curved_segments())
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn perimeter(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        curve_dispatch!(self, c => c.length())
    }

    fn bounding_box(&self) -> Option<Rect> {
        curve_dispatch!(self, c => c.bounding_box())
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        curve_dispatch!(self, c => c.closest_segment(point, epsilon))
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        curve_dispatch!(self, c => c.segmentize(tolerance))
    }

    fn to_curve_type(&self) -> Geom {
        curve_dispatch!(self, c => c.to_curve_type())
    }
}

impl From<LineString> for Curve {
    fn from(value: LineString) -> Self {
        Self::LineString(value)
    }
}

impl From<CircularString> for Curve {
    fn from(value: CircularString) -> Self {
        Self::CircularString(value)
    }
}

impl From<CompoundCurve> for Curve {
    fn from(value: CompoundCurve) -> Self {
        Self::CompoundCurve(value)
    }
}

impl From<Curve> for Geom {
    fn from(value: Curve) -> Self {
        match value {
            Curve::LineString(c) => Geom::LineString(c),
            Curve::CircularString(c) => Geom::CircularString(c),
            Curve::CompoundCurve(c) => Geom::CompoundCurve(c),
        }
    }
}

impl TryFrom<Geom> for Curve {
    type Error = Geom;

    fn try_from(value: Geom) -> Result<Self, Self::Error> {
        match value {
            Geom::LineString(c) => Ok(Curve::LineString(c)),
            Geom::CircularString(c) => Ok(Curve::CircularString(c)),
            Geom::CompoundCurve(c) => Ok(Curve::CompoundCurve(c)),
            other => Err(other),
        }
    }
}
