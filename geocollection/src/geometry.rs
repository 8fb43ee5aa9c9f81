use crate::collection::GeometryCollection;
use crate::config::SegmentationTolerance;
use crate::impls::{CircularString, CompoundCurve, CurvePolygon, LineString, Polygon};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::SegmentHit;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Any geometry that can be a part of a [`GeometryCollection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Geom {
    /// Point.
    Point(Point),
    /// Line string.
    LineString(LineString),
    /// Circular string.
    CircularString(CircularString),
    /// Compound curve.
    CompoundCurve(CompoundCurve),
    /// Polygon with linear rings.
    Polygon(Polygon),
    /// Polygon with curved rings.
    CurvePolygon(CurvePolygon),
    /// Nested collection.
    GeometryCollection(GeometryCollection),
}

/// Common capabilities of all geometries.
///
/// Vertices are addressed by ring and position inside the ring. Surfaces have the exterior ring `0` followed by
/// the interior rings, curves and points have a single ring `0` unless they are empty. Nested collections
/// number the rings of all their parts consecutively.
pub trait Geometry {
    /// Type tag of the geometry.
    fn wkb_type(&self) -> WkbType;

    /// True if the geometry has no vertices.
    fn is_empty(&self) -> bool;

    /// Topological dimension: `0` for points, `1` for curves, `2` for surfaces.
    fn dimension(&self) -> u8;

    /// Number of rings.
    fn ring_count(&self) -> usize;

    /// Number of vertices in the ring, `0` if there is no such ring.
    fn vertex_count(&self, ring: usize) -> usize;

    /// Total number of vertices.
    fn n_coordinates(&self) -> usize {
        (0..self.ring_count()).map(|ring| self.vertex_count(ring)).sum()
    }

    /// Vertex at the given position.
    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point>;

    /// Inserts a vertex before the given position. Position equal to the ring size appends the vertex.
    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool;

    /// Replaces the vertex at the given position.
    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool;

    /// Removes the vertex at the given position. A geometry that becomes invalid is cleared.
    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool;

    /// Positions of the previous and the next vertex in the same ring, `None` for an invalid position.
    fn adjacent_in_ring(
        &self,
        ring: usize,
        vertex: usize,
    ) -> Option<(Option<usize>, Option<usize>)> {
        let count = self.vertex_count(ring);
        if vertex >= count {
            return None;
        }

        let prev = vertex.checked_sub(1);
        let next = (vertex + 1 < count).then_some(vertex + 1);
        Some((prev, next))
    }

    /// Direction of the bisector at the vertex in radians, clockwise from north.
    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64>;

    /// Exchanges X and Y of every vertex.
    fn swap_xy(&mut self);

    /// Removes elevation. Returns false if there was none.
    fn drop_z_value(&mut self) -> bool;

    /// Removes measure. Returns false if there was none.
    fn drop_m_value(&mut self) -> bool;

    /// Adds elevation with the given value. Returns false if elevation is already present.
    fn add_z_value(&mut self, z: f64) -> bool;

    /// Adds measure with the given value. Returns false if measure is already present.
    fn add_m_value(&mut self, m: f64) -> bool;

    /// Replaces every vertex with the result of the function.
    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point);

    /// Replaces vertices with the result of the function, stopping at the first failure.
    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool;

    /// Keeps only the vertices the predicate returns true for. A geometry that becomes invalid is cleared.
    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool);

    /// Removes consecutive vertices closer than `tolerance` in each ordinate.
    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool;

    /// True if the geometry contains circular arcs.
    fn has_curved_segments(&self) -> bool;

    /// Planar area.
    fn area(&self) -> f64;

    /// Length of the boundary of surfaces.
    fn perimeter(&self) -> f64;

    /// Length of curves.
    fn length(&self) -> f64;

    /// Planar bounding rectangle.
    fn bounding_box(&self) -> Option<Rect>;

    /// Closest segment to the point. Vertex ids in the result have part `0`.
    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit>;

    /// Copy of the geometry with all curves replaced by line strings.
    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom;

    /// Copy of the geometry with linear types replaced by their curved counterparts.
    fn to_curve_type(&self) -> Geom;
}

macro_rules! dispatch {
    ($self:ident, $g:ident => $body:expr) => {
        match $self {
            Geom::Point($g) => $body,
            Geom::LineString($g) => $body,
            Geom::CircularString($g) => $body,
            Geom::CompoundCurve($g) => $body,
            Geom::Polygon($g) => $body,
            Geom::CurvePolygon($g) => $body,
            Geom::GeometryCollection($g) => $body,
        }
    };
}

impl Geom {
    /// Base kind of the geometry.
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geom::Point(_) => GeometryKind::Point,
            Geom::LineString(_) => GeometryKind::LineString,
            Geom::CircularString(_) => GeometryKind::CircularString,
            Geom::CompoundCurve(_) => GeometryKind::CompoundCurve,
            Geom::Polygon(_) => GeometryKind::Polygon,
            Geom::CurvePolygon(_) => GeometryKind::CurvePolygon,
            Geom::GeometryCollection(c) => c.wkb_type().kind,
        }
    }

    /// Ordinates of the geometry.
    pub fn dimensions(&self) -> Dimensions {
        self.wkb_type().dimensions
    }

    /// True if the geometry has elevation.
    pub fn is_3d(&self) -> bool {
        self.dimensions().has_z()
    }

    /// True if the geometry has measure.
    pub fn is_measure(&self) -> bool {
        self.dimensions().has_m()
    }

    /// All vertices in ring order.
    pub fn vertices(&self) -> impl Iterator<Item = Point> + '_ {
        (0..self.ring_count()).flat_map(move |ring| {
            (0..self.vertex_count(ring)).filter_map(move |vertex| self.vertex_at(ring, vertex))
        })
    }
}

impl Geometry for Geom {
    fn wkb_type(&self) -> WkbType {
        dispatch!(self, g => g.wkb_type())
    }

    fn is_empty(&self) -> bool {
        dispatch!(self, g => g.is_empty())
    }

    fn dimension(&self) -> u8 {
        dispatch!(self, g => g.dimension())
    }

    fn ring_count(&self) -> usize {
        dispatch!(self, g => g.ring_count())
    }

    fn vertex_count(&self, ring: usize) -> usize {
        dispatch!(self, g => g.vertex_count(ring))
    }

    fn n_coordinates(&self) -> usize {
        dispatch!(self, g => g.n_coordinates())
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        dispatch!(self, g => g.vertex_at(ring, vertex))
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        dispatch!(self, g => g.insert_vertex_at(ring, vertex, point))
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        dispatch!(self, g => g.move_vertex_at(ring, vertex, point))
    }

    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        dispatch!(self, g => g.delete_vertex_at(ring, vertex))
    }

    fn adjacent_in_ring(
        &self,
        ring: usize,
        vertex: usize,
    ) -> Option<(Option<usize>, Option<usize>)> {
        dispatch!(self, g => g.adjacent_in_ring(ring, vertex))
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        dispatch!(self, g => g.vertex_angle_at(ring, vertex))
    }

    fn swap_xy(&mut self) {
        dispatch!(self, g => g.swap_xy())
    }

    fn drop_z_value(&mut self) -> bool {
        dispatch!(self, g => g.drop_z_value())
    }

    fn drop_m_value(&mut self) -> bool {
        dispatch!(self, g => g.drop_m_value())
    }

    fn add_z_value(&mut self, z: f64) -> bool {
        dispatch!(self, g => g.add_z_value(z))
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        dispatch!(self, g => g.add_m_value(m))
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        dispatch!(self, g => g.transform_vertices(f))
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        dispatch!(self, g => g.try_transform_vertices(f))
    }

    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        dispatch!(self, g => g.filter_vertices(predicate))
    }

    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        dispatch!(self, g => g.remove_duplicate_nodes(tolerance, use_z))
    }

    fn has_curved_segments(&self) -> bool {
        dispatch!(self, g => g.has_curved_segments())
    }

    fn area(&self) -> f64 {
        dispatch!(self, g => g.area())
    }

    fn perimeter(&self) -> f64 {
        dispatch!(self, g => g.perimeter())
    }

    fn length(&self) -> f64 {
        dispatch!(self, g => g.length())
    }

    fn bounding_box(&self) -> Option<Rect> {
        dispatch!(self, g => g.bounding_box())
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        dispatch!(self, g => g.closest_segment(point, epsilon))
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        dispatch!(self, g => g.segmentize(tolerance))
    }

    fn to_curve_type(&self) -> Geom {
        dispatch!(self, g => g.to_curve_type())
    }
}

impl From<Point> for Geom {
    fn from(value: Point) -> Self {
        Self::Point(value)
    }
}

impl From<LineString> for Geom {
    fn from(value: LineString) -> Self {
        Self::LineString(value)
    }
}

impl From<CircularString> for Geom {
    fn from(value: CircularString) -> Self {
        Self::CircularString(value)
    }
}

impl From<CompoundCurve> for Geom {
    fn from(value: CompoundCurve) -> Self {
        Self::CompoundCurve(value)
    }
}

impl From<Polygon> for Geom {
    fn from(value: Polygon) -> Self {
        Self::Polygon(value)
    }
}

impl From<CurvePolygon> for Geom {
    fn from(value: CurvePolygon) -> Self {
        Self::CurvePolygon(value)
    }
}

impl From<GeometryCollection> for Geom {
    fn from(value: GeometryCollection) -> Self {
        Self::GeometryCollection(value)
    }
}
