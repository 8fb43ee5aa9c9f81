use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::impls::sequence;
use crate::impls::CompoundCurve;
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::{self, SegmentHit};
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Sequence of vertices connected by straight segments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineString {
    points: Vec<Point>,
    dimensions: Dimensions,
}

impl LineString {
    /// Creates a line string. Dimensions are taken from the first point; other points are adjusted to them.
    pub fn new(points: Vec<Point>) -> Self {
        let dimensions = points
            .first()
            .map(Point::dimensions)
            .unwrap_or_default();
        Self::with_dimensions(dimensions, points)
    }

    /// Creates a line string with the given dimensions.
    pub fn with_dimensions(dimensions: Dimensions, mut points: Vec<Point>) -> Self {
        sequence::set_dimensions(&mut points, dimensions);
        Self { points, dimensions }
    }

    /// Creates an empty line string.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self {
            points: vec![],
            dimensions,
        }
    }

    /// Vertices of the line.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consumes the line returning its vertices.
    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    /// Number of vertices.
    pub fn num_points(&self) -> usize {
        self.points.len()
    }

    /// Vertex by index.
    pub fn point_n(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    /// Ordinates of the vertices.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Appends a vertex.
    pub fn push(&mut self, point: Point) {
        self.points.push(point.with_dimensions(self.dimensions));
    }

    /// Removes all vertices.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// True if the first and the last vertices coincide.
    pub fn is_closed(&self) -> bool {
        segment::is_closed(&self.points)
    }

    /// Appends the first vertex to the end if the line is not closed.
    pub fn close(&mut self) {
        if let Some(first) = self.points.first().copied() {
            if !self.is_closed() {
                self.points.push(first);
            }
        }
    }

    /// Signed area enclosed by the line, positive for counter-clockwise lines.
    pub fn signed_area(&self) -> f64 {
        segment::shoelace(&self.points)
    }

    pub(crate) fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        sequence::set_dimensions(&mut self.points, dimensions);
    }
}

impl Geometry for LineString {
    fn wkb_type(&self) -> WkbType {
        WkbType::new(GeometryKind::LineString, self.dimensions)
    }

    fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    fn dimension(&self) -> u8 {
        1
    }

    fn ring_count(&self) -> usize {
        !self.points.is_empty() as usize
    }

    fn vertex_count(&self, ring: usize) -> usize {
        if ring == 0 {
            self.points.len()
        } else {
            0
        }
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        if ring != 0 {
            return None;
        }
        self.point_n(vertex)
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        if ring != 0 || vertex > self.points.len() {
            return false;
        }

        self.points
            .insert(vertex, point.with_dimensions(self.dimensions));
        true
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        match self.points.get_mut(vertex) {
            Some(p) if ring == 0 => {
                *p = point.with_dimensions(self.dimensions);
                true
            }
            _ => false,
        }
    }

    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        if ring != 0 || vertex >= self.points.len() {
            return false;
        }

        self.points.remove(vertex);
        if self.points.len() < 2 {
            self.points.clear();
        }

        true
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        if ring != 0 {
            return None;
        }
        segment::polyline_vertex_angle(&self.points, vertex)
    }

    fn swap_xy(&mut self) {
        sequence::swap_xy(&mut self.points);
    }

    fn drop_z_value(&mut self) -> bool {
        if !self.dimensions.has_z() {
            return false;
        }

        self.set_dimensions(self.dimensions.with_z(false));
        true
    }

    fn drop_m_value(&mut self) -> bool {
        if !self.dimensions.has_m() {
            return false;
        }

        self.set_dimensions(self.dimensions.with_m(false));
        true
    }

    fn add_z_value(&mut self, z: f64) -> bool {
        if self.dimensions.has_z() {
            return false;
        }

        self.dimensions = self.dimensions.with_z(true);
        sequence::fill_z(&mut self.points, z);
        true
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        if self.dimensions.has_m() {
            return false;
        }

        self.dimensions = self.dimensions.with_m(true);
        sequence::fill_m(&mut self.points, m);
        true
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        sequence::transform(&mut self.points, self.dimensions, f);
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        sequence::try_transform(&mut self.points, self.dimensions, f)
    }

    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        self.points.retain(|p| predicate(p));
        if self.points.len() < 2 {
            self.points.clear();
        }
    }

    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        let closed = self.is_closed();
        let changed = sequence::remove_duplicates(&mut self.points, tolerance, use_z);

        if changed && closed && !self.is_closed() {
            let first = self.points.first().copied();
            if let (Some(first), Some(last)) = (first, self.points.last_mut()) {
                *last = first;
            }
        }

        changed
    }

    fn has_curved_segments(&self) -> bool {
        false
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn perimeter(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        segment::polyline_length(&self.points)
    }

    fn bounding_box(&self) -> Option<Rect> {
        Rect::from_points(&self.points)
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        segment::closest_polyline_segment(&self.points, point, epsilon)
    }

    fn segmentize(&self, _tolerance: SegmentationTolerance) -> Geom {
        Geom::LineString(self.clone())
    }

    fn to_curve_type(&self) -> Geom {
        Geom::CompoundCurve(CompoundCurve::from(self.clone()))
    }
}
