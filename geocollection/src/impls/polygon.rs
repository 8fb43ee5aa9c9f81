use std::fmt::Debug;

use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CompoundCurve, Curve, LineString};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::SegmentHit;
use crate::vertex_id::VertexId;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Curve that can be used as a boundary of a polygon.
pub trait Ring: Geometry + Debug + Clone + PartialEq + Default {
    /// Kind of the polygon built from rings of this type.
    const POLYGON_KIND: GeometryKind;

    /// Ordinates of the ring.
    fn dimensions(&self) -> Dimensions;

    /// True if the first and the last vertices coincide.
    fn is_closed(&self) -> bool;

    /// Connects the last vertex to the first one if they differ.
    fn close(&mut self);

    /// Signed enclosed area, positive for counter-clockwise rings.
    fn signed_area(&self) -> f64;

    /// Linear approximation of the ring.
    fn to_line_string(&self, tolerance: SegmentationTolerance) -> LineString;

    /// The ring as a general curve.
    fn to_curve(&self) -> Curve;

    #[doc(hidden)]
    fn set_dimensions(&mut self, dimensions: Dimensions);
}

impl Ring for LineString {
    const POLYGON_KIND: GeometryKind = GeometryKind::Polygon;

    fn dimensions(&self) -> Dimensions {
        LineString::dimensions(self)
    }

    fn is_closed(&self) -> bool {
        LineString::is_closed(self)
    }

    fn close(&mut self) {
        LineString::close(self)
    }

    fn signed_area(&self) -> f64 {
        LineString::signed_area(self)
    }

    fn to_line_string(&self, _tolerance: SegmentationTolerance) -> LineString {
        self.clone()
    }

    fn to_curve(&self) -> Curve {
        Curve::CompoundCurve(CompoundCurve::from(self.clone()))
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) {
        LineString::set_dimensions(self, dimensions)
    }
}

impl Ring for Curve {
    const POLYGON_KIND: GeometryKind = GeometryKind::CurvePolygon;

    fn dimensions(&self) -> Dimensions {
        Curve::dimensions(self)
    }

    fn is_closed(&self) -> bool {
        Curve::is_closed(self)
    }

    fn close(&mut self) {
        Curve::close(self)
    }

    fn signed_area(&self) -> f64 {
        Curve::signed_area(self)
    }

    fn to_line_string(&self, tolerance: SegmentationTolerance) -> LineString {
        Curve::to_line_string(self, tolerance)
    }

    fn to_curve(&self) -> Curve {
        match self {
            Curve::LineString(line) => Curve::CompoundCurve(CompoundCurve::from(line.clone())),
            other => other.clone(),
        }
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) {
        Curve::set_dimensions(self, dimensions)
    }
}

/// Surface bounded by an exterior ring with optional holes.
///
/// Ring `0` is the exterior, the following ones are the interior rings. Editing keeps every ring closed: changing
/// the first vertex of a ring also changes the last one and the other way round.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon<R = LineString> {
    rings: Vec<R>,
    dimensions: Dimensions,
}

/// Polygon whose rings may contain circular arcs.
pub type CurvePolygon = Polygon<Curve>;

/// Rings with fewer vertices than this do not bound an area.
const MIN_RING_VERTICES: usize = 4;

impl<R: Ring> Default for Polygon<R> {
    fn default() -> Self {
        Self::empty(Dimensions::Xy)
    }
}

impl<R: Ring> Polygon<R> {
    /// Creates a polygon. Rings are closed if necessary and adjusted to the dimensions of the exterior ring.
    pub fn new(exterior: R, interiors: Vec<R>) -> Self {
        let mut polygon = Self::empty(exterior.dimensions());
        polygon.set_exterior_ring(exterior);
        for ring in interiors {
            polygon.add_interior_ring(ring);
        }

        polygon
    }

    /// Creates a polygon without rings.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self {
            rings: vec![],
            dimensions,
        }
    }

    /// Ordinates of the vertices.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Exterior ring.
    pub fn exterior(&self) -> Option<&R> {
        self.rings.first()
    }

    /// Interior rings.
    pub fn interiors(&self) -> &[R] {
        self.rings.get(1..).unwrap_or_default()
    }

    /// All rings, exterior first.
    pub fn rings(&self) -> &[R] {
        &self.rings
    }

    /// Number of interior rings.
    pub fn num_interior_rings(&self) -> usize {
        self.rings.len().saturating_sub(1)
    }

    /// Replaces the exterior ring.
    pub fn set_exterior_ring(&mut self, mut ring: R) {
        ring.set_dimensions(self.dimensions);
        ring.close();
        match self.rings.first_mut() {
            Some(exterior) => *exterior = ring,
            None => self.rings.push(ring),
        }
    }

    /// Adds a hole. Returns false if there is no exterior ring.
    pub fn add_interior_ring(&mut self, mut ring: R) -> bool {
        if self.rings.is_empty() {
            return false;
        }

        ring.set_dimensions(self.dimensions);
        ring.close();
        self.rings.push(ring);
        true
    }

    /// Removes all rings.
    pub fn clear(&mut self) {
        self.rings.clear();
    }

    fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        for ring in &mut self.rings {
            ring.set_dimensions(dimensions);
        }
    }

    fn remove_ring(&mut self, ring: usize) {
        self.rings.remove(ring);
        if ring == 0 && !self.rings.is_empty() {
            log::debug!("Exterior ring removed, first interior ring becomes the exterior");
        }
    }

    fn sync_closing_vertex(ring: &mut R, changed: usize) {
        let n = ring.vertex_count(0);
        if n < 2 {
            return;
        }

        if changed == 0 {
            if let Some(first) = ring.vertex_at(0, 0) {
                ring.move_vertex_at(0, n - 1, first);
            }
        } else if changed == n - 1 {
            if let Some(last) = ring.vertex_at(0, n - 1) {
                ring.move_vertex_at(0, 0, last);
            }
        }
    }
}

impl<R: Ring> Geometry for Polygon<R> {
    fn wkb_type(&self) -> WkbType {
        WkbType::new(R::POLYGON_KIND, self.dimensions)
    }

    fn is_empty(&self) -> bool {
        self.rings.iter().all(|r| r.is_empty())
    }

    fn dimension(&self) -> u8 {
        2
    }

    fn ring_count(&self) -> usize {
        self.rings.len()
    }

    fn vertex_count(&self, ring: usize) -> usize {
        self.rings.get(ring).map_or(0, |r| r.vertex_count(0))
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        self.rings.get(ring)?.vertex_at(0, vertex)
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        let Some(target) = self.rings.get_mut(ring) else {
            return false;
        };

        let n = target.vertex_count(0);
        if !target.insert_vertex_at(0, vertex, point) {
            return false;
        }

        if vertex == 0 {
            if let Some(first) = target.vertex_at(0, 0) {
                target.move_vertex_at(0, n, first);
            }
        } else if vertex == n {
            if let Some(last) = target.vertex_at(0, n) {
                target.move_vertex_at(0, 0, last);
            }
        }

        true
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        let Some(target) = self.rings.get_mut(ring) else {
            return false;
        };

        if !target.move_vertex_at(0, vertex, point) {
            return false;
        }

        Self::sync_closing_vertex(target, vertex);
        true
    }

    /// Removes the vertex. A ring left with too few vertices is removed entirely; if that is the exterior ring,
    /// the first interior ring takes its place.
    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        let Some(target) = self.rings.get_mut(ring) else {
            return false;
        };

        let n = target.vertex_count(0);
        if vertex >= n {
            return false;
        }

        if n <= MIN_RING_VERTICES {
            self.remove_ring(ring);
            return true;
        }

        if !target.delete_vertex_at(0, vertex) {
            return false;
        }

        let remaining = target.vertex_count(0);
        if vertex == 0 {
            Self::sync_closing_vertex(target, 0);
        } else if vertex == n - 1 && remaining > 0 {
            Self::sync_closing_vertex(target, remaining - 1);
        }

        true
    }

    /// Neighbours inside the ring. Rings wrap around, the closing vertex is skipped.
    fn adjacent_in_ring(
        &self,
        ring: usize,
        vertex: usize,
    ) -> Option<(Option<usize>, Option<usize>)> {
        let n = self.vertex_count(ring);
        if vertex >= n {
            return None;
        }
        if n < 3 {
            return Some((vertex.checked_sub(1), (vertex + 1 < n).then_some(vertex + 1)));
        }

        if vertex == 0 || vertex == n - 1 {
            Some((Some(n - 2), Some(1)))
        } else {
            Some((Some(vertex - 1), Some(vertex + 1)))
        }
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        self.rings.get(ring)?.vertex_angle_at(0, vertex)
    }

    fn swap_xy(&mut self) {
        self.rings.iter_mut().for_each(|r| r.swap_xy());
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
        for ring in &mut self.rings {
            ring.add_z_value(z);
        }
        true
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        if self.dimensions.has_m() {
            return false;
        }

        self.dimensions = self.dimensions.with_m(true);
        for ring in &mut self.rings {
            ring.add_m_value(m);
        }
        true
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        for ring in &mut self.rings {
            ring.transform_vertices(f);
        }
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        self.rings
            .iter_mut()
            .all(|ring| ring.try_transform_vertices(f))
    }

    /// Keeps the matching vertices. Rings are closed again afterwards; an interior ring left with too few
    /// vertices is dropped, a collapsed exterior ring clears the polygon.
    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        for ring in &mut self.rings {
            ring.filter_vertices(predicate);
            ring.close();
        }

        if self.vertex_count(0) < MIN_RING_VERTICES {
            self.rings.clear();
            return;
        }

        let mut index = 0;
        self.rings.retain(|ring| {
            index += 1;
            index == 1 || ring.vertex_count(0) >= MIN_RING_VERTICES
        });
    }

    /// Removes duplicate vertices of every ring, rings with four or less vertices are kept as they are.
    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        let mut changed = false;
        for ring in &mut self.rings {
            if ring.vertex_count(0) <= MIN_RING_VERTICES {
                continue;
            }

            if ring.remove_duplicate_nodes(tolerance, use_z) {
                ring.close();
                changed = true;
            }
        }

        changed
    }

    fn has_curved_segments(&self) -> bool {
        self.rings.iter().any(|r| r.has_curved_segments())
    }

    fn area(&self) -> f64 {
        let mut rings = self.rings.iter();
        let Some(exterior) = rings.next() else {
            return 0.0;
        };

        let holes: f64 = rings.map(|r| r.signed_area().abs()).sum();
        exterior.signed_area().abs() - holes
    }

    fn perimeter(&self) -> f64 {
        self.rings.iter().map(|r| r.length()).sum()
    }

    fn length(&self) -> f64 {
        0.0
    }

    fn bounding_box(&self) -> Option<Rect> {
        self.exterior()?.bounding_box()
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        let mut best = None;
        for (index, ring) in self.rings.iter().enumerate() {
            let hit = ring.closest_segment(point, epsilon).map(|mut hit| {
                hit.vertex_after = VertexId::new(0, index, hit.vertex_after.vertex);
                hit
            });
            SegmentHit::keep_closest(&mut best, hit);
        }

        best
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        Geom::Polygon(Polygon {
            rings: self
                .rings
                .iter()
                .map(|r| r.to_line_string(tolerance))
                .collect(),
            dimensions: self.dimensions,
        })
    }

    fn to_curve_type(&self) -> Geom {
        Geom::CurvePolygon(Polygon {
            rings: self.rings.iter().map(Ring::to_curve).collect(),
            dimensions: self.dimensions,
        })
    }
}

impl From<Polygon<LineString>> for CurvePolygon {
    fn from(value: Polygon<LineString>) -> Self {
        Polygon {
            rings: value.rings.into_iter().map(Curve::LineString).collect(),
            dimensions: value.dimensions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::CircularString;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn ring(coords: &[(f64, f64)]) -> LineString {
        LineString::new(coords.iter().map(|(x, y)| Point::new(*x, *y)).collect())
    }

    fn square_with_hole() -> Polygon {
        Polygon::new(
            ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]),
            vec![ring(&[(1.0, 1.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0), (1.0, 1.0)])],
        )
    }

    #[test]
    fn rings_are_closed_on_creation() {
        let polygon = Polygon::new(ring(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]), vec![]);
        assert_eq!(polygon.vertex_count(0), 4);
        assert!(polygon.exterior().unwrap().is_closed());
    }

    #[test]
    fn area_and_perimeter() {
        let polygon = square_with_hole();
        assert_abs_diff_eq!(polygon.area(), 36.0);
        assert_abs_diff_eq!(polygon.perimeter(), 72.0);
        assert_eq!(polygon.dimension(), 2);
        assert_eq!(polygon.n_coordinates(), 10);
    }

    #[test]
    fn moving_first_vertex_moves_last() {
        let mut polygon = square_with_hole();
        assert!(polygon.move_vertex_at(1, 0, Point::new(2.0, 2.0)));
        assert_eq!(polygon.vertex_at(1, 4), Some(Point::new(2.0, 2.0)));
        assert!(polygon.move_vertex_at(0, 4, Point::new(-1.0, -1.0)));
        assert_eq!(polygon.vertex_at(0, 0), Some(Point::new(-1.0, -1.0)));
        assert!(!polygon.move_vertex_at(2, 0, Point::new(0.0, 0.0)));
    }

    #[test]
    fn inserting_first_vertex_keeps_ring_closed() {
        let mut polygon = square_with_hole();
        assert!(polygon.insert_vertex_at(0, 0, Point::new(-5.0, 5.0)));
        assert_eq!(polygon.vertex_count(0), 6);
        assert_eq!(polygon.vertex_at(0, 5), Some(Point::new(-5.0, 5.0)));
        assert!(polygon.exterior().unwrap().is_closed());
    }

    #[test]
    fn deleting_from_small_ring_removes_it() {
        let mut polygon = Polygon::new(
            ring(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (0.0, 0.0)]),
            vec![ring(&[(1.0, 1.0), (1.0, 2.0), (2.0, 2.0), (1.0, 1.0)])],
        );
        assert!(polygon.delete_vertex_at(0, 1));
        assert_eq!(polygon.ring_count(), 1);
        assert_eq!(polygon.vertex_at(0, 0), Some(Point::new(1.0, 1.0)));
        assert!(polygon.delete_vertex_at(0, 0));
        assert!(Geometry::is_empty(&polygon));
    }

    #[test]
    fn deleting_first_vertex_recloses_ring() {
        let mut polygon = square_with_hole();
        assert!(polygon.delete_vertex_at(0, 0));
        assert_eq!(polygon.vertex_count(0), 4);
        assert_eq!(polygon.vertex_at(0, 0), Some(Point::new(0.0, 10.0)));
        assert_eq!(polygon.vertex_at(0, 3), Some(Point::new(0.0, 10.0)));
    }

    #[test]
    fn adjacent_vertices_wrap() {
        let polygon = square_with_hole();
        assert_eq!(polygon.adjacent_in_ring(0, 0), Some((Some(3), Some(1))));
        assert_eq!(polygon.adjacent_in_ring(0, 4), Some((Some(3), Some(1))));
        assert_eq!(polygon.adjacent_in_ring(1, 2), Some((Some(1), Some(3))));
        assert_eq!(polygon.adjacent_in_ring(1, 5), None);
    }

    #[test]
    fn closest_segment_reports_ring() {
        let polygon = square_with_hole();
        let hit = polygon
            .closest_segment(&Point::new(5.0, 8.5), crate::segment::DEFAULT_EPSILON)
            .unwrap();
        assert_eq!(hit.vertex_after, VertexId::new(0, 1, 2));
        assert_abs_diff_eq!(hit.sq_dist, 0.25);
    }

    #[test]
    fn curve_polygon_area() {
        let mut exterior = CompoundCurve::from(CircularString::new(vec![
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
        ]));
        exterior.close();
        let polygon = CurvePolygon::new(Curve::CompoundCurve(exterior), vec![]);
        assert_eq!(polygon.wkb_type().kind, GeometryKind::CurvePolygon);
        assert_abs_diff_eq!(polygon.area(), PI / 2.0, epsilon = 1e-12);
        assert!(polygon.has_curved_segments());

        let Geom::Polygon(linear) = polygon.segmentize(SegmentationTolerance::default()) else {
            panic!("expected polygon");
        };
        assert!(!linear.has_curved_segments());
        assert_abs_diff_eq!(linear.area(), PI / 2.0, epsilon = 1e-3);
    }

    #[test]
    fn curve_type_of_polygon() {
        let Geom::CurvePolygon(curved) = square_with_hole().to_curve_type() else {
            panic!("expected curve polygon");
        };
        assert_eq!(curved.ring_count(), 2);
        assert_eq!(curved.rings()[0].kind(), GeometryKind::CompoundCurve);
        assert_abs_diff_eq!(curved.area(), 36.0);
    }
}
