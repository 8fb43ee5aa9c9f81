use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::SegmentHit;
use crate::vertex_id::VertexId;
use crate::wkb_type::{GeometryKind, WkbType};

impl Geometry for Point {
    fn wkb_type(&self) -> WkbType {
        WkbType::new(GeometryKind::Point, self.dimensions())
    }

    fn is_empty(&self) -> bool {
        Point::is_empty(self)
    }

    fn dimension(&self) -> u8 {
        0
    }

    fn ring_count(&self) -> usize {
        if Point::is_empty(self) {
            0
        } else {
            1
        }
    }

    fn vertex_count(&self, ring: usize) -> usize {
        (ring == 0 && !Point::is_empty(self)) as usize
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        (ring == 0 && vertex == 0 && !Point::is_empty(self)).then_some(*self)
    }

    fn insert_vertex_at(&mut self, _ring: usize, _vertex: usize, _point: Point) -> bool {
        false
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        if ring != 0 || vertex != 0 {
            return false;
        }

        *self = point.with_dimensions(self.dimensions());
        true
    }

    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        if self.vertex_at(ring, vertex).is_none() {
            return false;
        }

        *self = Point::empty(self.dimensions());
        true
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        self.vertex_at(ring, vertex).map(|_| 0.0)
    }

    fn swap_xy(&mut self) {
        Point::swap_xy(self)
    }

    fn drop_z_value(&mut self) -> bool {
        if self.z().is_none() {
            return false;
        }

        self.set_z(None);
        true
    }

    fn drop_m_value(&mut self) -> bool {
        if self.m().is_none() {
            return false;
        }

        self.set_m(None);
        true
    }

    fn add_z_value(&mut self, z: f64) -> bool {
        if self.z().is_some() {
            return false;
        }

        self.set_z(Some(z));
        true
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        if self.m().is_some() {
            return false;
        }

        self.set_m(Some(m));
        true
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        if !Point::is_empty(self) {
            *self = f(self).with_dimensions(self.dimensions());
        }
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        if Point::is_empty(self) {
            return true;
        }

        match f(self) {
            Some(p) => {
                *self = p.with_dimensions(self.dimensions());
                true
            }
            None => false,
        }
    }

    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        if !Point::is_empty(self) && !predicate(self) {
            *self = Point::empty(self.dimensions());
        }
    }

    fn remove_duplicate_nodes(&mut self, _tolerance: f64, _use_z: bool) -> bool {
        false
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
        0.0
    }

    fn bounding_box(&self) -> Option<Rect> {
        Rect::from_points([self])
    }

    fn closest_segment(&self, point: &Point, _epsilon: f64) -> Option<SegmentHit> {
        if Point::is_empty(self) {
            return None;
        }

        Some(SegmentHit {
            sq_dist: self.distance_sq(point),
            point: Point::new(self.x(), self.y()),
            vertex_after: VertexId::new(0, 0, 0),
            left_of: None,
        })
    }

    fn segmentize(&self, _tolerance: SegmentationTolerance) -> Geom {
        Geom::Point(*self)
    }

    fn to_curve_type(&self) -> Geom {
        Geom::Point(*self)
    }
}
