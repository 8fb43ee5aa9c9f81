use crate::arc::{self, Arc};
use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::impls::sequence;
use crate::impls::LineString;
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::{self, average_angle, line_angle, SegmentHit};
use crate::vertex_id::VertexId;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Chain of circular arcs. Every arc is defined by its start, a control point on the arc and its end; the end of
/// one arc is the start of the next, so a valid string has an odd number of vertices, at least three.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CircularString {
    points: Vec<Point>,
    dimensions: Dimensions,
}

impl CircularString {
    /// Creates a circular string. Dimensions are taken from the first point.
    pub fn new(points: Vec<Point>) -> Self {
        let dimensions = points
            .first()
            .map(Point::dimensions)
            .unwrap_or_default();
        Self::with_dimensions(dimensions, points)
    }

    /// Creates a circular string with the given dimensions.
    pub fn with_dimensions(dimensions: Dimensions, mut points: Vec<Point>) -> Self {
        sequence::set_dimensions(&mut points, dimensions);
        Self { points, dimensions }
    }

    /// Creates an empty circular string.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self {
            points: vec![],
            dimensions,
        }
    }

    /// Vertices, including the control points.
    pub fn points(&self) -> &[Point] {
        &self.points
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

    /// Removes all vertices.
    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// True if the first and the last vertices coincide.
    pub fn is_closed(&self) -> bool {
        segment::is_closed(&self.points)
    }

    fn arcs(&self) -> impl Iterator<Item = (usize, &Point, &Point, &Point)> + '_ {
        (0..self.points.len().saturating_sub(1) / 2).map(move |i| {
            let start = i * 2;
            (
                start,
                &self.points[start],
                &self.points[start + 1],
                &self.points[start + 2],
            )
        })
    }

    /// Signed area enclosed by the string, positive for counter-clockwise strings.
    pub fn signed_area(&self) -> f64 {
        let ends: Vec<Point> = self.chord_points().collect();
        segment::shoelace(&ends) + self.arcs_area()
    }

    /// Start and end points of the arcs, without the control points.
    pub(crate) fn chord_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().step_by(2).copied()
    }

    /// Sum of the signed areas between every arc and its chord.
    pub(crate) fn arcs_area(&self) -> f64 {
        self.arcs()
            .filter_map(|(_, a, b, c)| Arc::new(a, b, c))
            .map(|arc| arc.segment_area())
            .sum()
    }

    /// Direction of travel at the start point.
    pub(crate) fn start_direction(&self) -> Option<f64> {
        (self.points.len() >= 3).then(|| self.arc_tangent(0, 0))
    }

    /// Direction of travel at the end point.
    pub(crate) fn end_direction(&self) -> Option<f64> {
        let n = self.points.len();
        (n >= 3).then(|| self.arc_tangent(n - 3, n - 1))
    }

    /// Vertices of the linear approximation.
    pub fn segmentized_points(&self, tolerance: SegmentationTolerance) -> Vec<Point> {
        let mut points = vec![];
        for (_, start, control, end) in self.arcs() {
            points.extend(arc::segmentize(start, control, end, tolerance));
        }

        if let Some(last) = self.points.last() {
            points.push(*last);
        }

        points
    }

    /// Linear approximation of the string.
    pub fn to_line_string(&self, tolerance: SegmentationTolerance) -> LineString {
        LineString::with_dimensions(self.dimensions, self.segmentized_points(tolerance))
    }

    pub(crate) fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        sequence::set_dimensions(&mut self.points, dimensions);
    }

    /// True if the vertex count is zero, or odd and at least three.
    pub(crate) fn forms_arcs(count: usize) -> bool {
        count == 0 || (count >= 3 && count % 2 == 1)
    }

    /// Direction at `at` of the arc starting at `arc_start`. A string with an even number of vertices ends with
    /// a vertex that belongs to no arc, the last two vertices are then treated as a straight segment.
    fn arc_tangent(&self, arc_start: usize, at: usize) -> f64 {
        match self.points.get(arc_start..arc_start + 3) {
            Some([a, b, c]) => match Arc::new(a, b, c) {
                Some(arc) => arc.tangent_at(&self.points[at]),
                None => line_angle(a, c),
            },
            _ => match self.points.get(arc_start..) {
                Some([.., a, b]) => line_angle(a, b),
                _ => 0.0,
            },
        }
    }
}

impl Geometry for CircularString {
    fn wkb_type(&self) -> WkbType {
        WkbType::new(GeometryKind::CircularString, self.dimensions)
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

    /// Inserts the vertex and a control point between it and the following vertex, so that the string keeps
    /// an odd number of vertices. Vertices cannot be inserted before the start or after the end.
    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        if ring != 0 || vertex == 0 || vertex >= self.points.len() {
            return false;
        }

        let point = point.with_dimensions(self.dimensions);
        let control = point.lerp(&self.points[vertex], 0.5);
        self.points.insert(vertex, point);
        self.points.insert(vertex + 1, control);
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

    /// Removes the vertex together with its neighbour, so that the remaining vertices still form arcs.
    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        let n = self.points.len();
        if ring != 0 || vertex >= n {
            return false;
        }

        if n < 4 {
            self.points.clear();
        } else if vertex + 2 < n {
            self.points.drain(vertex..vertex + 2);
        } else {
            self.points.drain(vertex - 1..=vertex);
        }

        true
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        let n = self.points.len();
        if ring != 0 || vertex >= n {
            return None;
        }
        if n < 3 {
            return segment::polyline_vertex_angle(&self.points, vertex);
        }

        let last_arc = n - 3;
        let angle = if vertex % 2 == 1 {
            self.arc_tangent(vertex - 1, vertex)
        } else if vertex == 0 || vertex == n - 1 {
            if self.is_closed() {
                average_angle(
                    self.arc_tangent(last_arc, n - 1),
                    self.arc_tangent(0, 0),
                )
            } else if vertex == 0 {
                self.arc_tangent(0, 0)
            } else {
                self.arc_tangent(last_arc, n - 1)
            }
        } else {
            average_angle(
                self.arc_tangent(vertex - 2, vertex),
                self.arc_tangent(vertex, vertex),
            )
        };

        Some(angle)
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

    /// Keeps the matching vertices. A trailing vertex that would leave an even count is dropped as well.
    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        self.points.retain(|p| predicate(p));
        if self.points.len() % 2 == 0 {
            self.points.pop();
        }
        if self.points.len() < 3 {
            self.points.clear();
        }
    }

    /// Removes arcs whose control and end points coincide with the start within the tolerance.
    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        if self.points.len() <= 3 {
            return false;
        }

        let same = |a: &Point, b: &Point| {
            let same_z = match (use_z, a.z(), b.z()) {
                (true, Some(az), Some(bz)) => segment::near(az, bz, tolerance),
                _ => true,
            };
            segment::near(a.x(), b.x(), tolerance)
                && segment::near(a.y(), b.y(), tolerance)
                && same_z
        };

        let mut kept = vec![self.points[0]];
        for (_, start, control, end) in self.arcs() {
            let anchor = kept.last().copied().unwrap_or(*start);
            if same(&anchor, control) && same(&anchor, end) {
                continue;
            }
            kept.push(*control);
            kept.push(*end);
        }

        if kept.len() < 3 || kept.len() == self.points.len() {
            return false;
        }

        self.points = kept;
        true
    }

    fn has_curved_segments(&self) -> bool {
        !self.points.is_empty()
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn perimeter(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        self.arcs()
            .map(|(_, a, b, c)| match Arc::new(a, b, c) {
                Some(arc) => arc.length(),
                None => a.distance(b) + b.distance(c),
            })
            .sum()
    }

    fn bounding_box(&self) -> Option<Rect> {
        Rect::from_points(&self.segmentized_points(SegmentationTolerance::default()))
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        let mut best: Option<SegmentHit> = None;
        for (start, a, b, c) in self.arcs() {
            let candidate = match arc::closest_point(a, b, c, point) {
                Some((sq_dist, closest, after_control, left_of)) => {
                    let (sq_dist, closest) = if segment::near(sq_dist, 0.0, epsilon) {
                        (0.0, Point::new(point.x(), point.y()))
                    } else {
                        (sq_dist, closest)
                    };
                    Some(SegmentHit {
                        sq_dist,
                        point: closest,
                        vertex_after: VertexId::new(0, 0, start + 1 + after_control as usize),
                        left_of: if sq_dist == 0.0 { None } else { left_of },
                    })
                }
                None => segment::closest_polyline_segment(&[*a, *b, *c], point, epsilon).map(
                    |mut hit| {
                        hit.vertex_after.vertex += start;
                        hit
                    },
                ),
            };

            SegmentHit::keep_closest(&mut best, candidate);
        }

        best
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        Geom::LineString(self.to_line_string(tolerance))
    }

    fn to_curve_type(&self) -> Geom {
        Geom::CircularString(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn half_circle() -> CircularString {
        CircularString::new(vec![
            Point::new(-1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 0.0),
        ])
    }

    #[test]
    fn segmentize_keeps_endpoints() {
        let cs = CircularString::new(vec![
            Point::new(1.0, 2.0),
            Point::new(11.0, 10.0),
            Point::new(21.0, 2.0),
        ]);
        let Geom::LineString(line) = cs.segmentize(SegmentationTolerance::default()) else {
            panic!("expected line string");
        };
        assert_eq!(line.num_points(), 156);
        assert_eq!(line.point_n(0), Some(Point::new(1.0, 2.0)));
        assert_eq!(line.point_n(155), Some(Point::new(21.0, 2.0)));
    }

    #[test]
    fn length_and_area() {
        let cs = half_circle();
        assert_abs_diff_eq!(cs.length(), PI, epsilon = 1e-12);
        assert!(cs.has_curved_segments());

        let circle = CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(2.0, 0.0),
            Point::new(0.0, 0.0),
        ]);
        assert_abs_diff_eq!(circle.signed_area(), PI, epsilon = 1e-12);
    }

    #[test]
    fn delete_removes_pairs() {
        let mut cs = CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, -1.0),
            Point::new(4.0, 0.0),
        ]);
        assert!(cs.delete_vertex_at(0, 1));
        assert_eq!(
            cs.points(),
            &[
                Point::new(0.0, 0.0),
                Point::new(3.0, -1.0),
                Point::new(4.0, 0.0)
            ]
        );
        assert!(cs.delete_vertex_at(0, 2));
        assert!(Geometry::is_empty(&cs));
        assert!(!cs.delete_vertex_at(0, 0));
    }

    #[test]
    fn insert_keeps_odd_count() {
        let mut cs = half_circle();
        assert!(!cs.insert_vertex_at(0, 0, Point::new(5.0, 5.0)));
        assert!(!cs.insert_vertex_at(0, 3, Point::new(5.0, 5.0)));
        assert!(cs.insert_vertex_at(0, 1, Point::new(-0.5, 0.8)));
        assert_eq!(cs.num_points(), 5);
        assert_eq!(cs.point_n(1), Some(Point::new(-0.5, 0.8)));
    }

    #[test]
    fn closest_segment_on_arc() {
        let cs = half_circle();
        let hit = cs.closest_segment(&Point::new(0.5, 2.0), 1e-12).unwrap();
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 2));
        assert_abs_diff_eq!(hit.point.distance(&Point::new(0.0, 0.0)), 1.0, epsilon = 1e-12);

        let hit = cs.closest_segment(&Point::new(-0.6, 0.8), 1e-12).unwrap();
        assert_eq!(hit.sq_dist, 0.0);
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 1));
        assert_eq!(hit.left_of, None);
    }

    #[test]
    fn valid_counts() {
        assert!(CircularString::forms_arcs(0));
        assert!(CircularString::forms_arcs(3));
        assert!(CircularString::forms_arcs(5));
        assert!(!CircularString::forms_arcs(1));
        assert!(!CircularString::forms_arcs(2));
        assert!(!CircularString::forms_arcs(4));
    }

    #[test]
    fn angles_of_even_count_string() {
        let cs = CircularString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 1.0),
            Point::new(2.0, 0.0),
            Point::new(3.0, 3.0),
        ]);
        for vertex in 0..4 {
            assert!(cs.vertex_angle_at(0, vertex).is_some(), "vertex {vertex}");
        }
        assert_abs_diff_eq!(
            cs.vertex_angle_at(0, 3).unwrap(),
            line_angle(&Point::new(2.0, 0.0), &Point::new(3.0, 3.0)),
            epsilon = 1e-12
        );
        assert!(cs.start_direction().is_some());
        assert!(cs.end_direction().is_some());
    }

    #[test]
    fn angles_follow_tangent() {
        let cs = half_circle();
        let start = cs.vertex_angle_at(0, 0).unwrap();
        assert!(start < 1e-12 || std::f64::consts::TAU - start < 1e-12);
        assert_abs_diff_eq!(cs.vertex_angle_at(0, 1).unwrap(), PI / 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(cs.vertex_angle_at(0, 2).unwrap(), PI, epsilon = 1e-12);
    }
}
