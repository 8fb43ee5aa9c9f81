use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::impls::{CircularString, Curve, LineString};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::{self, average_angle, SegmentHit};
use crate::vertex_id::VertexId;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Chain of line strings and circular strings, each one starting where the previous one ends.
///
/// Vertices shared by two neighbouring pieces are counted once, so vertex positions run continuously through
/// the whole curve.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompoundCurve {
    curves: Vec<Curve>,
    dimensions: Dimensions,
}

impl CompoundCurve {
    /// Creates an empty compound curve.
    pub fn empty(dimensions: Dimensions) -> Self {
        Self {
            curves: vec![],
            dimensions,
        }
    }

    /// Creates a compound curve from the pieces. Dimensions are taken from the first piece.
    pub fn new(curves: Vec<Curve>) -> Self {
        let dimensions = curves
            .first()
            .map(Curve::dimensions)
            .unwrap_or_default();
        let mut compound = Self::empty(dimensions);
        for curve in curves {
            compound.add_curve(curve);
        }

        compound
    }

    /// Pieces of the curve.
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    /// Number of pieces.
    pub fn num_curves(&self) -> usize {
        self.curves.len()
    }

    /// Ordinates of the vertices.
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    /// Appends a piece. Nested compound curves are flattened, a gap between the pieces is bridged with a
    /// straight segment.
    pub fn add_curve(&mut self, curve: Curve) {
        match curve {
            Curve::CompoundCurve(compound) => {
                for curve in compound.curves {
                    self.add_curve(curve);
                }
            }
            mut curve => {
                curve.set_dimensions(self.dimensions);
                self.curves.push(curve);
                self.normalize();
            }
        }
    }

    /// Removes all pieces.
    pub fn clear(&mut self) {
        self.curves.clear();
    }

    /// True if the first and the last vertices coincide.
    pub fn is_closed(&self) -> bool {
        match (self.curves.first(), self.curves.last()) {
            (Some(first), Some(last)) if self.n_coordinates() > 1 => {
                match (first.start_point(), last.end_point()) {
                    (Some(start), Some(end)) => start.equal_2d(&end),
                    _ => false,
                }
            }
            _ => false,
        }
    }

    /// Connects the end to the start with a straight segment if the curve is not closed.
    pub fn close(&mut self) {
        if self.is_closed() {
            return;
        }

        let (Some(start), Some(end)) = (self.vertex_at(0, 0), self.last_point()) else {
            return;
        };
        self.curves.push(Curve::LineString(LineString::with_dimensions(
            self.dimensions,
            vec![end, start],
        )));
        self.normalize();
    }

    /// Signed area enclosed by the curve, positive for counter-clockwise curves.
    pub fn signed_area(&self) -> f64 {
        let mut chords = vec![];
        let mut arcs = 0.0;
        for curve in &self.curves {
            match curve {
                Curve::LineString(line) => chords.extend_from_slice(line.points()),
                Curve::CircularString(cs) => {
                    chords.extend(cs.chord_points());
                    arcs += cs.arcs_area();
                }
                Curve::CompoundCurve(compound) => arcs += compound.signed_area(),
            }
        }

        segment::shoelace(&chords) + arcs
    }

    /// Vertices of the linear approximation.
    pub fn segmentized_points(&self, tolerance: SegmentationTolerance) -> Vec<Point> {
        let mut points: Vec<Point> = vec![];
        for curve in &self.curves {
            let skip = !points.is_empty() as usize;
            points.extend(curve.segmentized_points(tolerance).into_iter().skip(skip));
        }

        points
    }

    /// Linear approximation of the curve.
    pub fn to_line_string(&self, tolerance: SegmentationTolerance) -> LineString {
        LineString::with_dimensions(self.dimensions, self.segmentized_points(tolerance))
    }

    pub(crate) fn set_dimensions(&mut self, dimensions: Dimensions) {
        self.dimensions = dimensions;
        for curve in &mut self.curves {
            curve.set_dimensions(dimensions);
        }
    }

    fn last_point(&self) -> Option<Point> {
        self.curves.last()?.end_point()
    }

    /// Pieces containing the vertex with their local positions. A shared vertex is found in two pieces.
    fn locate(&self, vertex: usize) -> Vec<(usize, usize)> {
        let mut found = vec![];
        let mut offset = 0;
        for (index, curve) in self.curves.iter().enumerate() {
            let count = curve.vertex_count(0);
            if count == 0 {
                continue;
            }
            if vertex >= offset && vertex < offset + count {
                found.push((index, vertex - offset));
            }
            offset += count - 1;
        }

        found
    }

    fn offset_of(&self, index: usize) -> usize {
        self.curves[..index]
            .iter()
            .map(|c| c.vertex_count(0).saturating_sub(1))
            .sum()
    }

    /// Drops empty pieces, restores continuity between the pieces and merges neighbouring line strings.
    fn normalize(&mut self) {
        let mut result: Vec<Curve> = Vec::with_capacity(self.curves.len());
        for mut curve in std::mem::take(&mut self.curves) {
            if curve.is_empty() {
                continue;
            }

            let gap = match (result.last().and_then(Curve::end_point), curve.start_point()) {
                (Some(end), Some(start)) if !end.equal_2d(&start) => Some((end, start)),
                _ => None,
            };

            if let Some((end, start)) = gap {
                let bridge = match (result.last_mut(), &mut curve) {
                    (Some(Curve::LineString(prev)), _) => {
                        prev.push(start);
                        false
                    }
                    (_, Curve::LineString(line)) => !line.insert_vertex_at(0, 0, end),
                    _ => true,
                };

                if bridge {
                    result.push(Curve::LineString(LineString::with_dimensions(
                        self.dimensions,
                        vec![end, start],
                    )));
                }
            }

            if !result.is_empty() && curve.vertex_count(0) < 2 {
                continue;
            }

            if let (Some(Curve::LineString(prev)), Curve::LineString(line)) =
                (result.last_mut(), &curve)
            {
                for p in line.points().iter().skip(1) {
                    prev.push(*p);
                }
                continue;
            }

            result.push(curve);
        }

        self.curves = result;
    }

    fn collapse_if_degenerate(&mut self) {
        if self.n_coordinates() < 2 {
            self.curves.clear();
        }
    }
}

impl Geometry for CompoundCurve {
    fn wkb_type(&self) -> WkbType {
        WkbType::new(GeometryKind::CompoundCurve, self.dimensions)
    }

    fn is_empty(&self) -> bool {
        self.curves.iter().all(Curve::is_empty)
    }

    fn dimension(&self) -> u8 {
        1
    }

    fn ring_count(&self) -> usize {
        !Geometry::is_empty(self) as usize
    }

    fn vertex_count(&self, ring: usize) -> usize {
        if ring != 0 {
            return 0;
        }

        let mut counts = self
            .curves
            .iter()
            .map(|c| c.vertex_count(0))
            .filter(|count| *count > 0);
        match counts.next() {
            Some(first) => first + counts.map(|count| count - 1).sum::<usize>(),
            None => 0,
        }
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        if ring != 0 {
            return None;
        }

        let (index, local) = *self.locate(vertex).first()?;
        self.curves[index].vertex_at(0, local)
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        if ring != 0 {
            return false;
        }

        let count = self.vertex_count(0);
        if vertex > count {
            return false;
        }

        let point = point.with_dimensions(self.dimensions);
        if self.curves.is_empty() {
            self.curves
                .push(Curve::LineString(LineString::with_dimensions(self.dimensions, vec![point])));
            return true;
        }

        if vertex == 0 {
            return match &mut self.curves[0] {
                Curve::LineString(line) => line.insert_vertex_at(0, 0, point),
                first => {
                    let Some(start) = first.start_point() else {
                        return false;
                    };
                    self.curves.insert(
                        0,
                        Curve::LineString(LineString::with_dimensions(
                            self.dimensions,
                            vec![point, start],
                        )),
                    );
                    true
                }
            };
        }

        if vertex == count {
            let dimensions = self.dimensions;
            return match self.curves.last_mut() {
                Some(Curve::LineString(line)) => {
                    line.push(point);
                    true
                }
                Some(last) => {
                    let Some(end) = last.end_point() else {
                        return false;
                    };
                    self.curves.push(Curve::LineString(LineString::with_dimensions(
                        dimensions,
                        vec![end, point],
                    )));
                    true
                }
                None => false,
            };
        }

        let mut offset = 0;
        for curve in &mut self.curves {
            let n = curve.vertex_count(0);
            if n == 0 {
                continue;
            }
            if vertex > offset && vertex < offset + n {
                return curve.insert_vertex_at(0, vertex - offset, point);
            }
            offset += n - 1;
        }

        false
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        if ring != 0 {
            return false;
        }

        let found = self.locate(vertex);
        for (index, local) in &found {
            self.curves[*index].move_vertex_at(0, *local, point);
        }

        !found.is_empty()
    }

    /// Removes the vertex. A piece that becomes invalid is replaced by a straight segment between its
    /// remaining end points, a shared vertex is removed from both pieces and the gap is bridged.
    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        if ring != 0 {
            return false;
        }

        let found = self.locate(vertex);
        if found.is_empty() {
            return false;
        }

        for (index, local) in found.into_iter().rev() {
            let curve = &mut self.curves[index];
            let last = curve.vertex_count(0) - 1;
            let (start, end) = (curve.start_point(), curve.end_point());
            curve.delete_vertex_at(0, local);

            if curve.is_empty() {
                let remaining: Vec<Point> = [
                    (local != 0).then_some(start),
                    (local != last).then_some(end),
                ]
                .into_iter()
                .flatten()
                .flatten()
                .collect();
                *curve =
                    Curve::LineString(LineString::with_dimensions(self.dimensions, remaining));
            }
        }

        self.normalize();
        self.collapse_if_degenerate();
        true
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        if ring != 0 {
            return None;
        }

        let found = self.locate(vertex);
        match found.as_slice() {
            [] => None,
            [(before, _), (after, _)] => Some(average_angle(
                self.curves[*before].end_direction()?,
                self.curves[*after].start_direction()?,
            )),
            [(index, local)] => {
                let count = self.vertex_count(0);
                let at_end = vertex == 0 || vertex + 1 == count;
                if at_end && self.curves.len() > 1 && self.is_closed() {
                    let first = self.curves.first()?;
                    let last = self.curves.last()?;
                    Some(average_angle(last.end_direction()?, first.start_direction()?))
                } else {
                    self.curves[*index].vertex_angle_at(0, *local)
                }
            }
            _ => None,
        }
    }

    fn swap_xy(&mut self) {
        self.curves.iter_mut().for_each(Curve::swap_xy);
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
        for curve in &mut self.curves {
            curve.add_z_value(z);
        }
        true
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        if self.dimensions.has_m() {
            return false;
        }

        self.dimensions = self.dimensions.with_m(true);
        for curve in &mut self.curves {
            curve.add_m_value(m);
        }
        true
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        for curve in &mut self.curves {
            curve.transform_vertices(f);
        }
    }

    /// The joint of two pieces is stored in both of them but converted once.
    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        let mut joint: Option<(Point, Point)> = None;
        for curve in &mut self.curves {
            let mut at_start = true;
            let mut last = None;
            let converted = curve.try_transform_vertices(&mut |point| {
                let shared = std::mem::replace(&mut at_start, false)
                    .then_some(joint)
                    .flatten()
                    .filter(|(original, _)| original == point);
                let converted = match shared {
                    Some((_, converted)) => converted,
                    None => f(point)?,
                };
                last = Some((*point, converted));
                Some(converted)
            });

            if !converted {
                return false;
            }
            if last.is_some() {
                joint = last;
            }
        }

        true
    }

    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        for curve in &mut self.curves {
            curve.filter_vertices(predicate);
        }
        self.normalize();
        self.collapse_if_degenerate();
    }

    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        let mut changed = false;
        for curve in &mut self.curves {
            changed |= curve.remove_duplicate_nodes(tolerance, use_z);
        }

        if changed {
            self.normalize();
        }
        changed
    }

    fn has_curved_segments(&self) -> bool {
        self.curves.iter().any(Curve::has_curved_segments)
    }

    fn area(&self) -> f64 {
        0.0
    }

    fn perimeter(&self) -> f64 {
        0.0
    }

    fn length(&self) -> f64 {
        self.curves.iter().map(Curve::length).sum()
    }

    fn bounding_box(&self) -> Option<Rect> {
        Rect::merge_all(self.curves.iter().map(Curve::bounding_box))
    }

    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        let mut best = None;
        for (index, curve) in self.curves.iter().enumerate() {
            let offset = self.offset_of(index);
            let hit = curve.closest_segment(point, epsilon).map(|mut hit| {
                hit.vertex_after = VertexId::new(0, 0, offset + hit.vertex_after.vertex);
                hit
            });
            SegmentHit::keep_closest(&mut best, hit);
        }

        best
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        Geom::LineString(self.to_line_string(tolerance))
    }

    fn to_curve_type(&self) -> Geom {
        Geom::CompoundCurve(self.clone())
    }
}

impl From<LineString> for CompoundCurve {
    fn from(value: LineString) -> Self {
        let mut compound = Self::empty(value.dimensions());
        if !Geometry::is_empty(&value) {
            compound.curves.push(Curve::LineString(value));
        }
        compound
    }
}

impl From<CircularString> for CompoundCurve {
    fn from(value: CircularString) -> Self {
        let mut compound = Self::empty(value.dimensions());
        if !Geometry::is_empty(&value) {
            compound.curves.push(Curve::CircularString(value));
        }
        compound
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    /// Line from (0,0) to (1,0), half circle to (3,0), line to (4,0).
    fn mixed() -> CompoundCurve {
        CompoundCurve::new(vec![
            LineString::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]).into(),
            CircularString::new(vec![
                Point::new(1.0, 0.0),
                Point::new(2.0, 1.0),
                Point::new(3.0, 0.0),
            ])
            .into(),
            LineString::new(vec![Point::new(3.0, 0.0), Point::new(4.0, 0.0)]).into(),
        ])
    }

    #[test]
    fn shared_vertices_counted_once() {
        let curve = mixed();
        assert_eq!(curve.num_curves(), 3);
        assert_eq!(curve.n_coordinates(), 5);
        assert_eq!(curve.vertex_at(0, 2), Some(Point::new(2.0, 1.0)));
        assert_eq!(curve.vertex_at(0, 4), Some(Point::new(4.0, 0.0)));
        assert_eq!(curve.vertex_at(0, 5), None);
        assert_abs_diff_eq!(curve.length(), 2.0 + PI, epsilon = 1e-12);
    }

    #[test]
    fn move_shared_vertex() {
        let mut curve = mixed();
        assert!(curve.move_vertex_at(0, 3, Point::new(3.0, 0.5)));
        let Curve::LineString(last) = &curve.curves()[2] else {
            panic!("expected line string");
        };
        assert_eq!(last.point_n(0), Some(Point::new(3.0, 0.5)));
        assert_eq!(curve.curves()[1].end_point(), Some(Point::new(3.0, 0.5)));
    }

    #[test]
    fn delete_control_point_straightens_arc() {
        let mut curve = mixed();
        assert!(curve.delete_vertex_at(0, 2));
        assert_eq!(curve.num_curves(), 1);
        assert!(!curve.has_curved_segments());
        let vertices: Vec<Point> = (0..curve.n_coordinates())
            .filter_map(|i| curve.vertex_at(0, i))
            .collect();
        assert_eq!(
            vertices,
            vec![
                Point::new(0.0, 0.0),
                Point::new(1.0, 0.0),
                Point::new(3.0, 0.0),
                Point::new(4.0, 0.0)
            ]
        );
    }

    #[test]
    fn delete_shared_vertex_bridges_gap() {
        let mut curve = mixed();
        assert!(curve.delete_vertex_at(0, 1));
        assert_eq!(curve.n_coordinates(), 3);
        assert_eq!(curve.vertex_at(0, 0), Some(Point::new(0.0, 0.0)));
        assert_eq!(curve.vertex_at(0, 1), Some(Point::new(3.0, 0.0)));
        assert_eq!(curve.vertex_at(0, 2), Some(Point::new(4.0, 0.0)));
    }

    #[test]
    fn delete_until_empty() {
        let mut curve = CompoundCurve::from(LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
        ]));
        assert!(curve.delete_vertex_at(0, 0));
        assert!(Geometry::is_empty(&curve));
        assert!(!curve.delete_vertex_at(0, 0));
    }

    #[test]
    fn insert_at_ends() {
        let mut curve = CompoundCurve::from(CircularString::new(vec![
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(3.0, 0.0),
        ]));
        assert!(curve.insert_vertex_at(0, 0, Point::new(0.0, 0.0)));
        assert!(curve.insert_vertex_at(0, 4, Point::new(4.0, 0.0)));
        assert_eq!(curve, mixed());
        assert!(!curve.insert_vertex_at(0, 7, Point::new(9.0, 9.0)));
    }

    #[test]
    fn closed_curve_area() {
        let mut curve = CompoundCurve::from(CircularString::new(vec![
            Point::new(-1.0, 0.0),
            Point::new(0.0, -1.0),
            Point::new(1.0, 0.0),
        ]));
        curve.close();
        assert!(curve.is_closed());
        assert_abs_diff_eq!(curve.signed_area(), PI / 2.0, epsilon = 1e-12);
    }

    #[test]
    fn closest_segment_uses_global_positions() {
        let curve = mixed();
        let hit = curve
            .closest_segment(&Point::new(4.0, 1.0), segment::DEFAULT_EPSILON)
            .unwrap();
        assert_eq!(hit.vertex_after, VertexId::new(0, 0, 4));
        assert_abs_diff_eq!(hit.sq_dist, 1.0);
    }

    #[test]
    fn nested_compound_curves_are_flattened() {
        let mut curve = CompoundCurve::empty(Dimensions::Xy);
        curve.add_curve(Curve::CompoundCurve(mixed()));
        assert_eq!(curve.num_curves(), 3);
    }
}
