//! [`GeometryCollection`] and its vertex addressing, editing and transformation operations.

mod editing;
mod transform;
mod vertices;

use crate::config::SegmentationTolerance;
use crate::geometry::{Geom, Geometry};
use crate::point::Point;
use crate::rect::Rect;
use crate::segment::SegmentHit;
use crate::vertex_id::VertexId;
use crate::wkb_type::{Dimensions, GeometryKind, WkbType};

/// Ordered set of owned geometries of any kind, including nested collections.
///
/// The collection has its own declared [`WkbType`]. It is either a generic `GEOMETRYCOLLECTION` accepting any
/// part, or one of the multi-geometry kinds accepting only matching parts (see [`GeometryKind::accepts`]).
/// Adding a part with other dimensions than the declared ones does not change the declared type.
///
/// Vertices of the parts are addressed with [`VertexId`]s. Part order defines the global numbering of the
/// vertices (see [`GeometryCollection::vertex_number_from_vertex_id`]).
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryCollection {
    wkb_type: WkbType,
    parts: Vec<Geom>,
}

impl Default for GeometryCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl GeometryCollection {
    /// Creates an empty 2D `GEOMETRYCOLLECTION`.
    pub fn new() -> Self {
        Self {
            wkb_type: WkbType::flat(GeometryKind::GeometryCollection),
            parts: vec![],
        }
    }

    /// Creates an empty collection of the given type. Returns `None` if the type is not a collection kind.
    pub fn with_type(wkb_type: WkbType) -> Option<Self> {
        if !wkb_type.kind.is_collection() {
            return None;
        }

        Some(Self {
            wkb_type,
            parts: vec![],
        })
    }

    /// Creates a collection of the given parts. Parts the declared kind does not accept are skipped.
    pub fn from_parts(wkb_type: WkbType, parts: impl IntoIterator<Item = Geom>) -> Option<Self> {
        let mut collection = Self::with_type(wkb_type)?;
        for part in parts {
            collection.add_geometry(part);
        }

        Some(collection)
    }

    /// Declared dimensions.
    pub fn dimensions(&self) -> Dimensions {
        self.wkb_type.dimensions
    }

    /// True if the declared type has elevation.
    pub fn is_3d(&self) -> bool {
        self.wkb_type.has_z()
    }

    /// True if the declared type has measure.
    pub fn is_measure(&self) -> bool {
        self.wkb_type.has_m()
    }

    /// Number of parts.
    pub fn num_geometries(&self) -> usize {
        self.parts.len()
    }

    /// Number of parts. Same as [`num_geometries`](Self::num_geometries).
    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    /// Number of rings in the given part, `0` for a missing part.
    pub fn part_ring_count(&self, part: usize) -> usize {
        self.parts.get(part).map_or(0, Geometry::ring_count)
    }

    /// All parts in order.
    pub fn parts(&self) -> &[Geom] {
        &self.parts
    }

    /// Part by index.
    pub fn geometry_n(&self, index: usize) -> Option<&Geom> {
        self.parts.get(index)
    }

    /// Mutable part by index.
    pub fn geometry_n_mut(&mut self, index: usize) -> Option<&mut Geom> {
        self.parts.get_mut(index)
    }

    /// Appends a part. Returns false if the declared kind does not accept the part.
    pub fn add_geometry(&mut self, part: impl Into<Geom>) -> bool {
        let part = part.into();
        if !self.wkb_type.kind.accepts(part.kind()) {
            return false;
        }

        self.parts.push(part);
        true
    }

    /// Inserts a part before the given index, index equal to the number of parts appends. Returns false (and
    /// drops the part) for an index out of range or a part the declared kind does not accept.
    pub fn insert_geometry(&mut self, part: impl Into<Geom>, index: usize) -> bool {
        let part = part.into();
        if index > self.parts.len() || !self.wkb_type.kind.accepts(part.kind()) {
            return false;
        }

        self.parts.insert(index, part);
        true
    }

    /// Removes the part at the index and returns it.
    pub fn remove_geometry(&mut self, index: usize) -> Option<Geom> {
        if index >= self.parts.len() {
            return None;
        }

        Some(self.parts.remove(index))
    }

    /// Removes all parts. The declared type is kept.
    pub fn clear(&mut self) {
        self.parts.clear();
    }

    /// Returns the geometry as a collection if it is one.
    pub fn cast(geometry: &Geom) -> Option<&Self> {
        match geometry {
            Geom::GeometryCollection(collection) => Some(collection),
            _ => None,
        }
    }

    /// Boundary of a collection is not defined.
    pub fn boundary(&self) -> Option<Geom> {
        None
    }

    /// Copy of the collection with curved parts replaced by linear approximations.
    ///
    /// `MULTICURVE` becomes `MULTILINESTRING` and `MULTISURFACE` becomes `MULTIPOLYGON`.
    pub fn segmentized(&self, tolerance: SegmentationTolerance) -> Self {
        Self {
            wkb_type: WkbType::new(self.wkb_type.kind.linear(), self.wkb_type.dimensions),
            parts: self.parts.iter().map(|p| p.segmentize(tolerance)).collect(),
        }
    }

    /// Copy of the collection with linear parts replaced by their curved counterparts.
    ///
    /// `MULTILINESTRING` becomes `MULTICURVE` and `MULTIPOLYGON` becomes `MULTISURFACE`.
    pub fn to_curve_collection(&self) -> Self {
        Self {
            wkb_type: WkbType::new(self.wkb_type.kind.curved(), self.wkb_type.dimensions),
            parts: self.parts.iter().map(Geometry::to_curve_type).collect(),
        }
    }

    /// Part index and ring inside the part for a ring number counted through all parts.
    fn locate_ring(&self, ring: usize) -> Option<(usize, usize)> {
        let mut remaining = ring;
        for (index, part) in self.parts.iter().enumerate() {
            let count = part.ring_count();
            if remaining < count {
                return Some((index, remaining));
            }
            remaining -= count;
        }

        None
    }

    /// Ring number counted through all parts for the ring of the given part.
    fn flat_ring(&self, part: usize, ring: usize) -> usize {
        self.parts[..part.min(self.parts.len())]
            .iter()
            .map(Geometry::ring_count)
            .sum::<usize>()
            + ring
    }

    /// Removes the part if it became empty.
    fn drop_if_collapsed(&mut self, part: usize) {
        if self.parts.get(part).is_some_and(Geometry::is_empty) {
            log::debug!("Part {part} collapsed and was removed from the collection");
            self.parts.remove(part);
        }
    }

}

/// Nested collections expose the rings of all their parts as one consecutive sequence.
impl Geometry for GeometryCollection {
    fn wkb_type(&self) -> WkbType {
        self.wkb_type
    }

    fn is_empty(&self) -> bool {
        self.parts.iter().all(Geometry::is_empty)
    }

    fn dimension(&self) -> u8 {
        self.parts.iter().map(Geometry::dimension).max().unwrap_or(0)
    }

    fn ring_count(&self) -> usize {
        self.parts.iter().map(Geometry::ring_count).sum()
    }

    fn vertex_count(&self, ring: usize) -> usize {
        self.locate_ring(ring)
            .map_or(0, |(part, ring)| self.parts[part].vertex_count(ring))
    }

    fn n_coordinates(&self) -> usize {
        self.parts.iter().map(Geometry::n_coordinates).sum()
    }

    fn vertex_at(&self, ring: usize, vertex: usize) -> Option<Point> {
        let (part, ring) = self.locate_ring(ring)?;
        self.parts[part].vertex_at(ring, vertex)
    }

    fn insert_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        match self.locate_ring(ring) {
            Some((part, ring)) => self.insert_vertex(VertexId::new(part, ring, vertex), point),
            None => false,
        }
    }

    fn move_vertex_at(&mut self, ring: usize, vertex: usize, point: Point) -> bool {
        match self.locate_ring(ring) {
            Some((part, ring)) => self.move_vertex(VertexId::new(part, ring, vertex), point),
            None => false,
        }
    }

    fn delete_vertex_at(&mut self, ring: usize, vertex: usize) -> bool {
        match self.locate_ring(ring) {
            Some((part, ring)) => self.delete_vertex(VertexId::new(part, ring, vertex)),
            None => false,
        }
    }

    fn adjacent_in_ring(
        &self,
        ring: usize,
        vertex: usize,
    ) -> Option<(Option<usize>, Option<usize>)> {
        let (part, ring) = self.locate_ring(ring)?;
        self.parts[part].adjacent_in_ring(ring, vertex)
    }

    fn vertex_angle_at(&self, ring: usize, vertex: usize) -> Option<f64> {
        let (part, ring) = self.locate_ring(ring)?;
        self.parts[part].vertex_angle_at(ring, vertex)
    }

    fn swap_xy(&mut self) {
        self.parts.iter_mut().for_each(Geometry::swap_xy);
    }

    fn drop_z_value(&mut self) -> bool {
        let declared = self.wkb_type.has_z();
        self.wkb_type.dimensions = self.wkb_type.dimensions.with_z(false);
        self.parts
            .iter_mut()
            .fold(declared, |changed, part| part.drop_z_value() || changed)
    }

    fn drop_m_value(&mut self) -> bool {
        let declared = self.wkb_type.has_m();
        self.wkb_type.dimensions = self.wkb_type.dimensions.with_m(false);
        self.parts
            .iter_mut()
            .fold(declared, |changed, part| part.drop_m_value() || changed)
    }

    fn add_z_value(&mut self, z: f64) -> bool {
        let declared = !self.wkb_type.has_z();
        self.wkb_type.dimensions = self.wkb_type.dimensions.with_z(true);
        self.parts
            .iter_mut()
            .fold(declared, |changed, part| part.add_z_value(z) || changed)
    }

    fn add_m_value(&mut self, m: f64) -> bool {
        let declared = !self.wkb_type.has_m();
        self.wkb_type.dimensions = self.wkb_type.dimensions.with_m(true);
        self.parts
            .iter_mut()
            .fold(declared, |changed, part| part.add_m_value(m) || changed)
    }

    fn transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Point) {
        for part in &mut self.parts {
            part.transform_vertices(f);
        }
    }

    fn try_transform_vertices(&mut self, f: &mut dyn FnMut(&Point) -> Option<Point>) -> bool {
        self.parts
            .iter_mut()
            .all(|part| part.try_transform_vertices(f))
    }

    /// Keeps only the matching vertices. Parts that collapse are removed, parts that were empty before stay.
    fn filter_vertices(&mut self, predicate: &mut dyn FnMut(&Point) -> bool) {
        let before = self.parts.len();
        self.parts.retain_mut(|part| {
            if part.is_empty() {
                return true;
            }

            part.filter_vertices(predicate);
            !part.is_empty()
        });

        if self.parts.len() != before {
            log::debug!(
                "{} collapsed parts were removed from the collection",
                before - self.parts.len()
            );
        }
    }

    fn remove_duplicate_nodes(&mut self, tolerance: f64, use_z: bool) -> bool {
        self.parts.iter_mut().fold(false, |changed, part| {
            part.remove_duplicate_nodes(tolerance, use_z) || changed
        })
    }

    fn has_curved_segments(&self) -> bool {
        self.parts.iter().any(Geometry::has_curved_segments)
    }

    fn area(&self) -> f64 {
        self.parts.iter().map(Geometry::area).sum()
    }

    fn perimeter(&self) -> f64 {
        self.parts.iter().map(Geometry::perimeter).sum()
    }

    fn length(&self) -> f64 {
        self.parts.iter().map(Geometry::length).sum()
    }

    fn bounding_box(&self) -> Option<Rect> {
        Rect::merge_all(self.parts.iter().map(Geometry::bounding_box))
    }

    /// Closest segment over all parts. The returned vertex id addresses the part of this collection; ties are
    /// resolved in favour of the earlier part.
    fn closest_segment(&self, point: &Point, epsilon: f64) -> Option<SegmentHit> {
        let mut best = None;
        for (index, part) in self.parts.iter().enumerate() {
            let hit = part.closest_segment(point, epsilon).map(|mut hit| {
                let ring = match part {
                    Geom::GeometryCollection(nested) => {
                        nested.flat_ring(hit.vertex_after.part, hit.vertex_after.ring)
                    }
                    _ => hit.vertex_after.ring,
                };
                hit.vertex_after = VertexId::new(index, ring, hit.vertex_after.vertex);
                hit
            });
            SegmentHit::keep_closest(&mut best, hit);
        }

        best
    }

    fn segmentize(&self, tolerance: SegmentationTolerance) -> Geom {
        Geom::GeometryCollection(self.segmentized(tolerance))
    }

    fn to_curve_type(&self) -> Geom {
        Geom::GeometryCollection(self.to_curve_collection())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::impls::{CircularString, CompoundCurve, LineString, Polygon};
    use crate::segment::{Side, DEFAULT_EPSILON};
    use approx::assert_abs_diff_eq;

    pub(crate) fn line(coords: &[(f64, f64)]) -> LineString {
        LineString::new(coords.iter().map(|(x, y)| Point::new(*x, *y)).collect())
    }

    pub(crate) fn square_collection() -> GeometryCollection {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(line(&[
            (0.0, 0.0),
            (0.0, 10.0),
            (10.0, 10.0),
            (10.0, 0.0),
            (0.0, 0.0),
        ]));
        collection
    }

    #[test]
    fn empty_collection() {
        let collection = GeometryCollection::new();
        assert!(collection.is_empty());
        assert_eq!(collection.num_geometries(), 0);
        assert_eq!(collection.n_coordinates(), 0);
        assert_eq!(collection.dimension(), 0);
        assert!(collection.geometry_n(0).is_none());
        assert!(collection
            .closest_segment(&Point::new(1.0, 2.0), DEFAULT_EPSILON)
            .is_none());
        assert_eq!(collection.bounding_box(), None);
        assert_eq!(collection.area(), 0.0);
        assert!(!collection.has_curved_segments());
        assert!(collection.boundary().is_none());
    }

    #[test]
    fn part_management() {
        let mut collection = square_collection();
        assert_eq!(collection.n_coordinates(), 5);
        assert_eq!(collection.dimension(), 1);
        assert!(!collection.is_empty());

        assert!(collection.insert_geometry(Point::new(1.0, 1.0), 0));
        assert!(collection.insert_geometry(Point::new(2.0, 2.0), 2));
        assert!(!collection.insert_geometry(Point::new(3.0, 3.0), 4));
        assert_eq!(collection.num_geometries(), 3);
        assert_eq!(
            collection.geometry_n(2),
            Some(&Geom::Point(Point::new(2.0, 2.0)))
        );

        assert_eq!(
            collection.remove_geometry(0),
            Some(Geom::Point(Point::new(1.0, 1.0)))
        );
        assert_eq!(collection.remove_geometry(5), None);
        assert_eq!(collection.part_count(), 2);
        assert_eq!(collection.part_ring_count(0), 1);
        assert_eq!(collection.part_ring_count(7), 0);

        collection.clear();
        assert!(collection.is_empty());
        assert_eq!(collection.wkb_type(), WkbType::flat(GeometryKind::GeometryCollection));
    }

    #[test]
    fn clone_is_independent() {
        let original = square_collection();
        let mut copy = original.clone();
        assert_eq!(copy, original);
        assert!(copy.move_vertex(VertexId::new(0, 0, 1), Point::new(5.0, 5.0)));
        assert_ne!(copy, original);
        assert_eq!(
            original.vertex(VertexId::new(0, 0, 1)),
            Some(Point::new(0.0, 10.0))
        );
    }

    #[test]
    fn declared_type_is_not_widened() {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(LineString::new(vec![
            Point::new_zm(0.0, 0.0, 1.0, 2.0),
            Point::new_zm(1.0, 1.0, 1.0, 2.0),
        ]));
        assert!(!collection.is_3d());
        assert!(!collection.is_measure());
        assert_eq!(collection.parts()[0].dimensions(), Dimensions::Xyzm);
    }

    #[test]
    fn typed_collections_reject_parts() {
        let mut multi_point =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiPoint)).unwrap();
        assert!(multi_point.add_geometry(Point::new(1.0, 1.0)));
        assert!(!multi_point.add_geometry(line(&[(0.0, 0.0), (1.0, 1.0)])));
        assert_eq!(multi_point.num_geometries(), 1);

        let mut multi_curve =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiCurve)).unwrap();
        assert!(multi_curve.add_geometry(CompoundCurve::from(line(&[(0.0, 0.0), (1.0, 1.0)]))));
        assert!(!multi_curve.add_geometry(Point::new(1.0, 1.0)));

        assert!(GeometryCollection::with_type(WkbType::flat(GeometryKind::Polygon)).is_none());
    }

    #[test]
    fn equality_with_other_geometries() {
        let collection = square_collection();
        let as_geom = Geom::from(collection.clone());
        let line = collection.parts()[0].clone();
        assert_ne!(as_geom, line);
        assert_eq!(GeometryCollection::cast(&as_geom), Some(&collection));
        assert_eq!(GeometryCollection::cast(&line), None);

        let mut multi =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiLineString)).unwrap();
        multi.add_geometry(collection.parts()[0].clone());
        assert_ne!(multi, collection);
    }

    #[test]
    fn aggregates() {
        let mut collection = square_collection();
        collection.add_geometry(Polygon::new(
            line(&[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0), (4.0, 0.0), (0.0, 0.0)]),
            vec![],
        ));
        assert_eq!(collection.dimension(), 2);
        assert_abs_diff_eq!(collection.area(), 16.0);
        assert_abs_diff_eq!(collection.perimeter(), 16.0);
        assert_abs_diff_eq!(collection.length(), 40.0);
        assert_eq!(
            collection.bounding_box(),
            Some(Rect::new(0.0, 0.0, 10.0, 10.0))
        );
    }

    #[test]
    fn closest_segment_over_parts() {
        let mut collection = square_collection();
        collection.add_geometry(line(&[(20.0, 0.0), (20.0, 10.0)]));

        let hit = collection
            .closest_segment(&Point::new(19.0, 5.0), DEFAULT_EPSILON)
            .unwrap();
        assert_abs_diff_eq!(hit.sq_dist, 1.0);
        assert_eq!(hit.point, Point::new(20.0, 5.0));
        assert_eq!(hit.vertex_after, VertexId::new(1, 0, 1));
        assert_eq!(hit.left_of, Some(Side::Left));

        let on_segment = collection
            .closest_segment(&Point::new(5.0, 10.0), DEFAULT_EPSILON)
            .unwrap();
        assert_eq!(on_segment.sq_dist, 0.0);
        assert_eq!(on_segment.point, Point::new(5.0, 10.0));
        assert_eq!(on_segment.vertex_after, VertexId::new(0, 0, 2));
        assert_eq!(on_segment.left_of, None);
    }

    #[test]
    fn closest_segment_in_nested_collection() {
        let mut nested = GeometryCollection::new();
        nested.add_geometry(Point::new(100.0, 100.0));
        nested.add_geometry(line(&[(20.0, 0.0), (20.0, 10.0)]));

        let mut collection = square_collection();
        collection.add_geometry(nested);

        let hit = collection
            .closest_segment(&Point::new(21.0, 5.0), DEFAULT_EPSILON)
            .unwrap();
        assert_eq!(hit.vertex_after, VertexId::new(1, 1, 1));
        assert_eq!(
            collection.vertex(hit.vertex_after),
            Some(Point::new(20.0, 10.0))
        );
    }

    #[test]
    fn segmentize_and_curve_type() {
        let mut multi_curve =
            GeometryCollection::with_type(WkbType::flat(GeometryKind::MultiCurve)).unwrap();
        multi_curve.add_geometry(CircularString::new(vec![
            Point::new(1.0, 2.0),
            Point::new(11.0, 10.0),
            Point::new(21.0, 2.0),
        ]));
        assert!(multi_curve.has_curved_segments());

        let linear = multi_curve.segmentized(SegmentationTolerance::default());
        assert_eq!(linear.wkb_type().kind, GeometryKind::MultiLineString);
        assert!(!linear.has_curved_segments());
        assert_eq!(linear.n_coordinates(), 156);

        let curved = square_collection().to_curve_collection();
        assert_eq!(curved.wkb_type().kind, GeometryKind::GeometryCollection);
        assert_eq!(curved.parts()[0].kind(), GeometryKind::CompoundCurve);
        assert_eq!(curved.n_coordinates(), 5);
        assert_eq!(
            curved.vertex(VertexId::new(0, 0, 2)),
            Some(Point::new(10.0, 10.0))
        );
    }
}
