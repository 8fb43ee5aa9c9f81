use crate::collection::GeometryCollection;
use crate::geometry::Geometry;
use crate::point::Point;
use crate::vertex_id::{CursorPosition, VertexCursor, VertexId};

impl GeometryCollection {
    /// Vertex at the given id.
    pub fn vertex(&self, id: VertexId) -> Option<Point> {
        self.parts.get(id.part)?.vertex_at(id.ring, id.vertex)
    }

    /// Position of the vertex in the order of [`vertices`](Self::vertices), `None` for an invalid id.
    pub fn vertex_number_from_vertex_id(&self, id: VertexId) -> Option<usize> {
        let part = self.parts.get(id.part)?;
        if id.ring >= part.ring_count() || id.vertex >= part.vertex_count(id.ring) {
            return None;
        }

        let before_part: usize = self.parts[..id.part]
            .iter()
            .map(Geometry::n_coordinates)
            .sum();
        let before_ring: usize = (0..id.ring).map(|ring| part.vertex_count(ring)).sum();

        Some(before_part + before_ring + id.vertex)
    }

    /// Advances the cursor to the next vertex and returns it.
    ///
    /// Vertices are visited ring by ring inside a part, then part by part. A cursor that points past the rings
    /// of its part continues with the next part. Returns `None` and marks the cursor as
    /// [`Exhausted`](CursorPosition::Exhausted) when there are no more vertices.
    pub fn next_vertex(&self, cursor: &mut VertexCursor) -> Option<Point> {
        loop {
            let candidate = match cursor.position {
                CursorPosition::Exhausted => return None,
                CursorPosition::BeforeStart => 0,
                CursorPosition::At(vertex) => vertex + 1,
            };

            let Some(part) = self.parts.get(cursor.part) else {
                cursor.position = CursorPosition::Exhausted;
                return None;
            };

            if cursor.ring < part.ring_count() {
                if let Some(point) = part.vertex_at(cursor.ring, candidate) {
                    cursor.position = CursorPosition::At(candidate);
                    return Some(point);
                }

                if cursor.ring + 1 < part.ring_count() {
                    *cursor = VertexCursor::before(cursor.part, cursor.ring + 1);
                    continue;
                }
            }

            *cursor = VertexCursor::before(cursor.part + 1, 0);
        }
    }

    /// Iterates over all vertices with their ids.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, Point)> + '_ {
        let mut cursor = VertexCursor::start();
        std::iter::from_fn(move || {
            let point = self.next_vertex(&mut cursor)?;
            Some((cursor.vertex_id()?, point))
        })
    }

    /// Previous and next vertex in the same ring. Closed rings of surfaces wrap around, skipping the closing
    /// vertex; open curves have no neighbour beyond their end points. Both are `None` for an invalid id.
    pub fn adjacent_vertices(&self, id: VertexId) -> (Option<VertexId>, Option<VertexId>) {
        let Some((prev, next)) = self
            .parts
            .get(id.part)
            .and_then(|part| part.adjacent_in_ring(id.ring, id.vertex))
        else {
            return (None, None);
        };

        let to_id = |vertex: usize| VertexId::new(id.part, id.ring, vertex);
        (prev.map(to_id), next.map(to_id))
    }

    /// Direction of the bisector at the vertex in radians, clockwise from north, in `[0, 2π)`.
    pub fn vertex_angle(&self, id: VertexId) -> Option<f64> {
        self.parts
            .get(id.part)?
            .vertex_angle_at(id.ring, id.vertex)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::tests::{line, square_collection};
    use crate::impls::{LineString, Polygon};
    use std::f64::consts::TAU;

    fn polygon_collection() -> GeometryCollection {
        let mut collection = square_collection();
        collection.add_geometry(Polygon::new(
            line(&[(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)]),
            vec![line(&[(1.0, 1.0), (1.0, 9.0), (9.0, 9.0), (9.0, 1.0), (1.0, 1.0)])],
        ));
        collection
    }

    #[test]
    fn vertex_numbers() {
        let collection = polygon_collection();
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(0, 0, 0)),
            Some(0)
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(0, 0, 4)),
            Some(4)
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(1, 0, 0)),
            Some(5)
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(1, 1, 4)),
            Some(14)
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(0, 0, 5)),
            None
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(0, 1, 0)),
            None
        );
        assert_eq!(
            collection.vertex_number_from_vertex_id(VertexId::new(2, 0, 0)),
            None
        );
    }

    #[test]
    fn numbering_is_gap_free() {
        let collection = polygon_collection();
        let numbers: Vec<usize> = collection
            .vertices()
            .map(|(id, _)| collection.vertex_number_from_vertex_id(id).unwrap())
            .collect();
        assert_eq!(numbers, (0..collection.n_coordinates()).collect::<Vec<_>>());
    }

    #[test]
    fn traversal() {
        let collection = polygon_collection();
        let mut cursor = VertexCursor::start();
        assert_eq!(collection.next_vertex(&mut cursor), Some(Point::new(0.0, 0.0)));
        assert_eq!(cursor.vertex_id(), Some(VertexId::new(0, 0, 0)));

        let mut cursor = VertexCursor::at(VertexId::new(0, 0, 4));
        assert_eq!(collection.next_vertex(&mut cursor), Some(Point::new(0.0, 0.0)));
        assert_eq!(cursor.vertex_id(), Some(VertexId::new(1, 0, 0)));

        let mut cursor = VertexCursor::at(VertexId::new(1, 0, 4));
        assert_eq!(collection.next_vertex(&mut cursor), Some(Point::new(1.0, 1.0)));
        assert_eq!(cursor.vertex_id(), Some(VertexId::new(1, 1, 0)));

        let mut cursor = VertexCursor::before(1, 1);
        assert_eq!(collection.next_vertex(&mut cursor), Some(Point::new(1.0, 1.0)));

        let mut cursor = VertexCursor::at(VertexId::new(1, 1, 4));
        assert_eq!(collection.next_vertex(&mut cursor), None);
        assert_eq!(cursor.position, CursorPosition::Exhausted);
        assert_eq!(collection.next_vertex(&mut cursor), None);

        let mut cursor = VertexCursor::before(0, 5);
        assert_eq!(collection.next_vertex(&mut cursor), Some(Point::new(0.0, 0.0)));
        assert_eq!(cursor.vertex_id(), Some(VertexId::new(1, 0, 0)));

        assert_eq!(
            GeometryCollection::new().next_vertex(&mut VertexCursor::start()),
            None
        );
    }

    #[test]
    fn vertices_iterator() {
        let collection = polygon_collection();
        let all: Vec<(VertexId, Point)> = collection.vertices().collect();
        assert_eq!(all.len(), 15);
        assert_eq!(all[7], (VertexId::new(1, 0, 2), Point::new(10.0, 10.0)));
        assert_eq!(all[14], (VertexId::new(1, 1, 4), Point::new(1.0, 1.0)));
    }

    #[test]
    fn adjacent_vertices() {
        let mut collection = polygon_collection();
        collection.add_geometry(line(&[(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]));

        assert_eq!(
            collection.adjacent_vertices(VertexId::new(2, 0, 0)),
            (None, Some(VertexId::new(2, 0, 1)))
        );
        assert_eq!(
            collection.adjacent_vertices(VertexId::new(2, 0, 1)),
            (Some(VertexId::new(2, 0, 0)), Some(VertexId::new(2, 0, 2)))
        );
        assert_eq!(
            collection.adjacent_vertices(VertexId::new(2, 0, 2)),
            (Some(VertexId::new(2, 0, 1)), None)
        );

        // closed line strings are curves and do not wrap
        assert_eq!(
            collection.adjacent_vertices(VertexId::new(0, 0, 0)),
            (None, Some(VertexId::new(0, 0, 1)))
        );

        assert_eq!(
            collection.adjacent_vertices(VertexId::new(1, 1, 0)),
            (Some(VertexId::new(1, 1, 3)), Some(VertexId::new(1, 1, 1)))
        );
        assert_eq!(
            collection.adjacent_vertices(VertexId::new(1, 1, 4)),
            (Some(VertexId::new(1, 1, 3)), Some(VertexId::new(1, 1, 1)))
        );

        assert_eq!(collection.adjacent_vertices(VertexId::new(2, 0, 3)), (None, None));
        assert_eq!(collection.adjacent_vertices(VertexId::new(3, 0, 0)), (None, None));
        assert_eq!(collection.adjacent_vertices(VertexId::new(1, 2, 0)), (None, None));
    }

    #[test]
    fn vertex_angles() {
        let mut collection = GeometryCollection::new();
        collection.add_geometry(LineString::new(vec![
            Point::new(0.0, 0.0),
            Point::new(0.5, 0.0),
            Point::new(1.0, 0.0),
            Point::new(2.0, 1.0),
            Point::new(1.0, 2.0),
            Point::new(0.0, 2.0),
            Point::new(0.0, 0.0),
        ]));

        let expected = [2.35619, 1.5708, 1.17809, 0.0, 5.10509, 3.92699, 2.35619];
        for (vertex, angle) in expected.iter().enumerate() {
            let actual = collection
                .vertex_angle(VertexId::new(0, 0, vertex))
                .unwrap();
            let diff = (actual - angle).abs();
            assert!(diff.min(TAU - diff) < 1e-4, "vertex {vertex}: {actual}");
        }

        assert_eq!(collection.vertex_angle(VertexId::new(0, 0, 7)), None);
        assert_eq!(collection.vertex_angle(VertexId::new(1, 0, 0)), None);
    }
}
