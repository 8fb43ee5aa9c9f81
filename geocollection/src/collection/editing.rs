use crate::collection::GeometryCollection;
use crate::geometry::Geometry;
use crate::point::Point;
use crate::vertex_id::VertexId;

impl GeometryCollection {
    /// Inserts a vertex before the given position. Position equal to the ring size appends the vertex.
    ///
    /// Returns false if the part or the ring does not exist, or the position is out of range.
    pub fn insert_vertex(&mut self, id: VertexId, point: Point) -> bool {
        match self.parts.get_mut(id.part) {
            Some(part) => part.insert_vertex_at(id.ring, id.vertex, point),
            None => false,
        }
    }

    /// Replaces the vertex. Returns false if there is no such vertex.
    pub fn move_vertex(&mut self, id: VertexId, point: Point) -> bool {
        match self.parts.get_mut(id.part) {
            Some(part) => part.move_vertex_at(id.ring, id.vertex, point),
            None => false,
        }
    }

    /// Removes the vertex. Returns false if there is no such vertex.
    ///
    /// A part left with too few vertices to be valid is removed from the collection, the following parts
    /// move one index down.
    pub fn delete_vertex(&mut self, id: VertexId) -> bool {
        let Some(part) = self.parts.get_mut(id.part) else {
            return false;
        };

        if !part.delete_vertex_at(id.ring, id.vertex) {
            return false;
        }

        self.drop_if_collapsed(id.part);
        true
    }
}
