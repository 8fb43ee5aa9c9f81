//! Addressing of single vertices inside a geometry.

use serde::{Deserialize, Serialize};

/// Address of a vertex: part of the collection, ring inside the part and position inside the ring.
///
/// Rings of surfaces are numbered from the exterior ring (`0`). Curves and points have a single ring `0`.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct VertexId {
    /// Index of the part.
    pub part: usize,
    /// Index of the ring inside the part.
    pub ring: usize,
    /// Index of the vertex inside the ring.
    pub vertex: usize,
}

impl VertexId {
    /// Creates a new id.
    pub const fn new(part: usize, ring: usize, vertex: usize) -> Self {
        Self { part, ring, vertex }
    }
}

/// Position of a [`VertexCursor`] inside its ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPosition {
    /// Before the first vertex of the ring.
    BeforeStart,
    /// At the given vertex.
    At(usize),
    /// Traversal ran past the last vertex of the geometry.
    Exhausted,
}

/// Traversal state used by [`GeometryCollection::next_vertex`](crate::GeometryCollection::next_vertex).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexCursor {
    /// Current part.
    pub part: usize,
    /// Current ring inside the part.
    pub ring: usize,
    /// Position inside the ring.
    pub position: CursorPosition,
}

impl VertexCursor {
    /// Cursor before the first vertex of the whole geometry.
    pub const fn start() -> Self {
        Self::before(0, 0)
    }

    /// Cursor before the first vertex of the given ring.
    pub const fn before(part: usize, ring: usize) -> Self {
        Self {
            part,
            ring,
            position: CursorPosition::BeforeStart,
        }
    }

    /// Cursor standing at the given vertex.
    pub const fn at(id: VertexId) -> Self {
        Self {
            part: id.part,
            ring: id.ring,
            position: CursorPosition::At(id.vertex),
        }
    }

    /// Id of the vertex the cursor stands at.
    pub fn vertex_id(&self) -> Option<VertexId> {
        match self.position {
            CursorPosition::At(vertex) => Some(VertexId::new(self.part, self.ring, vertex)),
            _ => None,
        }
    }
}

impl Default for VertexCursor {
    fn default() -> Self {
        Self::start()
    }
}

impl From<VertexId> for VertexCursor {
    fn from(id: VertexId) -> Self {
        Self::at(id)
    }
}
