use crate::math::Point3;

use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a vertex in a polyhedron.
    pub struct VertexId;
}

/// Data associated with a polyhedron vertex.
#[derive(Debug, Clone)]
pub struct VertexData {
    /// The 3D position of the vertex.
    pub position: Point3,
    /// One half-edge leaving this vertex, if any face uses it.
    pub leaving: Option<HalfEdgeId>,
}

impl VertexData {
    /// Creates a new vertex at the given position.
    #[must_use]
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            leaving: None,
        }
    }
}
