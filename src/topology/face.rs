use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for a face in a polyhedron.
    pub struct FaceId;
}

/// A polyhedron face: a closed loop of half-edges.
#[derive(Debug, Clone)]
pub struct FaceData {
    /// First half-edge of the boundary; the loop is followed through `next`.
    pub boundary: HalfEdgeId,
    /// Number of half-edges in the boundary.
    pub len: usize,
}
