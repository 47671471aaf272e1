use super::half_edge::HalfEdgeId;

slotmap::new_key_type! {
    /// Unique identifier for an edge in a polyhedron.
    pub struct EdgeId;
}

/// An undirected edge, shared by up to two half-edges running in opposite
/// directions.
#[derive(Debug, Clone)]
pub struct EdgeData {
    /// The half-edge that created this edge.
    pub first: HalfEdgeId,
    /// Its twin on the adjacent face, once that face has been added.
    pub second: Option<HalfEdgeId>,
}

impl EdgeData {
    /// Whether both sides of the edge belong to a face.
    #[must_use]
    pub fn is_fully_specified(&self) -> bool {
        self.second.is_some()
    }
}
