use super::edge::EdgeId;
use super::face::FaceId;
use super::vertex::VertexId;

slotmap::new_key_type! {
    /// Unique identifier for a half-edge in a polyhedron.
    pub struct HalfEdgeId;
}

/// One directed side of an edge, walking around a single face.
#[derive(Debug, Clone)]
pub struct HalfEdgeData {
    /// Vertex this half-edge starts at.
    pub origin: VertexId,
    /// Half-edge of the adjacent face running the other way.
    pub twin: Option<HalfEdgeId>,
    /// Next half-edge around the face.
    pub next: HalfEdgeId,
    /// Previous half-edge around the face.
    pub previous: HalfEdgeId,
    /// Undirected edge this half-edge belongs to.
    pub edge: EdgeId,
    /// Face whose boundary contains this half-edge.
    pub face: FaceId,
}
