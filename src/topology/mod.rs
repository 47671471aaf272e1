pub mod edge;
pub mod face;
pub mod half_edge;
pub mod vertex;

pub use edge::{EdgeData, EdgeId};
pub use face::{FaceData, FaceId};
pub use half_edge::{HalfEdgeData, HalfEdgeId};
pub use vertex::{VertexData, VertexId};

use std::collections::HashMap;

use crate::error::TopologyError;
use crate::math::Point3;
use slotmap::SlotMap;

/// Half-edge polyhedron stored in flat arenas.
///
/// Entities reference each other via typed IDs (generational indices),
/// so faces can keep a stable key to their boundary without borrowing it.
#[derive(Debug, Default, Clone)]
pub struct Polyhedron {
    vertices: SlotMap<VertexId, VertexData>,
    edges: SlotMap<EdgeId, EdgeData>,
    half_edges: SlotMap<HalfEdgeId, HalfEdgeData>,
    faces: SlotMap<FaceId, FaceData>,
}

impl Polyhedron {
    /// Creates a new, empty polyhedron.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a polyhedron from vertex positions and index loops.
    ///
    /// Each loop becomes one face whose boundary visits the given vertices in
    /// order. Half-edges running in opposite directions between the same pair
    /// of vertices are linked as twins. Returns the face IDs in loop order.
    ///
    /// # Errors
    ///
    /// Returns an error if a loop has fewer than three vertices, refers to a
    /// missing position, repeats a vertex, or if two loops traverse the same
    /// directed edge.
    pub fn from_polygons(
        positions: &[Point3],
        polygons: &[Vec<usize>],
    ) -> Result<(Self, Vec<FaceId>), TopologyError> {
        let mut polyhedron = Self::new();
        let vertex_ids: Vec<VertexId> = positions
            .iter()
            .map(|&p| polyhedron.vertices.insert(VertexData::new(p)))
            .collect();

        let mut edge_map: HashMap<(VertexId, VertexId), HalfEdgeId> = HashMap::new();
        let mut face_ids = Vec::with_capacity(polygons.len());

        for polygon in polygons {
            let loop_ids = polygon
                .iter()
                .map(|&i| {
                    vertex_ids.get(i).copied().ok_or_else(|| {
                        TopologyError::InvalidTopology(format!("vertex index {i} out of range"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            let face = polyhedron.add_face(&loop_ids, &mut edge_map)?;
            face_ids.push(face);
        }

        tracing::trace!(
            vertices = polyhedron.vertex_count(),
            edges = polyhedron.edge_count(),
            faces = polyhedron.face_count(),
            "built polyhedron"
        );
        Ok((polyhedron, face_ids))
    }

    fn add_face(
        &mut self,
        loop_ids: &[VertexId],
        edge_map: &mut HashMap<(VertexId, VertexId), HalfEdgeId>,
    ) -> Result<FaceId, TopologyError> {
        let n = loop_ids.len();
        if n < 3 {
            return Err(TopologyError::InvalidTopology(format!(
                "face needs at least 3 vertices, got {n}"
            )));
        }
        for (i, id) in loop_ids.iter().enumerate() {
            if loop_ids[i + 1..].contains(id) {
                return Err(TopologyError::InvalidTopology(
                    "face visits a vertex twice".into(),
                ));
            }
        }
        for i in 0..n {
            let key = (loop_ids[i], loop_ids[(i + 1) % n]);
            if edge_map.contains_key(&key) {
                return Err(TopologyError::InvalidTopology(
                    "directed edge used by two faces".into(),
                ));
            }
        }

        let face = self.faces.insert(FaceData {
            boundary: HalfEdgeId::default(),
            len: n,
        });

        let mut loop_edges = Vec::with_capacity(n);
        for i in 0..n {
            let origin = loop_ids[i];
            let destination = loop_ids[(i + 1) % n];
            let half_edge = self.half_edges.insert(HalfEdgeData {
                origin,
                twin: None,
                next: HalfEdgeId::default(),
                previous: HalfEdgeId::default(),
                edge: EdgeId::default(),
                face,
            });

            // Link with the opposite half-edge if its face already exists.
            let edge = if let Some(&twin) = edge_map.get(&(destination, origin)) {
                let twin_data = &mut self.half_edges[twin];
                twin_data.twin = Some(half_edge);
                let edge = twin_data.edge;
                self.edges[edge].second = Some(half_edge);
                self.half_edges[half_edge].twin = Some(twin);
                edge
            } else {
                self.edges.insert(EdgeData {
                    first: half_edge,
                    second: None,
                })
            };
            self.half_edges[half_edge].edge = edge;
            edge_map.insert((origin, destination), half_edge);

            let vertex = &mut self.vertices[origin];
            if vertex.leaving.is_none() {
                vertex.leaving = Some(half_edge);
            }
            loop_edges.push(half_edge);
        }

        for i in 0..n {
            let half_edge = &mut self.half_edges[loop_edges[i]];
            half_edge.next = loop_edges[(i + 1) % n];
            half_edge.previous = loop_edges[(i + n - 1) % n];
        }
        self.faces[face].boundary = loop_edges[0];

        Ok(face)
    }

    // --- Lookups ---

    /// Returns a reference to the vertex data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the polyhedron.
    pub fn vertex(&self, id: VertexId) -> Result<&VertexData, TopologyError> {
        self.vertices
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))
    }

    /// Returns a reference to the edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the polyhedron.
    pub fn edge(&self, id: EdgeId) -> Result<&EdgeData, TopologyError> {
        self.edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("edge".into()))
    }

    /// Returns a reference to the half-edge data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the polyhedron.
    pub fn half_edge(&self, id: HalfEdgeId) -> Result<&HalfEdgeData, TopologyError> {
        self.half_edges
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("half-edge".into()))
    }

    /// Returns a reference to the face data, or an error if not found.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found in the polyhedron.
    pub fn face(&self, id: FaceId) -> Result<&FaceData, TopologyError> {
        self.faces
            .get(id)
            .ok_or_else(|| TopologyError::EntityNotFound("face".into()))
    }

    // --- Traversal ---

    /// Position of the vertex a half-edge starts at.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn origin(&self, id: HalfEdgeId) -> Point3 {
        self.vertices[self.half_edges[id].origin].position
    }

    /// Position of the vertex a half-edge ends at.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn destination(&self, id: HalfEdgeId) -> Point3 {
        self.origin(self.next(id))
    }

    /// The half-edge following `id` around its face.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn next(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[id].next
    }

    /// The half-edge preceding `id` around its face.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn previous(&self, id: HalfEdgeId) -> HalfEdgeId {
        self.half_edges[id].previous
    }

    /// The half-edge running the other way on the adjacent face.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn twin(&self, id: HalfEdgeId) -> Option<HalfEdgeId> {
        self.half_edges[id].twin
    }

    /// The undirected edge a half-edge belongs to.
    ///
    /// # Panics
    ///
    /// Panics if `id` does not belong to this polyhedron.
    #[must_use]
    pub fn edge_of(&self, id: HalfEdgeId) -> EdgeId {
        self.half_edges[id].edge
    }

    /// Iterates the boundary half-edges of a face, starting at its first one.
    ///
    /// # Panics
    ///
    /// Panics if `face` does not belong to this polyhedron.
    #[must_use]
    pub fn boundary(&self, face: FaceId) -> Boundary<'_> {
        let data = &self.faces[face];
        Boundary {
            polyhedron: self,
            current: Some(data.boundary),
            first: data.boundary,
        }
    }

    /// First half-edge of a face's boundary.
    ///
    /// # Panics
    ///
    /// Panics if `face` does not belong to this polyhedron.
    #[must_use]
    pub fn first_half_edge(&self, face: FaceId) -> HalfEdgeId {
        self.faces[face].boundary
    }

    /// Positions of a face's vertices in boundary order.
    #[must_use]
    pub fn vertex_positions(&self, face: FaceId) -> Vec<Point3> {
        self.boundary(face).map(|he| self.origin(he)).collect()
    }

    /// Whether the face's boundary visits exactly `positions`, in cyclic order,
    /// each within `epsilon`.
    #[must_use]
    pub fn has_vertex_positions(&self, face: FaceId, positions: &[Point3], epsilon: f64) -> bool {
        let own = self.vertex_positions(face);
        let n = own.len();
        if n != positions.len() {
            return false;
        }
        (0..n).any(|offset| {
            (0..n).all(|i| (own[(i + offset) % n] - positions[i]).norm() <= epsilon)
        })
    }

    /// Finds a vertex within `epsilon` of `position`.
    #[must_use]
    pub fn find_vertex(&self, position: &Point3, epsilon: f64) -> Option<VertexId> {
        self.vertices
            .iter()
            .find(|(_, v)| (v.position - position).norm() <= epsilon)
            .map(|(id, _)| id)
    }

    /// Moves a vertex. Faces that use it are not re-planarized.
    ///
    /// # Errors
    ///
    /// Returns an error if the vertex is not found in the polyhedron.
    pub fn set_vertex_position(
        &mut self,
        id: VertexId,
        position: Point3,
    ) -> Result<(), TopologyError> {
        let vertex = self
            .vertices
            .get_mut(id)
            .ok_or_else(|| TopologyError::EntityNotFound("vertex".into()))?;
        vertex.position = position;
        Ok(())
    }

    // --- Counts & validation ---

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of undirected edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Number of faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Iterates all face IDs.
    pub fn face_ids(&self) -> impl Iterator<Item = FaceId> + '_ {
        self.faces.keys()
    }

    /// Whether every edge has a face on both sides.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        !self.faces.is_empty() && self.edges.values().all(EdgeData::is_fully_specified)
    }

    /// Checks that every face boundary is a closed loop whose `next` and
    /// `previous` links agree and whose twins point back.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.faces.iter().all(|(face_id, face)| {
            let visited: Vec<HalfEdgeId> = self.boundary(face_id).collect();
            visited.len() == face.len
                && visited.iter().all(|&he| {
                    let data = &self.half_edges[he];
                    data.face == face_id
                        && self.half_edges[data.next].previous == he
                        && data
                            .twin
                            .is_none_or(|twin| self.half_edges[twin].twin == Some(he))
                })
        })
    }
}

/// Iterator over the half-edges of a face boundary.
#[derive(Debug, Clone)]
pub struct Boundary<'a> {
    polyhedron: &'a Polyhedron,
    current: Option<HalfEdgeId>,
    first: HalfEdgeId,
}

impl Iterator for Boundary<'_> {
    type Item = HalfEdgeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.current?;
        let next = self.polyhedron.next(current);
        self.current = (next != self.first).then_some(next);
        Some(current)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    /// Unit cube with every face wound counter-clockwise seen from outside.
    fn cube() -> (Polyhedron, Vec<FaceId>) {
        let positions = vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
            p(0.0, 0.0, 1.0),
            p(1.0, 0.0, 1.0),
            p(1.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ];
        let polygons = vec![
            vec![0, 3, 2, 1], // bottom
            vec![4, 5, 6, 7], // top
            vec![0, 1, 5, 4], // front
            vec![2, 3, 7, 6], // back
            vec![1, 2, 6, 5], // right
            vec![3, 0, 4, 7], // left
        ];
        Polyhedron::from_polygons(&positions, &polygons).unwrap()
    }

    #[test]
    fn cube_is_closed_and_consistent() {
        let (poly, faces) = cube();
        assert_eq!(faces.len(), 6);
        assert_eq!(poly.vertex_count(), 8);
        assert_eq!(poly.edge_count(), 12);
        assert_eq!(poly.face_count(), 6);
        assert!(poly.is_closed());
        assert!(poly.is_consistent());
    }

    #[test]
    fn boundary_walk_returns_to_start() {
        let (poly, faces) = cube();
        for face in faces {
            let first = poly.first_half_edge(face);
            let mut current = first;
            let mut steps = 0;
            loop {
                current = poly.next(current);
                steps += 1;
                if current == first {
                    break;
                }
            }
            assert_eq!(steps, poly.boundary(face).count());
            assert_eq!(poly.previous(poly.next(first)), first);
        }
    }

    #[test]
    fn twins_share_an_edge_and_reverse_direction() {
        let (poly, faces) = cube();
        for he in poly.boundary(faces[1]) {
            let twin = poly.twin(he).unwrap();
            assert_eq!(poly.edge_of(he), poly.edge_of(twin));
            assert_eq!(poly.origin(he), poly.destination(twin));
            assert_eq!(poly.destination(he), poly.origin(twin));
        }
    }

    #[test]
    fn vertex_positions_follow_boundary_order() {
        let (poly, faces) = cube();
        let top = poly.vertex_positions(faces[1]);
        assert_eq!(top, vec![p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0), p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0)]);

        let rotated = [p(1.0, 1.0, 1.0), p(0.0, 1.0, 1.0), p(0.0, 0.0, 1.0), p(1.0, 0.0, 1.0)];
        assert!(poly.has_vertex_positions(faces[1], &rotated, 1e-9));
        let reversed = [p(0.0, 1.0, 1.0), p(1.0, 1.0, 1.0), p(1.0, 0.0, 1.0), p(0.0, 0.0, 1.0)];
        assert!(!poly.has_vertex_positions(faces[1], &reversed, 1e-9));
    }

    #[test]
    fn single_face_is_open() {
        let positions = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        let (poly, _) = Polyhedron::from_polygons(&positions, &[vec![0, 1, 2]]).unwrap();
        assert!(!poly.is_closed());
        assert!(poly.is_consistent());
    }

    #[test]
    fn rejects_degenerate_loops() {
        let positions = vec![p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0), p(0.0, 1.0, 0.0)];
        assert!(matches!(
            Polyhedron::from_polygons(&positions, &[vec![0, 1]]),
            Err(TopologyError::InvalidTopology(_))
        ));
        assert!(matches!(
            Polyhedron::from_polygons(&positions, &[vec![0, 1, 7]]),
            Err(TopologyError::InvalidTopology(_))
        ));
        assert!(matches!(
            Polyhedron::from_polygons(&positions, &[vec![0, 1, 2], vec![0, 1, 2]]),
            Err(TopologyError::InvalidTopology(_))
        ));
    }

    #[test]
    fn moving_a_vertex_updates_positions() {
        let (mut poly, faces) = cube();
        let corner = poly.find_vertex(&p(1.0, 1.0, 1.0), 1e-9).unwrap();
        poly.set_vertex_position(corner, p(1.0, 1.0, 2.0)).unwrap();
        assert!(poly.vertex_positions(faces[1]).contains(&p(1.0, 1.0, 2.0)));
        assert!(poly.find_vertex(&p(1.0, 1.0, 1.0), 1e-9).is_none());
    }
}
