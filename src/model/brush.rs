use crate::error::{Result, TopologyError};
use crate::geometry::Plane3;
use crate::math::intersect_3d::{
    classify_point_plane, plane_triple_intersect, PointPlaneClassification,
};
use crate::math::polygon_3d::average;
use crate::math::{Matrix4, Point3, Vector3, POINT_STATUS_EPSILON};
use crate::topology::Polyhedron;
use crate::uv::WrapStyle;

use super::BrushFace;

/// A convex solid bounded by faces, together with the polyhedron their
/// planes enclose.
///
/// Every face in a brush has its `geometry` set to its polygon in
/// [`geometry`](Self::geometry).
#[derive(Debug)]
pub struct Brush {
    faces: Vec<BrushFace>,
    geometry: Polyhedron,
}

impl Clone for Brush {
    fn clone(&self) -> Self {
        let faces = self
            .faces
            .iter()
            .map(|face| {
                let mut copy = face.clone();
                copy.set_geometry(face.geometry());
                copy
            })
            .collect();
        Self {
            faces,
            geometry: self.geometry.clone(),
        }
    }
}

impl Brush {
    /// Builds the brush enclosed by the planes of `faces`.
    ///
    /// Faces whose plane only touches the solid in an edge or a corner are
    /// dropped.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::EmptyBrush`] if there are no faces or the
    /// planes enclose no vertices, and [`TopologyError::NotClosed`] if they
    /// do not enclose a bounded solid.
    pub fn create(faces: Vec<BrushFace>) -> Result<Self> {
        if faces.is_empty() {
            return Err(TopologyError::EmptyBrush.into());
        }

        let planes: Vec<Plane3> = faces.iter().map(|face| *face.boundary()).collect();
        let positions = enclosed_vertices(&planes);
        if positions.is_empty() {
            return Err(TopologyError::EmptyBrush.into());
        }

        let mut kept = Vec::with_capacity(faces.len());
        let mut polygons = Vec::with_capacity(faces.len());
        for face in faces {
            let polygon = face_polygon(face.boundary(), &positions);
            if polygon.len() < 3 {
                tracing::debug!(
                    normal = %face.normal(),
                    vertices = polygon.len(),
                    "dropping redundant brush face"
                );
                continue;
            }
            kept.push(face);
            polygons.push(polygon);
        }

        let (positions, polygons) = compact(&positions, &polygons);
        let (geometry, face_ids) = Polyhedron::from_polygons(&positions, &polygons)?;
        if !geometry.is_closed() {
            return Err(TopologyError::NotClosed.into());
        }
        tracing::trace!(
            vertices = geometry.vertex_count(),
            edges = geometry.edge_count(),
            faces = geometry.face_count(),
            "built brush geometry"
        );

        for (face, id) in kept.iter_mut().zip(face_ids) {
            face.set_geometry(Some(id));
        }
        Ok(Self {
            faces: kept,
            geometry,
        })
    }

    #[must_use]
    pub fn faces(&self) -> &[BrushFace] {
        &self.faces
    }

    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[must_use]
    pub fn face(&self, index: usize) -> &BrushFace {
        &self.faces[index]
    }

    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn face_mut(&mut self, index: usize) -> &mut BrushFace {
        &mut self.faces[index]
    }

    /// Index of the first face whose normal is within `epsilon` of `normal`.
    #[must_use]
    pub fn find_face(&self, normal: &Vector3, epsilon: f64) -> Option<usize> {
        self.faces
            .iter()
            .position(|face| (face.normal() - normal).norm() <= epsilon)
    }

    #[must_use]
    pub fn geometry(&self) -> &Polyhedron {
        &self.geometry
    }

    /// Direct access to the vertices. Call
    /// [`update_points_from_vertices`](Self::update_points_from_vertices)
    /// after moving them.
    pub fn geometry_mut(&mut self) -> &mut Polyhedron {
        &mut self.geometry
    }

    /// Transforms every face and rebuilds the geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if a face degenerates or the transformed planes no
    /// longer enclose a solid. The brush is left unchanged in that case.
    pub fn transform(&mut self, matrix: &Matrix4, lock_alignment: bool) -> Result<()> {
        let mut faces = self.faces.clone();
        for (face, original) in faces.iter_mut().zip(&self.faces) {
            face.set_geometry(original.geometry());
            face.transform(Some(&self.geometry), matrix, lock_alignment)?;
        }
        *self = Self::create(faces)?;
        Ok(())
    }

    /// Re-derives every face's plane from its polygon.
    ///
    /// # Errors
    ///
    /// Returns an error if a polygon's leading vertices became collinear.
    pub fn update_points_from_vertices(&mut self) -> Result<()> {
        for face in &mut self.faces {
            face.update_points_from_vertices(&self.geometry)?;
        }
        Ok(())
    }

    /// Continues the texture of face `source` onto face `target`.
    ///
    /// # Panics
    ///
    /// Panics if either index is out of bounds or the faces use different
    /// kinds of texture systems.
    pub fn copy_uv_coord_system_between(
        &mut self,
        source: usize,
        target: usize,
        wrap_style: WrapStyle,
    ) {
        let source = &self.faces[source];
        let snapshot = source.take_uv_coord_system_snapshot();
        let attributes = source.attributes().clone();
        let plane = *source.boundary();
        self.faces[target].copy_uv_coord_system_from_face(
            &self.geometry,
            &snapshot,
            &attributes,
            &plane,
            wrap_style,
        );
    }
}

/// Corners of the solid: intersections of plane triples that lie behind or
/// on every plane, without duplicates.
fn enclosed_vertices(planes: &[Plane3]) -> Vec<Point3> {
    let mut vertices: Vec<Point3> = Vec::new();
    for (i, first) in planes.iter().enumerate() {
        for (j, second) in planes.iter().enumerate().skip(i + 1) {
            for third in planes.iter().skip(j + 1) {
                let Some(point) = plane_triple_intersect(first, second, third) else {
                    continue;
                };
                let inside = planes.iter().all(|plane| {
                    classify_point_plane(&point, plane) != PointPlaneClassification::Front
                });
                let known = vertices
                    .iter()
                    .any(|vertex| (vertex - point).norm() <= POINT_STATUS_EPSILON);
                if inside && !known {
                    vertices.push(point);
                }
            }
        }
    }
    vertices
}

/// Indices of the vertices on `plane`, counter-clockwise about its normal.
fn face_polygon(plane: &Plane3, positions: &[Point3]) -> Vec<usize> {
    let mut polygon: Vec<usize> = (0..positions.len())
        .filter(|&i| classify_point_plane(&positions[i], plane) == PointPlaneClassification::On)
        .collect();
    if polygon.len() < 3 {
        return polygon;
    }

    let points: Vec<Point3> = polygon.iter().map(|&i| positions[i]).collect();
    let center = average(&points);
    let (x_axis, y_axis) = plane.basis();
    let angle = |i: usize| {
        let offset = positions[i] - center;
        offset.dot(&y_axis).atan2(offset.dot(&x_axis))
    };
    polygon.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
    polygon
}

/// Drops positions no polygon refers to and renumbers the polygons.
fn compact(positions: &[Point3], polygons: &[Vec<usize>]) -> (Vec<Point3>, Vec<Vec<usize>>) {
    let mut remap: Vec<Option<usize>> = vec![None; positions.len()];
    let mut used: Vec<Point3> = Vec::new();
    let mut renumbered = Vec::with_capacity(polygons.len());
    for polygon in polygons {
        let mut indices = Vec::with_capacity(polygon.len());
        for &index in polygon {
            let new_index = match remap[index] {
                Some(new_index) => new_index,
                None => {
                    used.push(positions[index]);
                    remap[index] = Some(used.len() - 1);
                    used.len() - 1
                }
            };
            indices.push(new_index);
        }
        renumbered.push(indices);
    }
    (used, renumbered)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BrushError;
    use crate::math::{transform_point, Vector2};
    use crate::model::{BrushFaceAttributes, MapFormat};
    use crate::operations::creation::MakeCuboid;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn init_logging() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn cuboid(min: Point3, max: Point3, format: MapFormat) -> Brush {
        MakeCuboid::new(min, max, BrushFaceAttributes::new("box"), format)
            .execute()
            .unwrap()
    }

    #[test]
    fn cuboid_is_closed_with_box_topology() {
        let brush = cuboid(p(-8.0, 0.0, 0.0), p(8.0, 32.0, 16.0), MapFormat::Standard);
        let geometry = brush.geometry();
        assert_eq!(geometry.vertex_count(), 8);
        assert_eq!(geometry.edge_count(), 12);
        assert_eq!(geometry.face_count(), 6);
        assert!(geometry.is_closed());
        assert!(geometry.is_consistent());
        for face in brush.faces() {
            assert!(face.geometry().is_some());
            assert_eq!(face.vertex_count(geometry), 4);
            for position in face.vertex_positions(geometry) {
                assert_relative_eq!(face.boundary().point_distance(&position), 0.0, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn no_faces_is_empty() {
        assert!(matches!(
            Brush::create(Vec::new()),
            Err(BrushError::Topology(TopologyError::EmptyBrush))
        ));
    }

    #[test]
    fn open_planes_are_not_closed() {
        let brush = cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), MapFormat::Standard);
        let faces: Vec<BrushFace> = brush
            .faces()
            .iter()
            .filter(|face| face.normal().z < 0.5)
            .cloned()
            .collect();
        assert_eq!(faces.len(), 5);
        assert!(matches!(
            Brush::create(faces),
            Err(BrushError::Topology(TopologyError::NotClosed))
        ));
    }

    #[test]
    fn plane_touching_an_edge_is_dropped() {
        init_logging();
        let brush = cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), MapFormat::Standard);
        let mut faces = brush.faces().to_vec();
        // leans on the edge x = 1, z = 1 from outside
        faces.push(
            BrushFace::create(
                &p(1.0, 0.0, 1.0),
                &p(1.0, 1.0, 1.0),
                &p(2.0, 0.0, 0.0),
                BrushFaceAttributes::default(),
                MapFormat::Standard,
            )
            .unwrap(),
        );
        let rebuilt = Brush::create(faces).unwrap();
        assert_eq!(rebuilt.face_count(), 6);
        assert_eq!(rebuilt.geometry().vertex_count(), 8);
    }

    #[test]
    fn clone_keeps_geometry_links() {
        let brush = cuboid(p(0.0, 0.0, 0.0), p(2.0, 2.0, 2.0), MapFormat::Valve);
        let copy = brush.clone();
        let top = copy.find_face(&Vector3::z(), 1e-9).unwrap();
        assert_relative_eq!(
            copy.face(top).area(copy.geometry()),
            4.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn locked_translation_keeps_texture() {
        for format in [MapFormat::Standard, MapFormat::Valve] {
            let mut brush = cuboid(p(0.0, 0.0, 0.0), p(64.0, 64.0, 64.0), format);
            let before = brush.clone();
            let matrix = Matrix4::new_translation(&Vector3::new(13.0, -7.0, 5.0));
            brush.transform(&matrix, true).unwrap();

            assert_eq!(brush.geometry().vertex_count(), 8);
            for (moved, original) in brush.faces().iter().zip(before.faces()) {
                for corner in original.vertex_positions(before.geometry()) {
                    let expected = original.uv_coords(&corner);
                    let actual = moved.uv_coords(&transform_point(&matrix, &corner));
                    let delta = (actual - expected).map(|c| c - c.round());
                    assert!(delta.norm() < 1e-3, "{format:?}: {expected} vs {actual}");
                }
            }
        }
    }

    #[test]
    fn failed_transform_leaves_brush_unchanged() {
        let mut brush = cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), MapFormat::Standard);
        let flatten = Matrix4::new_nonuniform_scaling(&Vector3::new(1.0, 1.0, 0.0));
        assert!(brush.transform(&flatten, false).is_err());
        assert_eq!(brush.face_count(), 6);
        assert_eq!(brush.geometry().vertex_count(), 8);
    }

    #[test]
    fn faces_follow_moved_vertices() {
        let mut brush = cuboid(p(0.0, 0.0, 0.0), p(1.0, 1.0, 1.0), MapFormat::Standard);
        let top = brush.find_face(&Vector3::z(), 1e-9).unwrap();
        {
            let face = brush.face_mut(top);
            let mut attrs = face.attributes().clone();
            attrs.set_offset(Vector2::new(0.25, 0.75));
            face.set_attributes(attrs);
        }
        for x in [0.0, 1.0] {
            for y in [0.0, 1.0] {
                let vertex = brush.geometry().find_vertex(&p(x, y, 1.0), 1e-9).unwrap();
                brush
                    .geometry_mut()
                    .set_vertex_position(vertex, p(x, y, 3.0))
                    .unwrap();
            }
        }
        brush.update_points_from_vertices().unwrap();
        assert_relative_eq!(brush.face(top).boundary().distance, 3.0, epsilon = 1e-9);
        // the top plane only moved along its normal, so there is no seam to
        // correct against
        assert_eq!(brush.face(top).attributes().offset(), Vector2::new(0.25, 0.75));
        let side = brush.find_face(&Vector3::x(), 1e-9).unwrap();
        assert_relative_eq!(brush.face(side).area(brush.geometry()), 3.0, epsilon = 1e-9);
    }
}
