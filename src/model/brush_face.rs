use std::sync::Arc;

use crate::error::{BrushError, Result};
use crate::geometry::{Plane3, Ray3};
use crate::math::intersect_3d::plane_plane_intersect;
use crate::math::polygon_3d::{average, fan_area, projected_area, ray_polygon_intersect};
use crate::math::{
    compare_vectors, correct_point, correct_vector2, transform_direction, transform_point, Axis,
    Direction, Matrix4, Point3, Vector2, Vector3, ALMOST_ZERO, COLINEAR_EPSILON,
};
use crate::topology::{FaceId, Polyhedron};
use crate::uv::{
    ParallelUvCoordSystem, ParaxialUvCoordSystem, UvAxes, UvCoordSystem, UvCoordSystemSnapshot,
    WrapStyle,
};

use super::tag::{ConstTagVisitor, TagMask, TagVisitor};
use super::{BrushFaceAttributes, Color, EmbeddedDefaults, MapFormat, Material};

/// Maximum distance of a face's center from a plane for the face to count as
/// lying in it.
const COPLANAR_DISTANCE_EPSILON: f64 = ALMOST_ZERO * 10.0;

/// One bounding plane of a brush, with its texturing.
///
/// The plane is defined by three points that wind clockwise when seen from
/// the front. Once the face is part of a [`Brush`](super::Brush), `geometry`
/// names its polygon in the brush's [`Polyhedron`]; cloning a face detaches
/// the clone from that polygon.
#[derive(Debug)]
pub struct BrushFace {
    points: [Point3; 3],
    boundary: Plane3,
    attributes: BrushFaceAttributes,
    uv_coord_system: UvCoordSystem,
    material: Option<Arc<Material>>,
    geometry: Option<FaceId>,
    line_number: usize,
    line_count: usize,
    selected: bool,
    tags: TagMask,
}

impl Clone for BrushFace {
    fn clone(&self) -> Self {
        Self {
            points: self.points,
            boundary: self.boundary,
            attributes: self.attributes.clone(),
            uv_coord_system: self.uv_coord_system.clone(),
            material: self.material.clone(),
            geometry: None,
            line_number: self.line_number,
            line_count: self.line_count,
            selected: self.selected,
            tags: self.tags,
        }
    }
}

impl BrushFace {
    // --- Construction ---

    /// Creates a face whose texture system is chosen by `map_format`.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the points do not span a plane.
    ///
    /// # Panics
    ///
    /// Panics if `map_format` is [`MapFormat::Unknown`].
    pub fn create(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: BrushFaceAttributes,
        map_format: MapFormat,
    ) -> Result<Self> {
        let uv_coord_system: UvCoordSystem = if map_format.is_parallel_uv_coord_system() {
            ParallelUvCoordSystem::from_points(point0, point1, point2, &attributes).into()
        } else {
            ParaxialUvCoordSystem::from_points(point0, point1, point2, &attributes).into()
        };
        Self::create_with_uv_coord_system(point0, point1, point2, attributes, uv_coord_system)
    }

    /// Creates a face from paraxial texturing, converting it if `map_format`
    /// uses parallel texture axes.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the points do not span a plane.
    ///
    /// # Panics
    ///
    /// Panics if `map_format` is [`MapFormat::Unknown`].
    pub fn create_from_standard(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: BrushFaceAttributes,
        map_format: MapFormat,
    ) -> Result<Self> {
        let (uv_coord_system, attributes) = if map_format.is_parallel_uv_coord_system() {
            let (system, attributes) =
                ParallelUvCoordSystem::from_paraxial(point0, point1, point2, &attributes);
            (UvCoordSystem::from(system), attributes)
        } else {
            let system = ParaxialUvCoordSystem::from_points(point0, point1, point2, &attributes);
            (system.into(), attributes)
        };
        Self::create_with_uv_coord_system(point0, point1, point2, attributes, uv_coord_system)
    }

    /// Creates a face from explicit texture axes, converting them to the
    /// closest paraxial mapping if `map_format` does not support them.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the points do not span a plane.
    ///
    /// # Panics
    ///
    /// Panics if `map_format` is [`MapFormat::Unknown`].
    pub fn create_from_valve(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: BrushFaceAttributes,
        u_axis: &Vector3,
        v_axis: &Vector3,
        map_format: MapFormat,
    ) -> Result<Self> {
        let (uv_coord_system, attributes) = if map_format.is_parallel_uv_coord_system() {
            let system = ParallelUvCoordSystem::new(*u_axis, *v_axis);
            (UvCoordSystem::from(system), attributes)
        } else {
            let (system, attributes) = ParaxialUvCoordSystem::from_parallel(
                point0,
                point1,
                point2,
                &attributes,
                u_axis,
                v_axis,
            );
            (system.into(), attributes)
        };
        Self::create_with_uv_coord_system(point0, point1, point2, attributes, uv_coord_system)
    }

    /// Creates a face that takes ownership of an existing texture system.
    ///
    /// The points are snapped to nearby integers before the plane is derived.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the points do not span a plane.
    pub fn create_with_uv_coord_system(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: BrushFaceAttributes,
        uv_coord_system: UvCoordSystem,
    ) -> Result<Self> {
        let points = [correct_point(point0), correct_point(point1), correct_point(point2)];
        let Some(boundary) = Plane3::from_points(&points[0], &points[1], &points[2]) else {
            tracing::debug!(
                "rejecting face through {} {} {}",
                points[0],
                points[1],
                points[2]
            );
            return Err(BrushError::InvalidFace);
        };
        Ok(Self {
            points,
            boundary,
            attributes,
            uv_coord_system,
            material: None,
            geometry: None,
            line_number: 0,
            line_count: 0,
            selected: false,
            tags: TagMask::NONE,
        })
    }

    /// Orders faces by normal, then by distance, so that brushes built from
    /// the same planes always see them in the same order.
    pub fn sort_faces(faces: &mut [BrushFace]) {
        faces.sort_by(|lhs, rhs| {
            compare_vectors(&lhs.boundary.normal, &rhs.boundary.normal)
                .then_with(|| lhs.boundary.distance.total_cmp(&rhs.boundary.distance))
        });
    }

    // --- Accessors ---

    #[must_use]
    pub fn points(&self) -> &[Point3; 3] {
        &self.points
    }

    #[must_use]
    pub fn boundary(&self) -> &Plane3 {
        &self.boundary
    }

    #[must_use]
    pub fn normal(&self) -> Vector3 {
        self.boundary.normal
    }

    #[must_use]
    pub fn attributes(&self) -> &BrushFaceAttributes {
        &self.attributes
    }

    #[must_use]
    pub fn uv_coord_system(&self) -> &UvCoordSystem {
        &self.uv_coord_system
    }

    #[must_use]
    pub fn material(&self) -> Option<&Arc<Material>> {
        self.material.as_ref()
    }

    #[must_use]
    pub fn geometry(&self) -> Option<FaceId> {
        self.geometry
    }

    pub(crate) fn set_geometry(&mut self, geometry: Option<FaceId>) {
        self.geometry = geometry;
    }

    #[must_use]
    pub fn u_axis(&self) -> Vector3 {
        self.uv_coord_system.u_axis()
    }

    #[must_use]
    pub fn v_axis(&self) -> Vector3 {
        self.uv_coord_system.v_axis()
    }

    fn face_geometry(&self, geometry: &Polyhedron) -> FaceId {
        let Some(face) = self.geometry else {
            panic!("geometry is null");
        };
        assert!(
            geometry.face(face).is_ok(),
            "face is not part of this polyhedron"
        );
        face
    }

    fn set_points(&mut self, point0: &Point3, point1: &Point3, point2: &Point3) -> Result<()> {
        let points = [correct_point(point0), correct_point(point1), correct_point(point2)];
        let Some(boundary) = Plane3::from_points(&points[0], &points[1], &points[2]) else {
            tracing::debug!("face points became degenerate");
            return Err(BrushError::InvalidFace);
        };
        self.points = points;
        self.boundary = boundary;
        Ok(())
    }

    // --- Geometric queries ---
    //
    // These read the face's polygon and panic if the face is not part of a
    // polyhedron, or if `geometry` is not the polyhedron holding it.

    /// Average of the polygon's vertices.
    #[must_use]
    pub fn center(&self, geometry: &Polyhedron) -> Point3 {
        average(&self.vertex_positions(geometry))
    }

    /// Center of the polygon's bounding rectangle within the face plane.
    #[must_use]
    pub fn bounds_center(&self, geometry: &Polyhedron) -> Point3 {
        let positions = self.vertex_positions(geometry);
        let Some(to_plane) = self.boundary.projection_matrix(&self.boundary.normal) else {
            return average(&positions);
        };
        let Some(from_plane) = to_plane.try_inverse() else {
            return average(&positions);
        };

        let mut local = positions.iter().map(|p| transform_point(&to_plane, p));
        let Some(first) = local.next() else {
            return self.boundary.anchor();
        };
        let (min, max) = local.fold((first, first), |(min, max), p| (min.inf(&p), max.sup(&p)));
        transform_point(&from_plane, &nalgebra::center(&min, &max))
    }

    /// Area of the polygon.
    #[must_use]
    pub fn area(&self, geometry: &Polyhedron) -> f64 {
        fan_area(&self.vertex_positions(geometry))
    }

    /// Area of the polygon projected onto the plane perpendicular to `axis`.
    #[must_use]
    pub fn projected_area(&self, geometry: &Polyhedron, axis: Axis) -> f64 {
        projected_area(&self.vertex_positions(geometry), axis)
    }

    /// Whether the face lies in `plane`: its center must be on the plane and
    /// the normals must agree.
    #[must_use]
    pub fn coplanar_with(&self, geometry: &Polyhedron, plane: &Plane3) -> bool {
        let center = self.center(geometry);
        plane.point_distance(&center).abs() < COPLANAR_DISTANCE_EPSILON
            && 1.0 - self.boundary.normal.dot(&plane.normal) < COLINEAR_EPSILON
    }

    #[must_use]
    pub fn vertex_count(&self, geometry: &Polyhedron) -> usize {
        geometry.boundary(self.face_geometry(geometry)).count()
    }

    #[must_use]
    pub fn vertex_positions(&self, geometry: &Polyhedron) -> Vec<Point3> {
        geometry.vertex_positions(self.face_geometry(geometry))
    }

    /// Whether the polygon consists of exactly `positions`, in cyclic order.
    #[must_use]
    pub fn has_vertices(&self, geometry: &Polyhedron, positions: &[Point3], epsilon: f64) -> bool {
        geometry.has_vertex_positions(self.face_geometry(geometry), positions, epsilon)
    }

    /// The polygon as a closed ring of points, counter-clockwise about the
    /// normal.
    #[must_use]
    pub fn polygon(&self, geometry: &Polyhedron) -> Vec<Point3> {
        self.vertex_positions(geometry)
    }

    /// Distance along `ray` to the polygon. Rays hitting the back of the face
    /// never intersect it.
    #[must_use]
    pub fn intersect_with_ray(&self, geometry: &Polyhedron, ray: &Ray3) -> Option<f64> {
        let positions = self.vertex_positions(geometry);
        if self.boundary.normal.dot(&ray.direction) >= 0.0 {
            return None;
        }
        ray_polygon_intersect(ray, &self.boundary, &positions)
    }

    // --- Editing ---

    /// Transforms the face by `matrix`.
    ///
    /// Under `lock_alignment` the polygon's center keeps its texture
    /// coordinates. A face that is not part of a polyhedron has no polygon and
    /// uses the plane's anchor instead.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the transformed points are
    /// degenerate.
    ///
    /// # Panics
    ///
    /// Panics if the face is part of a polyhedron and `geometry` is `None`.
    pub fn transform(
        &mut self,
        geometry: Option<&Polyhedron>,
        matrix: &Matrix4,
        lock_alignment: bool,
    ) -> Result<()> {
        let invariant = match (geometry, self.geometry) {
            (Some(geometry), Some(_)) => self.center(geometry),
            (None, Some(_)) => panic!("face geometry must be passed to transform"),
            (_, None) => self.boundary.anchor(),
        };
        let old_boundary = self.boundary;

        self.boundary = self.boundary.transform(matrix);
        let mut points = self.points.map(|p| transform_point(matrix, &p));
        // mirroring transforms reverse the winding
        if (points[2] - points[0])
            .cross(&(points[1] - points[0]))
            .dot(&self.boundary.normal)
            < 0.0
        {
            points.swap(1, 2);
        }
        self.set_points(&points[0], &points[1], &points[2])?;

        let texture_size = self.texture_size();
        self.uv_coord_system.transform(
            &old_boundary,
            &self.boundary,
            matrix,
            &mut self.attributes,
            &texture_size,
            lock_alignment,
            &invariant,
        );
        Ok(())
    }

    /// Turns the face around without touching its texture.
    pub fn invert(&mut self) {
        self.boundary = self.boundary.flip();
        self.points.swap(1, 2);
    }

    /// Re-derives the points from the polygon after its vertices were moved,
    /// keeping the texture continuous along the line where the old and new
    /// planes meet.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::InvalidFace`] if the first vertices are collinear.
    pub fn update_points_from_vertices(&mut self, geometry: &Polyhedron) -> Result<()> {
        let first = geometry.first_half_edge(self.face_geometry(geometry));
        let old_plane = self.boundary;
        self.set_points(
            &geometry.origin(geometry.next(first)),
            &geometry.origin(first),
            &geometry.origin(geometry.previous(first)),
        )?;

        let Some(seam) = plane_plane_intersect(&old_plane, &self.boundary).seam() else {
            tracing::trace!("face plane moved parallel to itself, texture offset kept");
            return Ok(());
        };
        let reference = seam.project_point(&self.center(geometry));
        let unit = Vector2::new(1.0, 1.0);
        let desired = self
            .uv_coord_system
            .uv_coords(&reference, &self.attributes, &unit);
        self.uv_coord_system.set_normal(
            &old_plane.normal,
            &self.boundary.normal,
            &self.attributes,
            WrapStyle::Projection,
        );
        let current = self
            .uv_coord_system
            .uv_coords(&reference, &self.attributes, &unit);
        self.shift_offset(&(desired - current));
        Ok(())
    }

    /// Continues the texture of a neighboring face onto this one.
    ///
    /// `snapshot`, `attributes` and `source_plane` describe the source face.
    /// The texture coordinates of both faces agree along the line where their
    /// planes meet.
    pub fn copy_uv_coord_system_from_face(
        &mut self,
        geometry: &Polyhedron,
        snapshot: &UvCoordSystemSnapshot,
        attributes: &BrushFaceAttributes,
        source_plane: &Plane3,
        wrap_style: WrapStyle,
    ) {
        let seam = plane_plane_intersect(source_plane, &self.boundary).seam();
        snapshot.restore(&mut self.uv_coord_system);

        let unit = Vector2::new(1.0, 1.0);
        let reference = seam
            .as_ref()
            .map(|seam| seam.project_point(&self.center(geometry)));
        let desired = reference
            .map(|point| self.uv_coord_system.uv_coords(&point, attributes, &unit));

        self.uv_coord_system.set_normal(
            &source_plane.normal,
            &self.boundary.normal,
            &self.attributes,
            wrap_style,
        );

        if let (Some(point), Some(desired)) = (reference, desired) {
            let current = self
                .uv_coord_system
                .uv_coords(&point, &self.attributes, &unit);
            self.shift_offset(&(desired - current));
        } else {
            tracing::trace!("source face is parallel, texture offset kept");
        }
    }

    fn shift_offset(&mut self, change: &Vector2) {
        let offset = self.mod_offset(&(self.attributes.offset() + change));
        self.attributes.set_offset(correct_vector2(&offset, 4));
    }

    fn mod_offset(&self, offset: &Vector2) -> Vector2 {
        self.attributes.mod_offset(offset, &self.texture_size())
    }

    /// Moves the texture by `offset` texels in camera space.
    pub fn move_uv(&mut self, up: &Vector3, right: &Vector3, offset: &Vector2) {
        self.uv_coord_system.translate(
            &self.boundary.normal,
            up,
            right,
            offset,
            &mut self.attributes,
        );
    }

    /// Rotates the texture by `angle` degrees.
    pub fn rotate_uv(&mut self, angle: f64) {
        let old_rotation = self.attributes.rotation();
        self.uv_coord_system
            .rotate(&self.boundary.normal, angle, &mut self.attributes);
        self.uv_coord_system.set_rotation(
            &self.boundary.normal,
            old_rotation,
            self.attributes.rotation(),
        );
    }

    pub fn shear_uv(&mut self, factors: &Vector2) {
        self.uv_coord_system.shear(&self.boundary.normal, factors);
    }

    /// Mirrors the texture horizontally (`Left`/`Right`) or vertically
    /// (any other direction) as seen from the camera.
    pub fn flip_uv(&mut self, _camera_up: &Vector3, camera_right: &Vector3, direction: Direction) {
        let (u_in_world, v_in_world) = self
            .uv_coord_system
            .from_matrix(&Vector2::zeros(), &Vector2::new(1.0, 1.0))
            .map_or_else(
                || (self.u_axis(), self.v_axis()),
                |to_world| {
                    (
                        transform_direction(&to_world, &Vector3::x()),
                        transform_direction(&to_world, &Vector3::y()),
                    )
                },
            );

        // cosine to the axis line, ignoring its sign
        let u_cos = u_in_world.normalize().dot(camera_right).abs();
        let v_cos = v_in_world.normalize().dot(camera_right).abs();

        let horizontal = matches!(direction, Direction::Left | Direction::Right);
        let flip_u = horizontal != (v_cos > u_cos);

        if flip_u {
            self.attributes.set_x_scale(-self.attributes.x_scale());
        } else {
            self.attributes.set_y_scale(-self.attributes.y_scale());
        }
    }

    /// Replaces all attributes and brings the texture axes in line with the
    /// new rotation.
    pub fn set_attributes(&mut self, attributes: BrushFaceAttributes) {
        let old_rotation = self.attributes.rotation();
        self.attributes = attributes;
        self.uv_coord_system.set_rotation(
            &self.boundary.normal,
            old_rotation,
            self.attributes.rotation(),
        );
    }

    /// Copies the material name, offset, rotation, scale and surface
    /// attributes of `other`. Returns whether anything changed.
    pub fn set_attributes_from(&mut self, other: &BrushFace) -> bool {
        let source = &other.attributes;
        let mut changed = false;
        changed |= self.attributes.set_material_name(source.material_name());
        changed |= self.attributes.set_x_offset(source.x_offset());
        changed |= self.attributes.set_y_offset(source.y_offset());
        changed |= self.attributes.set_rotation(source.rotation());
        changed |= self.attributes.set_x_scale(source.x_scale());
        changed |= self.attributes.set_y_scale(source.y_scale());
        changed |= self.attributes.set_surface_contents(source.surface_contents());
        changed |= self.attributes.set_surface_flags(source.surface_flags());
        changed |= self.attributes.set_surface_value(source.surface_value());
        changed
    }

    /// Points the face at another material. Returns `false` if it already
    /// uses that exact material.
    pub fn set_material(&mut self, material: Option<Arc<Material>>) -> bool {
        let same = match (&self.material, &material) {
            (Some(current), Some(new)) => Arc::ptr_eq(current, new),
            (None, None) => true,
            _ => false,
        };
        if same {
            return false;
        }
        self.material = material;
        true
    }

    pub fn reset_uv_axes(&mut self) {
        self.uv_coord_system.reset(&self.boundary.normal);
    }

    pub fn reset_uv_axes_to_paraxial(&mut self) {
        self.uv_coord_system
            .reset_to_paraxial(&self.boundary.normal, 0.0);
    }

    /// Switches to paraxial texturing, keeping the texture where the model
    /// allows it.
    pub fn convert_to_paraxial(&mut self) {
        let [p0, p1, p2] = &self.points;
        let (system, attributes) = self.uv_coord_system.to_paraxial(p0, p1, p2, &self.attributes);
        tracing::debug!(rotation = attributes.rotation(), "converted face to paraxial");
        self.uv_coord_system = system;
        self.attributes = attributes;
    }

    /// Switches to parallel texturing.
    pub fn convert_to_parallel(&mut self) {
        let [p0, p1, p2] = &self.points;
        let (system, attributes) = self.uv_coord_system.to_parallel(p0, p1, p2, &self.attributes);
        tracing::debug!("converted face to parallel");
        self.uv_coord_system = system;
        self.attributes = attributes;
    }

    #[must_use]
    pub fn take_uv_coord_system_snapshot(&self) -> UvCoordSystemSnapshot {
        self.uv_coord_system.take_snapshot()
    }

    /// # Panics
    ///
    /// Panics if the snapshot was taken from the other kind of texture system.
    pub fn restore_uv_coord_system_snapshot(&mut self, snapshot: &UvCoordSystemSnapshot) {
        snapshot.restore(&mut self.uv_coord_system);
    }

    pub fn reset_uv_coord_system_cache(&mut self) {
        let [p0, p1, p2] = &self.points;
        self.uv_coord_system
            .reset_cache(p0, p1, p2, &self.attributes);
    }

    // --- Texture space ---

    /// Normalized texture coordinates of `point`.
    #[must_use]
    pub fn uv_coords(&self, point: &Point3) -> Vector2 {
        self.uv_coord_system
            .uv_coords(point, &self.attributes, &self.texture_size())
    }

    #[must_use]
    pub fn measure_uv_angle(&self, center: &Vector2, point: &Vector2) -> f64 {
        self.uv_coord_system
            .measure_angle(self.attributes.rotation(), center, point)
    }

    /// World to texture space. With `project` the depth coordinate is dropped.
    #[must_use]
    pub fn to_uv_coord_system_matrix(&self, offset: &Vector2, scale: &Vector2, project: bool) -> Matrix4 {
        let matrix = self.uv_coord_system.to_matrix(offset, scale);
        if project {
            flatten_z() * matrix
        } else {
            matrix
        }
    }

    /// Texture to world space. With `project` the result lands on the face
    /// plane.
    #[must_use]
    pub fn from_uv_coord_system_matrix(
        &self,
        offset: &Vector2,
        scale: &Vector2,
        project: bool,
    ) -> Option<Matrix4> {
        let matrix = self.uv_coord_system.from_matrix(offset, scale)?;
        if project {
            Some(self.project_to_boundary_matrix()? * matrix)
        } else {
            Some(matrix)
        }
    }

    /// Projects world points onto the face plane along the texture's
    /// projection axis.
    #[must_use]
    pub fn project_to_boundary_matrix(&self) -> Option<Matrix4> {
        let to_world = self
            .uv_coord_system
            .from_matrix(&Vector2::zeros(), &Vector2::new(1.0, 1.0))?;
        let direction = transform_direction(&to_world, &Vector3::z());
        let to_plane = self.boundary.projection_matrix(&direction)?;
        let from_plane = to_plane.try_inverse()?;
        Some(from_plane * flatten_z() * to_plane)
    }

    // --- Surface ---

    /// Size of the material's texture in texels, at least 1x1.
    #[must_use]
    pub fn texture_size(&self) -> Vector2 {
        self.material
            .as_ref()
            .and_then(|material| material.texture.as_ref())
            .map_or_else(
                || Vector2::new(1.0, 1.0),
                |texture| texture.size().sup(&Vector2::new(1.0, 1.0)),
            )
    }

    fn embedded_defaults(&self) -> EmbeddedDefaults {
        self.material
            .as_ref()
            .and_then(|material| material.texture.as_ref())
            .map_or(EmbeddedDefaults::None, |texture| texture.embedded_defaults)
    }

    /// Surface contents, falling back to the texture's embedded defaults.
    #[must_use]
    pub fn resolved_surface_contents(&self) -> i32 {
        self.attributes.surface_contents().unwrap_or_else(|| match self.embedded_defaults() {
            EmbeddedDefaults::Quake2 { contents, .. } => contents,
            EmbeddedDefaults::None => 0,
        })
    }

    #[must_use]
    pub fn resolved_surface_flags(&self) -> i32 {
        self.attributes.surface_flags().unwrap_or_else(|| match self.embedded_defaults() {
            EmbeddedDefaults::Quake2 { flags, .. } => flags,
            EmbeddedDefaults::None => 0,
        })
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn resolved_surface_value(&self) -> f32 {
        self.attributes.surface_value().unwrap_or_else(|| match self.embedded_defaults() {
            EmbeddedDefaults::Quake2 { value, .. } => value as f32,
            EmbeddedDefaults::None => 0.0,
        })
    }

    #[must_use]
    pub fn resolved_color(&self) -> Color {
        self.attributes.color().unwrap_or_default()
    }

    // --- Editor state ---

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// # Panics
    ///
    /// Panics if the face is already selected.
    pub fn select(&mut self) {
        assert!(!self.selected, "face is already selected");
        self.selected = true;
    }

    /// # Panics
    ///
    /// Panics if the face is not selected.
    pub fn deselect(&mut self) {
        assert!(self.selected, "face is not selected");
        self.selected = false;
    }

    pub fn set_file_position(&mut self, line_number: usize, line_count: usize) {
        self.line_number = line_number;
        self.line_count = line_count;
    }

    #[must_use]
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_count
    }

    #[must_use]
    pub fn tags(&self) -> TagMask {
        self.tags
    }

    #[must_use]
    pub fn has_tag(&self, mask: TagMask) -> bool {
        self.tags.intersects(mask)
    }

    pub fn add_tag(&mut self, mask: TagMask) {
        self.tags.insert(mask);
    }

    pub fn remove_tag(&mut self, mask: TagMask) {
        self.tags.remove(mask);
    }

    pub fn accept_tag_visitor(&mut self, visitor: &mut dyn TagVisitor) {
        visitor.visit_face(self);
    }

    pub fn accept_const_tag_visitor(&self, visitor: &mut dyn ConstTagVisitor) {
        visitor.visit_face(self);
    }
}

/// Identity with the z row cleared.
fn flatten_z() -> Matrix4 {
    let mut matrix = Matrix4::identity();
    matrix[(2, 2)] = 0.0;
    matrix
}
