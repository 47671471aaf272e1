//! Texture coordinate systems for brush faces.
//!
//! A face maps world points to texture space through either a
//! [`ParaxialUvCoordSystem`], whose axes are snapped to one of six world-aligned
//! projections, or a [`ParallelUvCoordSystem`], which stores its U/V axes
//! explicitly. [`UvCoordSystem`] holds exactly one of them and can be swapped
//! between the two at runtime.

mod parallel;
mod paraxial;

pub use parallel::ParallelUvCoordSystem;
pub use paraxial::ParaxialUvCoordSystem;

use crate::geometry::Plane3;
use crate::math::{Matrix4, Point3, Vector2, Vector3, ALMOST_ZERO};
use crate::model::BrushFaceAttributes;

/// How texture axes follow a face whose normal changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapStyle {
    /// Rotate the axes by the rotation that carries the old normal onto the new one.
    Rotation,
    /// Keep projecting the texture along its own normal onto the new plane.
    Projection,
}

/// Treats a zero scale as 1 so that texture coordinates stay finite.
#[must_use]
pub(crate) fn safe_scale(value: f64) -> f64 {
    if value.abs() < ALMOST_ZERO {
        1.0
    } else {
        value
    }
}

/// Axis access and the texture math shared by every coordinate system.
pub trait UvAxes {
    /// World direction of the texture U axis.
    fn u_axis(&self) -> Vector3;

    /// World direction of the texture V axis.
    fn v_axis(&self) -> Vector3;

    /// Direction along which the texture is projected.
    fn z_axis(&self) -> Vector3;

    /// Texture coordinates of `point` in texels, before the offset is applied.
    fn compute_uv_coords(&self, point: &Point3, scale: &Vector2) -> Vector2 {
        Vector2::new(
            point.coords.dot(&(self.u_axis() / safe_scale(scale.x))),
            point.coords.dot(&(self.v_axis() / safe_scale(scale.y))),
        )
    }

    /// Normalized texture coordinates of `point` for a texture of the given size.
    fn uv_coords(
        &self,
        point: &Point3,
        attributes: &BrushFaceAttributes,
        texture_size: &Vector2,
    ) -> Vector2 {
        (self.compute_uv_coords(point, &attributes.scale()) + attributes.offset())
            .component_div(texture_size)
    }

    /// Matrix mapping world space into texel space (x, y) plus the distance
    /// along the projection axis (z).
    fn to_matrix(&self, offset: &Vector2, scale: &Vector2) -> Matrix4 {
        let u = self.u_axis() / safe_scale(scale.x);
        let v = self.v_axis() / safe_scale(scale.y);
        let n = self.z_axis();
        #[rustfmt::skip]
        let matrix = Matrix4::new(
            u.x, u.y, u.z, offset.x,
            v.x, v.y, v.z, offset.y,
            n.x, n.y, n.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );
        matrix
    }

    /// Inverse of [`to_matrix`](Self::to_matrix), if it exists.
    fn from_matrix(&self, offset: &Vector2, scale: &Vector2) -> Option<Matrix4> {
        self.to_matrix(offset, scale).try_inverse()
    }

    /// Moves the texture by `offset` texels relative to the camera.
    ///
    /// `offset.x` follows `right` and `offset.y` follows `up`; each is
    /// paired with whichever texture axis is closer to it on the face.
    fn translate(
        &self,
        normal: &Vector3,
        up: &Vector3,
        right: &Vector3,
        offset: &Vector2,
        attributes: &mut BrushFaceAttributes,
    ) {
        let plane = Plane3::new(*normal, 0.0);
        let on_face = |axis: Vector3| {
            let projected = plane.project_vector(&axis);
            if projected.norm() < ALMOST_ZERO {
                axis.normalize()
            } else {
                projected.normalize()
            }
        };
        let u = on_face(self.u_axis());
        let v = on_face(self.v_axis());

        let u_right = u.dot(right);
        let v_right = v.dot(right);
        let delta = if u_right.abs() >= v_right.abs() {
            Vector2::new(u_right.signum() * offset.x, v.dot(up).signum() * offset.y)
        } else {
            Vector2::new(u.dot(up).signum() * offset.y, v_right.signum() * offset.x)
        };
        attributes.set_offset(attributes.offset() - delta);
    }
}

/// The coordinate system owned by a brush face.
#[derive(Debug, Clone, PartialEq)]
pub enum UvCoordSystem {
    Paraxial(ParaxialUvCoordSystem),
    Parallel(ParallelUvCoordSystem),
}

impl From<ParaxialUvCoordSystem> for UvCoordSystem {
    fn from(system: ParaxialUvCoordSystem) -> Self {
        Self::Paraxial(system)
    }
}

impl From<ParallelUvCoordSystem> for UvCoordSystem {
    fn from(system: ParallelUvCoordSystem) -> Self {
        Self::Parallel(system)
    }
}

impl UvAxes for UvCoordSystem {
    fn u_axis(&self) -> Vector3 {
        match self {
            Self::Paraxial(system) => system.u_axis(),
            Self::Parallel(system) => system.u_axis(),
        }
    }

    fn v_axis(&self) -> Vector3 {
        match self {
            Self::Paraxial(system) => system.v_axis(),
            Self::Parallel(system) => system.v_axis(),
        }
    }

    fn z_axis(&self) -> Vector3 {
        match self {
            Self::Paraxial(system) => system.z_axis(),
            Self::Parallel(system) => system.z_axis(),
        }
    }
}

impl UvCoordSystem {
    #[must_use]
    pub fn is_paraxial(&self) -> bool {
        matches!(self, Self::Paraxial(_))
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        matches!(self, Self::Parallel(_))
    }

    /// Recomputes the axes from `normal`, discarding their current orientation.
    pub fn reset(&mut self, normal: &Vector3) {
        match self {
            Self::Paraxial(system) => system.reset(normal),
            Self::Parallel(system) => system.reset(normal),
        }
    }

    /// Sets the axes to the paraxial projection for `normal`, rotated by
    /// `angle` degrees.
    pub fn reset_to_paraxial(&mut self, normal: &Vector3, angle: f64) {
        match self {
            Self::Paraxial(system) => system.reset_to_paraxial(normal, angle),
            Self::Parallel(system) => system.reset_to_paraxial(normal, angle),
        }
    }

    /// Re-derives cached axes after the defining points changed.
    pub fn reset_cache(
        &mut self,
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) {
        if let Self::Paraxial(system) = self {
            system.reset_cache(point0, point1, point2, attributes);
        }
    }

    /// Re-orients the axes for a face whose normal changed from `old_normal`
    /// to `new_normal`.
    pub fn set_normal(
        &mut self,
        old_normal: &Vector3,
        new_normal: &Vector3,
        attributes: &BrushFaceAttributes,
        wrap_style: WrapStyle,
    ) {
        match self {
            Self::Paraxial(system) => system.set_normal(old_normal, new_normal, attributes, wrap_style),
            Self::Parallel(system) => system.set_normal(old_normal, new_normal, attributes, wrap_style),
        }
    }

    /// Brings the axes in line with a rotation attribute that changed from
    /// `old_angle` to `new_angle` degrees.
    pub fn set_rotation(&mut self, normal: &Vector3, old_angle: f64, new_angle: f64) {
        match self {
            Self::Paraxial(system) => system.set_rotation(normal, old_angle, new_angle),
            Self::Parallel(system) => system.set_rotation(normal, old_angle, new_angle),
        }
    }

    /// Adds `angle` degrees to the rotation attribute.
    pub fn rotate(&self, normal: &Vector3, angle: f64, attributes: &mut BrushFaceAttributes) {
        match self {
            Self::Paraxial(system) => system.rotate(normal, angle, attributes),
            Self::Parallel(system) => system.rotate(normal, angle, attributes),
        }
    }

    /// Shears texture space by `factors`. Paraxial systems cannot shear.
    pub fn shear(&mut self, normal: &Vector3, factors: &Vector2) {
        match self {
            Self::Paraxial(system) => system.shear(normal, factors),
            Self::Parallel(system) => system.shear(normal, factors),
        }
    }

    /// Updates the mapping for a face transformed by `matrix`.
    ///
    /// With `lock_alignment` the texture stays anchored at `invariant`: its
    /// transformed position keeps the texture coordinates `invariant` had
    /// before.
    #[allow(clippy::too_many_arguments)]
    pub fn transform(
        &mut self,
        old_plane: &Plane3,
        new_plane: &Plane3,
        matrix: &Matrix4,
        attributes: &mut BrushFaceAttributes,
        texture_size: &Vector2,
        lock_alignment: bool,
        invariant: &Point3,
    ) {
        match self {
            Self::Paraxial(system) => system.transform(
                old_plane,
                new_plane,
                matrix,
                attributes,
                texture_size,
                lock_alignment,
                invariant,
            ),
            Self::Parallel(system) => system.transform(
                old_plane,
                new_plane,
                matrix,
                attributes,
                texture_size,
                lock_alignment,
                invariant,
            ),
        }
    }

    /// Converts to a paraxial system that reproduces the texture coordinates
    /// at the three points as closely as the paraxial model allows.
    #[must_use]
    pub fn to_paraxial(
        &self,
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        match self {
            Self::Paraxial(system) => (system.clone().into(), attributes.clone()),
            Self::Parallel(system) => {
                let (paraxial, attributes) = ParaxialUvCoordSystem::from_parallel(
                    point0,
                    point1,
                    point2,
                    attributes,
                    &system.u_axis(),
                    &system.v_axis(),
                );
                (paraxial.into(), attributes)
            }
        }
    }

    /// Converts to a parallel system with the same texture coordinates.
    #[must_use]
    pub fn to_parallel(
        &self,
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) -> (UvCoordSystem, BrushFaceAttributes) {
        match self {
            Self::Paraxial(_) => {
                let (parallel, attributes) =
                    ParallelUvCoordSystem::from_paraxial(point0, point1, point2, attributes);
                (parallel.into(), attributes)
            }
            Self::Parallel(system) => (system.clone().into(), attributes.clone()),
        }
    }

    /// Captures the axis state, not the attributes.
    #[must_use]
    pub fn take_snapshot(&self) -> UvCoordSystemSnapshot {
        UvCoordSystemSnapshot(self.clone())
    }

    /// Angle in degrees of `point` around `center` in texture space, used by
    /// interactive rotation tools.
    #[must_use]
    pub fn measure_angle(&self, current_angle: f64, center: &Vector2, point: &Vector2) -> f64 {
        match self {
            Self::Paraxial(system) => system.measure_angle(current_angle, center, point),
            Self::Parallel(system) => system.measure_angle(current_angle, center, point),
        }
    }
}

/// Opaque copy of a coordinate system's axis state.
#[derive(Debug, Clone, PartialEq)]
pub struct UvCoordSystemSnapshot(UvCoordSystem);

impl UvCoordSystemSnapshot {
    /// Writes the captured state back into `target`.
    ///
    /// # Panics
    ///
    /// Panics if `target` is a different kind of coordinate system than the
    /// one the snapshot was taken from.
    pub fn restore(&self, target: &mut UvCoordSystem) {
        assert!(
            self.0.is_paraxial() == target.is_paraxial(),
            "wrong coord system type"
        );
        target.clone_from(&self.0);
    }
}

/// Converts a texture-space point to a unit direction in the texture plane,
/// or `None` for a zero-length vector.
pub(crate) fn texture_direction(center: &Vector2, point: &Vector2) -> Option<Vector3> {
    let delta = point - center;
    let len = delta.norm();
    (len >= ALMOST_ZERO).then(|| Vector3::new(delta.x / len, delta.y / len, 0.0))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn floor() -> UvCoordSystem {
        ParaxialUvCoordSystem::new(&Vector3::z(), &BrushFaceAttributes::default()).into()
    }

    #[test]
    fn uv_coords_apply_scale_offset_and_size() {
        let system = floor();
        let mut attrs = BrushFaceAttributes::default();
        attrs.set_scale(Vector2::new(2.0, 0.5));
        attrs.set_offset(Vector2::new(3.0, 1.0));
        let uv = system.uv_coords(&Point3::new(8.0, 4.0, 100.0), &attrs, &Vector2::new(4.0, 2.0));
        // u = 8 / 2 + 3 = 7, v = -4 / 0.5 + 1 = -7
        assert_relative_eq!(uv, Vector2::new(7.0 / 4.0, -7.0 / 2.0));
    }

    #[test]
    fn zero_scale_is_treated_as_one() {
        let system = floor();
        let coords = system.compute_uv_coords(&Point3::new(5.0, 0.0, 0.0), &Vector2::zeros());
        assert_relative_eq!(coords, Vector2::new(5.0, 0.0));
    }

    #[test]
    fn from_matrix_inverts_to_matrix() {
        let system = floor();
        let offset = Vector2::new(3.0, -2.0);
        let scale = Vector2::new(0.5, 2.0);
        let forward = system.to_matrix(&offset, &scale);
        let backward = system.from_matrix(&offset, &scale).unwrap();
        assert_relative_eq!(forward * backward, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn translate_follows_camera_axes() {
        let system = floor();
        let mut attrs = BrushFaceAttributes::default();
        // Looking down at the floor: right is +X, up is +Y, V runs along -Y.
        system.translate(
            &Vector3::z(),
            &Vector3::y(),
            &Vector3::x(),
            &Vector2::new(2.0, 3.0),
            &mut attrs,
        );
        assert_relative_eq!(attrs.offset(), Vector2::new(-2.0, 3.0));
    }

    #[test]
    fn translate_swaps_axes_when_texture_is_sideways() {
        let system = floor();
        let mut attrs = BrushFaceAttributes::default();
        // Camera rolled by 90 degrees: right is +Y, up is -X.
        system.translate(
            &Vector3::z(),
            &-Vector3::x(),
            &Vector3::y(),
            &Vector2::new(2.0, 3.0),
            &mut attrs,
        );
        assert_relative_eq!(attrs.offset(), Vector2::new(3.0, 2.0));
    }

    #[test]
    fn snapshot_restores_axes() {
        let mut system: UvCoordSystem =
            ParallelUvCoordSystem::new(Vector3::x(), -Vector3::y()).into();
        let snapshot = system.take_snapshot();
        system.set_rotation(&Vector3::z(), 0.0, 45.0);
        assert!((system.u_axis() - Vector3::x()).norm() > 0.1);
        snapshot.restore(&mut system);
        assert_relative_eq!(system.u_axis(), Vector3::x());
    }

    #[test]
    #[should_panic(expected = "wrong coord system type")]
    fn snapshot_of_other_kind_is_a_contract_violation() {
        let snapshot = floor().take_snapshot();
        let mut parallel: UvCoordSystem =
            ParallelUvCoordSystem::new(Vector3::x(), -Vector3::y()).into();
        snapshot.restore(&mut parallel);
    }
}
