use nalgebra::{Rotation3, Unit};
use tracing::trace;

use crate::geometry::Plane3;
use crate::math::{
    correct_vector2, find_abs_max_component, linear_part, measure_angle, perpendicular,
    transform_point, Axis, Matrix4, Point3, Vector2, Vector3, ALMOST_ZERO,
};
use crate::model::BrushFaceAttributes;

use super::{safe_scale, texture_direction, ParaxialUvCoordSystem, UvAxes, WrapStyle};

/// Below this cosine between the texture normal and a face normal, projecting
/// the texture onto the face degenerates.
const MIN_PROJECTION_COSINE: f64 = 0.01;

/// Texture projection with explicit U and V axes.
///
/// The axes need not be orthogonal or unit length, which lets the mapping
/// express shear and lets locked transforms be exact.
#[derive(Debug, Clone, PartialEq)]
pub struct ParallelUvCoordSystem {
    u_axis: Vector3,
    v_axis: Vector3,
}

impl ParallelUvCoordSystem {
    #[must_use]
    pub fn new(u_axis: Vector3, v_axis: Vector3) -> Self {
        Self { u_axis, v_axis }
    }

    /// Axes lying in the plane through the three points, rotated by the
    /// rotation attribute.
    #[must_use]
    pub fn from_points(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) -> Self {
        let normal = Plane3::from_points(point0, point1, point2)
            .map_or_else(Vector3::z, |plane| plane.normal);
        let mut system = Self::new(Vector3::x(), -Vector3::y());
        system.reset(&normal);
        system.apply_rotation(&normal, attributes.rotation());
        system
    }

    /// Takes over the axes of the paraxial system for the same points.
    ///
    /// Both systems evaluate the same formula, so the mapping is unchanged.
    #[must_use]
    pub fn from_paraxial(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) -> (Self, BrushFaceAttributes) {
        let paraxial = ParaxialUvCoordSystem::from_points(point0, point1, point2, attributes);
        (
            Self::new(paraxial.u_axis(), paraxial.v_axis()),
            attributes.clone(),
        )
    }

    pub fn reset(&mut self, normal: &Vector3) {
        let first = match find_abs_max_component(normal) {
            Axis::Z => -Vector3::y(),
            Axis::X | Axis::Y => -Vector3::z(),
        };
        self.u_axis = normal.cross(&first).normalize();
        self.v_axis = self.u_axis.cross(normal).normalize();
    }

    pub fn reset_to_paraxial(&mut self, normal: &Vector3, angle: f64) {
        let index = ParaxialUvCoordSystem::plane_normal_index(normal);
        let (mut u_axis, mut v_axis, _) = ParaxialUvCoordSystem::axes(index);
        ParaxialUvCoordSystem::rotate_axes(&mut u_axis, &mut v_axis, angle.to_radians(), index);
        self.u_axis = u_axis;
        self.v_axis = v_axis;
    }

    /// Rotates both axes by `angle` degrees about `normal`.
    fn apply_rotation(&mut self, normal: &Vector3, angle: f64) {
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(*normal), angle.to_radians());
        self.u_axis = rotation * self.u_axis;
        self.v_axis = rotation * self.v_axis;
    }

    pub fn set_rotation(&mut self, normal: &Vector3, old_angle: f64, new_angle: f64) {
        self.apply_rotation(normal, new_angle - old_angle);
    }

    pub fn set_normal(
        &mut self,
        old_normal: &Vector3,
        new_normal: &Vector3,
        attributes: &BrushFaceAttributes,
        wrap_style: WrapStyle,
    ) {
        match wrap_style {
            WrapStyle::Rotation => {
                let rotation = Rotation3::rotation_between(old_normal, new_normal)
                    .unwrap_or_else(|| {
                        let axis = if self.u_axis.dot(old_normal).abs() < ALMOST_ZERO
                            && self.u_axis.norm() > ALMOST_ZERO
                        {
                            self.u_axis.normalize()
                        } else {
                            perpendicular(old_normal)
                        };
                        Rotation3::from_axis_angle(&Unit::new_normalize(axis), std::f64::consts::PI)
                    });
                self.u_axis = rotation * self.u_axis;
                self.v_axis = rotation * self.v_axis;
            }
            WrapStyle::Projection => {
                if self.z_axis().dot(new_normal).abs() < MIN_PROJECTION_COSINE {
                    trace!("texture normal lies in the new face plane, resetting axes");
                    self.reset(new_normal);
                    self.apply_rotation(new_normal, attributes.rotation());
                }
            }
        }
    }

    pub fn rotate(&self, _normal: &Vector3, angle: f64, attributes: &mut BrushFaceAttributes) {
        attributes.set_rotation(attributes.rotation() + angle);
    }

    /// Shears texture space: each axis leans towards the other by its factor.
    pub fn shear(&mut self, _normal: &Vector3, factors: &Vector2) {
        let (u_axis, v_axis) = (self.u_axis, self.v_axis);
        self.u_axis = u_axis + v_axis * factors.x;
        self.v_axis = v_axis + u_axis * factors.y;
    }

    #[allow(clippy::too_many_arguments)]
    pub fn transform(
        &mut self,
        _old_plane: &Plane3,
        _new_plane: &Plane3,
        matrix: &Matrix4,
        attributes: &mut BrushFaceAttributes,
        texture_size: &Vector2,
        lock_alignment: bool,
        invariant: &Point3,
    ) {
        let linear = linear_part(matrix);
        if !lock_alignment {
            let carry = |axis: Vector3| {
                let moved = linear * axis;
                if moved.norm() < ALMOST_ZERO {
                    axis
                } else {
                    moved.normalize()
                }
            };
            self.u_axis = carry(self.u_axis);
            self.v_axis = carry(self.v_axis);
            return;
        }

        let Some(inverse) = linear.try_inverse() else {
            trace!("singular transform, texture axes left unchanged");
            return;
        };
        let normal_matrix = inverse.transpose();

        let old_scale = attributes.scale();
        let old_invariant_coords = self.compute_uv_coords(invariant, &old_scale) + attributes.offset();

        // The texture coordinate of p is dot(p, u / sx); dot(M p, L^-T (u / sx))
        // equals it up to a constant, so the scaled axes follow L^-T.
        let scale = old_scale.map(safe_scale);
        let scaled_u = normal_matrix * (self.u_axis / scale.x);
        let scaled_v = normal_matrix * (self.v_axis / scale.y);
        let new_scale = Vector2::new(
            scale.x.signum() / scaled_u.norm(),
            scale.y.signum() / scaled_v.norm(),
        );
        self.u_axis = scaled_u * new_scale.x;
        self.v_axis = scaled_v * new_scale.y;

        let new_invariant = transform_point(matrix, invariant);
        let new_invariant_coords = self.compute_uv_coords(&new_invariant, &new_scale);
        let new_offset = old_invariant_coords - new_invariant_coords;

        attributes.set_scale(new_scale);
        attributes.set_offset(correct_vector2(
            &attributes.mod_offset(&new_offset, texture_size),
            4,
        ));
    }

    /// Angle in degrees of `point` around `center` in texture space.
    #[must_use]
    pub fn measure_angle(&self, _current_angle: f64, center: &Vector2, point: &Vector2) -> f64 {
        texture_direction(center, point).map_or(0.0, |direction| {
            measure_angle(&direction, &Vector3::x(), &Vector3::z()).to_degrees()
        })
    }
}

impl UvAxes for ParallelUvCoordSystem {
    fn u_axis(&self) -> Vector3 {
        self.u_axis
    }

    fn v_axis(&self) -> Vector3 {
        self.v_axis
    }

    fn z_axis(&self) -> Vector3 {
        self.u_axis.cross(&self.v_axis).normalize()
    }
}
