use nalgebra::{Matrix2, Rotation3, Unit};
use tracing::trace;

use crate::geometry::Plane3;
use crate::math::{
    correct, correct_vector2, linear_part, measure_angle, transform_point, Matrix4, Point3,
    Vector2, Vector3, ALMOST_ZERO,
};
use crate::model::BrushFaceAttributes;

use super::{safe_scale, texture_direction, ParallelUvCoordSystem, UvAxes, WrapStyle};

/// Normal, U axis and V axis of each world-aligned projection.
#[rustfmt::skip]
const BASE_AXES: [[[f64; 3]; 3]; 6] = [
    [[ 0.0,  0.0,  1.0], [1.0, 0.0, 0.0], [0.0, -1.0,  0.0]], // floor
    [[ 0.0,  0.0, -1.0], [1.0, 0.0, 0.0], [0.0, -1.0,  0.0]], // ceiling
    [[ 1.0,  0.0,  0.0], [0.0, 1.0, 0.0], [0.0,  0.0, -1.0]], // west wall
    [[-1.0,  0.0,  0.0], [0.0, 1.0, 0.0], [0.0,  0.0, -1.0]], // east wall
    [[ 0.0,  1.0,  0.0], [1.0, 0.0, 0.0], [0.0,  0.0, -1.0]], // south wall
    [[ 0.0, -1.0,  0.0], [1.0, 0.0, 0.0], [0.0,  0.0, -1.0]], // north wall
];

/// Normals that differ by less than this are treated as unchanged.
const NORMAL_CHANGE_EPSILON: f64 = 0.01;

fn vector(components: [f64; 3]) -> Vector3 {
    Vector3::new(components[0], components[1], components[2])
}

/// Snaps rounding noise such as `cos(90°)` to exact zeros and ones.
fn clean_axis(axis: &Vector3) -> Vector3 {
    axis.map(|c| correct(c, 0, ALMOST_ZERO))
}

/// Texture projection along one of the six world-aligned base planes.
///
/// The axes are the base axes of the chosen plane, rotated by the face's
/// rotation attribute. Only rotation, scale and offset are expressible; there
/// is no shear.
#[derive(Debug, Clone, PartialEq)]
pub struct ParaxialUvCoordSystem {
    index: usize,
    u_axis: Vector3,
    v_axis: Vector3,
}

impl ParaxialUvCoordSystem {
    /// Paraxial system for a face with the given normal and attributes.
    #[must_use]
    pub fn new(normal: &Vector3, attributes: &BrushFaceAttributes) -> Self {
        let mut system = Self {
            index: 0,
            u_axis: Vector3::x(),
            v_axis: -Vector3::y(),
        };
        system.set_rotation(normal, 0.0, attributes.rotation());
        system
    }

    /// Paraxial system for the plane through three face points.
    ///
    /// Degenerate points fall back to the floor projection.
    #[must_use]
    pub fn from_points(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) -> Self {
        let normal = Plane3::from_points(point0, point1, point2)
            .map_or_else(Vector3::z, |plane| plane.normal);
        Self::new(&normal, attributes)
    }

    /// Finds the paraxial system and attributes that reproduce a parallel
    /// mapping at the three points.
    ///
    /// The parallel mapping restricted to the face plane is an affine map of
    /// the base plane coordinates. Its rotation, signed scales and offset carry
    /// over exactly; any shear is lost.
    #[must_use]
    pub fn from_parallel(
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
        u_axis: &Vector3,
        v_axis: &Vector3,
    ) -> (Self, BrushFaceAttributes) {
        let Some(plane) = Plane3::from_points(point0, point1, point2) else {
            return (Self::new(&Vector3::z(), attributes), attributes.clone());
        };

        let parallel = ParallelUvCoordSystem::new(*u_axis, *v_axis);
        let scale = attributes.scale();
        let points = [point0, point1, point2];
        let uvs = points.map(|p| parallel.compute_uv_coords(p, &scale) + attributes.offset());

        let index = Self::plane_normal_index(&plane.normal);
        let (base_u, base_v, _) = Self::axes(index);
        let planar = points.map(|p| Vector2::new(p.coords.dot(&base_u), p.coords.dot(&base_v)));

        let planar_deltas = Matrix2::from_columns(&[planar[1] - planar[0], planar[2] - planar[0]]);
        let uv_deltas = Matrix2::from_columns(&[uvs[1] - uvs[0], uvs[2] - uvs[0]]);

        let fallback = || {
            trace!("parallel mapping has no paraxial equivalent, keeping attributes");
            (Self::new(&plane.normal, attributes), attributes.clone())
        };

        let Some(inverse) = planar_deltas.try_inverse() else {
            return fallback();
        };
        let linear = uv_deltas * inverse;
        let u_row = Vector2::new(linear[(0, 0)], linear[(0, 1)]);
        let v_row = Vector2::new(linear[(1, 0)], linear[(1, 1)]);
        if u_row.norm() < ALMOST_ZERO || v_row.norm() < ALMOST_ZERO {
            return fallback();
        }

        // u_row = (cos, -sin) / sx and v_row = (sin, cos) / sy
        let angle = (-u_row.y).atan2(u_row.x);
        let (sin, cos) = angle.sin_cos();
        let x_scale = 1.0 / u_row.norm();
        let y_denominator = Vector2::new(sin, cos).dot(&v_row);
        let y_scale = if y_denominator.abs() < ALMOST_ZERO {
            1.0 / v_row.norm()
        } else {
            1.0 / y_denominator
        };
        let offset = uvs[0] - linear * planar[0];

        let mut converted = attributes.clone();
        converted.set_rotation(angle.to_degrees());
        converted.set_scale(Vector2::new(x_scale, y_scale));
        converted.set_offset(offset);

        (Self::new(&plane.normal, &converted), converted)
    }

    /// Index of the base plane used for `normal`: the first one whose normal
    /// has the strictly largest positive dot product with it.
    #[must_use]
    pub fn plane_normal_index(normal: &Vector3) -> usize {
        let mut best_index = 0;
        let mut best_dot = 0.0;
        for (index, axes) in BASE_AXES.iter().enumerate() {
            let dot = normal.dot(&vector(axes[0]));
            if dot > best_dot {
                best_dot = dot;
                best_index = index;
            }
        }
        best_index
    }

    /// Base U, V and normal of the base plane at `index`.
    #[must_use]
    pub fn axes(index: usize) -> (Vector3, Vector3, Vector3) {
        let [normal, u_axis, v_axis] = BASE_AXES[index];
        (vector(u_axis), vector(v_axis), vector(normal))
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn rotate_axes(u_axis: &mut Vector3, v_axis: &mut Vector3, angle: f64, index: usize) {
        let (base_u, base_v, _) = Self::axes(index);
        let rotation = Rotation3::from_axis_angle(&Unit::new_normalize(base_v.cross(&base_u)), angle);
        *u_axis = clean_axis(&(rotation * *u_axis));
        *v_axis = clean_axis(&(rotation * *v_axis));
    }

    pub fn reset(&mut self, normal: &Vector3) {
        self.index = Self::plane_normal_index(normal);
        let (u_axis, v_axis, _) = Self::axes(self.index);
        self.u_axis = u_axis;
        self.v_axis = v_axis;
    }

    pub fn reset_to_paraxial(&mut self, normal: &Vector3, angle: f64) {
        self.reset(normal);
        Self::rotate_axes(&mut self.u_axis, &mut self.v_axis, angle.to_radians(), self.index);
    }

    pub fn reset_cache(
        &mut self,
        point0: &Point3,
        point1: &Point3,
        point2: &Point3,
        attributes: &BrushFaceAttributes,
    ) {
        if let Some(plane) = Plane3::from_points(point0, point1, point2) {
            self.set_rotation(&plane.normal, 0.0, attributes.rotation());
        }
    }

    pub fn set_rotation(&mut self, normal: &Vector3, _old_angle: f64, new_angle: f64) {
        self.reset_to_paraxial(normal, new_angle);
    }

    pub fn set_normal(
        &mut self,
        _old_normal: &Vector3,
        new_normal: &Vector3,
        attributes: &BrushFaceAttributes,
        _wrap_style: WrapStyle,
    ) {
        let rotation = attributes.rotation();
        self.set_rotation(new_normal, rotation, rotation);
    }

    pub fn rotate(&self, _normal: &Vector3, angle: f64, attributes: &mut BrushFaceAttributes) {
        attributes.set_rotation(attributes.rotation() + angle);
    }

    pub fn shear(&mut self, _normal: &Vector3, _factors: &Vector2) {}

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
        let new_normal = if (new_plane.normal - old_plane.normal).norm() < NORMAL_CHANGE_EPSILON {
            old_plane.normal
        } else {
            new_plane.normal
        };

        let rotation = attributes.rotation();
        if !lock_alignment {
            self.set_rotation(&new_normal, rotation, rotation);
            return;
        }

        let old_scale = attributes.scale();
        let old_invariant_coords = self.compute_uv_coords(invariant, &old_scale) + attributes.offset();

        let linear = linear_part(matrix);
        let transformed_u = linear * (self.u_axis * safe_scale(old_scale.x));
        let transformed_v = linear * (self.v_axis * safe_scale(old_scale.y));

        let new_index = Self::plane_normal_index(&new_normal);
        let (base_u, base_v, base_normal) = Self::axes(new_index);
        let projected_u = transformed_u - base_normal * transformed_u.dot(&base_normal);
        let projected_v = transformed_v - base_normal * transformed_v.dot(&base_normal);
        if projected_u.norm() < ALMOST_ZERO || projected_v.norm() < ALMOST_ZERO {
            trace!("transformed texture axes collapse on the new base plane");
            self.set_rotation(&new_normal, rotation, rotation);
            return;
        }

        let rotation_axis = base_v.cross(&base_u);
        let direction = projected_u.normalize();
        let angle = base_u
            .cross(&direction)
            .dot(&rotation_axis)
            .atan2(base_u.dot(&direction));

        let (mut new_u, mut new_v) = (base_u, base_v);
        Self::rotate_axes(&mut new_u, &mut new_v, angle, new_index);

        let keep_nonzero = |value: f64, old: f64| if value.abs() < ALMOST_ZERO { old } else { value };
        let new_scale = Vector2::new(
            keep_nonzero(projected_u.dot(&new_u), old_scale.x),
            keep_nonzero(projected_v.dot(&new_v), old_scale.y),
        );

        self.index = new_index;
        self.u_axis = new_u;
        self.v_axis = new_v;

        let new_invariant = transform_point(matrix, invariant);
        let new_invariant_coords = self.compute_uv_coords(&new_invariant, &new_scale);
        let new_offset = old_invariant_coords - new_invariant_coords;

        attributes.set_rotation(angle.to_degrees());
        attributes.set_scale(new_scale);
        attributes.set_offset(correct_vector2(
            &attributes.mod_offset(&new_offset, texture_size),
            4,
        ));
    }

    /// Angle in degrees of `point` around `center`, measured in the texture's
    /// unrotated frame.
    #[must_use]
    pub fn measure_angle(&self, current_angle: f64, center: &Vector2, point: &Vector2) -> f64 {
        let Some(direction) = texture_direction(center, point) else {
            return 0.0;
        };
        let unrotate = Rotation3::from_axis_angle(&Vector3::z_axis(), -current_angle.to_radians());
        measure_angle(&(unrotate * direction), &Vector3::x(), &Vector3::z()).to_degrees()
    }
}

impl UvAxes for ParaxialUvCoordSystem {
    fn u_axis(&self) -> Vector3 {
        self.u_axis
    }

    fn v_axis(&self) -> Vector3 {
        self.v_axis
    }

    fn z_axis(&self) -> Vector3 {
        vector(BASE_AXES[self.index][0])
    }
}
