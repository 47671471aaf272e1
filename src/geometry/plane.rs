use crate::math::{
    find_abs_max_component, linear_part, transform_point, Axis, Matrix4, Point3, Vector3,
    ALMOST_ZERO,
};

/// An infinite plane in 3D space.
///
/// A point `p` lies on the plane when `normal · p == distance`. The normal is
/// always unit length.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane3 {
    /// Unit normal.
    pub normal: Vector3,
    /// Signed distance of the plane from the origin along `normal`.
    pub distance: f64,
}

impl Plane3 {
    /// Creates a plane from a normal and a distance. The normal is normalized.
    #[must_use]
    pub fn new(normal: Vector3, distance: f64) -> Self {
        Self {
            normal: normal.normalize(),
            distance,
        }
    }

    /// Creates a plane through `anchor` with the given normal.
    #[must_use]
    pub fn from_anchor(anchor: &Point3, normal: Vector3) -> Self {
        let normal = normal.normalize();
        Self {
            normal,
            distance: normal.dot(&anchor.coords),
        }
    }

    /// Derives the plane through three points.
    ///
    /// The normal is `(p2 - p0) × (p1 - p0)`, so the points wind clockwise when
    /// viewed from the front. Returns `None` if the points are collinear or
    /// coincident.
    #[must_use]
    pub fn from_points(p0: &Point3, p1: &Point3, p2: &Point3) -> Option<Self> {
        let normal = (p2 - p0).cross(&(p1 - p0));
        let len = normal.norm();
        if len < ALMOST_ZERO || !len.is_finite() {
            return None;
        }
        let normal = normal / len;
        Some(Self {
            normal,
            distance: normal.dot(&p0.coords),
        })
    }

    /// The point on the plane closest to the origin.
    #[must_use]
    pub fn anchor(&self) -> Point3 {
        Point3::from(self.normal * self.distance)
    }

    /// Signed distance of `point` from the plane; positive in front.
    #[must_use]
    pub fn point_distance(&self, point: &Point3) -> f64 {
        self.normal.dot(&point.coords) - self.distance
    }

    /// Returns the plane facing the opposite way.
    #[must_use]
    pub fn flip(&self) -> Self {
        Self {
            normal: -self.normal,
            distance: -self.distance,
        }
    }

    /// Transforms the plane by an affine matrix.
    ///
    /// The normal is carried by the inverse transpose of the linear part so
    /// that it stays perpendicular under non-uniform scaling.
    #[must_use]
    pub fn transform(&self, matrix: &Matrix4) -> Self {
        let linear = linear_part(matrix);
        let normal_matrix = linear
            .try_inverse()
            .map_or(linear, |inverse| inverse.transpose());
        let normal = (normal_matrix * self.normal).normalize();
        let anchor = transform_point(matrix, &self.anchor());
        Self::from_anchor(&anchor, normal)
    }

    /// Orthogonally projects `point` onto the plane.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        point - self.normal * self.point_distance(point)
    }

    /// Removes the component of `vector` along the normal.
    #[must_use]
    pub fn project_vector(&self, vector: &Vector3) -> Vector3 {
        vector - self.normal * vector.dot(&self.normal)
    }

    /// Two unit vectors spanning the plane, chosen from the dominant axis of
    /// the normal so that the result is stable for a given normal.
    #[must_use]
    pub fn basis(&self) -> (Vector3, Vector3) {
        let n = self.normal;
        let x_axis = match find_abs_max_component(&n) {
            Axis::X => n.cross(&Vector3::z()),
            Axis::Y => Vector3::z().cross(&n),
            Axis::Z => n.cross(&Vector3::y()),
        }
        .normalize();
        let y_axis = n.cross(&x_axis).normalize();
        (x_axis, y_axis)
    }

    /// A matrix that maps world space into a coordinate system in which this
    /// plane is `z = 0` and points are projected along `direction`.
    ///
    /// Returns `None` if `direction` is parallel to the plane.
    #[must_use]
    pub fn projection_matrix(&self, direction: &Vector3) -> Option<Matrix4> {
        if direction.dot(&self.normal).abs() < ALMOST_ZERO {
            return None;
        }
        let (x_axis, y_axis) = self.basis();
        let origin = self.anchor();
        #[rustfmt::skip]
        let plane_to_world = Matrix4::new(
            x_axis.x, y_axis.x, direction.x, origin.x,
            x_axis.y, y_axis.y, direction.y, origin.y,
            x_axis.z, y_axis.z, direction.z, origin.z,
            0.0,      0.0,      0.0,         1.0,
        );
        plane_to_world.try_inverse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn from_points_uses_clockwise_winding() {
        let plane = Plane3::from_points(&p(0.0, 0.0, 4.0), &p(0.0, 1.0, 4.0), &p(1.0, 0.0, 4.0))
            .unwrap();
        assert_relative_eq!(plane.normal, Vector3::z());
        assert_relative_eq!(plane.distance, 4.0);
    }

    #[test]
    fn from_points_rejects_collinear() {
        assert!(Plane3::from_points(&p(0.0, 0.0, 0.0), &p(1.0, 1.0, 1.0), &p(2.0, 2.0, 2.0))
            .is_none());
        assert!(Plane3::from_points(&p(1.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), &p(0.0, 1.0, 0.0))
            .is_none());
    }

    #[test]
    fn flip_reverses_orientation() {
        let plane = Plane3::new(Vector3::x(), 3.0);
        let flipped = plane.flip();
        assert_relative_eq!(flipped.normal, -Vector3::x());
        assert_relative_eq!(flipped.point_distance(&p(5.0, 0.0, 0.0)), -2.0);
    }

    #[test]
    fn transform_translates_and_rotates() {
        let plane = Plane3::new(Vector3::z(), 2.0);
        let rotation =
            nalgebra::Rotation3::from_axis_angle(&Vector3::x_axis(), std::f64::consts::FRAC_PI_2);
        let matrix = Matrix4::new_translation(&Vector3::new(0.0, 0.0, 3.0)) * rotation.to_homogeneous();
        let moved = plane.transform(&matrix);
        // z = 2 rotates to y = -2, translation along z leaves it untouched
        assert_relative_eq!(moved.normal, -Vector3::y(), epsilon = 1e-12);
        assert_relative_eq!(moved.distance, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn transform_keeps_normal_perpendicular_under_scaling() {
        let plane = Plane3::from_points(&p(0.0, 0.0, 0.0), &p(0.0, 0.0, 1.0), &p(1.0, 1.0, 0.0))
            .unwrap();
        let matrix = Matrix4::new_nonuniform_scaling(&Vector3::new(2.0, 1.0, 1.0));
        let moved = plane.transform(&matrix);
        let direction = Vector3::new(2.0, 1.0, 0.0);
        assert_relative_eq!(moved.normal.dot(&direction), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn projection_matrix_flattens_plane_to_z_zero() {
        let plane = Plane3::new(Vector3::new(1.0, 1.0, 0.0), 2.0);
        let to_plane = plane.projection_matrix(&plane.normal).unwrap();
        let on_plane = plane.project_point(&p(7.0, -3.0, 5.0));
        let local = transform_point(&to_plane, &on_plane);
        assert_relative_eq!(local.z, 0.0, epsilon = 1e-12);
    }
}
