pub mod intersect_3d;
pub mod polygon_3d;

/// 2D vector type, used for UV coordinates, offsets and scales.
pub type Vector2 = nalgebra::Vector2<f64>;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Values closer to zero than this are treated as zero.
pub const ALMOST_ZERO: f64 = 1e-5;

/// Two unit normals are colinear when `1 - dot(a, b)` is below this.
pub const COLINEAR_EPSILON: f64 = 1e-5;

/// Maximum distance over which [`correct`] snaps a value.
pub const CORRECT_EPSILON: f64 = 1e-3;

/// Tolerance for classifying a point against a plane.
pub const POINT_STATUS_EPSILON: f64 = 1e-4;

/// A world coordinate axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// A camera-relative direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

/// Snaps `value` to the nearest multiple of `1 / 2^decimals` if it lies
/// within `epsilon` of it; otherwise returns `value` unchanged.
#[must_use]
pub fn correct(value: f64, decimals: i32, epsilon: f64) -> f64 {
    let m = 2.0_f64.powi(decimals);
    let rounded = (value * m).round() / m;
    if (value - rounded).abs() < epsilon {
        rounded
    } else {
        value
    }
}

/// Applies [`correct`] with zero decimals to every component of a point.
#[must_use]
pub fn correct_point(point: &Point3) -> Point3 {
    point.map(|c| correct(c, 0, CORRECT_EPSILON))
}

/// Applies [`correct`] with the given decimals to both components.
#[must_use]
pub fn correct_vector2(vector: &Vector2, decimals: i32) -> Vector2 {
    vector.map(|c| correct(c, decimals, CORRECT_EPSILON))
}

/// Returns the axis of the component with the largest magnitude.
///
/// Ties resolve in the order Z, X, Y, so that a normal halfway between a wall
/// and the floor counts as a floor.
#[must_use]
pub fn find_abs_max_component(v: &Vector3) -> Axis {
    let (x, y, z) = (v.x.abs(), v.y.abs(), v.z.abs());
    if z >= x && z >= y {
        Axis::Z
    } else if x >= y {
        Axis::X
    } else {
        Axis::Y
    }
}

/// Rotates the components of `point` so that `axis` becomes the last one.
///
/// Dropping the last component of the result projects the point onto the
/// plane perpendicular to `axis` while keeping a right-handed orientation.
#[must_use]
pub fn swizzle(point: &Point3, axis: Axis) -> Point3 {
    match axis {
        Axis::X => Point3::new(point.y, point.z, point.x),
        Axis::Y => Point3::new(point.z, point.x, point.y),
        Axis::Z => *point,
    }
}

/// Returns a unit vector perpendicular to `v`.
#[must_use]
pub fn perpendicular(v: &Vector3) -> Vector3 {
    let reference = match find_abs_max_component(v) {
        Axis::Z => Vector3::x(),
        Axis::X | Axis::Y => Vector3::z(),
    };
    v.cross(&reference).normalize()
}

/// Measures the angle (radians, in `[0, 2π)`) by which `vector` is rotated
/// from `axis` about `up`, measured clockwise when looking down `up`.
///
/// Both `vector` and `axis` must be unit vectors perpendicular to `up`.
#[must_use]
pub fn measure_angle(vector: &Vector3, axis: &Vector3, up: &Vector3) -> f64 {
    let cos = vector.dot(axis).clamp(-1.0, 1.0);
    if (cos - 1.0).abs() < ALMOST_ZERO {
        return 0.0;
    }
    if (cos + 1.0).abs() < ALMOST_ZERO {
        return std::f64::consts::PI;
    }
    let perp = vector.cross(axis);
    if perp.dot(up) >= 0.0 {
        cos.acos()
    } else {
        std::f64::consts::TAU - cos.acos()
    }
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * nalgebra::Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction vector by a 4x4 matrix (ignoring translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let v = matrix * nalgebra::Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(v.x, v.y, v.z)
}

/// Returns the upper-left 3x3 block of a transformation matrix.
#[must_use]
pub fn linear_part(matrix: &Matrix4) -> Matrix3 {
    matrix.fixed_view::<3, 3>(0, 0).into_owned()
}

/// Compares two vectors component by component.
#[must_use]
pub fn compare_vectors(lhs: &Vector3, rhs: &Vector3) -> std::cmp::Ordering {
    lhs.iter()
        .zip(rhs.iter())
        .map(|(a, b)| a.total_cmp(b))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(std::cmp::Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn correct_snaps_near_integers_only() {
        assert_eq!(correct(2.0004, 0, CORRECT_EPSILON), 2.0);
        assert_eq!(correct(-0.0002, 0, CORRECT_EPSILON), 0.0);
        assert_eq!(correct(2.25, 0, CORRECT_EPSILON), 2.25);
        assert_eq!(correct(0.1254, 3, CORRECT_EPSILON), 0.125);
    }

    #[test]
    fn abs_max_component_prefers_z_on_ties() {
        assert_eq!(find_abs_max_component(&Vector3::new(1.0, 0.0, 1.0)), Axis::Z);
        assert_eq!(find_abs_max_component(&Vector3::new(-3.0, 1.0, 2.0)), Axis::X);
        assert_eq!(find_abs_max_component(&Vector3::new(0.0, -1.0, 0.5)), Axis::Y);
    }

    #[test]
    fn swizzle_moves_axis_last() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(swizzle(&p, Axis::X), Point3::new(2.0, 3.0, 1.0));
        assert_eq!(swizzle(&p, Axis::Y), Point3::new(3.0, 1.0, 2.0));
        assert_eq!(swizzle(&p, Axis::Z), p);
    }

    #[test]
    fn measure_angle_is_clockwise_about_up() {
        let x = Vector3::x();
        let z = Vector3::z();
        assert_relative_eq!(measure_angle(&x, &x, &z), 0.0);
        assert_relative_eq!(measure_angle(&-x, &x, &z), PI);
        assert_relative_eq!(measure_angle(&-Vector3::y(), &x, &z), FRAC_PI_2, epsilon = 1e-12);
        assert_relative_eq!(measure_angle(&Vector3::y(), &x, &z), 3.0 * FRAC_PI_2, epsilon = 1e-12);
    }

    #[test]
    fn perpendicular_is_orthogonal_unit() {
        for v in [Vector3::x(), Vector3::new(0.3, -0.2, 0.9), Vector3::new(0.0, 5.0, 0.1)] {
            let p = perpendicular(&v);
            assert_relative_eq!(p.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(p.dot(&v), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn vectors_compare_lexicographically() {
        use std::cmp::Ordering;
        let a = Vector3::new(0.0, 1.0, 0.0);
        let b = Vector3::new(0.0, 1.0, 0.5);
        assert_eq!(compare_vectors(&a, &b), Ordering::Less);
        assert_eq!(compare_vectors(&b, &a), Ordering::Greater);
        assert_eq!(compare_vectors(&a, &a), Ordering::Equal);
    }
}
