use crate::geometry::{Plane3, Ray3};

use super::intersect_3d::ray_plane_intersect;
use super::{find_abs_max_component, swizzle, Axis, Point3, Vector3};

/// Point-in-polygon test for a 3D point coplanar with the polygon.
///
/// Projects onto the coordinate plane that is most perpendicular to `normal`
/// and uses the winding number algorithm. Returns `true` if the point is inside
/// or on the boundary.
#[must_use]
pub fn point_in_polygon_3d(point: &Point3, polygon: &[Point3], normal: &Vector3) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let axis = find_abs_max_component(normal);
    let project = |p: &Point3| {
        let s = swizzle(p, axis);
        (s.x, s.y)
    };

    let (px, py) = project(point);
    let uvs: Vec<(f64, f64)> = polygon.iter().map(project).collect();

    winding_number_2d(px, py, &uvs) != 0 || on_boundary_2d(px, py, &uvs)
}

/// Winding number of point `(px, py)` with respect to polygon `verts`.
///
/// Non-zero => inside, zero => outside.
fn winding_number_2d(px: f64, py: f64, verts: &[(f64, f64)]) -> i32 {
    let n = verts.len();
    let mut winding = 0i32;
    for i in 0..n {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % n];

        if y0 <= py {
            if y1 > py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) > 0.0 {
                winding += 1;
            }
        } else if y1 <= py && cross_2d(x1 - x0, y1 - y0, px - x0, py - y0) < 0.0 {
            winding -= 1;
        }
    }
    winding
}

/// Whether `(px, py)` lies on one of the polygon's edges.
fn on_boundary_2d(px: f64, py: f64, verts: &[(f64, f64)]) -> bool {
    const EPS: f64 = 1e-9;
    let n = verts.len();
    (0..n).any(|i| {
        let (x0, y0) = verts[i];
        let (x1, y1) = verts[(i + 1) % n];
        let cross = cross_2d(x1 - x0, y1 - y0, px - x0, py - y0);
        let len_sq = (x1 - x0).powi(2) + (y1 - y0).powi(2);
        if cross.abs() > EPS * len_sq.sqrt().max(1.0) {
            return false;
        }
        let dot = (px - x0) * (x1 - x0) + (py - y0) * (y1 - y0);
        dot >= -EPS && dot <= len_sq + EPS
    })
}

/// 2D cross product: `(ax * by - ay * bx)`.
#[inline]
fn cross_2d(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    ax * by - ay * bx
}

/// Area of a planar polygon as the sum of its fan triangles around the first
/// vertex.
#[must_use]
pub fn fan_area(points: &[Point3]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    let origin = &points[0];
    let doubled: f64 = points[1..]
        .windows(2)
        .map(|pair| (pair[0] - origin).cross(&(pair[1] - origin)).norm())
        .sum();
    doubled / 2.0
}

/// Unsigned shoelace area of a polygon projected onto the coordinate plane
/// perpendicular to `axis`.
#[must_use]
pub fn projected_area(points: &[Point3], axis: Axis) -> f64 {
    let n = points.len();
    let (mut c1, mut c2) = (0.0, 0.0);
    for i in 0..n {
        let origin = swizzle(&points[i], axis);
        let destination = swizzle(&points[(i + 1) % n], axis);
        c1 += origin.x * destination.y;
        c2 += origin.y * destination.x;
    }
    ((c1 - c2) / 2.0).abs()
}

/// Arithmetic mean of a set of points. Returns the origin for an empty set.
#[must_use]
pub fn average(points: &[Point3]) -> Point3 {
    if points.is_empty() {
        return Point3::origin();
    }
    let sum = points
        .iter()
        .fold(Vector3::zeros(), |acc, p| acc + p.coords);
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    Point3::from(sum * inv_n)
}

/// Distance along `ray` to the polygon lying in `plane`, if the ray hits it.
#[must_use]
pub fn ray_polygon_intersect(ray: &Ray3, plane: &Plane3, polygon: &[Point3]) -> Option<f64> {
    let t = ray_plane_intersect(ray, plane)?;
    let hit = ray.point_at(t);
    point_in_polygon_3d(&hit, polygon, &plane.normal).then_some(t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    // ── point_in_polygon_3d ──

    #[test]
    fn point_inside_square() {
        assert!(point_in_polygon_3d(&p(0.5, 0.5, 0.0), &unit_square(), &Vector3::z()));
    }

    #[test]
    fn point_outside_square() {
        assert!(!point_in_polygon_3d(&p(2.0, 0.5, 0.0), &unit_square(), &Vector3::z()));
    }

    #[test]
    fn point_on_edge_counts_as_inside() {
        assert!(point_in_polygon_3d(&p(1.0, 0.5, 0.0), &unit_square(), &Vector3::z()));
    }

    #[test]
    fn point_inside_wall_triangle() {
        let tri = vec![p(3.0, 0.0, 0.0), p(3.0, 4.0, 0.0), p(3.0, 2.0, 3.0)];
        assert!(point_in_polygon_3d(&p(3.0, 2.0, 1.0), &tri, &Vector3::x()));
        assert!(!point_in_polygon_3d(&p(3.0, 5.0, 5.0), &tri, &Vector3::x()));
    }

    // ── areas ──

    #[test]
    fn unit_square_fan_area() {
        assert_relative_eq!(fan_area(&unit_square()), 1.0);
    }

    #[test]
    fn tilted_rectangle_fan_area() {
        // 2 x sqrt(2) rectangle on the plane y = z
        let rect = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ];
        assert_relative_eq!(fan_area(&rect), 2.0 * 2.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn projected_area_drops_axis() {
        let rect = vec![
            p(0.0, 0.0, 0.0),
            p(2.0, 0.0, 0.0),
            p(2.0, 1.0, 1.0),
            p(0.0, 1.0, 1.0),
        ];
        assert_relative_eq!(projected_area(&rect, Axis::Z), 2.0, epsilon = 1e-12);
        assert_relative_eq!(projected_area(&rect, Axis::Y), 2.0, epsilon = 1e-12);
        assert_relative_eq!(projected_area(&rect, Axis::X), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn average_of_square_is_center() {
        assert_relative_eq!(average(&unit_square()), p(0.5, 0.5, 0.0));
    }

    // ── ray_polygon_intersect ──

    #[test]
    fn ray_hits_square_from_above() {
        let plane = Plane3::new(Vector3::z(), 0.0);
        let ray = Ray3::new(p(0.25, 0.75, 3.0), -Vector3::z());
        let t = ray_polygon_intersect(&ray, &plane, &unit_square()).unwrap();
        assert_relative_eq!(t, 3.0);
    }

    #[test]
    fn ray_beside_square_misses() {
        let plane = Plane3::new(Vector3::z(), 0.0);
        let ray = Ray3::new(p(1.5, 0.5, 3.0), -Vector3::z());
        assert!(ray_polygon_intersect(&ray, &plane, &unit_square()).is_none());
    }
}
