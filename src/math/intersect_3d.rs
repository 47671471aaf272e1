use crate::geometry::{Line3, Plane3, Ray3};

use super::{Point3, Vector3, ALMOST_ZERO, POINT_STATUS_EPSILON};

/// Relationship between two planes.
#[derive(Debug)]
pub enum PlanePairRelation {
    /// Planes intersect along a line.
    IntersectionLine { origin: Point3, direction: Vector3 },
    /// Planes are parallel but not coincident.
    Parallel { distance: f64 },
    /// Planes are the same (coincident), possibly facing opposite ways.
    Coincident,
}

impl PlanePairRelation {
    /// The intersection line, if the planes cross.
    #[must_use]
    pub fn seam(&self) -> Option<Line3> {
        match self {
            Self::IntersectionLine { origin, direction } => Some(Line3::new(*origin, *direction)),
            Self::Parallel { .. } | Self::Coincident => None,
        }
    }
}

/// Computes the intersection of two planes.
///
/// Returns an [`IntersectionLine`](PlanePairRelation::IntersectionLine) with a
/// unit-length `direction` when the planes cross, [`Parallel`](PlanePairRelation::Parallel)
/// when they don't, or [`Coincident`](PlanePairRelation::Coincident) when they overlap.
#[must_use]
pub fn plane_plane_intersect(a: &Plane3, b: &Plane3) -> PlanePairRelation {
    let na = a.normal;
    let nb = b.normal;

    let dir = na.cross(&nb);
    let dir_len = dir.norm();

    if dir_len < ALMOST_ZERO {
        // Normals are (anti-)parallel; measure the gap along `na`.
        let dist = (b.anchor() - a.anchor()).dot(&na).abs();
        if dist < ALMOST_ZERO {
            PlanePairRelation::Coincident
        } else {
            PlanePairRelation::Parallel { distance: dist }
        }
    } else {
        let dir = dir / dir_len;

        // p = s * na + t * nb with na·p = da and nb·p = db.
        let dot_nn = na.dot(&nb);
        let denom = 1.0 - dot_nn * dot_nn;
        let s = (a.distance - dot_nn * b.distance) / denom;
        let t = (b.distance - dot_nn * a.distance) / denom;
        let origin = Point3::from(na * s + nb * t);

        PlanePairRelation::IntersectionLine { origin, direction: dir }
    }
}

/// Intersects three planes at a single point.
///
/// Returns `None` if any two of the planes are parallel or the three share a line.
#[must_use]
pub fn plane_triple_intersect(p1: &Plane3, p2: &Plane3, p3: &Plane3) -> Option<Point3> {
    let n1 = p1.normal;
    let n2 = p2.normal;
    let n3 = p3.normal;

    let det = n1.dot(&n2.cross(&n3));
    if det.abs() < ALMOST_ZERO {
        return None;
    }

    let point = (n2.cross(&n3) * p1.distance
        + n3.cross(&n1) * p2.distance
        + n1.cross(&n2) * p3.distance)
        / det;
    Some(Point3::from(point))
}

/// Distance along `ray` to `plane`, or `None` if the ray is parallel to the
/// plane or points away from it.
#[must_use]
pub fn ray_plane_intersect(ray: &Ray3, plane: &Plane3) -> Option<f64> {
    let denom = plane.normal.dot(&ray.direction);
    if denom.abs() < ALMOST_ZERO {
        return None;
    }
    let t = (plane.distance - plane.normal.dot(&ray.origin.coords)) / denom;
    (t >= 0.0).then_some(t)
}

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPlaneClassification {
    /// Point is on the positive side (in the direction of the normal).
    Front,
    /// Point is on the negative side (opposite the normal).
    Back,
    /// Point lies on the plane (within tolerance).
    On,
}

/// Classifies a point relative to a plane.
#[must_use]
pub fn classify_point_plane(point: &Point3, plane: &Plane3) -> PointPlaneClassification {
    let dist = plane.point_distance(point);

    if dist > POINT_STATUS_EPSILON {
        PointPlaneClassification::Front
    } else if dist < -POINT_STATUS_EPSILON {
        PointPlaneClassification::Back
    } else {
        PointPlaneClassification::On
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn v(x: f64, y: f64, z: f64) -> Vector3 {
        Vector3::new(x, y, z)
    }

    fn plane(origin: Point3, normal: Vector3) -> Plane3 {
        Plane3::from_anchor(&origin, normal)
    }

    // ── plane_plane_intersect ──

    #[test]
    fn perpendicular_planes_intersect() {
        // XY-plane and XZ-plane should intersect along the X-axis
        let xy = plane(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        let xz = plane(p(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0));

        match plane_plane_intersect(&xy, &xz) {
            PlanePairRelation::IntersectionLine { direction, .. } => {
                assert!(
                    direction.x.abs() > 0.99,
                    "expected X-axis direction, got {direction:?}"
                );
            }
            other => panic!("expected IntersectionLine, got {other:?}"),
        }
    }

    #[test]
    fn parallel_planes() {
        let a = plane(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        let b = plane(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0));

        match plane_plane_intersect(&a, &b) {
            PlanePairRelation::Parallel { distance } => {
                assert!((distance - 5.0).abs() < ALMOST_ZERO);
            }
            other => panic!("expected Parallel, got {other:?}"),
        }
        assert!(plane_plane_intersect(&a, &b).seam().is_none());
    }

    #[test]
    fn coincident_planes() {
        let a = plane(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        let b = plane(p(1.0, 2.0, 0.0), v(0.0, 0.0, -1.0));

        assert!(matches!(
            plane_plane_intersect(&a, &b),
            PlanePairRelation::Coincident
        ));
    }

    #[test]
    fn intersection_point_lies_on_both_planes() {
        let a = plane(p(0.0, 0.0, 64.0), v(0.0, 0.0, 1.0));
        let b = plane(p(64.0, 0.0, 0.0), v(1.0, 0.0, 1.0));

        let seam = plane_plane_intersect(&a, &b).seam().unwrap();
        assert!(a.point_distance(&seam.point).abs() < 1e-9);
        assert!(b.point_distance(&seam.point).abs() < 1e-9);
        assert!(seam.direction.y.abs() > 0.99);
    }

    // ── plane_triple_intersect ──

    #[test]
    fn three_axis_planes_meet_at_corner() {
        let x = Plane3::new(v(1.0, 0.0, 0.0), 1.0);
        let y = Plane3::new(v(0.0, 1.0, 0.0), 2.0);
        let z = Plane3::new(v(0.0, 0.0, -1.0), 3.0);
        let corner = plane_triple_intersect(&x, &y, &z).unwrap();
        assert!((corner - p(1.0, 2.0, -3.0)).norm() < 1e-12);
    }

    #[test]
    fn triple_with_parallel_pair_has_no_point() {
        let a = Plane3::new(v(1.0, 0.0, 0.0), 1.0);
        let b = Plane3::new(v(-1.0, 0.0, 0.0), 1.0);
        let c = Plane3::new(v(0.0, 0.0, 1.0), 1.0);
        assert!(plane_triple_intersect(&a, &b, &c).is_none());
    }

    // ── ray_plane_intersect ──

    #[test]
    fn ray_hits_plane_in_front() {
        let target = plane(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0));
        let ray = Ray3::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        let t = ray_plane_intersect(&ray, &target).unwrap();
        assert!((t - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ray_misses_plane_behind_or_parallel() {
        let target = plane(p(0.0, 0.0, 5.0), v(0.0, 0.0, 1.0));
        let away = Ray3::new(p(0.0, 0.0, 0.0), v(0.0, 0.0, -1.0));
        let along = Ray3::new(p(0.0, 0.0, 0.0), v(1.0, 0.0, 0.0));
        assert!(ray_plane_intersect(&away, &target).is_none());
        assert!(ray_plane_intersect(&along, &target).is_none());
    }

    // ── classify_point_plane ──

    #[test]
    fn classify_front_back_on() {
        let target = plane(p(0.0, 0.0, 0.0), v(0.0, 0.0, 1.0));
        assert_eq!(
            classify_point_plane(&p(0.0, 0.0, 1.0), &target),
            PointPlaneClassification::Front
        );
        assert_eq!(
            classify_point_plane(&p(0.0, 0.0, -1.0), &target),
            PointPlaneClassification::Back
        );
        assert_eq!(
            classify_point_plane(&p(5.0, 3.0, 0.0), &target),
            PointPlaneClassification::On
        );
    }
}
