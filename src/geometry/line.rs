use crate::math::{Point3, Vector3};

/// An infinite line through `point` along a unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    pub point: Point3,
    pub direction: Vector3,
}

impl Line3 {
    /// Creates a line; `direction` is normalized.
    #[must_use]
    pub fn new(point: Point3, direction: Vector3) -> Self {
        Self {
            point,
            direction: direction.normalize(),
        }
    }

    /// Orthogonally projects `point` onto the line.
    #[must_use]
    pub fn project_point(&self, point: &Point3) -> Point3 {
        self.point + self.direction * (point - self.point).dot(&self.direction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn project_point_drops_perpendicular_component() {
        let line = Line3::new(Point3::new(0.0, 0.0, 4.0), Vector3::new(0.0, 2.0, 0.0));
        let projected = line.project_point(&Point3::new(3.0, 7.0, -1.0));
        assert_relative_eq!(projected, Point3::new(0.0, 7.0, 4.0));
    }
}
