use crate::error::Result;
use crate::math::{Point3, Vector3};
use crate::model::{Brush, BrushFace, BrushFaceAttributes, MapFormat};

/// Creates an axis-aligned box brush from two corner points.
pub struct MakeCuboid {
    min_corner: Point3,
    max_corner: Point3,
    attributes: BrushFaceAttributes,
    map_format: MapFormat,
}

impl MakeCuboid {
    /// Creates a new `MakeCuboid` operation. Every face gets a copy of
    /// `attributes`.
    #[must_use]
    pub fn new(
        min_corner: Point3,
        max_corner: Point3,
        attributes: BrushFaceAttributes,
        map_format: MapFormat,
    ) -> Self {
        Self {
            min_corner,
            max_corner,
            attributes,
            map_format,
        }
    }

    /// Executes the operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the box has no volume.
    ///
    /// # Panics
    ///
    /// Panics if the map format is [`MapFormat::Unknown`].
    pub fn execute(&self) -> Result<Brush> {
        let (min, max) = (self.min_corner, self.max_corner);
        let size = max - min;
        let x = Vector3::x() * size.x;
        let y = Vector3::y() * size.y;
        let z = Vector3::z() * size.z;

        // (corner, a, b) with a x b pointing out of the box
        let sides = [
            (min, z, y),
            (Point3::new(max.x, min.y, min.z), y, z),
            (min, x, z),
            (Point3::new(min.x, max.y, min.z), z, x),
            (min, y, x),
            (Point3::new(min.x, min.y, max.z), x, y),
        ];

        let faces = sides
            .iter()
            .map(|(corner, a, b)| {
                BrushFace::create(
                    corner,
                    &(corner + b),
                    &(corner + a),
                    self.attributes.clone(),
                    self.map_format,
                )
            })
            .collect::<Result<Vec<_>>>()?;
        Brush::create(faces)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BrushError;
    use approx::assert_relative_eq;

    #[test]
    fn cuboid_faces_point_outwards() {
        let brush = MakeCuboid::new(
            Point3::new(-16.0, -16.0, 0.0),
            Point3::new(16.0, 16.0, 64.0),
            BrushFaceAttributes::new("crate"),
            MapFormat::Valve,
        )
        .execute()
        .unwrap();
        assert_eq!(brush.face_count(), 6);
        let center = Point3::new(0.0, 0.0, 32.0);
        for face in brush.faces() {
            assert!(face.boundary().point_distance(&center) < 0.0);
            assert!(face.uv_coord_system().is_parallel());
            assert_eq!(face.attributes().material_name(), "crate");
        }
        let top = brush.find_face(&Vector3::z(), 1e-9).unwrap();
        assert_relative_eq!(brush.face(top).boundary().distance, 64.0);
    }

    #[test]
    fn flat_cuboid_is_invalid() {
        let result = MakeCuboid::new(
            Point3::origin(),
            Point3::new(8.0, 8.0, 0.0),
            BrushFaceAttributes::default(),
            MapFormat::Standard,
        )
        .execute();
        assert!(matches!(result, Err(BrushError::InvalidFace)));
    }
}
