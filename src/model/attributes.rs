use crate::math::Vector2;

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Creates a color from its components.
    #[must_use]
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Editable texturing and surface attributes of a brush face.
///
/// Offsets are in texels, scales in world units per texel and the rotation
/// in degrees. The setters return whether the stored value changed.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushFaceAttributes {
    material_name: String,
    offset: Vector2,
    scale: Vector2,
    rotation: f64,
    surface_contents: Option<i32>,
    surface_flags: Option<i32>,
    surface_value: Option<f32>,
    color: Option<Color>,
}

impl BrushFaceAttributes {
    /// Attributes for `material_name` with zero offset and rotation and unit scale.
    #[must_use]
    pub fn new(material_name: impl Into<String>) -> Self {
        Self {
            material_name: material_name.into(),
            offset: Vector2::zeros(),
            scale: Vector2::new(1.0, 1.0),
            rotation: 0.0,
            surface_contents: None,
            surface_flags: None,
            surface_value: None,
            color: None,
        }
    }

    #[must_use]
    pub fn material_name(&self) -> &str {
        &self.material_name
    }

    #[must_use]
    pub fn offset(&self) -> Vector2 {
        self.offset
    }

    #[must_use]
    pub fn x_offset(&self) -> f64 {
        self.offset.x
    }

    #[must_use]
    pub fn y_offset(&self) -> f64 {
        self.offset.y
    }

    /// Reduces `offset` modulo `texture_size`, which leaves the rendered
    /// texture unchanged.
    #[must_use]
    pub fn mod_offset(&self, offset: &Vector2, texture_size: &Vector2) -> Vector2 {
        offset.zip_map(texture_size, |o, size| {
            if size.abs() < f64::EPSILON {
                o
            } else {
                o - (o / size).floor() * size
            }
        })
    }

    #[must_use]
    pub fn scale(&self) -> Vector2 {
        self.scale
    }

    #[must_use]
    pub fn x_scale(&self) -> f64 {
        self.scale.x
    }

    #[must_use]
    pub fn y_scale(&self) -> f64 {
        self.scale.y
    }

    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    #[must_use]
    pub fn surface_contents(&self) -> Option<i32> {
        self.surface_contents
    }

    #[must_use]
    pub fn surface_flags(&self) -> Option<i32> {
        self.surface_flags
    }

    #[must_use]
    pub fn surface_value(&self) -> Option<f32> {
        self.surface_value
    }

    #[must_use]
    pub fn color(&self) -> Option<Color> {
        self.color
    }

    pub fn set_material_name(&mut self, material_name: &str) -> bool {
        replace(&mut self.material_name, material_name.to_owned())
    }

    pub fn set_offset(&mut self, offset: Vector2) -> bool {
        replace(&mut self.offset, offset)
    }

    pub fn set_x_offset(&mut self, x_offset: f64) -> bool {
        replace(&mut self.offset.x, x_offset)
    }

    pub fn set_y_offset(&mut self, y_offset: f64) -> bool {
        replace(&mut self.offset.y, y_offset)
    }

    pub fn set_scale(&mut self, scale: Vector2) -> bool {
        replace(&mut self.scale, scale)
    }

    pub fn set_x_scale(&mut self, x_scale: f64) -> bool {
        replace(&mut self.scale.x, x_scale)
    }

    pub fn set_y_scale(&mut self, y_scale: f64) -> bool {
        replace(&mut self.scale.y, y_scale)
    }

    pub fn set_rotation(&mut self, rotation: f64) -> bool {
        replace(&mut self.rotation, rotation)
    }

    pub fn set_surface_contents(&mut self, surface_contents: Option<i32>) -> bool {
        replace(&mut self.surface_contents, surface_contents)
    }

    pub fn set_surface_flags(&mut self, surface_flags: Option<i32>) -> bool {
        replace(&mut self.surface_flags, surface_flags)
    }

    pub fn set_surface_value(&mut self, surface_value: Option<f32>) -> bool {
        replace(&mut self.surface_value, surface_value)
    }

    pub fn set_color(&mut self, color: Option<Color>) -> bool {
        replace(&mut self.color, color)
    }
}

impl Default for BrushFaceAttributes {
    fn default() -> Self {
        Self::new("")
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_identity_mapping() {
        let attrs = BrushFaceAttributes::new("rock");
        assert_eq!(attrs.material_name(), "rock");
        assert_eq!(attrs.offset(), Vector2::zeros());
        assert_eq!(attrs.scale(), Vector2::new(1.0, 1.0));
        assert_eq!(attrs.rotation(), 0.0);
        assert!(attrs.surface_contents().is_none());
    }

    #[test]
    fn setters_report_changes() {
        let mut attrs = BrushFaceAttributes::default();
        assert!(attrs.set_x_offset(4.0));
        assert!(!attrs.set_x_offset(4.0));
        assert!(attrs.set_surface_flags(Some(8)));
        assert!(!attrs.set_surface_flags(Some(8)));
        assert!(attrs.set_surface_flags(None));
        assert!(!attrs.set_material_name(""));
    }

    #[test]
    fn mod_offset_wraps_into_texture() {
        let attrs = BrushFaceAttributes::default();
        let wrapped = attrs.mod_offset(&Vector2::new(70.0, -10.0), &Vector2::new(64.0, 32.0));
        assert_eq!(wrapped, Vector2::new(6.0, 22.0));
    }
}
