use crate::math::Vector2;

/// Surface defaults embedded in a texture by some legacy formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EmbeddedDefaults {
    #[default]
    None,
    /// Contents, flags and value stored in a Quake 2 `.wal` header.
    Quake2 { contents: i32, flags: i32, value: i32 },
}

/// Texel data description of a material.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub width: u32,
    pub height: u32,
    pub embedded_defaults: EmbeddedDefaults,
}

impl Texture {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            embedded_defaults: EmbeddedDefaults::None,
        }
    }

    #[must_use]
    pub fn with_embedded_defaults(mut self, embedded_defaults: EmbeddedDefaults) -> Self {
        self.embedded_defaults = embedded_defaults;
        self
    }

    /// Texture size in texels.
    #[must_use]
    pub fn size(&self) -> Vector2 {
        Vector2::new(f64::from(self.width), f64::from(self.height))
    }
}

/// A named material, shared between faces through `Arc<Material>`.
///
/// Materials are owned by a registry outside this crate and are never
/// mutated by it.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub texture: Option<Texture>,
}

impl Material {
    #[must_use]
    pub fn new(name: impl Into<String>, texture: Option<Texture>) -> Self {
        Self {
            name: name.into(),
            texture,
        }
    }
}
