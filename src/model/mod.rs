//! Brush faces, brushes and the attributes and materials they refer to.

mod attributes;
mod brush;
mod brush_face;
mod map_format;
mod marks;
mod material;
mod tag;

pub use attributes::{BrushFaceAttributes, Color};
pub use brush::Brush;
pub use brush_face::BrushFace;
pub use map_format::MapFormat;
pub use marks::FaceMarks;
pub use material::{EmbeddedDefaults, Material, Texture};
pub use tag::{ConstTagVisitor, TagMask, TagVisitor};
