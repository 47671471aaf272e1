//! A brush geometry kernel for level editors.
//!
//! Brushes are convex solids bounded by [`model::BrushFace`]s. Each face is a
//! plane through three points plus the texturing that maps world points onto
//! it, either paraxially or with explicit texture axes (see [`uv`]).

pub mod error;
pub mod geometry;
pub mod math;
pub mod model;
pub mod operations;
pub mod topology;
pub mod uv;

pub use error::{BrushError, Result};
