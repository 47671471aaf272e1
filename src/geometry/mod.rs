mod line;
mod plane;
mod ray;

pub use line::Line3;
pub use plane::Plane3;
pub use ray::Ray3;
