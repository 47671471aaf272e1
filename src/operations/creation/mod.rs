mod make_cuboid;

pub use make_cuboid::MakeCuboid;
