mod aabb;
mod triangle;

pub use aabb::{BoxPacket4, intersect_box};
pub use triangle::{TrianglePacket4, intersect_triangle};
