mod bvh;
pub mod config;
mod geometry;
mod intersect;
mod seam_bleed;
mod simd;
mod trace;

pub use bvh::{Bvh, Stats};
pub use geometry::{GeometryError, GeometryStore, RayState, TriangleIndex};
pub use seam_bleed::bleed;
pub use trace::{TraceMode, TraceOptions, trace};
