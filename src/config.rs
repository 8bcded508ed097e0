//! Compile-time tuning constants shared by the BVH builder and the tracer.

/// Maximum number of triangles stored in a single BVH leaf.
pub const K: usize = 4;

/// Number of rays processed together in one traversal packet.
///
/// Must be a multiple of the SIMD lane width (4).
pub const P: usize = 64;

/// Alpha level (0-255) above which a pixel is considered opaque and usable
/// as a seed for the seam-bleed distance transform.
pub const BLEED_ALPHA_THRESHOLD: u8 = 128;

/// Minimum opacity a candidate hit must have to be accepted in first-hit mode.
pub const FIRST_HIT_OPACITY_THRESHOLD: f32 = 0.5;

const _: () = assert!(P % 4 == 0, "P must be a multiple of the lane width");
