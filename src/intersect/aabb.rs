use nalgebra::Point3;
use wide::f32x4;

use crate::simd::{Lane, Vec3x4, blend_nan, fast_max, fast_min};

/// An axis-aligned box, broadcast to all four lanes, ready to be tested against a 4-ray packet.
#[derive(Copy, Clone, Debug)]
pub struct BoxPacket4 {
    min: Vec3x4,
    max: Vec3x4,
}

impl BoxPacket4 {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> BoxPacket4 {
        BoxPacket4 {
            min: Vec3x4::splat(min.x, min.y, min.z),
            max: Vec3x4::splat(max.x, max.y, max.z),
        }
    }
}

/// Slab test: the ray's origin and the componentwise inverse of its direction, 4 rays wide,
/// against one box. Returns `(t_min, t_max)` per lane; the lane is a hit iff
/// `t_max >= 0 && t_max >= t_min`.
///
/// Zero-length direction components (`inv_direction` holding an infinity) combined with an
/// origin that already lies in the corresponding slab plane produce a `0 * inf = NaN` product;
/// those lanes are blended to the permissive extreme (`-inf` near, `+inf` far) before the
/// min/max reduction, matching the watertight slab test this is adapted from.
pub fn intersect_box(b: &BoxPacket4, origin: Vec3x4, inv_direction: Vec3x4) -> (Lane, Lane) {
    let to_min = (b.min - origin).component_mul(inv_direction);
    let to_max = (b.max - origin).component_mul(inv_direction);

    let to_min = Vec3x4::new(
        blend_nan(to_min.x, f32x4::splat(f32::NEG_INFINITY)),
        blend_nan(to_min.y, f32x4::splat(f32::NEG_INFINITY)),
        blend_nan(to_min.z, f32x4::splat(f32::NEG_INFINITY)),
    );
    let to_max = Vec3x4::new(
        blend_nan(to_max.x, f32x4::splat(f32::INFINITY)),
        blend_nan(to_max.y, f32x4::splat(f32::INFINITY)),
        blend_nan(to_max.z, f32x4::splat(f32::INFINITY)),
    );

    let near = Vec3x4::new(
        fast_min(to_min.x, to_max.x),
        fast_min(to_min.y, to_max.y),
        fast_min(to_min.z, to_max.z),
    );
    let far = Vec3x4::new(
        fast_max(to_min.x, to_max.x),
        fast_max(to_min.y, to_max.y),
        fast_max(to_min.z, to_max.z),
    );

    let t_min = fast_max(near.x, fast_max(near.y, near.z));
    let t_max = fast_min(far.x, fast_min(far.y, far.z));

    (t_min, t_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use test_case::test_case;

    fn inv_dir(x: f32, y: f32, z: f32) -> Vec3x4 {
        let inv = |c: f32| if c == 0.0 { f32::INFINITY } else { 1.0 / c };
        Vec3x4::splat(inv(x), inv(y), inv(z))
    }

    #[test]
    fn ray_through_box_center_hits() {
        let b = BoxPacket4::new(Point3::new(5.0, 5.0, 5.0), Point3::new(10.0, 10.0, 10.0));
        let origin = Vec3x4::splat(7.5, 7.5, 0.0);
        let (t_min, t_max) = intersect_box(&b, origin, inv_dir(0.0, 0.0, 1.0));

        for i in 0..4 {
            assert!((t_min.as_array_ref()[i] - 5.0).abs() < 1e-4);
            assert!((t_max.as_array_ref()[i] - 10.0).abs() < 1e-4);
        }
    }

    #[test_case(0.0, 7.0, 7.0, 0.0, 1.0, 0.0 ; "low_x_parallel_miss")]
    #[test_case(12.0, 7.0, 7.0, 0.0, 1.0, 0.0 ; "high_x_parallel_miss")]
    #[test_case(7.0, 0.0, 7.0, 1.0, 0.0, 0.0 ; "low_y_parallel_miss")]
    fn parallel_ray_outside_slab_misses(
        px: f32,
        py: f32,
        pz: f32,
        dx: f32,
        dy: f32,
        dz: f32,
    ) {
        let b = BoxPacket4::new(Point3::new(5.0, 5.0, 5.0), Point3::new(10.0, 10.0, 10.0));
        let origin = Vec3x4::splat(px, py, pz);
        let (t_min, t_max) = intersect_box(&b, origin, inv_dir(dx, dy, dz));

        for i in 0..4 {
            assert!(t_max.as_array_ref()[i] < t_min.as_array_ref()[i]);
        }
    }

    #[test]
    fn ray_grazing_edge_hits() {
        let b = BoxPacket4::new(Point3::new(5.0, 5.0, 5.0), Point3::new(10.0, 10.0, 10.0));
        let origin = Vec3x4::splat(5.0, 5.0, 0.0);
        let (t_min, t_max) = intersect_box(&b, origin, inv_dir(0.0, 0.0, 1.0));

        for i in 0..4 {
            assert!((t_min.as_array_ref()[i] - 5.0).abs() < 1e-4);
            assert!((t_max.as_array_ref()[i] - 10.0).abs() < 1e-4);
        }
    }
}
