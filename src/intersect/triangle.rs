use nalgebra::Point3;
use wide::f32x4;

use crate::simd::{Lane, Vec3x4, mask_iter};

/// One triangle, broadcast to all four lanes, ready to be tested against a 4-ray packet.
///
/// Adapted from the triangle-parallel Möller-Trumbore intersector: here the SIMD axis is the
/// ray packet rather than the triangle, so the triangle's own edge vectors are splatted instead
/// of the ray.
#[derive(Copy, Clone, Debug)]
pub struct TrianglePacket4 {
    a: Vec3x4,
    e0: Vec3x4,
    e1: Vec3x4,
}

impl TrianglePacket4 {
    pub fn new(vertices: [Point3<f32>; 3]) -> TrianglePacket4 {
        let a = Vec3x4::splat(vertices[0].x, vertices[0].y, vertices[0].z);
        let b = Vec3x4::splat(vertices[1].x, vertices[1].y, vertices[1].z);
        let c = Vec3x4::splat(vertices[2].x, vertices[2].y, vertices[2].z);
        TrianglePacket4 {
            a,
            e0: b - a,
            e1: c - a,
        }
    }
}

/// Result of intersecting one triangle against a 4-ray packet: a hit mask plus `t`, `u`, `v`
/// per lane. Lanes outside the mask hold meaningless values.
#[derive(Copy, Clone, Debug)]
pub struct TriangleHit4 {
    pub mask: Lane,
    pub t: Lane,
    pub u: Lane,
    pub v: Lane,
}

/// Watertight 4-wide Möller-Trumbore intersection: one triangle against 4 rays.
///
/// No explicit determinant-is-zero test is performed; dividing by a zero determinant yields
/// infinities that fail the `u <= 1` / `t <= t_max` bounds naturally, exactly as the scalar
/// formula this is adapted from relies on.
pub fn intersect_triangle(
    triangle: &TrianglePacket4,
    origin: Vec3x4,
    direction: Vec3x4,
    t_max: Lane,
) -> TriangleHit4 {
    use wide::{CmpGe, CmpLe};

    let ray_cross_e1 = direction.cross(&triangle.e1);
    let det = triangle.e0.dot(&ray_cross_e1);

    let inv_det = f32x4::ONE / det; // may be infinite
    let s = origin - triangle.a;
    let u = inv_det * s.dot(&ray_cross_e1);

    let s_cross_e0 = s.cross(&triangle.e0);
    let v = inv_det * direction.dot(&s_cross_e0);
    let t = inv_det * triangle.e1.dot(&s_cross_e0);

    let mask = u.cmp_ge(f32x4::ZERO)
        & u.cmp_le(f32x4::ONE)
        & v.cmp_ge(f32x4::ZERO)
        & (u + v).cmp_le(f32x4::ONE)
        & t.cmp_ge(f32x4::ZERO)
        & t.cmp_le(t_max);

    TriangleHit4 { mask, t, u, v }
}

/// Iterates over the lane indices (0..4) where `hit.mask` is set.
pub fn hit_lanes(hit: &TriangleHit4) -> impl Iterator<Item = usize> {
    mask_iter(hit.mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;

    fn packet_of(origin: Point3<f32>, direction: nalgebra::Vector3<f32>) -> (Vec3x4, Vec3x4) {
        (
            Vec3x4::splat(origin.x, origin.y, origin.z),
            Vec3x4::splat(direction.x, direction.y, direction.z),
        )
    }

    #[test]
    fn axial_ray_hits_triangle() {
        let triangle = TrianglePacket4::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let (origin, direction) =
            packet_of(Point3::new(0.25, 0.25, 1.0), nalgebra::Vector3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&triangle, origin, direction, f32x4::splat(10.0));

        let lanes: Vec<usize> = hit_lanes(&hit).collect();
        assert!(lanes == vec![0, 1, 2, 3]);
        for i in lanes {
            assert!((hit.t.as_array_ref()[i] - 1.0).abs() < 1e-5);
            assert!((hit.u.as_array_ref()[i] - 0.25).abs() < 1e-5);
            assert!((hit.v.as_array_ref()[i] - 0.25).abs() < 1e-5);
        }
    }

    #[test]
    fn ray_outside_triangle_misses() {
        let triangle = TrianglePacket4::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let (origin, direction) =
            packet_of(Point3::new(2.0, 2.0, 1.0), nalgebra::Vector3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&triangle, origin, direction, f32x4::splat(10.0));

        assert!(hit_lanes(&hit).next().is_none());
    }

    #[test]
    fn t_max_prunes_far_hits() {
        let triangle = TrianglePacket4::new([
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ]);
        let (origin, direction) =
            packet_of(Point3::new(0.25, 0.25, 1.0), nalgebra::Vector3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&triangle, origin, direction, f32x4::splat(0.5));

        assert!(hit_lanes(&hit).next().is_none());
    }
}
