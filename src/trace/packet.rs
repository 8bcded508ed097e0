use arrayvec::ArrayVec;
use wide::f32x4;

use crate::{
    config::P,
    geometry::{RayState, TriangleIndex},
    simd::Vec3x4,
};

/// Sentinel original-ray index used by padding lanes; no hit is ever written back for a lane
/// carrying this value.
const PADDING: usize = usize::MAX;

/// Stack-resident, lane-aligned scratch for one packet of up to [`P`] rays.
///
/// All per-ray arrays are kept in lockstep: [`Packet::swap`] exchanges lane `a` and `b` across
/// every array at once, preserving the invariant that lane `i` always refers to one consistent
/// original ray as the packet is partitioned during traversal.
pub struct Packet {
    origin: ArrayVec<[f32; 3], P>,
    direction: ArrayVec<[f32; 3], P>,
    inv_direction: ArrayVec<[f32; 3], P>,
    t_max: ArrayVec<f32, P>,
    hit: ArrayVec<Option<TriangleIndex>, P>,
    u: ArrayVec<f32, P>,
    v: ArrayVec<f32, P>,
    visibility: ArrayVec<f32, P>,
    original_index: ArrayVec<usize, P>,
}

impl Packet {
    /// Loads up to `P` rays into lane-aligned scratch, padding the tail up to a multiple of 4
    /// by duplicating the last real ray with a sentinel back-pointer.
    pub fn load(rays: &[RayState]) -> Packet {
        debug_assert!(!rays.is_empty());
        debug_assert!(rays.len() <= P);

        let mut packet = Packet {
            origin: ArrayVec::new(),
            direction: ArrayVec::new(),
            inv_direction: ArrayVec::new(),
            t_max: ArrayVec::new(),
            hit: ArrayVec::new(),
            u: ArrayVec::new(),
            v: ArrayVec::new(),
            visibility: ArrayVec::new(),
            original_index: ArrayVec::new(),
        };

        for (index, ray) in rays.iter().enumerate() {
            packet.push(ray, index);
        }

        let padded_len = rays.len().div_ceil(4) * 4;
        let last = rays.last().expect("checked non-empty above");
        while packet.origin.len() < padded_len {
            packet.push(last, PADDING);
        }

        packet
    }

    fn push(&mut self, ray: &RayState, original_index: usize) {
        self.origin.push(ray.origin.coords.into());
        self.direction.push(ray.direction.into());
        self.inv_direction.push(inverse(ray.direction.into()));
        self.t_max.push(ray.t_max);
        self.hit.push(ray.hit);
        self.u.push(ray.u);
        self.v.push(ray.v);
        self.visibility.push(ray.visibility);
        self.original_index.push(original_index);
    }

    pub fn padded_len(&self) -> usize {
        self.origin.len()
    }

    pub fn swap(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        self.origin.swap(a, b);
        self.direction.swap(a, b);
        self.inv_direction.swap(a, b);
        self.t_max.swap(a, b);
        self.hit.swap(a, b);
        self.u.swap(a, b);
        self.v.swap(a, b);
        self.visibility.swap(a, b);
        self.original_index.swap(a, b);
    }

    pub fn is_padding(&self, lane: usize) -> bool {
        self.original_index[lane] == PADDING
    }

    pub fn original_index(&self, lane: usize) -> usize {
        self.original_index[lane]
    }

    pub fn visibility(&self, lane: usize) -> f32 {
        self.visibility[lane]
    }

    pub fn set_visibility(&mut self, lane: usize, value: f32) {
        self.visibility[lane] = value;
    }

    pub fn set_t_max(&mut self, lane: usize, value: f32) {
        self.t_max[lane] = value;
    }

    pub fn set_hit(&mut self, lane: usize, tri: TriangleIndex, t: f32, u: f32, v: f32) {
        self.hit[lane] = Some(tri);
        self.t_max[lane] = t;
        self.u[lane] = u;
        self.v[lane] = v;
        self.visibility[lane] = 0.0;
    }

    /// The four lanes starting at `group_start` as a SIMD vector of ray origins.
    pub fn origin_lanes(&self, group_start: usize) -> Vec3x4 {
        lanes_from(&self.origin, group_start)
    }

    pub fn direction_lanes(&self, group_start: usize) -> Vec3x4 {
        lanes_from(&self.direction, group_start)
    }

    pub fn inv_direction_lanes(&self, group_start: usize) -> Vec3x4 {
        lanes_from(&self.inv_direction, group_start)
    }

    pub fn t_max_lanes(&self, group_start: usize) -> f32x4 {
        f32x4::new([
            self.t_max[group_start],
            self.t_max[group_start + 1],
            self.t_max[group_start + 2],
            self.t_max[group_start + 3],
        ])
    }

    /// Commits this packet's output scratch (hit, u, v, visibility, t_max) back into the
    /// caller's ray records. Padding lanes are never written back, since they don't correspond
    /// to any real ray in `rays`.
    pub fn store(&self, rays: &mut [RayState]) {
        for lane in 0..self.padded_len() {
            let original = self.original_index[lane];
            if original == PADDING {
                continue;
            }
            let ray = &mut rays[original];
            ray.hit = self.hit[lane];
            ray.u = self.u[lane];
            ray.v = self.v[lane];
            ray.visibility = self.visibility[lane];
            ray.t_max = self.t_max[lane];
        }
    }
}

fn lanes_from(values: &ArrayVec<[f32; 3], P>, group_start: usize) -> Vec3x4 {
    Vec3x4::new(
        f32x4::new([
            values[group_start][0],
            values[group_start + 1][0],
            values[group_start + 2][0],
            values[group_start + 3][0],
        ]),
        f32x4::new([
            values[group_start][1],
            values[group_start + 1][1],
            values[group_start + 2][1],
            values[group_start + 3][1],
        ]),
        f32x4::new([
            values[group_start][2],
            values[group_start + 1][2],
            values[group_start + 2][2],
            values[group_start + 3][2],
        ]),
    )
}

fn inverse(direction: [f32; 3]) -> [f32; 3] {
    direction.map(|c| if c == 0.0 { f32::INFINITY } else { 1.0 / c })
}
