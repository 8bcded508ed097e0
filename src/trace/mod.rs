mod packet;

use bon::bon;
use wide::{CmpGe, CmpLe};

use crate::{
    bvh::Bvh,
    config::{FIRST_HIT_OPACITY_THRESHOLD, P},
    geometry::{GeometryStore, RayState, TriangleIndex},
    intersect::{BoxPacket4, TrianglePacket4, intersect_box, intersect_triangle},
    simd::{mask_any, mask_iter},
};

use packet::Packet;

/// Whether a trace call records the closest opaque hit per ray, or accumulates shadow-like
/// visibility and terminates early on a cutoff.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TraceMode {
    FirstHit,
    Visibility { cutoff: f32 },
}

/// A scalar opacity filter invoked for each candidate intersection: triangle index, ray index
/// within the caller's slice, candidate `t`, `u`, `v`. Replaces the user-data-pointer callback
/// convention with a captured closure, the idiomatic Rust equivalent.
pub type Filter<'a> = dyn FnMut(TriangleIndex, usize, f32, f32, f32) -> f32 + 'a;

pub struct TraceOptions<'a> {
    mode: TraceMode,
    filter: Option<&'a mut Filter<'a>>,
}

#[bon]
impl<'a> TraceOptions<'a> {
    #[builder]
    pub fn new(mode: TraceMode, filter: Option<&'a mut Filter<'a>>) -> TraceOptions<'a> {
        TraceOptions { mode, filter }
    }
}

/// Traces `rays` against `tree`, writing hit/visibility results back into each `RayState`.
///
/// Rays are processed in packets of up to [`P`](crate::config::P) lanes at a time; within a
/// packet the implementation descends the tree with a small explicit stack, partitioning the
/// active lanes at each internal node.
pub fn trace(
    tree: &Bvh,
    geometry: &GeometryStore,
    rays: &mut [RayState],
    mut options: TraceOptions,
) {
    for chunk in rays.chunks_mut(P) {
        trace_packet(tree, geometry, chunk, &mut options);
    }
}

fn trace_packet(
    tree: &Bvh,
    geometry: &GeometryStore,
    rays: &mut [RayState],
    options: &mut TraceOptions,
) {
    let mut packet = Packet::load(rays);

    let mut stack: Vec<(usize, usize)> = Vec::new();
    let mut current: Option<(usize, usize)> = Some((tree.root(), packet.padded_len()));

    while let Some((node_index, active_count)) = current {
        if tree.is_leaf(node_index) {
            for &tri in tree.leaf_triangles(node_index) {
                let triangle = TrianglePacket4::new(geometry.triangle_vertices(tri));
                intersect_leaf_triangle(&mut packet, active_count, tri, &triangle, options);
            }
            current = stack.pop();
            continue;
        }

        let (bmin, bmax) = tree.node_box(node_index);
        let node_box = BoxPacket4::new(bmin, bmax);

        let new_active = partition_by_box(&mut packet, active_count, &node_box);
        if new_active == 0 {
            current = stack.pop();
            continue;
        }

        stack.push((Bvh::right_child(node_index), new_active));
        current = Some((Bvh::left_child(node_index), new_active));
    }

    packet.store(rays);
}

/// Tests the active lanes of `packet` against `node_box`, swapping missed lanes (together with
/// all their lane-parallel scratch arrays) to the tail of the active region, and rounds the new
/// active count up to a multiple of 4 as Section 4.4 specifies.
fn partition_by_box(packet: &mut Packet, active_count: usize, node_box: &BoxPacket4) -> usize {
    debug_assert!(active_count % 4 == 0);

    let mut kept = 0usize;
    let mut group_start = 0usize;

    while group_start < active_count {
        let (t_min, t_max) = intersect_box(
            node_box,
            packet.origin_lanes(group_start),
            packet.inv_direction_lanes(group_start),
        );
        let current_t_max = packet.t_max_lanes(group_start);

        let hit = t_max.cmp_ge(wide::f32x4::ZERO) & t_max.cmp_ge(t_min) & t_min.cmp_le(current_t_max);

        for lane in mask_iter(hit) {
            packet.swap(kept, group_start + lane);
            kept += 1;
        }

        group_start += 4;
    }

    kept.div_ceil(4) * 4
}

fn intersect_leaf_triangle(
    packet: &mut Packet,
    active_count: usize,
    tri: TriangleIndex,
    triangle: &TrianglePacket4,
    options: &mut TraceOptions,
) {
    debug_assert!(active_count % 4 == 0);

    let mut group_start = 0usize;
    while group_start < active_count {
        let origin = packet.origin_lanes(group_start);
        let direction = packet.direction_lanes(group_start);
        let t_max = packet.t_max_lanes(group_start);

        let hit = intersect_triangle(triangle, origin, direction, t_max);
        if !mask_any(hit.mask) {
            group_start += 4;
            continue;
        }

        for lane in mask_iter(hit.mask) {
            let global = group_start + lane;
            if packet.is_padding(global) {
                continue;
            }

            let candidate_t = hit.t.as_array_ref()[lane];
            let u = hit.u.as_array_ref()[lane];
            let v = hit.v.as_array_ref()[lane];

            let ray_index = packet.original_index(global);
            let opacity = match &mut options.filter {
                Some(filter) => filter(tri, ray_index, candidate_t, u, v),
                None => 1.0,
            };

            match options.mode {
                TraceMode::Visibility { cutoff } => {
                    let visibility = packet.visibility(global) * (1.0 - opacity);
                    packet.set_visibility(global, visibility);
                    if visibility <= cutoff {
                        packet.set_t_max(global, 0.0);
                    }
                }
                TraceMode::FirstHit => {
                    if opacity >= FIRST_HIT_OPACITY_THRESHOLD {
                        packet.set_hit(global, tri, candidate_t, u, v);
                    }
                }
            }
        }

        group_start += 4;
    }
}
