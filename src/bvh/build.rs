use std::ops::Range;

use nalgebra::Point3;

use crate::geometry::{GeometryStore, TriangleIndex};

use super::{Bvh, InnerNode, Leaf};

impl Bvh {
    /// Builds a balanced implicit binary tree over `geometry`'s triangles using an
    /// object-median split on the longest axis at each internal node.
    pub fn build(geometry: &GeometryStore) -> Bvh {
        let triangle_count = geometry.triangle_count();
        let leaf_count = Bvh::leaf_count_for(triangle_count);
        let first_leaf = leaf_count - 1;

        let mut bvh = Bvh {
            first_leaf,
            nodes: vec![InnerNode::default(); first_leaf],
            leaves: vec![Leaf::default(); leaf_count],
            leaf_triangles: (0..triangle_count as u32).map(TriangleIndex::new).collect(),
        };

        bvh.build_recursive(geometry, 0, 0..triangle_count);
        bvh
    }

    fn build_recursive(&mut self, geometry: &GeometryStore, node_index: usize, range: Range<usize>) {
        if self.is_leaf(node_index) {
            let leaf = &mut self.leaves[node_index - self.first_leaf];
            leaf.offset = range.start as u32;
            leaf.count = range.len() as u32;
            return;
        }

        debug_assert!(range.len() >= 2);

        let (bmin, bmax) = triangle_range_bounds(geometry, &self.leaf_triangles[range.clone()]);
        self.nodes[node_index] = InnerNode { bmin, bmax };

        let axis = longest_axis(bmin, bmax);
        let mid = range.start + range.len() / 2;

        self.leaf_triangles[range.clone()]
            .select_nth_unstable_by(mid - range.start, |a, b| {
                geometry
                    .first_vertex_axis(*a, axis)
                    .total_cmp(&geometry.first_vertex_axis(*b, axis))
            });

        self.build_recursive(geometry, Bvh::left_child(node_index), range.start..mid);
        self.build_recursive(geometry, Bvh::right_child(node_index), mid..range.end);
    }
}

/// Chooses the longest of the box's three axes, breaking ties in x < y < z priority (a later
/// axis wins only if it is strictly longer than the current choice).
fn longest_axis(bmin: Point3<f32>, bmax: Point3<f32>) -> usize {
    let size = bmax - bmin;
    let mut axis = 0;
    for candidate in 1..3 {
        if size[candidate] > size[axis] {
            axis = candidate;
        }
    }
    axis
}

fn triangle_range_bounds(
    geometry: &GeometryStore,
    triangles: &[TriangleIndex],
) -> (Point3<f32>, Point3<f32>) {
    let mut bmin = Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY);
    let mut bmax = Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY);

    for &tri in triangles {
        for vertex in geometry.triangle_vertices(tri) {
            bmin = bmin.inf(&vertex);
            bmax = bmax.sup(&vertex);
        }
    }

    (bmin, bmax)
}
