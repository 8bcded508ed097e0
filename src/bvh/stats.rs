//! Diagnostic, non-functional summary of a built tree's leaf occupancy.
//!
//! Ported from the teacher's own `util::Stats` (used by `triangle_bvh::printing` to report
//! leaf/inner node fill); this crate's tree is always balanced by construction so only leaf
//! triangle-count fill is interesting to report, not per-level depth variance.

use std::fmt::Display;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Stats {
    pub count: usize,
    pub min: usize,
    pub max: usize,
    pub avg: f32,
}

impl Stats {
    fn new_single(v: usize) -> Self {
        Stats {
            count: 1,
            min: v,
            max: v,
            avg: v as f32,
        }
    }

    fn add_sample(&mut self, value: usize) {
        if self.count == 0 {
            *self = Stats::new_single(value);
            return;
        }
        self.count += 1;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.avg += (value as f32 - self.avg) / (self.count as f32);
    }
}

impl Display for Stats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} - {}; avg {:.1}; {} leaves",
            self.min, self.max, self.avg, self.count
        )
    }
}

use super::Bvh;

impl Bvh {
    /// Distribution of triangle counts across this tree's leaves: useful to check a build came
    /// out well-packed (fill close to [`K`](crate::config::K)) without walking the tree by hand.
    pub fn leaf_fill_stats(&self) -> Stats {
        let mut stats = Stats::default();
        for leaf_index in self.first_leaf..(self.first_leaf + self.leaf_count()) {
            stats.add_sample(self.leaf_triangles(leaf_index).len());
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert2::assert;
    use crate::geometry::GeometryStore;

    #[test]
    fn leaf_fill_stats_over_empty_tree() {
        let vertices: Vec<f32> = Vec::new();
        let triangles: Vec<u32> = Vec::new();
        let geometry = GeometryStore::new(&vertices, &triangles).unwrap();
        let bvh = Bvh::build(&geometry);

        let stats = bvh.leaf_fill_stats();
        assert!(stats.count == 1);
        assert!(stats.min == 0 && stats.max == 0);
    }

    #[test]
    fn leaf_fill_stats_over_grid() {
        let mut vertices = Vec::new();
        let mut triangles = Vec::new();
        for i in 0..9u32 {
            let x = i as f32 * 2.0;
            let base = vertices.len() as u32 / 3;
            vertices.extend_from_slice(&[x, 0.0, 0.0, x + 1.0, 0.0, 0.0, x, 1.0, 0.0]);
            triangles.extend_from_slice(&[base, base + 1, base + 2]);
        }
        let geometry = GeometryStore::new(&vertices, &triangles).unwrap();
        let bvh = Bvh::build(&geometry);

        let stats = bvh.leaf_fill_stats();
        assert!(stats.count == bvh.leaf_count());
        assert!(stats.max <= crate::config::K);
    }
}
