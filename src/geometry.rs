//! Caller-owned scene data: vertex/triangle arrays and per-ray query state.

use nalgebra::{Point3, Vector3};
use thiserror::Error;

index_vec::define_index_type! {
    /// Identifies a triangle within a [`GeometryStore`]. Never confused with a vertex index
    /// or a lane count, unlike a bare `u32`.
    pub struct TriangleIndex = u32;
}

/// Borrowed view over a caller-supplied mesh: a flat vertex array (tightly packed (x,y,z)
/// triples) and a flat triangle-index array (tightly packed vertex-index triples), validated
/// to be a whole number of triples at construction time. Per-index bounds are left to debug
/// assertions and ordinary slice-index panics at lookup time.
#[derive(Clone, Copy)]
pub struct GeometryStore<'a> {
    vertices: &'a [f32],
    triangles: &'a [u32],
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("vertex array length {0} is not a multiple of 3 floats per vertex")]
    InvalidVertexCount(usize),

    #[error("triangle array length {0} is not a multiple of 3 indices per triangle")]
    InvalidTriangleCount(usize),
}

impl<'a> GeometryStore<'a> {
    /// Builds a view from flat vertex/triangle buffers, the one fallible boundary crossing
    /// in this crate: lengths that are not whole multiples of 3 are rejected here rather than
    /// debug-asserted, since the caller cannot have produced them through this crate's own
    /// machinery.
    pub fn new(
        vertices: &'a [f32],
        triangles: &'a [u32],
    ) -> Result<GeometryStore<'a>, GeometryError> {
        if vertices.len() % 3 != 0 {
            return Err(GeometryError::InvalidVertexCount(vertices.len()));
        }
        if triangles.len() % 3 != 0 {
            return Err(GeometryError::InvalidTriangleCount(triangles.len()));
        }

        Ok(GeometryStore {
            vertices,
            triangles,
        })
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }

    pub fn vertex(&self, index: u32) -> Point3<f32> {
        let base = index as usize * 3;
        Point3::new(
            self.vertices[base],
            self.vertices[base + 1],
            self.vertices[base + 2],
        )
    }

    pub fn triangle_vertex_indices(&self, tri: TriangleIndex) -> [u32; 3] {
        let base = tri.index() * 3;
        [
            self.triangles[base],
            self.triangles[base + 1],
            self.triangles[base + 2],
        ]
    }

    pub fn triangle_vertices(&self, tri: TriangleIndex) -> [Point3<f32>; 3] {
        let [a, b, c] = self.triangle_vertex_indices(tri);
        [self.vertex(a), self.vertex(b), self.vertex(c)]
    }

    /// Coordinate of a triangle's first vertex on the given axis (0=x, 1=y, 2=z): the
    /// median-split sort key used by the BVH builder (Section 4.1 of the key is the first
    /// vertex, not the centroid).
    pub fn first_vertex_axis(&self, tri: TriangleIndex, axis: usize) -> f32 {
        let [a, _, _] = self.triangle_vertex_indices(tri);
        self.vertex(a)[axis]
    }
}

/// Mutable per-ray query state: caller-owned input and output fields, threaded through a
/// [`trace`](crate::trace::trace) call. `t_max` is simultaneously the caller's initial search
/// bound and a running output that the tracer tightens as closer first-hit candidates appear.
#[derive(Clone, Copy, Debug)]
pub struct RayState {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
    pub t_max: f32,

    pub hit: Option<TriangleIndex>,
    pub u: f32,
    pub v: f32,
    pub visibility: f32,
}

impl RayState {
    /// Creates a fresh ray ready to be traced: no hit yet, full visibility, the given search
    /// bound.
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>, t_max: f32) -> RayState {
        RayState {
            origin,
            direction,
            t_max,
            hit: None,
            u: 0.0,
            v: 0.0,
            visibility: 1.0,
        }
    }
}
