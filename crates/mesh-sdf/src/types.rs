//! Core mesh data types.

use nalgebra::{Point3, Vector3};

use crate::error::{SdfError, SdfResult};

/// A mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    /// 3D position.
    pub position: Point3<f64>,
}

impl Vertex {
    /// Create a new vertex at `position`.
    #[inline]
    pub fn new(position: Point3<f64>) -> Self {
        Self { position }
    }

    /// Create a vertex from raw coordinates.
    #[inline]
    pub fn from_coords(x: f64, y: f64, z: f64) -> Self {
        Self::new(Point3::new(x, y, z))
    }
}

/// A triangle mesh with indexed vertices and faces.
///
/// Distance magnitudes are valid for any triangle soup. Inside/outside
/// classification additionally assumes the mesh is closed; this is not
/// checked.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    /// Vertex indices, counter-clockwise seen from outside.
    pub faces: Vec<[u32; 3]>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty mesh with room for the given counts.
    pub fn with_capacity(vertex_count: usize, face_count: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertex_count),
            faces: Vec::with_capacity(face_count),
        }
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// True when there is nothing to rasterize.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Axis-aligned `(min, max)` over all vertices, `None` without vertices.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?.position;

        Some(self.vertices[1..].iter().fold((first, first), |(min, max), v| {
            (min.inf(&v.position), max.sup(&v.position))
        }))
    }

    /// Resolved triangles in face order.
    ///
    /// Panics on out-of-range indices; call [`Mesh::validate`] first for
    /// untrusted input.
    pub fn triangles(&self) -> impl Iterator<Item = Triangle> + '_ {
        self.faces.iter().map(|&face| self.resolve(face))
    }

    /// Triangle for one face, `None` if the face or an index is out of range.
    pub fn triangle(&self, face_idx: usize) -> Option<Triangle> {
        let face = *self.faces.get(face_idx)?;
        let [a, b, c] = face.map(|i| self.vertices.get(i as usize).map(|v| v.position));
        Some(Triangle::new(a?, b?, c?))
    }

    fn resolve(&self, [i0, i1, i2]: [u32; 3]) -> Triangle {
        Triangle {
            v0: self.vertices[i0 as usize].position,
            v1: self.vertices[i1 as usize].position,
            v2: self.vertices[i2 as usize].position,
        }
    }

    /// Check the mesh is usable as distance field input.
    ///
    /// Rejects empty meshes, out-of-range face indices and non-finite
    /// coordinates. Manifoldness and orientation are not checked.
    pub fn validate(&self) -> SdfResult<()> {
        if self.vertices.is_empty() {
            return Err(SdfError::empty_mesh("mesh has no vertices"));
        }
        if self.faces.is_empty() {
            return Err(SdfError::empty_mesh("mesh has no faces"));
        }

        for (vertex_idx, vertex) in self.vertices.iter().enumerate() {
            let p = &vertex.position;
            for (name, value) in [("x", p.x), ("y", p.y), ("z", p.z)] {
                if !value.is_finite() {
                    return Err(SdfError::invalid_coordinate(vertex_idx, name, value));
                }
            }
        }

        let vertex_count = self.vertices.len();
        for (face_idx, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&i| i as usize >= vertex_count) {
                return Err(SdfError::invalid_vertex_index(face_idx, bad, vertex_count));
            }
        }

        Ok(())
    }

    /// Move every vertex by `offset`.
    pub fn translate(&mut self, offset: Vector3<f64>) {
        for vertex in &mut self.vertices {
            vertex.position += offset;
        }
    }

    /// Enclosed volume by the divergence theorem.
    ///
    /// Positive for a closed mesh with outward-facing winding, negative when
    /// inside-out. Not meaningful for open meshes.
    pub fn signed_volume(&self) -> f64 {
        self.triangles()
            .map(|t| t.v0.coords.dot(&t.v1.coords.cross(&t.v2.coords)))
            .sum::<f64>()
            / 6.0
    }

    /// Sum of triangle areas.
    pub fn surface_area(&self) -> f64 {
        self.triangles().map(|tri| tri.area()).sum()
    }
}

/// Three resolved corner positions of a face.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub v0: Point3<f64>,
    pub v1: Point3<f64>,
    pub v2: Point3<f64>,
}

impl Triangle {
    #[inline]
    pub fn new(v0: Point3<f64>, v1: Point3<f64>, v2: Point3<f64>) -> Self {
        Self { v0, v1, v2 }
    }

    /// `(v1 - v0) x (v2 - v0)`; its length is twice the area.
    #[inline]
    pub fn normal_unnormalized(&self) -> Vector3<f64> {
        (self.v1 - self.v0).cross(&(self.v2 - self.v0))
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.normal_unnormalized().norm() * 0.5
    }

    /// Axis-aligned bounds as (min, max).
    #[inline]
    pub fn bounds(&self) -> (Point3<f64>, Point3<f64>) {
        (
            self.v0.inf(&self.v1).inf(&self.v2),
            self.v0.sup(&self.v1).sup(&self.v2),
        )
    }

    /// Longest edge length.
    pub fn max_edge(&self) -> f64 {
        let [a, b, c] = [self.v0, self.v1, self.v2];
        (b - a).norm().max((c - b).norm()).max((a - c).norm())
    }

    /// Zero or near-zero area relative to the longest edge.
    ///
    /// Such triangles are measured as their edges by the distance query.
    pub fn is_degenerate(&self, epsilon: f64) -> bool {
        let max_edge = self.max_edge();
        max_edge <= f64::EPSILON
            || self.normal_unnormalized().norm() <= epsilon * max_edge * max_edge
    }
}
