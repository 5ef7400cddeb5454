//! Triangle geometry: flat vertex buffer plus a triangle index buffer.
//!
//! Vertices are stored as `[x0, y0, z0, x1, y1, z1, ...]`. Every three indices
//! form one triangle, wound counter-clockwise when seen from the front.

use crate::error::{RenderError, Result};
use crate::math::{Matrix4, Sphere, Vector3};

#[derive(Debug, Clone, Default)]
pub struct Shape {
    vertices: Vec<f32>,
    normals: Option<Vec<f32>>,
    uvs: Option<Vec<f32>>,
    indices: Vec<u32>,
    bounding_sphere: Option<Sphere>,
}

impl Shape {
    /// Creates a shape after checking the buffers agree with each other.
    ///
    /// # Errors
    /// [`RenderError::InvalidGeometry`] if the vertex buffer is not made of
    /// whole `xyz` triples, the index count is not a multiple of 3, or an index
    /// points past the last vertex.
    pub fn new(vertices: Vec<f32>, indices: Vec<u32>) -> Result<Self> {
        if vertices.len() % 3 != 0 {
            return Err(RenderError::InvalidGeometry(format!(
                "vertex buffer length {} is not a multiple of 3",
                vertices.len()
            )));
        }
        if indices.len() % 3 != 0 {
            return Err(RenderError::InvalidGeometry(format!(
                "index buffer length {} is not a multiple of 3",
                indices.len()
            )));
        }
        let vertex_count = vertices.len() / 3;
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(RenderError::InvalidGeometry(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        Ok(Self {
            vertices,
            normals: None,
            uvs: None,
            indices,
            bounding_sphere: None,
        })
    }

    /// Attaches per-vertex normals, three floats per vertex.
    pub fn with_normals(mut self, normals: Vec<f32>) -> Result<Self> {
        if normals.len() != self.vertices.len() {
            return Err(RenderError::InvalidGeometry(format!(
                "{} normal floats for {} vertex floats",
                normals.len(),
                self.vertices.len()
            )));
        }
        self.normals = Some(normals);
        Ok(self)
    }

    /// Attaches per-vertex texture coordinates, two floats per vertex.
    pub fn with_uvs(mut self, uvs: Vec<f32>) -> Result<Self> {
        if uvs.len() != self.vertex_count() * 2 {
            return Err(RenderError::InvalidGeometry(format!(
                "{} uv floats for {} vertices",
                uvs.len(),
                self.vertex_count()
            )));
        }
        self.uvs = Some(uvs);
        Ok(self)
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn normals(&self) -> Option<&[f32]> {
        self.normals.as_deref()
    }

    pub fn uvs(&self) -> Option<&[f32]> {
        self.uvs.as_deref()
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Position of vertex `i`.
    ///
    /// # Panics
    /// If `i >= vertex_count()`.
    pub fn vertex(&self, i: usize) -> Vector3 {
        Vector3::from_array(&self.vertices, i * 3)
    }

    /// Vertex positions of every triangle, in index order.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3; 3]> + '_ {
        self.indices.chunks_exact(3).map(move |tri| {
            [
                self.vertex(tri[0] as usize),
                self.vertex(tri[1] as usize),
                self.vertex(tri[2] as usize),
            ]
        })
    }

    pub fn first_triangle(&self) -> Option<[Vector3; 3]> {
        self.triangles().next()
    }

    /// The cached bounding sphere, if one has been computed.
    pub fn bounding_sphere(&self) -> Option<&Sphere> {
        self.bounding_sphere.as_ref()
    }

    /// Computes and caches a sphere around all vertices.
    pub fn compute_bounding_sphere(&mut self) -> Sphere {
        let points: Vec<Vector3> = (0..self.vertex_count()).map(|i| self.vertex(i)).collect();
        let sphere = Sphere::from_points(&points);
        self.bounding_sphere = Some(sphere);
        sphere
    }

    /// Smooth normals: each vertex gets the unitized sum of its faces' normals.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![0.0f32; self.vertices.len()];

        for tri in self.indices.chunks_exact(3) {
            let a = self.vertex(tri[0] as usize);
            let b = self.vertex(tri[1] as usize);
            let c = self.vertex(tri[2] as usize);
            let face = (b - a).cross(c - a);

            for &i in tri {
                let base = i as usize * 3;
                normals[base] += face.x;
                normals[base + 1] += face.y;
                normals[base + 2] += face.z;
            }
        }

        for n in normals.chunks_exact_mut(3) {
            let mut v = Vector3::new(n[0], n[1], n[2]);
            v.unitize();
            n.copy_from_slice(&v.to_array3());
        }

        self.normals = Some(normals);
    }

    /// Bakes `m` into the vertex data. Normals go through the inverse transpose.
    /// A cached bounding sphere is recomputed.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        for p in self.vertices.chunks_exact_mut(3) {
            let mut v = Vector3::new(p[0], p[1], p[2]);
            v.apply_matrix4(m);
            p.copy_from_slice(&v.to_array3());
        }

        if let Some(normals) = self.normals.as_mut() {
            let normal_matrix = m.inverse().transpose();
            for n in normals.chunks_exact_mut(3) {
                let mut v = Vector3::new(n[0], n[1], n[2]);
                v.transform_direction(&normal_matrix);
                n.copy_from_slice(&v.to_array3());
            }
        }

        if self.bounding_sphere.is_some() {
            self.compute_bounding_sphere();
        }
        self
    }

    // ============ Built-in shapes ============

    /// Axis-aligned cube centered at the origin.
    pub fn cube(size: f32) -> Self {
        Self::cuboid(size, size, size)
    }

    /// Axis-aligned box centered at the origin, four vertices per face so each
    /// face keeps its own normal and uv square.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let half = Vector3::new(width / 2.0, height / 2.0, depth / 2.0);

        // (normal, u, v) with u x v == normal so corners run counter-clockwise
        let faces = [
            (Vector3::RIGHT, Vector3::FORWARD, Vector3::UP),
            (Vector3::LEFT, Vector3::BACK, Vector3::UP),
            (Vector3::UP, Vector3::RIGHT, Vector3::FORWARD),
            (Vector3::DOWN, Vector3::RIGHT, Vector3::BACK),
            (Vector3::BACK, Vector3::RIGHT, Vector3::UP),
            (Vector3::FORWARD, Vector3::LEFT, Vector3::UP),
        ];

        let mut vertices = Vec::with_capacity(6 * 4 * 3);
        let mut normals = Vec::with_capacity(6 * 4 * 3);
        let mut uvs = Vec::with_capacity(6 * 4 * 2);
        let mut indices = Vec::with_capacity(6 * 6);

        for (face, (normal, u, v)) in faces.into_iter().enumerate() {
            let center = normal * half;
            let u = u * half;
            let v = v * half;
            let corners = [
                (center - u - v, [0.0, 0.0]),
                (center + u - v, [1.0, 0.0]),
                (center + u + v, [1.0, 1.0]),
                (center - u + v, [0.0, 1.0]),
            ];

            for (corner, uv) in corners {
                vertices.extend_from_slice(&corner.to_array3());
                normals.extend_from_slice(&normal.to_array3());
                uvs.extend_from_slice(&uv);
            }

            let base = face as u32 * 4;
            indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        Self::built_in(vertices, Some(normals), Some(uvs), indices)
    }

    /// Rectangle in the XY plane facing +Z.
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width / 2.0, height / 2.0);
        let vertices = vec![
            -hw, -hh, 0.0, //
            hw, -hh, 0.0, //
            hw, hh, 0.0, //
            -hw, hh, 0.0,
        ];
        let normals = [0.0, 0.0, 1.0].repeat(4);
        let uvs = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        Self::built_in(vertices, Some(normals), Some(uvs), vec![0, 1, 2, 0, 2, 3])
    }

    /// A single triangle `a, b, c`.
    pub fn triangle(a: Vector3, b: Vector3, c: Vector3) -> Self {
        let mut vertices = Vec::with_capacity(9);
        for p in [a, b, c] {
            vertices.extend_from_slice(&p.to_array3());
        }
        Self::built_in(vertices, None, None, vec![0, 1, 2])
    }

    /// Buffers generated here are consistent by construction.
    fn built_in(
        vertices: Vec<f32>,
        normals: Option<Vec<f32>>,
        uvs: Option<Vec<f32>>,
        indices: Vec<u32>,
    ) -> Self {
        let mut shape = Self {
            vertices,
            normals,
            uvs,
            indices,
            bounding_sphere: None,
        };
        shape.compute_bounding_sphere();
        shape
    }
}
