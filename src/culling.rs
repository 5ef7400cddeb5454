//! Visibility tests: view-frustum culling and backface culling.
//!
//! Both are filters for the render pipeline. The frustum test may keep an
//! object that is actually hidden (sphere tests are conservative) but never
//! drops one that touches the view volume.

use crate::camera::Camera;
use crate::math::{Matrix4, Plane, Vector2, Vector3, Vector4};
use crate::scene::Mesh;
use crate::shape::Shape;

/// Six inward-facing planes bounding a view volume.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Frustum {
    /// Right, left, bottom, top, far, near.
    pub planes: [Plane; 6],
}

impl Frustum {
    pub fn from_projection_matrix(m: &Matrix4) -> Self {
        let mut frustum = Self::default();
        frustum.set_from_projection_matrix(m);
        frustum
    }

    /// Extracts the planes from a `projection * view` matrix. Each plane is a
    /// sum or difference of the fourth row with one of the others.
    pub fn set_from_projection_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let row = |r: usize| Vector4::new(m.get(r, 0), m.get(r, 1), m.get(r, 2), m.get(r, 3));
        let (x, y, z, w) = (row(0), row(1), row(2), row(3));

        let coefficients = [w - x, w + x, w + y, w - y, w - z, w + z];
        for (plane, c) in self.planes.iter_mut().zip(coefficients) {
            *plane = Plane::from_coefficients(c);
            plane.unitize();
        }
        self
    }

    /// False only when the sphere lies entirely behind some plane.
    pub fn intersects_sphere(&self, center: Vector3, radius: f32) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(center) >= -radius)
    }

    pub fn contains_point(&self, point: Vector3) -> bool {
        self.planes
            .iter()
            .all(|plane| plane.distance_to_point(point) >= 0.0)
    }

    /// Tests `shape` placed by `world`. Uses the bounding sphere when one has
    /// been computed, otherwise checks whether any vertex is inside.
    pub fn intersects_shape(&self, shape: &Shape, world: &Matrix4) -> bool {
        match shape.bounding_sphere() {
            Some(sphere) => {
                let mut sphere = *sphere;
                sphere.apply_matrix4(world);
                self.intersects_sphere(sphere.center, sphere.radius)
            }
            None => (0..shape.vertex_count()).any(|i| self.contains_point(*world * shape.vertex(i))),
        }
    }
}

/// Per-frame culling state derived from the camera.
#[derive(Debug, Clone, Default)]
pub struct CullingContext {
    pub frustum: Frustum,
    /// Camera position in world space.
    pub eye: Vector3,
}

impl CullingContext {
    pub fn new(camera: &Camera) -> Self {
        let mut context = Self::default();
        context.update(camera);
        context
    }

    /// Rebuilds the frustum from the camera's current `projection * view`.
    /// The camera's world matrix must be up to date.
    pub fn update(&mut self, camera: &Camera) {
        self.frustum.set_from_projection_matrix(&camera.view_projection());
        self.eye = camera.world_position();
    }

    /// True when the mesh may be visible.
    pub fn frustum_cull(&self, mesh: &Mesh, world: &Matrix4) -> bool {
        self.frustum.intersects_shape(&mesh.shape, world)
    }
}

/// True when the triangle faces away from `eye`. Vertices are in the same
/// space as `eye`, wound counter-clockwise on the front face.
pub fn backface_cull(v1: Vector3, v2: Vector3, v3: Vector3, eye: Vector3) -> bool {
    let normal = (v2 - v1).cross(v3 - v1);
    normal.dot(eye - v1) <= 0.0
}

/// Twice the signed area of a screen-space triangle.
///
/// Screen space has y pointing down, so a triangle that was counter-clockwise
/// in NDC comes out negative.
pub fn signed_area(a: Vector2, b: Vector2, c: Vector2) -> f32 {
    (b - a).cross(c - a)
}

/// True when a projected triangle is back-facing (or degenerate).
pub fn backface_cull_screen(a: Vector2, b: Vector2, c: Vector2) -> bool {
    signed_area(a, b, c) >= 0.0
}
