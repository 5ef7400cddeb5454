//! Cameras: a transform node plus a projection.
//!
//! # Coordinate System
//!
//! Right-handed, Y up. A camera looks down its local **-Z** axis.
//!
//! # Matrices
//!
//! - `projection_matrix`: eye space to clip space, rebuilt by
//!   [`Camera::update_projection_matrix`] whenever a lens parameter changes.
//! - `matrix_world_inverse`: world space to eye space (the view matrix),
//!   rebuilt by [`Camera::update_matrix_world`].

use tracing::debug;

use crate::math::{Matrix4, Vector3};
use crate::projection::Projection;
use crate::scene::Object3D;

#[derive(Debug, Clone)]
pub struct Camera {
    /// Transform node. The camera is not part of a scene, so its world matrix
    /// equals its local matrix.
    pub object: Object3D,
    projection: Projection,
    projection_matrix: Matrix4,
    projection_matrix_inverse: Matrix4,
    matrix_world_inverse: Matrix4,
}

impl Camera {
    pub fn new(projection: Projection) -> Self {
        let mut camera = Self {
            object: Object3D::named("Camera"),
            projection,
            projection_matrix: Matrix4::IDENTITY,
            projection_matrix_inverse: Matrix4::IDENTITY,
            matrix_world_inverse: Matrix4::IDENTITY,
        };
        camera.update_projection_matrix();
        camera
    }

    /// Perspective camera; `fov` is the vertical field of view in degrees.
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::perspective(fov, aspect, near, far))
    }

    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self::new(Projection::orthographic(left, right, top, bottom, near, far))
    }

    /// Moves the camera and returns it, for construction chains.
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.object.set_position(x, y, z);
        self
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn projection_matrix(&self) -> &Matrix4 {
        &self.projection_matrix
    }

    pub fn projection_matrix_inverse(&self) -> &Matrix4 {
        &self.projection_matrix_inverse
    }

    /// The view matrix.
    pub fn matrix_world_inverse(&self) -> &Matrix4 {
        &self.matrix_world_inverse
    }

    pub fn matrix_world(&self) -> &Matrix4 {
        &self.object.matrix_world
    }

    // =========================================================================
    // Lens
    // =========================================================================

    pub fn set_projection(&mut self, projection: Projection) {
        self.projection = projection;
        self.update_projection_matrix();
    }

    /// Sets the vertical field of view in degrees. No effect on orthographic cameras.
    pub fn set_fov(&mut self, degrees: f32) {
        if let Projection::Perspective { fov, .. } = &mut self.projection {
            *fov = degrees;
            self.update_projection_matrix();
        }
    }

    /// No effect on orthographic cameras.
    pub fn set_aspect(&mut self, value: f32) {
        if let Projection::Perspective { aspect, .. } = &mut self.projection {
            *aspect = value;
            debug!(aspect = value, "camera aspect changed");
            self.update_projection_matrix();
        }
    }

    pub fn set_near_far(&mut self, near_plane: f32, far_plane: f32) {
        match &mut self.projection {
            Projection::Perspective { near, far, .. } | Projection::Orthographic { near, far, .. } => {
                *near = near_plane;
                *far = far_plane;
            }
        }
        self.update_projection_matrix();
    }

    pub fn set_zoom(&mut self, value: f32) {
        match &mut self.projection {
            Projection::Perspective { zoom, .. } | Projection::Orthographic { zoom, .. } => {
                *zoom = value;
            }
        }
        self.update_projection_matrix();
    }

    /// Sets the orthographic box. No effect on perspective cameras.
    pub fn set_bounds(&mut self, l: f32, r: f32, t: f32, b: f32) {
        if let Projection::Orthographic {
            left,
            right,
            top,
            bottom,
            ..
        } = &mut self.projection
        {
            (*left, *right, *top, *bottom) = (l, r, t, b);
            self.update_projection_matrix();
        }
    }

    /// Rebuilds the projection matrix and its inverse from the lens parameters.
    pub fn update_projection_matrix(&mut self) {
        self.projection_matrix = self.projection.matrix();
        self.projection_matrix_inverse = self.projection_matrix.inverse();
    }

    // =========================================================================
    // Transform
    // =========================================================================

    /// Refreshes the world matrix from position, rotation and scale, then the
    /// view matrix as its inverse.
    pub fn update_matrix_world(&mut self) {
        self.object.update_world_from(None);
        self.matrix_world_inverse = self.object.matrix_world.inverse();
    }

    /// Turns the camera so it looks at the world-space point `target`.
    pub fn look_at(&mut self, target: Vector3) {
        self.update_matrix_world();
        let eye = self.object.matrix_world.position();
        self.object.orient_towards(eye, target, None, true);
        self.update_matrix_world();
    }

    pub fn world_position(&self) -> Vector3 {
        self.object.matrix_world.position()
    }

    /// Viewing direction (local -Z) in world space, unit length.
    pub fn world_direction(&self) -> Vector3 {
        let mut direction = Vector3::ZERO;
        direction
            .set_from_matrix_column(&self.object.matrix_world, 2)
            .negate()
            .unitize();
        direction
    }

    /// `projection * view`: world space straight to clip space.
    pub fn view_projection(&self) -> Matrix4 {
        self.projection_matrix * self.matrix_world_inverse
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, point: Vector3) -> Vector3 {
        self.view_projection() * point
    }

    /// Normalized device coordinates back to a world point.
    pub fn unproject(&self, ndc: Vector3) -> Vector3 {
        self.object.matrix_world * (self.projection_matrix_inverse * ndc)
    }
}

impl Vector3 {
    /// Replaces a world point with its normalized device coordinates as seen by `camera`.
    pub fn project(&mut self, camera: &Camera) -> &mut Self {
        *self = camera.project(*self);
        self
    }

    /// Inverse of [`Vector3::project`].
    pub fn unproject(&mut self, camera: &Camera) -> &mut Self {
        *self = camera.unproject(*self);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn front_camera() -> Camera {
        let mut camera = Camera::perspective(70.0, 640.0 / 480.0, 0.1, 100.0).with_position(0.0, 0.0, 5.0);
        camera.look_at(Vector3::ZERO);
        camera
    }

    #[test]
    fn view_matrix_inverts_world() {
        let camera = front_camera();
        assert_relative_eq!(
            *camera.matrix_world() * *camera.matrix_world_inverse(),
            Matrix4::IDENTITY,
            epsilon = 1e-5
        );
        assert_relative_eq!(camera.world_direction(), Vector3::FORWARD, epsilon = 1e-6);
    }

    #[test]
    fn setters_rebuild_projection() {
        let mut camera = Camera::perspective(50.0, 1.0, 0.1, 100.0);
        let before = *camera.projection_matrix();
        camera.set_aspect(2.0);
        assert_ne!(*camera.projection_matrix(), before);
        assert_relative_eq!(
            *camera.projection_matrix(),
            Projection::perspective(50.0, 2.0, 0.1, 100.0).matrix()
        );
    }

    #[test]
    fn target_projects_to_center() {
        let camera = front_camera();
        let ndc = camera.project(Vector3::ZERO);
        assert_relative_eq!(ndc.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(ndc.y, 0.0, epsilon = 1e-6);
        assert!(ndc.z > -1.0 && ndc.z < 1.0);
    }

    #[test]
    fn project_unproject_round_trip() {
        let camera = front_camera();
        let mut p = Vector3::new(0.4, -0.3, 1.0);
        p.project(&camera).unproject(&camera);
        assert_relative_eq!(p, Vector3::new(0.4, -0.3, 1.0), epsilon = 1e-4);
    }

    #[test]
    fn orthographic_ignores_fov() {
        let mut camera = Camera::orthographic(-1.0, 1.0, 1.0, -1.0, 0.1, 10.0);
        let before = *camera.projection_matrix();
        camera.set_fov(10.0);
        assert_eq!(*camera.projection_matrix(), before);
        camera.set_bounds(-2.0, 2.0, 2.0, -2.0);
        assert_relative_eq!(camera.project(Vector3::new(2.0, 0.0, -1.0)).x, 1.0, epsilon = 1e-6);
    }
}
