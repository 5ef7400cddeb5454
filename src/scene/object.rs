//! Transformable scene node.
//!
//! # Coordinate System
//!
//! Right-handed, Y up. An object's local frame faces +Z; cameras look down -Z.
//!
//! # Rotation
//!
//! Rotation is held twice, as an [`Euler`] and as a [`Quaternion`]. The two are
//! private and only change through setters that keep them describing the same
//! orientation.

use std::sync::atomic::{AtomicU32, Ordering};

use crate::math::{Euler, Matrix4, Quaternion, Vector3};

use super::mesh::Mesh;
use super::NodeId;

static NEXT_OBJECT_ID: AtomicU32 = AtomicU32::new(1);

/// A node in the scene hierarchy.
///
/// Parent and child links are managed by [`Scene`](super::Scene); an object on
/// its own is a detached node. A clone is a new object with its own
/// [`id`](Object3D::id).
#[derive(Debug)]
pub struct Object3D {
    id: u32,
    pub name: String,

    pub position: Vector3,
    rotation: Euler,
    quaternion: Quaternion,
    pub scale: Vector3,
    /// Up direction used by look-at.
    pub up: Vector3,

    /// Local transform, composed from position, quaternion and scale.
    pub matrix: Matrix4,
    /// Local-to-world transform, valid after a world-matrix update.
    pub matrix_world: Matrix4,
    /// Recompose `matrix` during world-matrix updates.
    pub matrix_auto_update: bool,
    /// Invisible nodes are skipped together with their descendants.
    pub visible: bool,

    pub mesh: Option<Mesh>,

    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Clone for Object3D {
    fn clone(&self) -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: self.name.clone(),
            position: self.position,
            rotation: self.rotation,
            quaternion: self.quaternion,
            scale: self.scale,
            up: self.up,
            matrix: self.matrix,
            matrix_world: self.matrix_world,
            matrix_auto_update: self.matrix_auto_update,
            visible: self.visible,
            mesh: self.mesh.clone(),
            parent: self.parent,
            children: self.children.clone(),
        }
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Object3D {
    /// Default up direction for newly created objects.
    pub const DEFAULT_UP: Vector3 = Vector3::UP;

    /// Creates a detached node with an identity transform.
    pub fn new() -> Self {
        Self {
            id: NEXT_OBJECT_ID.fetch_add(1, Ordering::Relaxed),
            name: String::new(),
            position: Vector3::ZERO,
            rotation: Euler::default(),
            quaternion: Quaternion::IDENTITY,
            scale: Vector3::ONE,
            up: Self::DEFAULT_UP,
            matrix: Matrix4::IDENTITY,
            matrix_world: Matrix4::IDENTITY,
            matrix_auto_update: true,
            visible: true,
            mesh: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self::new().with_name(name)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position.set(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: Euler) -> Self {
        self.set_rotation(rotation);
        self
    }

    pub fn with_scale(mut self, x: f32, y: f32, z: f32) -> Self {
        self.scale.set(x, y, z);
        self
    }

    /// Process-wide unique numeric id.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    // =========================================================================
    // Local Transform
    // =========================================================================

    pub fn rotation(&self) -> Euler {
        self.rotation
    }

    pub fn quaternion(&self) -> Quaternion {
        self.quaternion
    }

    pub fn set_position(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.position.set(x, y, z);
        self
    }

    pub fn set_scale(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.scale.set(x, y, z);
        self
    }

    pub fn set_rotation(&mut self, rotation: Euler) -> &mut Self {
        self.rotation = rotation;
        self.quaternion.set_from_euler(&rotation);
        self
    }

    pub fn set_quaternion(&mut self, quaternion: Quaternion) -> &mut Self {
        self.quaternion = quaternion;
        self.sync_rotation()
    }

    pub fn set_rotation_from_axis_angle(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.set_quaternion(Quaternion::from_axis_angle(axis, angle))
    }

    /// `m` must be a pure rotation (unscaled upper 3x3).
    pub fn set_rotation_from_matrix(&mut self, m: &Matrix4) -> &mut Self {
        self.set_quaternion(Quaternion::from_rotation_matrix(m))
    }

    fn sync_rotation(&mut self) -> &mut Self {
        let order = self.rotation.order;
        self.rotation.set_from_quaternion(&self.quaternion, order);
        self
    }

    /// Rotates about `axis` (unit length) in the object's local frame.
    pub fn rotate_on_axis(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.quaternion
            .multiply(&Quaternion::from_axis_angle(axis, angle));
        self.sync_rotation()
    }

    /// Rotates about `axis` (unit length) in the parent's frame.
    pub fn rotate_on_world_axis(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        self.quaternion
            .premultiply(&Quaternion::from_axis_angle(axis, angle));
        self.sync_rotation()
    }

    pub fn rotate_x(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::RIGHT, angle)
    }

    pub fn rotate_y(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::UP, angle)
    }

    pub fn rotate_z(&mut self, angle: f32) -> &mut Self {
        self.rotate_on_axis(Vector3::BACK, angle)
    }

    /// Moves along `axis` (unit length) expressed in the local frame.
    pub fn translate_on_axis(&mut self, axis: Vector3, distance: f32) -> &mut Self {
        let offset = self.quaternion * axis;
        self.position.add_scaled(offset, distance);
        self
    }

    pub fn translate_x(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::RIGHT, distance)
    }

    pub fn translate_y(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::UP, distance)
    }

    pub fn translate_z(&mut self, distance: f32) -> &mut Self {
        self.translate_on_axis(Vector3::BACK, distance)
    }

    /// Premultiplies the local transform by `m` and re-derives
    /// position, rotation and scale from the result.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        if self.matrix_auto_update {
            self.update_matrix();
        }
        self.matrix.premultiply(m);

        let (position, quaternion, scale) = self.matrix.decompose();
        self.position = position;
        self.scale = scale;
        self.set_quaternion(quaternion)
    }

    pub fn apply_quaternion(&mut self, q: &Quaternion) -> &mut Self {
        self.quaternion.premultiply(q);
        self.sync_rotation()
    }

    /// Recomposes the local matrix from position, quaternion and scale.
    pub fn update_matrix(&mut self) {
        self.matrix = Matrix4::compose(self.position, self.quaternion, self.scale);
    }

    /// Recomputes the world matrix from an already up-to-date parent world matrix.
    pub(crate) fn update_world_from(&mut self, parent_world: Option<&Matrix4>) {
        if self.matrix_auto_update {
            self.update_matrix();
        }
        self.matrix_world = match parent_world {
            Some(parent) => *parent * self.matrix,
            None => self.matrix,
        };
    }

    /// Orients the object so its local +Z points from itself toward `target`,
    /// or with `camera_convention` so its local -Z does.
    ///
    /// `world_position` is the object's current world position; the parent's
    /// world rotation, if any, is divided out of the result.
    pub(crate) fn orient_towards(
        &mut self,
        world_position: Vector3,
        target: Vector3,
        parent_world: Option<&Matrix4>,
        camera_convention: bool,
    ) {
        let basis = if camera_convention {
            Matrix4::look_at(world_position, target, self.up)
        } else {
            Matrix4::look_at(target, world_position, self.up)
        };

        let mut quaternion = Quaternion::from_rotation_matrix(&basis);

        if let Some(parent) = parent_world {
            let parent_rotation = Quaternion::from_rotation_matrix(&Matrix4::extract_rotation(parent));
            quaternion.premultiply(&parent_rotation.inverse());
        }

        self.set_quaternion(quaternion);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::EulerOrder;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn ids_are_unique() {
        assert_ne!(Object3D::new().id(), Object3D::new().id());
    }

    #[test]
    fn clone_gets_a_fresh_id() {
        let original = Object3D::named("crate").with_position(1.0, 2.0, 3.0);
        let copy = original.clone();
        assert_ne!(copy.id(), original.id());
        assert_eq!(copy.name, "crate");
        assert_eq!(copy.position, original.position);
    }

    #[test]
    fn rotation_and_quaternion_stay_in_sync() {
        let mut o = Object3D::new();
        o.set_rotation(Euler::with_order(0.1, 0.2, 0.3, EulerOrder::YXZ));
        assert_relative_eq!(
            o.quaternion(),
            Quaternion::from_euler(&o.rotation()),
            epsilon = 1e-6
        );

        o.set_quaternion(Quaternion::from_axis_angle(Vector3::UP, 0.5));
        assert_eq!(o.rotation().order, EulerOrder::YXZ);
        assert_relative_eq!(o.rotation().y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn rotate_then_translate_moves_along_local_axis() {
        let mut o = Object3D::new();
        o.rotate_y(FRAC_PI_2);
        o.translate_z(2.0);
        // local +Z is world +X after a quarter turn around Y
        assert_relative_eq!(o.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn apply_matrix_decomposes_back_into_components() {
        let mut o = Object3D::new().with_position(1.0, 0.0, 0.0);
        o.apply_matrix4(&Matrix4::make_scale(2.0, 2.0, 2.0));
        assert_relative_eq!(o.position, Vector3::new(2.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(o.scale, Vector3::new(2.0, 2.0, 2.0), epsilon = 1e-6);
    }

    #[test]
    fn update_matrix_composes_trs() {
        let mut o = Object3D::new()
            .with_position(1.0, 2.0, 3.0)
            .with_scale(2.0, 2.0, 2.0);
        o.update_matrix();
        assert_relative_eq!(o.matrix * Vector3::ONE, Vector3::new(3.0, 4.0, 5.0));
    }
}
