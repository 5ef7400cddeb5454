//! Arena-backed scene hierarchy.
//!
//! Every [`Object3D`] lives in a [`SlotMap`] owned by the [`Scene`]; parent and
//! child links are [`NodeId`] keys into it. The tree has a single root created
//! with the scene. Nodes can also exist detached (inserted but not added under
//! any parent) and are then ignored by traversal from the root.

use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::error::{RenderError, Result};
use crate::math::{Color, Matrix4, Quaternion, Vector3};

use super::object::Object3D;
use super::NodeId;

/// The root of a scene graph plus the arena holding every node.
#[derive(Debug)]
pub struct Scene {
    nodes: SlotMap<NodeId, Object3D>,
    root: NodeId,
    /// Clear color; the renderer's configured background is used when unset.
    pub background: Option<Color>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Object3D::named("Scene"));
        Self {
            nodes,
            root,
            background: None,
        }
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&Object3D> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Object3D> {
        self.nodes.get_mut(id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, the root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> Result<&Object3D> {
        self.nodes.get(id).ok_or(RenderError::NodeNotFound(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut Object3D> {
        self.nodes.get_mut(id).ok_or(RenderError::NodeNotFound(id))
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Stores `object` as a detached node.
    pub fn insert(&mut self, mut object: Object3D) -> NodeId {
        object.parent = None;
        object.children.clear();
        self.nodes.insert(object)
    }

    /// Inserts `object` and adds it under `parent`.
    pub fn spawn(&mut self, parent: NodeId, object: Object3D) -> Result<NodeId> {
        self.node(parent)?;
        let id = self.insert(object);
        self.add(parent, id)?;
        Ok(id)
    }

    /// Whether `ancestor` is a strict ancestor of `node`.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = self.nodes.get(node).and_then(|n| n.parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(id).and_then(|n| n.parent);
        }
        false
    }

    /// Appends `child` to `parent`'s children, detaching it from any previous
    /// parent first.
    ///
    /// # Errors
    /// [`RenderError::NodeNotFound`] for an unknown id and
    /// [`RenderError::Cycle`] when `child` is `parent` or one of its ancestors.
    pub fn add(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(parent)?;
        self.node(child)?;

        if parent == child || self.is_ancestor(child, parent) {
            return Err(RenderError::Cycle { parent, child });
        }

        self.remove_from_parent(child);

        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Detaches `child` if `parent` is its parent. The child stays alive and
    /// can be added again.
    pub fn remove(&mut self, parent: NodeId, child: NodeId) -> bool {
        if self.nodes.get(child).and_then(|n| n.parent) != Some(parent) {
            return false;
        }

        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.retain(|&id| id != child);
        }
        if let Some(c) = self.nodes.get_mut(child) {
            c.parent = None;
        }
        true
    }

    pub fn remove_from_parent(&mut self, id: NodeId) -> bool {
        match self.nodes.get(id).and_then(|n| n.parent) {
            Some(parent) => self.remove(parent, id),
            None => false,
        }
    }

    /// Like [`Scene::add`], but keeps the child's world transform by folding
    /// the change of parent into its local transform.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.node(child)?;
        if parent == child || self.is_ancestor(child, parent) {
            return Err(RenderError::Cycle { parent, child });
        }

        self.update_world_matrix(parent, true, false)?;
        let mut m = self.node(parent)?.matrix_world.inverse();

        if let Some(old_parent) = self.node(child)?.parent {
            self.update_world_matrix(old_parent, true, false)?;
            m.multiply(&self.node(old_parent)?.matrix_world);
        }

        self.node_mut(child)?.apply_matrix4(&m);
        self.add(parent, child)?;
        self.update_world_matrix(child, false, true)
    }

    /// Drops `id` and its whole subtree. The root cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) -> Option<Object3D> {
        if id == self.root || !self.nodes.contains_key(id) {
            return None;
        }

        self.remove_from_parent(id);

        let mut stack: Vec<NodeId> = self.nodes.get(id).map(|n| n.children.clone())?;
        while let Some(descendant) = stack.pop() {
            if let Some(node) = self.nodes.remove(descendant) {
                stack.extend(node.children);
            }
        }

        let removed = self.nodes.remove(id);
        debug!(?id, remaining = self.nodes.len(), "destroyed subtree");
        removed
    }

    // =========================================================================
    // Transforms
    // =========================================================================

    pub fn update_matrix(&mut self, id: NodeId) -> Result<()> {
        self.node_mut(id)?.update_matrix();
        Ok(())
    }

    /// Recomputes `id`'s world matrix as `parent.world * local` (or `local` at a
    /// root), optionally refreshing the ancestors first and the descendants after.
    pub fn update_world_matrix(
        &mut self,
        id: NodeId,
        update_parents: bool,
        update_children: bool,
    ) -> Result<()> {
        let parent = self.node(id)?.parent;

        if update_parents {
            if let Some(parent) = parent {
                self.update_world_matrix(parent, true, false)?;
            }
        }

        self.refresh_world(id);

        if update_children {
            let mut stack: Vec<NodeId> = self.node(id)?.children.iter().rev().copied().collect();
            while let Some(current) = stack.pop() {
                self.refresh_world(current);
                if let Some(node) = self.nodes.get(current) {
                    stack.extend(node.children.iter().rev().copied());
                }
            }
        }

        Ok(())
    }

    fn refresh_world(&mut self, id: NodeId) {
        let parent_world = self
            .nodes
            .get(id)
            .and_then(|n| n.parent)
            .and_then(|p| self.nodes.get(p))
            .map(|p| p.matrix_world);

        match self.nodes.get_mut(id) {
            Some(node) => node.update_world_from(parent_world.as_ref()),
            None => warn!(?id, "world matrix update for missing node"),
        }
    }

    /// Refreshes every world matrix reachable from the root.
    pub fn update_matrix_world(&mut self) {
        let root = self.root;
        // The root is never removed from the arena.
        if let Err(err) = self.update_world_matrix(root, false, true) {
            warn!(%err, "scene root missing");
        }
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Pre-order depth-first walk of `id`'s subtree, each node before its
    /// children and children in insertion order.
    pub fn traverse(&mut self, id: NodeId, mut f: impl FnMut(NodeId, &mut Object3D)) {
        self.walk(id, false, &mut f);
    }

    /// Like [`Scene::traverse`] but skips invisible nodes and everything below them.
    pub fn traverse_visible(&mut self, id: NodeId, mut f: impl FnMut(NodeId, &mut Object3D)) {
        self.walk(id, true, &mut f);
    }

    fn walk(&mut self, id: NodeId, visible_only: bool, f: &mut impl FnMut(NodeId, &mut Object3D)) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get_mut(current) else {
                warn!(id = ?current, "traversal reached a missing node");
                continue;
            };
            if visible_only && !node.visible {
                continue;
            }
            f(current, node);
            stack.extend(node.children.iter().rev().copied());
        }
    }

    /// Visits each ancestor of `id`, nearest first.
    pub fn traverse_ancestors(&mut self, id: NodeId, mut f: impl FnMut(NodeId, &mut Object3D)) {
        let mut current = self.nodes.get(id).and_then(|n| n.parent);
        while let Some(ancestor) = current {
            let Some(node) = self.nodes.get_mut(ancestor) else {
                break;
            };
            f(ancestor, node);
            current = node.parent;
        }
    }

    /// First node in depth-first order from the root matching `predicate`.
    pub fn find(&self, predicate: impl Fn(&Object3D) -> bool) -> Option<NodeId> {
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            let Some(node) = self.nodes.get(current) else {
                continue;
            };
            if predicate(node) {
                return Some(current);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        None
    }

    pub fn object_by_id(&self, id: u32) -> Option<NodeId> {
        self.find(|o| o.id() == id)
    }

    pub fn object_by_name(&self, name: &str) -> Option<NodeId> {
        self.find(|o| o.name == name)
    }

    // =========================================================================
    // World-space queries
    // =========================================================================

    /// Turns `id` so its local +Z axis faces the world-space point `target`.
    pub fn look_at(&mut self, id: NodeId, target: Vector3) -> Result<()> {
        self.update_world_matrix(id, true, false)?;

        let node = self.node(id)?;
        let world_position = node.matrix_world.position();
        let parent_world = node
            .parent
            .and_then(|p| self.nodes.get(p))
            .map(|p| p.matrix_world);

        self.node_mut(id)?
            .orient_towards(world_position, target, parent_world.as_ref(), false);
        Ok(())
    }

    fn fresh_world_matrix(&mut self, id: NodeId) -> Result<Matrix4> {
        self.update_world_matrix(id, true, false)?;
        Ok(self.node(id)?.matrix_world)
    }

    pub fn world_position(&mut self, id: NodeId) -> Result<Vector3> {
        Ok(self.fresh_world_matrix(id)?.position())
    }

    pub fn world_quaternion(&mut self, id: NodeId) -> Result<Quaternion> {
        Ok(self.fresh_world_matrix(id)?.decompose().1)
    }

    pub fn world_scale(&mut self, id: NodeId) -> Result<Vector3> {
        Ok(self.fresh_world_matrix(id)?.decompose().2)
    }

    /// The node's local +Z axis in world space, unit length.
    pub fn world_direction(&mut self, id: NodeId) -> Result<Vector3> {
        let m = self.fresh_world_matrix(id)?;
        let mut direction = Vector3::ZERO;
        direction.set_from_matrix_column(&m, 2).unitize();
        Ok(direction)
    }

    pub fn local_to_world(&mut self, id: NodeId, point: Vector3) -> Result<Vector3> {
        Ok(self.fresh_world_matrix(id)? * point)
    }

    pub fn world_to_local(&mut self, id: NodeId, point: Vector3) -> Result<Vector3> {
        Ok(self.fresh_world_matrix(id)?.inverse() * point)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Euler;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn named(scene: &mut Scene, parent: NodeId, name: &str) -> NodeId {
        scene.spawn(parent, Object3D::named(name)).unwrap()
    }

    #[test]
    fn add_detaches_from_previous_parent() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        let b = named(&mut scene, root, "b");
        let child = named(&mut scene, a, "child");

        scene.add(b, child).unwrap();

        assert!(scene.get(a).unwrap().children().is_empty());
        assert_eq!(scene.get(b).unwrap().children(), &[child]);
        assert_eq!(scene.get(child).unwrap().parent(), Some(b));
    }

    #[test]
    fn add_rejects_cycles() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        let b = named(&mut scene, a, "b");

        assert!(matches!(scene.add(b, a), Err(RenderError::Cycle { .. })));
        assert!(matches!(scene.add(a, a), Err(RenderError::Cycle { .. })));
        // structure untouched
        assert_eq!(scene.get(b).unwrap().parent(), Some(a));
    }

    #[test]
    fn remove_leaves_node_alive() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");

        assert!(scene.remove(root, a));
        assert!(!scene.remove(root, a));
        assert!(scene.contains(a));
        assert_eq!(scene.object_by_name("a"), None);
    }

    #[test]
    fn destroy_drops_subtree() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        let b = named(&mut scene, a, "b");
        let c = named(&mut scene, b, "c");

        assert!(scene.destroy(a).is_some());
        assert!(!scene.contains(b));
        assert!(!scene.contains(c));
        assert_eq!(scene.len(), 1);
        assert!(scene.destroy(root).is_none());
    }

    #[test]
    fn traversal_is_preorder_and_prunes_invisible() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        named(&mut scene, a, "a1");
        let b = named(&mut scene, root, "b");
        named(&mut scene, b, "b1");

        let mut order = Vec::new();
        scene.traverse(root, |_, o| order.push(o.name.clone()));
        assert_eq!(order, ["Scene", "a", "a1", "b", "b1"]);

        scene.get_mut(a).unwrap().visible = false;
        let mut visible = Vec::new();
        scene.traverse_visible(root, |_, o| visible.push(o.name.clone()));
        assert_eq!(visible, ["Scene", "b", "b1"]);
    }

    #[test]
    fn traverse_ancestors_walks_up() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        let b = named(&mut scene, a, "b");

        let mut names = Vec::new();
        scene.traverse_ancestors(b, |_, o| names.push(o.name.clone()));
        assert_eq!(names, ["a", "Scene"]);
    }

    #[test]
    fn lookup_by_id_and_name() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "dup");
        named(&mut scene, root, "dup");

        let numeric = scene.get(a).unwrap().id();
        assert_eq!(scene.object_by_id(numeric), Some(a));
        assert_eq!(scene.object_by_name("dup"), Some(a));
        assert_eq!(scene.object_by_name("missing"), None);
    }

    #[test]
    fn world_matrix_is_parent_world_times_local() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = scene
            .spawn(
                root,
                Object3D::new()
                    .with_position(1.0, 2.0, 3.0)
                    .with_rotation(Euler::new(0.3, 0.5, -0.2))
                    .with_scale(2.0, 1.0, 0.5),
            )
            .unwrap();
        let child = scene
            .spawn(
                parent,
                Object3D::new()
                    .with_position(-1.0, 0.5, 4.0)
                    .with_rotation(Euler::new(1.0, 0.0, 0.4))
                    .with_scale(1.5, 1.5, 1.5),
            )
            .unwrap();

        scene.update_world_matrix(parent, false, true).unwrap();

        let p = scene.get(parent).unwrap();
        let c = scene.get(child).unwrap();
        assert_eq!(c.matrix_world, p.matrix_world * c.matrix);
    }

    #[test]
    fn attach_preserves_world_position() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = scene
            .spawn(root, Object3D::new().with_position(5.0, 0.0, 0.0))
            .unwrap();
        let b = scene
            .spawn(root, Object3D::new().with_position(0.0, 3.0, 0.0).with_scale(2.0, 2.0, 2.0))
            .unwrap();
        let node = scene
            .spawn(a, Object3D::new().with_position(1.0, 1.0, 1.0))
            .unwrap();

        let before = scene.world_position(node).unwrap();
        scene.attach(b, node).unwrap();
        let after = scene.world_position(node).unwrap();

        assert_eq!(scene.get(node).unwrap().parent(), Some(b));
        assert_relative_eq!(before, after, epsilon = 1e-5);
    }

    #[test]
    fn look_at_points_local_z_at_target() {
        let mut scene = Scene::new();
        let root = scene.root();
        let parent = scene.spawn(root, Object3D::new()).unwrap();
        scene.get_mut(parent).unwrap().rotate_y(FRAC_PI_2);
        let node = scene
            .spawn(parent, Object3D::new().with_position(0.0, 0.0, 0.0))
            .unwrap();

        scene.look_at(node, Vector3::new(0.0, 0.0, -10.0)).unwrap();
        let direction = scene.world_direction(node).unwrap();
        assert_relative_eq!(direction, Vector3::FORWARD, epsilon = 1e-5);
    }

    #[test]
    fn local_world_round_trip() {
        let mut scene = Scene::new();
        let root = scene.root();
        let node = scene
            .spawn(root, Object3D::new().with_position(1.0, 2.0, 3.0).with_scale(2.0, 2.0, 2.0))
            .unwrap();

        let world = scene.local_to_world(node, Vector3::ONE).unwrap();
        assert_relative_eq!(world, Vector3::new(3.0, 4.0, 5.0));
        assert_relative_eq!(scene.world_to_local(node, world).unwrap(), Vector3::ONE, epsilon = 1e-6);
    }

    #[test]
    fn missing_nodes_are_errors() {
        let mut scene = Scene::new();
        let root = scene.root();
        let a = named(&mut scene, root, "a");
        scene.destroy(a);
        assert!(matches!(scene.update_matrix(a), Err(RenderError::NodeNotFound(_))));
        assert!(matches!(scene.add(root, a), Err(RenderError::NodeNotFound(_))));
    }
}
