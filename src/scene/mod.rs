//! Scene graph: transformable nodes, their hierarchy and renderable payloads.

mod graph;
mod mesh;
mod object;

pub use graph::Scene;
pub use mesh::Mesh;
pub use object::Object3D;

slotmap::new_key_type! {
    /// Handle to a node stored in a [`Scene`].
    pub struct NodeId;
}
