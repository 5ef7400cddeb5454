//! Renderable payload carried by a scene node.

use crate::material::Material;
use crate::math::Color;
use crate::shape::Shape;

/// A [`Shape`] paired with an optional [`Material`].
///
/// Without a material the mesh is drawn solid in the renderer's default color.
#[derive(Debug, Clone)]
pub struct Mesh {
    pub shape: Shape,
    pub material: Option<Material>,
}

impl Mesh {
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            material: None,
        }
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.material = Some(material);
        self
    }

    /// A mesh with no material is visible.
    pub fn is_visible(&self) -> bool {
        self.material.map_or(true, |m| m.visible)
    }

    pub fn color_or(&self, fallback: Color) -> Color {
        self.material.map_or(fallback, |m| m.color)
    }
}
