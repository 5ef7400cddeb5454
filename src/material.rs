//! Surface appearance: flat color, wireframe toggle and which faces to draw.

use crate::math::Color;

/// Which triangle faces survive backface culling.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Side {
    /// Counter-clockwise (as seen by the camera) faces only.
    #[default]
    Front,
    Back,
    Double,
}

impl Side {
    /// Whether a triangle with the given facing should be drawn.
    pub fn accepts(self, front_facing: bool) -> bool {
        match self {
            Side::Front => front_facing,
            Side::Back => !front_facing,
            Side::Double => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Material {
    pub color: Color,
    pub wireframe: bool,
    pub side: Side,
    pub visible: bool,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Color::WHITE)
    }
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self {
            color,
            wireframe: false,
            side: Side::Front,
            visible: true,
        }
    }

    /// Outline-only material; every triangle is drawn regardless of facing.
    pub fn wireframe(color: Color) -> Self {
        Self::new(color).with_wireframe(true)
    }

    pub fn with_wireframe(mut self, wireframe: bool) -> Self {
        self.wireframe = wireframe;
        self
    }

    pub fn with_side(mut self, side: Side) -> Self {
        self.side = side;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Wireframe and double-sided materials skip backface culling.
    pub fn skips_backface_cull(&self) -> bool {
        self.wireframe || self.side == Side::Double
    }
}
