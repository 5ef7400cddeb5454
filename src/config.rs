//! Renderer configuration.

use crate::math::Color;

/// Settings for a [`Renderer`](crate::renderer::Renderer).
///
/// Start from [`RendererConfig::default`] and adjust with the `with_*` builders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    /// Clear color used when the scene has no background of its own.
    pub background: Color,
    /// Fill color for meshes without a material.
    pub default_color: Color,
    /// Skip meshes whose bounds lie outside the view frustum.
    pub frustum_culling: bool,
    /// Skip triangles facing away from the camera, subject to the material side.
    pub backface_culling: bool,
    /// Draw meshes far to near.
    pub depth_sort: bool,
    /// Keep a perspective camera's aspect equal to `width / height`.
    pub auto_aspect: bool,
    /// Clip triangles that cross the near plane instead of dropping them.
    pub near_plane_clipping: bool,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            background: Color::BLACK,
            default_color: Color::WHITE,
            frustum_culling: true,
            backface_culling: true,
            depth_sort: true,
            auto_aspect: true,
            near_plane_clipping: false,
        }
    }
}

impl RendererConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    pub fn with_default_color(mut self, color: Color) -> Self {
        self.default_color = color;
        self
    }

    pub fn with_frustum_culling(mut self, enabled: bool) -> Self {
        self.frustum_culling = enabled;
        self
    }

    pub fn with_backface_culling(mut self, enabled: bool) -> Self {
        self.backface_culling = enabled;
        self
    }

    pub fn with_depth_sort(mut self, enabled: bool) -> Self {
        self.depth_sort = enabled;
        self
    }

    pub fn with_auto_aspect(mut self, enabled: bool) -> Self {
        self.auto_aspect = enabled;
        self
    }

    pub fn with_near_plane_clipping(mut self, enabled: bool) -> Self {
        self.near_plane_clipping = enabled;
        self
    }

    /// `width / height`, or 1 for a zero height.
    pub fn aspect(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_culling_and_sorting() {
        let config = RendererConfig::default();
        assert!(config.frustum_culling && config.backface_culling && config.depth_sort);
        assert!(!config.near_plane_clipping);
        approx::assert_relative_eq!(config.aspect(), 640.0 / 480.0);
    }

    #[test]
    fn builders_chain() {
        let config = RendererConfig::default()
            .with_size(100, 50)
            .with_depth_sort(false)
            .with_near_plane_clipping(true);
        assert_eq!((config.width, config.height), (100, 50));
        assert!(!config.depth_sort);
        assert!(config.near_plane_clipping);
        assert_eq!(config.aspect(), 2.0);
    }
}
