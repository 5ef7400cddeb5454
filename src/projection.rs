//! Projection parameters.
//!
//! [`Projection`] is the single source of truth for a camera's lens: either a
//! perspective frustum or an orthographic box. It generates the projection
//! matrix in the OpenGL clip convention (right-handed eye space looking down
//! -Z, NDC depth in `[-1, 1]`).

use crate::math::Matrix4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        /// Vertical field of view in degrees.
        fov: f32,
        /// Width divided by height.
        aspect: f32,
        near: f32,
        far: f32,
        /// Magnification; narrows the effective field of view.
        zoom: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
        /// Magnification; shrinks the visible box around its center.
        zoom: f32,
    },
}

impl Projection {
    /// Creates a perspective projection.
    ///
    /// # Arguments
    /// * `fov` - Vertical field of view in degrees
    /// * `aspect` - Width divided by height
    /// * `near` - Near clipping plane distance (must be > 0)
    /// * `far` - Far clipping plane distance (must be > near)
    pub fn perspective(fov: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self::Perspective {
            fov,
            aspect,
            near,
            far,
            zoom: 1.0,
        }
    }

    pub fn orthographic(left: f32, right: f32, top: f32, bottom: f32, near: f32, far: f32) -> Self {
        Self::Orthographic {
            left,
            right,
            top,
            bottom,
            near,
            far,
            zoom: 1.0,
        }
    }

    pub fn is_perspective(&self) -> bool {
        matches!(self, Self::Perspective { .. })
    }

    pub fn near(&self) -> f32 {
        match *self {
            Self::Perspective { near, .. } | Self::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Self::Perspective { far, .. } | Self::Orthographic { far, .. } => far,
        }
    }

    pub fn zoom(&self) -> f32 {
        match *self {
            Self::Perspective { zoom, .. } | Self::Orthographic { zoom, .. } => zoom,
        }
    }

    /// Aspect ratio of a perspective projection.
    pub fn aspect(&self) -> Option<f32> {
        match *self {
            Self::Perspective { aspect, .. } => Some(aspect),
            Self::Orthographic { .. } => None,
        }
    }

    /// Vertical field of view in radians after zoom, for perspective projections.
    pub fn fov_y(&self) -> Option<f32> {
        match *self {
            Self::Perspective { fov, zoom, .. } => {
                Some(2.0 * ((fov.to_radians() / 2.0).tan() / zoom).atan())
            }
            Self::Orthographic { .. } => None,
        }
    }

    /// Horizontal field of view in radians, computed from the vertical one and
    /// the aspect ratio.
    pub fn fov_x(&self) -> Option<f32> {
        let fov_y = self.fov_y()?;
        let aspect = self.aspect()?;
        Some(2.0 * (aspect * (fov_y / 2.0).tan()).atan())
    }

    /// Builds the projection matrix.
    pub fn matrix(&self) -> Matrix4 {
        match *self {
            Self::Perspective {
                fov,
                aspect,
                near,
                far,
                zoom,
            } => {
                let top = near * (fov.to_radians() / 2.0).tan() / zoom;
                let height = 2.0 * top;
                let width = aspect * height;
                let left = -0.5 * width;
                Matrix4::make_perspective(left, left + width, top, top - height, near, far)
            }
            Self::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
                zoom,
            } => {
                let dx = (right - left) / (2.0 * zoom);
                let dy = (top - bottom) / (2.0 * zoom);
                let cx = (right + left) / 2.0;
                let cy = (top + bottom) / 2.0;
                Matrix4::make_orthographic(cx - dx, cx + dx, cy + dy, cy - dy, near, far)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vector3;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    #[test]
    fn fov_x_matches_aspect_ratio() {
        // With aspect ratio 1:1, fov_x should equal fov_y
        let proj = Projection::perspective(45.0, 1.0, 0.1, 100.0);
        assert_relative_eq!(proj.fov_x().unwrap(), proj.fov_y().unwrap(), epsilon = 1e-6);
        assert_relative_eq!(proj.fov_y().unwrap(), FRAC_PI_4, epsilon = 1e-6);
    }

    #[test]
    fn fov_x_wider_with_higher_aspect() {
        let proj = Projection::perspective(45.0, 16.0 / 9.0, 0.1, 100.0);
        assert!(proj.fov_x().unwrap() > proj.fov_y().unwrap());
    }

    #[test]
    fn perspective_matches_symmetric_formula() {
        let proj = Projection::perspective(70.0, 4.0 / 3.0, 0.1, 100.0);
        let expected = Matrix4::perspective(70f32.to_radians(), 4.0 / 3.0, 0.1, 100.0);
        assert_relative_eq!(proj.matrix(), expected, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_zoom_shrinks_box() {
        let mut proj = Projection::orthographic(-2.0, 2.0, 2.0, -2.0, 0.1, 10.0);
        if let Projection::Orthographic { zoom, .. } = &mut proj {
            *zoom = 2.0;
        }
        // with zoom 2 the box edge maps to NDC 2
        let p = proj.matrix() * Vector3::new(2.0, 0.0, -1.0);
        assert_relative_eq!(p.x, 2.0, epsilon = 1e-6);
    }
}
