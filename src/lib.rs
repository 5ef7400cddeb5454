//! A retained-mode scene graph with a CPU software rasterizer.
//!
//! Build a [`Scene`] of [`Object3D`] nodes carrying [`Mesh`]es, point a
//! [`Camera`] at it and hand both to a [`Renderer`]. Each frame is culled,
//! depth-sorted with the painter's algorithm and rasterized into an RGBA
//! buffer that is presented on a [`Surface`]. Nothing runs on the GPU.
//!
//! # Quick Start
//!
//! ```no_run
//! use rustle3d::prelude::*;
//!
//! # fn main() -> rustle3d::Result<()> {
//! let mut scene = Scene::new();
//! let cube = Mesh::new(Shape::cube(1.0)).with_material(Material::new(Color::from_hex(0xff8800)));
//! scene.spawn(scene.root(), Object3D::named("cube").with_mesh(cube))?;
//!
//! let mut camera = Camera::perspective(60.0, 4.0 / 3.0, 0.1, 100.0).with_position(0.0, 1.0, 5.0);
//! camera.look_at(Vector3::ZERO);
//!
//! let mut renderer = Renderer::new(RendererConfig::default(), ImageSurface::new(640, 480))?;
//! renderer.render(&mut scene, &mut camera)?;
//! renderer.surface().save("cube.png")?;
//! # Ok(())
//! # }
//! ```

pub mod camera;
pub mod clipper;
pub mod config;
pub mod culling;
pub mod error;
pub mod loader;
pub mod logging;
pub mod material;
pub mod math;
pub mod pacing;
pub mod projection;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod shape;
pub mod surface;
#[cfg(feature = "window")]
pub mod window;

pub use camera::Camera;
pub use config::RendererConfig;
pub use error::{RenderError, Result};
pub use material::{Material, Side};
pub use projection::Projection;
pub use renderer::{FrameStats, Primitive, RenderList, Renderer};
pub use scene::{Mesh, NodeId, Object3D, Scene};
pub use shape::Shape;
pub use surface::{ImageSurface, Surface};

/// Prelude module for convenient imports.
///
/// # Example
/// ```ignore
/// use rustle3d::prelude::*;
/// ```
pub mod prelude {
    // Scene
    pub use crate::camera::Camera;
    pub use crate::material::{Material, Side};
    pub use crate::projection::Projection;
    pub use crate::scene::{Mesh, NodeId, Object3D, Scene};
    pub use crate::shape::Shape;

    // Rendering
    pub use crate::config::RendererConfig;
    pub use crate::renderer::{FrameStats, Renderer};
    pub use crate::surface::{ImageSurface, Surface};

    // Math
    pub use crate::math::{Color, Euler, EulerOrder, Matrix4, Quaternion, Vector2, Vector3, Vector4};

    // Errors
    pub use crate::error::{RenderError, Result};

    // Window
    pub use crate::pacing::FramePacer;
    #[cfg(feature = "window")]
    pub use crate::window::{Window, WindowEvent};
}

/// Internals exposed for benchmarking. Not part of the stable API.
pub mod bench {
    pub use crate::raster::{fill_triangle, Frame, PixelBuffer, Rasterizer};
}
