//! Polygon clipping in homogeneous clip space.
//!
//! Triangles that cross the camera plane cannot be perspective-divided
//! safely. The [`ClipSpaceClipper`] cuts them with the Sutherland-Hodgman
//! algorithm before the divide and fans the result back into triangles.

mod clip_space;

pub use clip_space::{ClipPlane, ClipSpaceClipper, ClipSpacePolygon};
