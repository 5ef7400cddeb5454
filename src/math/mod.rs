//! Linear algebra value types.
//!
//! Everything here is `Copy`. Mutating methods take `&mut self` and return
//! `&mut Self` so calls chain; operator traits give the by-value forms.

pub mod color;
pub mod euler;
pub mod mat4;
pub mod plane;
pub mod quat;
pub mod sphere;
pub mod vec2;
pub mod vec3;
pub mod vec4;

pub use color::Color;
pub use euler::{Euler, EulerOrder};
pub use mat4::Matrix4;
pub use plane::Plane;
pub use quat::Quaternion;
pub use sphere::Sphere;
pub use vec2::Vector2;
pub use vec3::Vector3;
pub use vec4::Vector4;
