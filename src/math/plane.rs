//! Infinite plane `normal · p + constant = 0`.

use super::vec3::Vector3;
use super::vec4::Vector4;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plane {
    pub normal: Vector3,
    pub constant: f32,
}

impl Default for Plane {
    fn default() -> Self {
        Self::new(Vector3::new(1.0, 0.0, 0.0), 0.0)
    }
}

impl Plane {
    pub const fn new(normal: Vector3, constant: f32) -> Self {
        Self { normal, constant }
    }

    /// Plane through `point` facing `normal` (unit length).
    pub fn from_normal_and_point(normal: Vector3, point: Vector3) -> Self {
        Self::new(normal, -point.dot(normal))
    }

    pub fn set_components(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        self.normal.set(x, y, z);
        self.constant = w;
        self
    }

    /// Builds from `(a, b, c, d)` coefficients, e.g. a combination of matrix rows.
    pub fn from_coefficients(v: Vector4) -> Self {
        Self::new(v.to_vec3(), v.w)
    }

    /// Scales so the normal has unit length. A zero normal is left unchanged.
    pub fn unitize(&mut self) -> &mut Self {
        let length = self.normal.length();
        if length > 0.0 {
            let inv = 1.0 / length;
            self.normal.multiply_scalar(inv);
            self.constant *= inv;
        }
        self
    }

    /// Signed distance; positive on the side the normal points to.
    pub fn distance_to_point(&self, point: Vector3) -> f32 {
        self.normal.dot(point) + self.constant
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn unitize_scales_constant_with_normal() {
        let mut p = Plane::new(Vector3::new(0.0, 3.0, 4.0), 10.0);
        p.unitize();
        assert_relative_eq!(p.normal, Vector3::new(0.0, 0.6, 0.8));
        assert_relative_eq!(p.constant, 2.0);
    }

    #[test]
    fn zero_normal_is_left_alone() {
        let mut p = Plane::new(Vector3::ZERO, 5.0);
        p.unitize();
        assert_eq!(p, Plane::new(Vector3::ZERO, 5.0));
    }

    #[test]
    fn signed_distance() {
        let p = Plane::from_normal_and_point(Vector3::UP, Vector3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(p.distance_to_point(Vector3::new(3.0, 5.0, 1.0)), 3.0);
        assert_relative_eq!(p.distance_to_point(Vector3::ZERO), -2.0);
    }
}
