//! 4D vector for homogeneous coordinates.

use std::ops::{Add, Div, Mul, Neg, Sub};

use approx::{AbsDiffEq, RelativeEq};

use super::mat4::Matrix4;
use super::vec3::Vector3;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Vector4 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Create a point (w=1) from x, y, z coordinates.
    pub const fn point(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 1.0)
    }

    /// Create a direction vector (w=0) from x, y, z coordinates.
    pub const fn direction(x: f32, y: f32, z: f32) -> Self {
        Self::new(x, y, z, 0.0)
    }

    /// Create a Vector4 from a Vector3 with specified w component.
    pub const fn from_vec3(v: Vector3, w: f32) -> Self {
        Self::new(v.x, v.y, v.z, w)
    }

    /// Convert to Vector3, discarding w.
    pub const fn to_vec3(self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Convert to Vector3 with perspective division (divide by w).
    ///
    /// A zero `w` leaves the components undivided.
    pub fn to_vec3_perspective(self) -> Vector3 {
        if self.w != 0.0 && self.w != 1.0 {
            Vector3::new(self.x / self.w, self.y / self.w, self.z / self.w)
        } else {
            Vector3::new(self.x, self.y, self.z)
        }
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32, w: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self.w = w;
        self
    }

    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(
            array[offset],
            array[offset + 1],
            array[offset + 2],
            array[offset + 3],
        )
    }

    pub fn to_array(&self, array: &mut [f32], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
        array[offset + 2] = self.z;
        array[offset + 3] = self.w;
    }

    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self.z *= s;
        self.w *= s;
        self
    }

    pub fn divide_scalar(&mut self, s: f32) -> &mut Self {
        self.multiply_scalar(1.0 / s)
    }

    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        *self = *m * *self;
        self
    }

    pub fn length_sq(&self) -> f32 {
        self.dot(*self)
    }

    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Scales to unit length. A zero vector is left unchanged.
    pub fn unitize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            self.multiply_scalar(1.0 / length);
        }
        self
    }

    pub fn dot(&self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z + self.w * other.w
    }

    /// Linearly interpolate between two vectors.
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
            self.w + (other.w - self.w) * t,
        )
    }
}

impl Add<Vector4> for Vector4 {
    type Output = Vector4;

    fn add(self, rhs: Vector4) -> Self::Output {
        Self::new(
            self.x + rhs.x,
            self.y + rhs.y,
            self.z + rhs.z,
            self.w + rhs.w,
        )
    }
}

impl Sub<Vector4> for Vector4 {
    type Output = Vector4;

    fn sub(self, rhs: Vector4) -> Self::Output {
        Self::new(
            self.x - rhs.x,
            self.y - rhs.y,
            self.z - rhs.z,
            self.w - rhs.w,
        )
    }
}

impl Mul<f32> for Vector4 {
    type Output = Vector4;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs, self.w * rhs)
    }
}

impl Div<f32> for Vector4 {
    type Output = Vector4;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs, self.w / rhs)
    }
}

impl Neg for Vector4 {
    type Output = Vector4;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z, -self.w)
    }
}

impl From<Vector3> for Vector4 {
    /// Convert Vector3 to Vector4 as a point (w=1).
    fn from(v: Vector3) -> Self {
        Self::point(v.x, v.y, v.z)
    }
}

impl From<Vector4> for Vector3 {
    /// Convert Vector4 to Vector3, discarding w.
    fn from(v: Vector4) -> Self {
        v.to_vec3()
    }
}

impl AbsDiffEq for Vector4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
            && self.w.abs_diff_eq(&other.w, epsilon)
    }
}

impl RelativeEq for Vector4 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
            && self.w.relative_eq(&other.w, epsilon, max_relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn perspective_divide() {
        let v = Vector4::new(2.0, 4.0, 6.0, 2.0);
        assert_eq!(v.to_vec3_perspective(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn zero_w_is_not_divided() {
        let v = Vector4::direction(1.0, 2.0, 3.0);
        assert_eq!(v.to_vec3_perspective(), Vector3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn unitize_zero_is_noop() {
        let mut v = Vector4::ZERO;
        v.unitize();
        assert_eq!(v, Vector4::ZERO);
    }

    #[test]
    fn apply_matrix_keeps_w_for_affine() {
        let mut v = Vector4::point(1.0, 0.0, 0.0);
        v.apply_matrix4(&Matrix4::from_translation(Vector3::new(0.0, 5.0, 0.0)));
        assert_relative_eq!(v, Vector4::point(1.0, 5.0, 0.0));
    }
}
