//! 3D vector for positions, directions and scale factors.
//!
//! Mutating methods take `&mut self` and return `&mut Self` so calls can be
//! chained; the operator traits produce new values and never touch their
//! operands.

use std::ops::{Add, AddAssign, Div, Index, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

use super::mat4::Matrix4;
use super::quat::Quaternion;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const ONE: Self = Self::new(1.0, 1.0, 1.0);
    pub const RIGHT: Self = Self::new(1.0, 0.0, 0.0);
    pub const LEFT: Self = Self::new(-1.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);
    pub const DOWN: Self = Self::new(0.0, -1.0, 0.0);
    /// Right-handed: the default view direction is down the negative Z axis.
    pub const FORWARD: Self = Self::new(0.0, 0.0, -1.0);
    pub const BACK: Self = Self::new(0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub const fn splat(s: f32) -> Self {
        Self::new(s, s, s)
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self
    }

    /// Reads three components starting at `offset`.
    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1], array[offset + 2])
    }

    /// Writes three components starting at `offset`.
    pub fn to_array(&self, array: &mut [f32], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
        array[offset + 2] = self.z;
    }

    pub fn to_array3(&self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    // ============ In-place arithmetic ============

    pub fn add_vector(&mut self, v: Self) -> &mut Self {
        self.x += v.x;
        self.y += v.y;
        self.z += v.z;
        self
    }

    pub fn add_scalar(&mut self, s: f32) -> &mut Self {
        self.x += s;
        self.y += s;
        self.z += s;
        self
    }

    /// Adds `v * s`.
    pub fn add_scaled(&mut self, v: Self, s: f32) -> &mut Self {
        self.x += v.x * s;
        self.y += v.y * s;
        self.z += v.z * s;
        self
    }

    pub fn sub_vector(&mut self, v: Self) -> &mut Self {
        self.x -= v.x;
        self.y -= v.y;
        self.z -= v.z;
        self
    }

    /// Component-wise multiplication.
    pub fn multiply_vector(&mut self, v: Self) -> &mut Self {
        self.x *= v.x;
        self.y *= v.y;
        self.z *= v.z;
        self
    }

    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self.z *= s;
        self
    }

    pub fn divide_scalar(&mut self, s: f32) -> &mut Self {
        self.multiply_scalar(1.0 / s)
    }

    pub fn negate(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
        self
    }

    // ============ Products and norms ============

    pub fn dot(&self, v: Self) -> f32 {
        self.x * v.x + self.y * v.y + self.z * v.z
    }

    /// Returns the cross product of two vectors.
    /// The resulting vector is perpendicular to both input vectors.
    pub fn cross(&self, v: Self) -> Self {
        Self {
            x: self.y * v.z - self.z * v.y,
            y: self.z * v.x - self.x * v.z,
            z: self.x * v.y - self.y * v.x,
        }
    }

    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn manhattan_length(&self) -> f32 {
        self.x.abs() + self.y.abs() + self.z.abs()
    }

    /// Scales to unit length. A zero vector is left unchanged.
    pub fn unitize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            self.multiply_scalar(1.0 / length);
        }
        self
    }

    /// By-value form of [`Vector3::unitize`].
    pub fn unitized(mut self) -> Self {
        self.unitize();
        self
    }

    pub fn set_length(&mut self, length: f32) -> &mut Self {
        self.unitize().multiply_scalar(length)
    }

    pub fn distance_to(&self, v: Self) -> f32 {
        self.distance_to_squared(v).sqrt()
    }

    pub fn distance_to_squared(&self, v: Self) -> f32 {
        (*self - v).length_sq()
    }

    /// Angle in radians between the two vectors; `π/2` if either is zero.
    pub fn angle_to(&self, v: Self) -> f32 {
        let denominator = (self.length_sq() * v.length_sq()).sqrt();
        if denominator == 0.0 {
            return std::f32::consts::FRAC_PI_2;
        }
        (self.dot(v) / denominator).clamp(-1.0, 1.0).acos()
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
            self.z + (other.z - self.z) * t,
        )
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y), self.z.min(other.z))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y), self.z.max(other.z))
    }

    pub fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    pub fn max_component(&self) -> f32 {
        self.x.max(self.y).max(self.z)
    }

    /// Projects this vector onto `v`. Projecting onto a zero vector yields zero.
    pub fn project_on_vector(&mut self, v: Self) -> &mut Self {
        let denominator = v.length_sq();
        if denominator == 0.0 {
            return self.set(0.0, 0.0, 0.0);
        }
        let scalar = v.dot(*self) / denominator;
        *self = v * scalar;
        self
    }

    pub fn project_on_plane(&mut self, plane_normal: Self) -> &mut Self {
        let mut projected = *self;
        projected.project_on_vector(plane_normal);
        self.sub_vector(projected)
    }

    /// Reflects off the plane orthogonal to `normal`, which must be unit length.
    pub fn reflect(&mut self, normal: Self) -> &mut Self {
        let d = 2.0 * self.dot(normal);
        self.add_scaled(normal, -d)
    }

    // ============ Transforms ============

    /// Transforms as a point (w = 1) and divides by the resulting w.
    pub fn apply_matrix4(&mut self, m: &Matrix4) -> &mut Self {
        let e = m.elements();
        let (x, y, z) = (self.x, self.y, self.z);
        let w = e[3] * x + e[7] * y + e[11] * z + e[15];
        let w = if w != 0.0 { 1.0 / w } else { 1.0 };
        self.x = (e[0] * x + e[4] * y + e[8] * z + e[12]) * w;
        self.y = (e[1] * x + e[5] * y + e[9] * z + e[13]) * w;
        self.z = (e[2] * x + e[6] * y + e[10] * z + e[14]) * w;
        self
    }

    /// Transforms as a direction (w = 0) by the upper 3x3 of `m` and unitizes.
    pub fn transform_direction(&mut self, m: &Matrix4) -> &mut Self {
        let e = m.elements();
        let (x, y, z) = (self.x, self.y, self.z);
        self.x = e[0] * x + e[4] * y + e[8] * z;
        self.y = e[1] * x + e[5] * y + e[9] * z;
        self.z = e[2] * x + e[6] * y + e[10] * z;
        self.unitize()
    }

    pub fn apply_quaternion(&mut self, q: &Quaternion) -> &mut Self {
        // t = 2 * cross(q.xyz, v); v' = v + q.w * t + cross(q.xyz, t)
        let (vx, vy, vz) = (self.x, self.y, self.z);
        let (qx, qy, qz, qw) = (q.x, q.y, q.z, q.w);

        let tx = 2.0 * (qy * vz - qz * vy);
        let ty = 2.0 * (qz * vx - qx * vz);
        let tz = 2.0 * (qx * vy - qy * vx);

        self.x = vx + qw * tx + qy * tz - qz * ty;
        self.y = vy + qw * ty + qz * tx - qx * tz;
        self.z = vz + qw * tz + qx * ty - qy * tx;
        self
    }

    pub fn set_from_matrix_position(&mut self, m: &Matrix4) -> &mut Self {
        let e = m.elements();
        self.set(e[12], e[13], e[14])
    }

    pub fn set_from_matrix_column(&mut self, m: &Matrix4, column: usize) -> &mut Self {
        *self = Self::from_array(m.elements(), column * 4);
        self
    }

    /// Sets each component to the length of the matching basis column of `m`.
    pub fn set_from_matrix_scale(&mut self, m: &Matrix4) -> &mut Self {
        let sx = Self::from_array(m.elements(), 0).length();
        let sy = Self::from_array(m.elements(), 4).length();
        let sz = Self::from_array(m.elements(), 8).length();
        self.set(sx, sy, sz)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Component-wise addition of two vectors.
impl Add<Vector3> for Vector3 {
    type Output = Vector3;

    fn add(self, rhs: Vector3) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

/// Component-wise subtraction of two vectors.
impl Sub<Vector3> for Vector3 {
    type Output = Vector3;

    fn sub(self, rhs: Vector3) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

/// Scalar multiplication of a vector.
impl Mul<f32> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Component-wise multiplication.
impl Mul<Vector3> for Vector3 {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        Self::new(self.x * rhs.x, self.y * rhs.y, self.z * rhs.z)
    }
}

/// Scalar division of a vector.
impl Div<f32> for Vector3 {
    type Output = Vector3;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

/// Negation of a vector.
impl Neg for Vector3 {
    type Output = Vector3;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl AddAssign for Vector3 {
    fn add_assign(&mut self, rhs: Vector3) {
        self.add_vector(rhs);
    }
}

impl SubAssign for Vector3 {
    fn sub_assign(&mut self, rhs: Vector3) {
        self.sub_vector(rhs);
    }
}

impl MulAssign<f32> for Vector3 {
    fn mul_assign(&mut self, rhs: f32) {
        self.multiply_scalar(rhs);
    }
}

impl Index<usize> for Vector3 {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            _ => panic!("Vector3 index out of range: {index}"),
        }
    }
}

impl From<[f32; 3]> for Vector3 {
    fn from(v: [f32; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }
}

impl AbsDiffEq for Vector3 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon)
            && self.y.abs_diff_eq(&other.y, epsilon)
            && self.z.abs_diff_eq(&other.z, epsilon)
    }
}

impl RelativeEq for Vector3 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
            && self.z.relative_eq(&other.z, epsilon, max_relative)
    }
}
