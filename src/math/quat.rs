//! Unit quaternion rotations.

use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};

use super::euler::{Euler, EulerOrder};
use super::mat4::Matrix4;
use super::vec3::Vector3;

/// Above this cosine of the half angle, `slerp` falls back to a normalized lerp.
const SLERP_LINEAR_THRESHOLD: f32 = 0.999;

/// Rotation stored as `(x, y, z, w)` with `w` the scalar part.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Quaternion {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians about the unit vector `axis`.
    pub fn from_axis_angle(axis: Vector3, angle: f32) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_axis_angle(axis, angle);
        q
    }

    pub fn from_euler(euler: &Euler) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_euler(euler);
        q
    }

    pub fn from_rotation_matrix(m: &Matrix4) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_rotation_matrix(m);
        q
    }

    /// Shortest rotation taking unit vector `from` onto unit vector `to`.
    pub fn from_unit_vectors(from: Vector3, to: Vector3) -> Self {
        let mut q = Self::IDENTITY;
        q.set_from_unit_vectors(from, to);
        q
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

    pub fn set_from_axis_angle(&mut self, axis: Vector3, angle: f32) -> &mut Self {
        let half = angle / 2.0;
        let s = half.sin();
        self.set(axis.x * s, axis.y * s, axis.z * s, half.cos())
    }

    /// Converts an Euler rotation, honoring its axis order.
    pub fn set_from_euler(&mut self, euler: &Euler) -> &mut Self {
        let (s1, c1) = (euler.x / 2.0).sin_cos();
        let (s2, c2) = (euler.y / 2.0).sin_cos();
        let (s3, c3) = (euler.z / 2.0).sin_cos();

        match euler.order {
            EulerOrder::XYZ => self.set(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::YXZ => self.set(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::ZXY => self.set(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::ZYX => self.set(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
            EulerOrder::YZX => self.set(
                s1 * c2 * c3 + c1 * s2 * s3,
                c1 * s2 * c3 + s1 * c2 * s3,
                c1 * c2 * s3 - s1 * s2 * c3,
                c1 * c2 * c3 - s1 * s2 * s3,
            ),
            EulerOrder::XZY => self.set(
                s1 * c2 * c3 - c1 * s2 * s3,
                c1 * s2 * c3 - s1 * c2 * s3,
                c1 * c2 * s3 + s1 * s2 * c3,
                c1 * c2 * c3 + s1 * s2 * s3,
            ),
        }
    }

    /// Extracts the rotation from the upper 3x3 of `m`, which must be unscaled.
    ///
    /// Branches on the largest diagonal term so the divisor stays well away from zero.
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4) -> &mut Self {
        let te = m.elements();
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);

        let trace = m11 + m22 + m33;

        if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            self.set(
                (m32 - m23) * s,
                (m13 - m31) * s,
                (m21 - m12) * s,
                0.25 / s,
            )
        } else if m11 > m22 && m11 > m33 {
            let s = 2.0 * (1.0 + m11 - m22 - m33).sqrt();
            self.set(
                0.25 * s,
                (m12 + m21) / s,
                (m13 + m31) / s,
                (m32 - m23) / s,
            )
        } else if m22 > m33 {
            let s = 2.0 * (1.0 + m22 - m11 - m33).sqrt();
            self.set(
                (m12 + m21) / s,
                0.25 * s,
                (m23 + m32) / s,
                (m13 - m31) / s,
            )
        } else {
            let s = 2.0 * (1.0 + m33 - m11 - m22).sqrt();
            self.set(
                (m13 + m31) / s,
                (m23 + m32) / s,
                0.25 * s,
                (m21 - m12) / s,
            )
        }
    }

    pub fn set_from_unit_vectors(&mut self, from: Vector3, to: Vector3) -> &mut Self {
        let r = from.dot(to) + 1.0;

        if r < 1e-6 {
            // Opposite vectors: rotate 180° about any axis orthogonal to `from`.
            if from.x.abs() > from.z.abs() {
                self.set(-from.y, from.x, 0.0, 0.0);
            } else {
                self.set(0.0, -from.z, from.y, 0.0);
            }
        } else {
            let axis = from.cross(to);
            self.set(axis.x, axis.y, axis.z, r);
        }

        self.unitize()
    }

    pub fn dot(&self, q: &Self) -> f32 {
        self.x * q.x + self.y * q.y + self.z * q.z + self.w * q.w
    }

    pub fn length_sq(&self) -> f32 {
        self.dot(self)
    }

    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Scales to unit length. A zero quaternion becomes the identity.
    pub fn unitize(&mut self) -> &mut Self {
        let length = self.length();
        if length == 0.0 {
            *self = Self::IDENTITY;
        } else {
            let inv = 1.0 / length;
            self.x *= inv;
            self.y *= inv;
            self.z *= inv;
            self.w *= inv;
        }
        self
    }

    pub fn conjugate(&mut self) -> &mut Self {
        self.x = -self.x;
        self.y = -self.y;
        self.z = -self.z;
        self
    }

    /// Inverse of a unit quaternion.
    pub fn invert(&mut self) -> &mut Self {
        self.conjugate()
    }

    pub fn inverse(mut self) -> Self {
        self.invert();
        self
    }

    /// `self = self * q`.
    pub fn multiply(&mut self, q: &Self) -> &mut Self {
        *self = Self::multiply_quaternions(self, q);
        self
    }

    /// `self = q * self`.
    pub fn premultiply(&mut self, q: &Self) -> &mut Self {
        *self = Self::multiply_quaternions(q, self);
        self
    }

    /// Hamilton product `a * b`: applies `b` first, then `a`.
    pub fn multiply_quaternions(a: &Self, b: &Self) -> Self {
        Self::new(
            a.x * b.w + a.w * b.x + a.y * b.z - a.z * b.y,
            a.y * b.w + a.w * b.y + a.z * b.x - a.x * b.z,
            a.z * b.w + a.w * b.z + a.x * b.y - a.y * b.x,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    /// Angle in radians between the two rotations.
    pub fn angle_to(&self, q: &Self) -> f32 {
        2.0 * self.dot(q).clamp(-1.0, 1.0).abs().acos()
    }

    /// Rotates towards `q` by at most `step` radians.
    pub fn rotate_towards(&mut self, q: &Self, step: f32) -> &mut Self {
        let angle = self.angle_to(q);
        if angle == 0.0 {
            return self;
        }
        let t = (step / angle).min(1.0);
        self.slerp(q, t)
    }

    /// Spherical interpolation towards `target` along the shorter arc.
    ///
    /// `t = 0` leaves `self` untouched and `t = 1` copies `target`.
    pub fn slerp(&mut self, target: &Self, t: f32) -> &mut Self {
        if t == 0.0 {
            return self;
        }
        if t == 1.0 {
            *self = *target;
            return self;
        }

        let start = *self;
        let mut end = *target;
        let mut cos_half_theta = start.dot(&end);

        if cos_half_theta < 0.0 {
            end = Self::new(-end.x, -end.y, -end.z, -end.w);
            cos_half_theta = -cos_half_theta;
        }

        if cos_half_theta >= SLERP_LINEAR_THRESHOLD {
            let s = 1.0 - t;
            self.set(
                s * start.x + t * end.x,
                s * start.y + t * end.y,
                s * start.z + t * end.z,
                s * start.w + t * end.w,
            );
            return self.unitize();
        }

        let sin_half_theta = (1.0 - cos_half_theta * cos_half_theta).sqrt();
        let half_theta = sin_half_theta.atan2(cos_half_theta);
        let ratio_a = ((1.0 - t) * half_theta).sin() / sin_half_theta;
        let ratio_b = (t * half_theta).sin() / sin_half_theta;

        self.set(
            start.x * ratio_a + end.x * ratio_b,
            start.y * ratio_a + end.y * ratio_b,
            start.z * ratio_a + end.z * ratio_b,
            start.w * ratio_a + end.w * ratio_b,
        )
    }

    /// By-value form of [`Quaternion::slerp`].
    pub fn slerp_quaternions(a: &Self, b: &Self, t: f32) -> Self {
        let mut q = *a;
        q.slerp(b, t);
        q
    }
}

impl Mul<Quaternion> for Quaternion {
    type Output = Quaternion;

    fn mul(self, rhs: Quaternion) -> Self::Output {
        Self::multiply_quaternions(&self, &rhs)
    }
}

/// Rotates a vector.
impl Mul<Vector3> for Quaternion {
    type Output = Vector3;

    fn mul(self, rhs: Vector3) -> Self::Output {
        let mut v = rhs;
        v.apply_quaternion(&self);
        v
    }
}

impl AbsDiffEq for Quaternion {
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

impl RelativeEq for Quaternion {
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
