//! 2D vector, used for screen-space positions and texture coordinates.

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };
    pub const ONE: Self = Self { x: 1.0, y: 1.0 };
    pub const RIGHT: Self = Self { x: 1.0, y: 0.0 };
    pub const LEFT: Self = Self { x: -1.0, y: 0.0 };
    pub const UP: Self = Self { x: 0.0, y: 1.0 };
    pub const DOWN: Self = Self { x: 0.0, y: -1.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn set(&mut self, x: f32, y: f32) -> &mut Self {
        self.x = x;
        self.y = y;
        self
    }

    /// Reads two components starting at `offset`.
    pub fn from_array(array: &[f32], offset: usize) -> Self {
        Self::new(array[offset], array[offset + 1])
    }

    /// Writes two components starting at `offset`.
    pub fn to_array(&self, array: &mut [f32], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
    }

    pub fn add_vector(&mut self, v: Self) -> &mut Self {
        self.x += v.x;
        self.y += v.y;
        self
    }

    pub fn sub_vector(&mut self, v: Self) -> &mut Self {
        self.x -= v.x;
        self.y -= v.y;
        self
    }

    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        self.x *= s;
        self.y *= s;
        self
    }

    pub fn divide_scalar(&mut self, s: f32) -> &mut Self {
        self.multiply_scalar(1.0 / s)
    }

    pub fn dot(&self, v: Self) -> f32 {
        self.x * v.x + self.y * v.y
    }

    /// Z component of the 3D cross product of the two vectors extended with z = 0.
    pub fn cross(&self, v: Self) -> f32 {
        self.x * v.y - self.y * v.x
    }

    pub fn length_sq(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f32 {
        self.length_sq().sqrt()
    }

    pub fn manhattan_length(&self) -> f32 {
        self.x.abs() + self.y.abs()
    }

    /// Scales to unit length. A zero vector is left unchanged.
    pub fn unitize(&mut self) -> &mut Self {
        let length = self.length();
        if length > 0.0 {
            self.multiply_scalar(1.0 / length);
        }
        self
    }

    pub fn unitized(mut self) -> Self {
        self.unitize();
        self
    }

    pub fn distance_to(&self, v: Self) -> f32 {
        (*self - v).length()
    }

    /// Angle in radians of this vector relative to the positive x axis, in `[0, 2π)`.
    pub fn angle(&self) -> f32 {
        (-self.y).atan2(-self.x) + std::f32::consts::PI
    }

    pub fn rotate_around(&mut self, center: Self, angle: f32) -> &mut Self {
        let (s, c) = angle.sin_cos();
        let x = self.x - center.x;
        let y = self.y - center.y;
        self.x = x * c - y * s + center.x;
        self.y = x * s + y * c + center.y;
        self
    }

    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn min(self, other: Self) -> Self {
        Self::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Self) -> Self {
        Self::new(self.x.max(other.x), self.y.max(other.y))
    }
}

impl Add<Vector2> for Vector2 {
    type Output = Vector2;

    fn add(self, rhs: Vector2) -> Self::Output {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vector2> for Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: Vector2) -> Self::Output {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: f32) -> Self::Output {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vector2 {
    type Output = Vector2;

    fn div(self, rhs: f32) -> Self::Output {
        Self::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vector2 {
    type Output = Vector2;

    fn neg(self) -> Self::Output {
        Self::new(-self.x, -self.y)
    }
}

impl AddAssign for Vector2 {
    fn add_assign(&mut self, rhs: Vector2) {
        self.add_vector(rhs);
    }
}

impl SubAssign for Vector2 {
    fn sub_assign(&mut self, rhs: Vector2) {
        self.sub_vector(rhs);
    }
}

impl MulAssign<f32> for Vector2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.multiply_scalar(rhs);
    }
}

impl AbsDiffEq for Vector2 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.x.abs_diff_eq(&other.x, epsilon) && self.y.abs_diff_eq(&other.y, epsilon)
    }
}

impl RelativeEq for Vector2 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.x.relative_eq(&other.x, epsilon, max_relative)
            && self.y.relative_eq(&other.y, epsilon, max_relative)
    }
}
