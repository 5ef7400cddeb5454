//! 4x4 transformation matrix using column-major convention.
//!
//! # Convention
//! - Elements are stored column by column: element `(row, col)` lives at `[col * 4 + row]`
//! - Vectors are **column vectors** on the right: `Matrix4 * Vec`
//! - Translation is stored in the **last column** (`[12]`, `[13]`, `[14]`)
//! - Transforms chain **right-to-left**: `A * B * v` applies B first, then A
//! - Projections follow the OpenGL clip convention: right-handed eye space looking
//!   down -Z, NDC depth in `[-1, 1]`
//!
//! # Example
//! ```ignore
//! let transform = rotation * scale;  // scale applied first, then rotation
//! let result = transform * vertex;   // transform the vertex
//! ```

use std::ops::Mul;

use approx::{AbsDiffEq, RelativeEq};

use super::euler::{Euler, EulerOrder};
use super::quat::Quaternion;
use super::vec3::Vector3;
use super::vec4::Vector4;

/// Nudge applied to the view axis when `up` is parallel to it in [`Matrix4::look_at`].
const LOOK_AT_NUDGE: f32 = 0.0001;

/// 4x4 matrix stored as 16 column-major `f32`s.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix4 {
    elements: [f32; 16],
}

impl Default for Matrix4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Matrix4 {
    pub const IDENTITY: Self = Self {
        elements: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    pub const ZERO: Self = Self {
        elements: [0.0; 16],
    };

    /// Builds a matrix from rows, the way it is written on paper.
    pub fn new(rows: [[f32; 4]; 4]) -> Self {
        let mut elements = [0.0; 16];
        for (row, values) in rows.iter().enumerate() {
            for (col, value) in values.iter().enumerate() {
                elements[col * 4 + row] = *value;
            }
        }
        Self { elements }
    }

    /// Wraps 16 column-major elements.
    pub const fn from_elements(elements: [f32; 16]) -> Self {
        Self { elements }
    }

    pub fn identity() -> Self {
        Self::IDENTITY
    }

    /// Column-major elements.
    #[inline]
    pub fn elements(&self) -> &[f32; 16] {
        &self.elements
    }

    #[inline]
    pub fn elements_mut(&mut self) -> &mut [f32; 16] {
        &mut self.elements
    }

    /// Access element at (row, col).
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.elements[col * 4 + row]
    }

    /// Set element at (row, col).
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f32) {
        self.elements[col * 4 + row] = value;
    }

    pub fn from_array(array: &[f32], offset: usize) -> Self {
        let mut elements = [0.0; 16];
        elements.copy_from_slice(&array[offset..offset + 16]);
        Self { elements }
    }

    pub fn to_array(&self, array: &mut [f32], offset: usize) {
        array[offset..offset + 16].copy_from_slice(&self.elements);
    }

    // ============ Constructors ============

    /// Creates a translation matrix.
    pub fn make_translation(x: f32, y: f32, z: f32) -> Self {
        Self::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn from_translation(v: Vector3) -> Self {
        Self::make_translation(v.x, v.y, v.z)
    }

    /// Creates a scale matrix.
    pub fn make_scale(x: f32, y: f32, z: f32) -> Self {
        Self::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the X axis (counter-clockwise looking down -X).
    pub fn make_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, -s, 0.0],
            [0.0, s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Y axis.
    pub fn make_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            [c, 0.0, s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [-s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Creates a rotation matrix around the Z axis.
    pub fn make_rotation_z(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::new([
            [c, -s, 0.0, 0.0],
            [s, c, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation of `angle` radians about the unit vector `axis`.
    pub fn make_rotation_axis(axis: Vector3, angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        let t = 1.0 - c;
        let (x, y, z) = (axis.x, axis.y, axis.z);
        let (tx, ty) = (t * x, t * y);
        Self::new([
            [tx * x + c, tx * y - s * z, tx * z + s * y, 0.0],
            [tx * y + s * z, ty * y + c, ty * z - s * x, 0.0],
            [tx * z - s * y, ty * z + s * x, t * z * z + c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    pub fn from_quaternion(q: &Quaternion) -> Self {
        Self::compose(Vector3::ZERO, *q, Vector3::ONE)
    }

    /// Pure rotation matrix for an Euler rotation, honoring its axis order.
    pub fn from_euler(euler: &Euler) -> Self {
        let (b, a) = euler.x.sin_cos();
        let (d, c) = euler.y.sin_cos();
        let (f, e) = euler.z.sin_cos();

        let mut te = [0.0; 16];

        match euler.order {
            EulerOrder::XYZ => {
                let (ae, af, be, bf) = (a * e, a * f, b * e, b * f);
                te[0] = c * e;
                te[4] = -c * f;
                te[8] = d;
                te[1] = af + be * d;
                te[5] = ae - bf * d;
                te[9] = -b * c;
                te[2] = bf - ae * d;
                te[6] = be + af * d;
                te[10] = a * c;
            }
            EulerOrder::YXZ => {
                let (ce, cf, de, df) = (c * e, c * f, d * e, d * f);
                te[0] = ce + df * b;
                te[4] = de * b - cf;
                te[8] = a * d;
                te[1] = a * f;
                te[5] = a * e;
                te[9] = -b;
                te[2] = cf * b - de;
                te[6] = df + ce * b;
                te[10] = a * c;
            }
            EulerOrder::ZXY => {
                let (ce, cf, de, df) = (c * e, c * f, d * e, d * f);
                te[0] = ce - df * b;
                te[4] = -a * f;
                te[8] = de + cf * b;
                te[1] = cf + de * b;
                te[5] = a * e;
                te[9] = df - ce * b;
                te[2] = -a * d;
                te[6] = b;
                te[10] = a * c;
            }
            EulerOrder::ZYX => {
                let (ae, af, be, bf) = (a * e, a * f, b * e, b * f);
                te[0] = c * e;
                te[4] = be * d - af;
                te[8] = ae * d + bf;
                te[1] = c * f;
                te[5] = bf * d + ae;
                te[9] = af * d - be;
                te[2] = -d;
                te[6] = b * c;
                te[10] = a * c;
            }
            EulerOrder::YZX => {
                let (ac, ad, bc, bd) = (a * c, a * d, b * c, b * d);
                te[0] = c * e;
                te[4] = bd - ac * f;
                te[8] = bc * f + ad;
                te[1] = f;
                te[5] = a * e;
                te[9] = -b * e;
                te[2] = -d * e;
                te[6] = ad * f + bc;
                te[10] = ac - bd * f;
            }
            EulerOrder::XZY => {
                let (ac, ad, bc, bd) = (a * c, a * d, b * c, b * d);
                te[0] = c * e;
                te[4] = -f;
                te[8] = d * e;
                te[1] = ac * f + bd;
                te[5] = a * e;
                te[9] = ad * f - bc;
                te[2] = bc * f - ad;
                te[6] = b * e;
                te[10] = bd * f + ac;
            }
        }

        te[15] = 1.0;
        Self::from_elements(te)
    }

    /// Composes `T(position) * R(quaternion) * S(scale)`.
    pub fn compose(position: Vector3, quaternion: Quaternion, scale: Vector3) -> Self {
        let Quaternion { x, y, z, w } = quaternion;
        let (x2, y2, z2) = (x + x, y + y, z + z);
        let (xx, xy, xz) = (x * x2, x * y2, x * z2);
        let (yy, yz, zz) = (y * y2, y * z2, z * z2);
        let (wx, wy, wz) = (w * x2, w * y2, w * z2);
        let (sx, sy, sz) = (scale.x, scale.y, scale.z);

        Self::from_elements([
            (1.0 - (yy + zz)) * sx,
            (xy + wz) * sx,
            (xz - wy) * sx,
            0.0,
            (xy - wz) * sy,
            (1.0 - (xx + zz)) * sy,
            (yz + wx) * sy,
            0.0,
            (xz + wy) * sz,
            (yz - wx) * sz,
            (1.0 - (xx + yy)) * sz,
            0.0,
            position.x,
            position.y,
            position.z,
            1.0,
        ])
    }

    /// Splits an affine matrix into translation, rotation and scale.
    ///
    /// A negative determinant is attributed to the x scale so the remaining
    /// basis is a proper rotation. Zero scale columns are left unnormalized.
    pub fn decompose(&self) -> (Vector3, Quaternion, Vector3) {
        let te = &self.elements;

        let mut sx = Vector3::new(te[0], te[1], te[2]).length();
        let sy = Vector3::new(te[4], te[5], te[6]).length();
        let sz = Vector3::new(te[8], te[9], te[10]).length();

        if self.determinant() < 0.0 {
            sx = -sx;
        }

        let position = Vector3::new(te[12], te[13], te[14]);

        let mut rotation = *self;
        for (col, s) in [sx, sy, sz].into_iter().enumerate() {
            if s != 0.0 {
                let inv = 1.0 / s;
                for row in 0..3 {
                    rotation.elements[col * 4 + row] *= inv;
                }
            }
        }

        let quaternion = Quaternion::from_rotation_matrix(&rotation);
        (position, quaternion, Vector3::new(sx, sy, sz))
    }

    /// Rotation basis that orients -Z from `eye` toward `target` (cameras) or
    /// +Z from `target` toward `eye` (objects, with the arguments swapped).
    ///
    /// Degenerate inputs never produce NaN: coincident points look down +Z and an
    /// `up` parallel to the view axis nudges the axis before the basis is rebuilt.
    pub fn look_at(eye: Vector3, target: Vector3, up: Vector3) -> Self {
        let mut z = eye - target;
        if z.length_sq() == 0.0 {
            z.z = 1.0;
        }
        z.unitize();

        let mut x = up.cross(z);
        if x.length_sq() == 0.0 {
            if up.z.abs() == 1.0 {
                z.x += LOOK_AT_NUDGE;
            } else {
                z.z += LOOK_AT_NUDGE;
            }
            z.unitize();
            x = up.cross(z);
        }
        x.unitize();

        let y = z.cross(x);

        Self::new([
            [x.x, y.x, z.x, 0.0],
            [x.y, y.y, z.y, 0.0],
            [x.z, y.z, z.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// General frustum projection (OpenGL convention).
    pub fn make_perspective(
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let x = 2.0 * near / (right - left);
        let y = 2.0 * near / (top - bottom);
        let a = (right + left) / (right - left);
        let b = (top + bottom) / (top - bottom);
        let c = -(far + near) / (far - near);
        let d = -2.0 * far * near / (far - near);

        Self::new([
            [x, 0.0, a, 0.0],
            [0.0, y, b, 0.0],
            [0.0, 0.0, c, d],
            [0.0, 0.0, -1.0, 0.0],
        ])
    }

    /// Symmetric perspective from a vertical field of view in radians.
    pub fn perspective(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let top = near * (fov_y / 2.0).tan();
        let right = top * aspect_ratio;
        Self::make_perspective(-right, right, top, -top, near, far)
    }

    /// Box-to-NDC projection (OpenGL convention).
    pub fn make_orthographic(
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let w = 1.0 / (right - left);
        let h = 1.0 / (top - bottom);
        let p = 1.0 / (far - near);

        Self::new([
            [2.0 * w, 0.0, 0.0, -(right + left) * w],
            [0.0, 2.0 * h, 0.0, -(top + bottom) * h],
            [0.0, 0.0, -2.0 * p, -(far + near) * p],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation part of `m` with the scale divided out.
    pub fn extract_rotation(m: &Matrix4) -> Self {
        let mut scale = Vector3::ZERO;
        scale.set_from_matrix_scale(m);

        let mut result = Self::IDENTITY;
        for (col, s) in [scale.x, scale.y, scale.z].into_iter().enumerate() {
            let inv = if s != 0.0 { 1.0 / s } else { 0.0 };
            for row in 0..3 {
                result.elements[col * 4 + row] = m.elements[col * 4 + row] * inv;
            }
        }
        result
    }

    // ============ Arithmetic ============

    /// `a * b`.
    pub fn multiply_matrices(a: &Matrix4, b: &Matrix4) -> Self {
        let ae = &a.elements;
        let be = &b.elements;
        let mut result = [0.0f32; 16];

        for col in 0..4 {
            for row in 0..4 {
                result[col * 4 + row] = ae[row] * be[col * 4]
                    + ae[4 + row] * be[col * 4 + 1]
                    + ae[8 + row] * be[col * 4 + 2]
                    + ae[12 + row] * be[col * 4 + 3];
            }
        }

        Self::from_elements(result)
    }

    /// `self = self * m`.
    pub fn multiply(&mut self, m: &Matrix4) -> &mut Self {
        *self = Self::multiply_matrices(self, m);
        self
    }

    /// `self = m * self`.
    pub fn premultiply(&mut self, m: &Matrix4) -> &mut Self {
        *self = Self::multiply_matrices(m, self);
        self
    }

    pub fn multiply_scalar(&mut self, s: f32) -> &mut Self {
        for e in self.elements.iter_mut() {
            *e *= s;
        }
        self
    }

    /// Scales the basis columns by `v`.
    pub fn scale(&mut self, v: Vector3) -> &mut Self {
        for (col, s) in [v.x, v.y, v.z].into_iter().enumerate() {
            for row in 0..4 {
                self.elements[col * 4 + row] *= s;
            }
        }
        self
    }

    pub fn set_position(&mut self, v: Vector3) -> &mut Self {
        self.elements[12] = v.x;
        self.elements[13] = v.y;
        self.elements[14] = v.z;
        self
    }

    pub fn position(&self) -> Vector3 {
        Vector3::new(self.elements[12], self.elements[13], self.elements[14])
    }

    /// Largest basis column length; bounds how far a unit radius can stretch.
    pub fn max_scale_on_axis(&self) -> f32 {
        let te = &self.elements;
        let sx = te[0] * te[0] + te[1] * te[1] + te[2] * te[2];
        let sy = te[4] * te[4] + te[5] * te[5] + te[6] * te[6];
        let sz = te[8] * te[8] + te[9] * te[9] + te[10] * te[10];
        sx.max(sy).max(sz).sqrt()
    }

    /// Returns the transposed matrix.
    pub fn transpose(&self) -> Self {
        let mut result = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                result[row * 4 + col] = self.elements[col * 4 + row];
            }
        }
        Self::from_elements(result)
    }

    /// Row-major 2D view used by the cofactor expansion.
    fn rows(&self) -> [[f32; 4]; 4] {
        let mut m = [[0.0; 4]; 4];
        for (row, values) in m.iter_mut().enumerate() {
            for (col, value) in values.iter_mut().enumerate() {
                *value = self.get(row, col);
            }
        }
        m
    }

    /// Cofactors of the first row, shared by `determinant` and the inverse.
    fn first_row_cofactors(m: &[[f32; 4]; 4]) -> [f32; 4] {
        let c00 = m[1][1] * (m[2][2] * m[3][3] - m[2][3] * m[3][2])
            - m[1][2] * (m[2][1] * m[3][3] - m[2][3] * m[3][1])
            + m[1][3] * (m[2][1] * m[3][2] - m[2][2] * m[3][1]);

        let c01 = -(m[1][0] * (m[2][2] * m[3][3] - m[2][3] * m[3][2])
            - m[1][2] * (m[2][0] * m[3][3] - m[2][3] * m[3][0])
            + m[1][3] * (m[2][0] * m[3][2] - m[2][2] * m[3][0]));

        let c02 = m[1][0] * (m[2][1] * m[3][3] - m[2][3] * m[3][1])
            - m[1][1] * (m[2][0] * m[3][3] - m[2][3] * m[3][0])
            + m[1][3] * (m[2][0] * m[3][1] - m[2][1] * m[3][0]);

        let c03 = -(m[1][0] * (m[2][1] * m[3][2] - m[2][2] * m[3][1])
            - m[1][1] * (m[2][0] * m[3][2] - m[2][2] * m[3][0])
            + m[1][2] * (m[2][0] * m[3][1] - m[2][1] * m[3][0]));

        [c00, c01, c02, c03]
    }

    pub fn determinant(&self) -> f32 {
        let m = self.rows();
        let c = Self::first_row_cofactors(&m);
        m[0][0] * c[0] + m[0][1] * c[1] + m[0][2] * c[2] + m[0][3] * c[3]
    }

    /// Computes the inverse via the adjugate (transposed cofactor matrix).
    /// Returns `None` if the determinant is exactly zero.
    pub fn try_inverse(&self) -> Option<Matrix4> {
        let m = self.rows();

        let [c00, c01, c02, c03] = Self::first_row_cofactors(&m);

        // Determinant using first row expansion
        let det = m[0][0] * c00 + m[0][1] * c01 + m[0][2] * c02 + m[0][3] * c03;

        if det == 0.0 {
            return None;
        }

        let inv_det = 1.0 / det;

        let c10 = -(m[0][1] * (m[2][2] * m[3][3] - m[2][3] * m[3][2])
            - m[0][2] * (m[2][1] * m[3][3] - m[2][3] * m[3][1])
            + m[0][3] * (m[2][1] * m[3][2] - m[2][2] * m[3][1]));

        let c11 = m[0][0] * (m[2][2] * m[3][3] - m[2][3] * m[3][2])
            - m[0][2] * (m[2][0] * m[3][3] - m[2][3] * m[3][0])
            + m[0][3] * (m[2][0] * m[3][2] - m[2][2] * m[3][0]);

        let c12 = -(m[0][0] * (m[2][1] * m[3][3] - m[2][3] * m[3][1])
            - m[0][1] * (m[2][0] * m[3][3] - m[2][3] * m[3][0])
            + m[0][3] * (m[2][0] * m[3][1] - m[2][1] * m[3][0]));

        let c13 = m[0][0] * (m[2][1] * m[3][2] - m[2][2] * m[3][1])
            - m[0][1] * (m[2][0] * m[3][2] - m[2][2] * m[3][0])
            + m[0][2] * (m[2][0] * m[3][1] - m[2][1] * m[3][0]);

        let c20 = m[0][1] * (m[1][2] * m[3][3] - m[1][3] * m[3][2])
            - m[0][2] * (m[1][1] * m[3][3] - m[1][3] * m[3][1])
            + m[0][3] * (m[1][1] * m[3][2] - m[1][2] * m[3][1]);

        let c21 = -(m[0][0] * (m[1][2] * m[3][3] - m[1][3] * m[3][2])
            - m[0][2] * (m[1][0] * m[3][3] - m[1][3] * m[3][0])
            + m[0][3] * (m[1][0] * m[3][2] - m[1][2] * m[3][0]));

        let c22 = m[0][0] * (m[1][1] * m[3][3] - m[1][3] * m[3][1])
            - m[0][1] * (m[1][0] * m[3][3] - m[1][3] * m[3][0])
            + m[0][3] * (m[1][0] * m[3][1] - m[1][1] * m[3][0]);

        let c23 = -(m[0][0] * (m[1][1] * m[3][2] - m[1][2] * m[3][1])
            - m[0][1] * (m[1][0] * m[3][2] - m[1][2] * m[3][0])
            + m[0][2] * (m[1][0] * m[3][1] - m[1][1] * m[3][0]));

        let c30 = -(m[0][1] * (m[1][2] * m[2][3] - m[1][3] * m[2][2])
            - m[0][2] * (m[1][1] * m[2][3] - m[1][3] * m[2][1])
            + m[0][3] * (m[1][1] * m[2][2] - m[1][2] * m[2][1]));

        let c31 = m[0][0] * (m[1][2] * m[2][3] - m[1][3] * m[2][2])
            - m[0][2] * (m[1][0] * m[2][3] - m[1][3] * m[2][0])
            + m[0][3] * (m[1][0] * m[2][2] - m[1][2] * m[2][0]);

        let c32 = -(m[0][0] * (m[1][1] * m[2][3] - m[1][3] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][3] - m[1][3] * m[2][0])
            + m[0][3] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]));

        let c33 = m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0]);

        // The inverse is the transpose of the cofactor matrix divided by determinant
        Some(Matrix4::new([
            [c00 * inv_det, c10 * inv_det, c20 * inv_det, c30 * inv_det],
            [c01 * inv_det, c11 * inv_det, c21 * inv_det, c31 * inv_det],
            [c02 * inv_det, c12 * inv_det, c22 * inv_det, c32 * inv_det],
            [c03 * inv_det, c13 * inv_det, c23 * inv_det, c33 * inv_det],
        ]))
    }

    /// Inverts in place. A singular matrix becomes [`Matrix4::ZERO`].
    pub fn invert(&mut self) -> &mut Self {
        *self = self.try_inverse().unwrap_or(Self::ZERO);
        self
    }

    /// By-value form of [`Matrix4::invert`].
    pub fn inverse(&self) -> Self {
        self.try_inverse().unwrap_or(Self::ZERO)
    }

    pub fn is_zero(&self) -> bool {
        self.elements.iter().all(|e| *e == 0.0)
    }
}

/// Matrix multiplication: Matrix4 * Matrix4.
///
/// For column-major convention, `A * B * v` applies B first, then A.
impl Mul<Matrix4> for Matrix4 {
    type Output = Matrix4;

    fn mul(self, rhs: Matrix4) -> Self::Output {
        Matrix4::multiply_matrices(&self, &rhs)
    }
}

/// Transform a Vector4 by a matrix: Matrix4 * Vector4 (column vector).
impl Mul<Vector4> for Matrix4 {
    type Output = Vector4;

    fn mul(self, v: Vector4) -> Self::Output {
        let e = &self.elements;
        Vector4::new(
            e[0] * v.x + e[4] * v.y + e[8] * v.z + e[12] * v.w,
            e[1] * v.x + e[5] * v.y + e[9] * v.z + e[13] * v.w,
            e[2] * v.x + e[6] * v.y + e[10] * v.z + e[14] * v.w,
            e[3] * v.x + e[7] * v.y + e[11] * v.z + e[15] * v.w,
        )
    }
}

/// Transform a point: Matrix4 * Vector3 (treats Vector3 as column vector with w=1).
///
/// Applies perspective division when the resulting w is non-zero.
impl Mul<Vector3> for Matrix4 {
    type Output = Vector3;

    fn mul(self, v: Vector3) -> Self::Output {
        let mut result = v;
        result.apply_matrix4(&self);
        result
    }
}

impl AbsDiffEq for Matrix4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl RelativeEq for Matrix4 {
    fn default_max_relative() -> f32 {
        f32::EPSILON
    }

    fn relative_eq(&self, other: &Self, epsilon: f32, max_relative: f32) -> bool {
        self.elements
            .iter()
            .zip(other.elements.iter())
            .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn sample_transform() -> Matrix4 {
        Matrix4::compose(
            Vector3::new(1.5, -2.0, 3.25),
            Quaternion::from_axis_angle(Vector3::new(1.0, 2.0, -0.5).unitized(), 0.8),
            Vector3::new(2.0, 0.5, 1.5),
        )
    }

    #[test]
    fn identity_is_multiplicative_identity() {
        let m = sample_transform();
        assert_eq!(m * Matrix4::IDENTITY, m);
        assert_eq!(Matrix4::IDENTITY * m, m);
    }

    #[test]
    fn column_major_layout() {
        let m = Matrix4::make_translation(1.0, 2.0, 3.0);
        assert_eq!(&m.elements()[12..15], &[1.0, 2.0, 3.0]);
        assert_eq!(m.get(0, 3), 1.0);
    }

    #[test]
    fn invert_twice_returns_original() {
        let m = sample_transform();
        assert_relative_eq!(m.inverse().inverse(), m, epsilon = 1e-4);
    }

    #[test]
    fn matrix_times_inverse_is_identity() {
        let m = sample_transform() * Matrix4::perspective(1.2, 1.5, 0.1, 50.0);
        assert_relative_eq!(m * m.inverse(), Matrix4::IDENTITY, epsilon = 1e-4);
    }

    #[test]
    fn singular_inverse_is_zero() {
        let mut m = Matrix4::make_scale(1.0, 0.0, 1.0);
        m.invert();
        assert!(m.is_zero());
        assert!(Matrix4::make_scale(1.0, 0.0, 1.0).try_inverse().is_none());
    }

    #[test]
    fn decompose_recovers_components() {
        let position = Vector3::new(4.0, 5.0, -6.0);
        let rotation = Quaternion::from_axis_angle(Vector3::UP, 0.7);
        let scale = Vector3::new(1.0, 2.0, 3.0);
        let (p, q, s) = Matrix4::compose(position, rotation, scale).decompose();

        assert_relative_eq!(p, position);
        assert_relative_eq!(s, scale, epsilon = 1e-5);
        let v = Vector3::new(0.5, -1.0, 2.0);
        assert_relative_eq!(q * v, rotation * v, epsilon = 1e-5);
    }

    #[test]
    fn decompose_mirrored_flips_x_scale() {
        let m = Matrix4::make_scale(-2.0, 1.0, 1.0);
        let (_, q, s) = m.decompose();
        assert_relative_eq!(s, Vector3::new(-2.0, 1.0, 1.0));
        assert_relative_eq!(q, Quaternion::IDENTITY, epsilon = 1e-6);
    }

    #[test]
    fn look_at_faces_target() {
        let m = Matrix4::look_at(Vector3::new(0.0, 0.0, 5.0), Vector3::ZERO, Vector3::UP);
        // -Z of the basis points from eye to target
        let forward = m * Vector3::FORWARD;
        assert_relative_eq!(forward, Vector3::FORWARD, epsilon = 1e-6);
    }

    #[test]
    fn look_at_degenerate_inputs_stay_finite() {
        let same = Matrix4::look_at(Vector3::ONE, Vector3::ONE, Vector3::UP);
        assert!(same.elements().iter().all(|e| e.is_finite()));

        let parallel = Matrix4::look_at(Vector3::new(0.0, 5.0, 0.0), Vector3::ZERO, Vector3::UP);
        assert!(parallel.elements().iter().all(|e| e.is_finite()));
        assert_relative_eq!(parallel.determinant(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn perspective_maps_near_and_far_to_ndc_bounds() {
        let p = Matrix4::perspective(FRAC_PI_2, 1.0, 1.0, 10.0);
        assert_relative_eq!((p * Vector3::new(0.0, 0.0, -1.0)).z, -1.0, epsilon = 1e-6);
        assert_relative_eq!((p * Vector3::new(0.0, 0.0, -10.0)).z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn orthographic_maps_box_to_cube() {
        let o = Matrix4::make_orthographic(-2.0, 2.0, 1.0, -1.0, 0.5, 10.0);
        assert_relative_eq!(o * Vector3::new(2.0, 1.0, -0.5), Vector3::new(1.0, 1.0, -1.0), epsilon = 1e-6);
        assert_relative_eq!(o * Vector3::new(-2.0, -1.0, -10.0), Vector3::new(-1.0, -1.0, 1.0), epsilon = 1e-6);
    }

    #[test]
    fn rotation_x_is_right_handed() {
        let v = Matrix4::make_rotation_x(FRAC_PI_2) * Vector3::UP;
        assert_relative_eq!(v, Vector3::BACK, epsilon = 1e-6);
    }

    #[test]
    fn rotation_axis_matches_quaternion() {
        let axis = Vector3::new(0.3, 0.4, -0.2).unitized();
        let a = Matrix4::make_rotation_axis(axis, 1.1);
        let b = Matrix4::from_quaternion(&Quaternion::from_axis_angle(axis, 1.1));
        assert_relative_eq!(a, b, epsilon = 1e-6);
    }

    #[test]
    fn max_scale_on_axis() {
        assert_relative_eq!(sample_transform().max_scale_on_axis(), 2.0, epsilon = 1e-5);
    }
}
