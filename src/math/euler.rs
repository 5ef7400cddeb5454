//! Euler angle rotations with an explicit axis order.
//!
//! The order names the sequence in which the axis rotations are composed into
//! a matrix: `XYZ` is `Rx * Ry * Rz`, so with column vectors Z is applied first
//! in local space. Conversion to and from quaternions and matrices honours the
//! order exactly; the six orders each have their own closed form.

use std::fmt;
use std::str::FromStr;

use crate::error::RenderError;

use super::mat4::Matrix4;
use super::quat::Quaternion;
use super::vec3::Vector3;

/// `|entry|` at or above this is treated as gimbal lock.
const GIMBAL_LOCK_THRESHOLD: f32 = 0.9999999;
/// Cosine of the middle angle below which the matrix is locked even when
/// rounding kept the sine entry under [`GIMBAL_LOCK_THRESHOLD`].
const GIMBAL_LOCK_COS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EulerOrder {
    #[default]
    XYZ,
    YXZ,
    ZXY,
    ZYX,
    YZX,
    XZY,
}

impl EulerOrder {
    pub const ALL: [EulerOrder; 6] = [
        EulerOrder::XYZ,
        EulerOrder::YXZ,
        EulerOrder::ZXY,
        EulerOrder::ZYX,
        EulerOrder::YZX,
        EulerOrder::XZY,
    ];
}

impl fmt::Display for EulerOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EulerOrder::XYZ => "XYZ",
            EulerOrder::YXZ => "YXZ",
            EulerOrder::ZXY => "ZXY",
            EulerOrder::ZYX => "ZYX",
            EulerOrder::YZX => "YZX",
            EulerOrder::XZY => "XZY",
        };
        write!(f, "{name}")
    }
}

impl FromStr for EulerOrder {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EulerOrder::ALL
            .into_iter()
            .find(|order| order.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| RenderError::InvalidEulerOrder(s.to_string()))
    }
}

/// Rotation as three angles in radians plus the order they are applied in.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub order: EulerOrder,
}

impl Euler {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self::with_order(x, y, z, EulerOrder::XYZ)
    }

    pub const fn with_order(x: f32, y: f32, z: f32, order: EulerOrder) -> Self {
        Self { x, y, z, order }
    }

    pub fn from_rotation_matrix(m: &Matrix4, order: EulerOrder) -> Self {
        let mut e = Self::with_order(0.0, 0.0, 0.0, order);
        e.set_from_rotation_matrix(m, order);
        e
    }

    pub fn from_quaternion(q: &Quaternion, order: EulerOrder) -> Self {
        Self::from_rotation_matrix(&Matrix4::from_quaternion(q), order)
    }

    pub fn set(&mut self, x: f32, y: f32, z: f32, order: EulerOrder) -> &mut Self {
        self.x = x;
        self.y = y;
        self.z = z;
        self.order = order;
        self
    }

    /// Reads `x, y, z` starting at `offset`; the order is kept.
    pub fn from_array(array: &[f32], offset: usize, order: EulerOrder) -> Self {
        Self::with_order(array[offset], array[offset + 1], array[offset + 2], order)
    }

    pub fn to_array(&self, array: &mut [f32], offset: usize) {
        array[offset] = self.x;
        array[offset + 1] = self.y;
        array[offset + 2] = self.z;
    }

    pub fn to_vector3(&self) -> Vector3 {
        Vector3::new(self.x, self.y, self.z)
    }

    /// Recovers angles from the upper 3x3 of `m`, which must be unscaled.
    ///
    /// When the middle rotation reaches ±90° one degree of freedom is lost; the
    /// third angle is then pinned to zero and the remaining one absorbs the
    /// combined rotation.
    pub fn set_from_rotation_matrix(&mut self, m: &Matrix4, order: EulerOrder) -> &mut Self {
        let te = m.elements();
        let (m11, m12, m13) = (te[0], te[4], te[8]);
        let (m21, m22, m23) = (te[1], te[5], te[9]);
        let (m31, m32, m33) = (te[2], te[6], te[10]);

        // atan2 keeps the middle angle accurate near ±90°
        let locked = |sin: f32, cos: f32| sin.abs() >= GIMBAL_LOCK_THRESHOLD || cos < GIMBAL_LOCK_COS;

        let (x, y, z) = match order {
            EulerOrder::XYZ => {
                let cos = m11.hypot(m12);
                let y = m13.atan2(cos);
                if !locked(m13, cos) {
                    ((-m23).atan2(m33), y, (-m12).atan2(m11))
                } else {
                    (m32.atan2(m22), y, 0.0)
                }
            }
            EulerOrder::YXZ => {
                let cos = m21.hypot(m22);
                let x = (-m23).atan2(cos);
                if !locked(m23, cos) {
                    (x, m13.atan2(m33), m21.atan2(m22))
                } else {
                    (x, (-m31).atan2(m11), 0.0)
                }
            }
            EulerOrder::ZXY => {
                let cos = m31.hypot(m33);
                let x = m32.atan2(cos);
                if !locked(m32, cos) {
                    (x, (-m31).atan2(m33), (-m12).atan2(m22))
                } else {
                    (x, 0.0, m21.atan2(m11))
                }
            }
            EulerOrder::ZYX => {
                let cos = m32.hypot(m33);
                let y = (-m31).atan2(cos);
                if !locked(m31, cos) {
                    (m32.atan2(m33), y, m21.atan2(m11))
                } else {
                    (0.0, y, (-m12).atan2(m22))
                }
            }
            EulerOrder::YZX => {
                let cos = m22.hypot(m23);
                let z = m21.atan2(cos);
                if !locked(m21, cos) {
                    ((-m23).atan2(m22), (-m31).atan2(m11), z)
                } else {
                    (0.0, m13.atan2(m33), z)
                }
            }
            EulerOrder::XZY => {
                let cos = m11.hypot(m13);
                let z = (-m12).atan2(cos);
                if !locked(m12, cos) {
                    (m32.atan2(m22), m13.atan2(m11), z)
                } else {
                    ((-m23).atan2(m33), 0.0, z)
                }
            }
        };

        self.set(x, y, z, order)
    }

    pub fn set_from_quaternion(&mut self, q: &Quaternion, order: EulerOrder) -> &mut Self {
        self.set_from_rotation_matrix(&Matrix4::from_quaternion(q), order)
    }

    /// Re-expresses the same rotation in another axis order.
    pub fn reorder(&mut self, order: EulerOrder) -> &mut Self {
        let q = Quaternion::from_euler(self);
        self.set_from_quaternion(&q, order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const SAMPLES: [(f32, f32, f32); 6] = [
        (0.0, 0.0, 0.0),
        (0.3, -0.5, 1.1),
        (-1.2, 0.8, -2.5),
        (2.9, 1.2, 0.2),
        (0.1, 1.3, 0.4),
        (-1.3, 0.7, -0.9),
    ];

    fn sample_vector() -> Vector3 {
        Vector3::new(0.3, -1.7, 2.2)
    }

    #[test]
    fn quaternion_round_trip_preserves_rotation_for_every_order() {
        for order in EulerOrder::ALL {
            for (x, y, z) in SAMPLES {
                let e = Euler::with_order(x, y, z, order);
                let q = Quaternion::from_euler(&e);
                let back = Euler::from_quaternion(&q, order);

                let expected = Matrix4::from_euler(&e) * sample_vector();
                let actual = Matrix4::from_euler(&back) * sample_vector();
                assert_relative_eq!(expected, actual, epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn matrix_and_quaternion_formulas_agree() {
        for order in EulerOrder::ALL {
            for (x, y, z) in SAMPLES {
                let e = Euler::with_order(x, y, z, order);
                let from_euler = Matrix4::from_euler(&e);
                let from_quat = Matrix4::from_quaternion(&Quaternion::from_euler(&e));
                assert_relative_eq!(from_euler, from_quat, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn gimbal_lock_pins_third_angle() {
        let e = Euler::new(0.4, std::f32::consts::FRAC_PI_2, 0.3);
        let back = Euler::from_rotation_matrix(&Matrix4::from_euler(&e), EulerOrder::XYZ);
        assert_eq!(back.z, 0.0);
        assert_relative_eq!(back.y, std::f32::consts::FRAC_PI_2, epsilon = 1e-6);
    }

    #[test]
    fn quaternion_round_trip_at_gimbal_lock_for_every_order() {
        use std::f32::consts::FRAC_PI_2;

        for order in EulerOrder::ALL {
            for middle in [FRAC_PI_2, -FRAC_PI_2] {
                let (x, y, z) = match order {
                    EulerOrder::XYZ | EulerOrder::ZYX => (0.4, middle, 0.3),
                    EulerOrder::YXZ | EulerOrder::ZXY => (middle, 0.4, 0.3),
                    EulerOrder::YZX | EulerOrder::XZY => (0.4, 0.3, middle),
                };
                let e = Euler::with_order(x, y, z, order);
                let back = Euler::from_quaternion(&Quaternion::from_euler(&e), order);

                let expected = Matrix4::from_euler(&e) * sample_vector();
                let actual = Matrix4::from_euler(&back) * sample_vector();
                assert_relative_eq!(expected, actual, epsilon = 1e-5, max_relative = 1e-5);
            }
        }
    }

    #[test]
    fn reorder_keeps_orientation() {
        let mut e = Euler::new(0.2, 0.4, 0.6);
        let before = Matrix4::from_euler(&e) * sample_vector();
        e.reorder(EulerOrder::ZYX);
        assert_eq!(e.order, EulerOrder::ZYX);
        let after = Matrix4::from_euler(&e) * sample_vector();
        assert_relative_eq!(before, after, epsilon = 1e-5);
    }

    #[test]
    fn order_parses_case_insensitively() {
        assert_eq!("yxz".parse::<EulerOrder>().unwrap(), EulerOrder::YXZ);
        assert!("XXY".parse::<EulerOrder>().is_err());
    }
}
