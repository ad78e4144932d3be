use super::fix32::Fix32;
use super::fix32_math::sqrt_raw;
use super::vector3::Vector3;
use glam::Quat;
use std::ops::Add;

/// Rotation quaternion of [`Fix32`] components.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Quaternion {
    pub x: Fix32,
    pub y: Fix32,
    pub z: Fix32,
    pub w: Fix32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    pub const IDENTITY: Self = Self::new(Fix32::ZERO, Fix32::ZERO, Fix32::ZERO, Fix32::ONE);

    #[inline(always)]
    pub const fn new(x: Fix32, y: Fix32, z: Fix32, w: Fix32) -> Self {
        Self { x, y, z, w }
    }

    /// Explicit conversion from a float quaternion.
    pub fn from_quat(q: Quat) -> Self {
        Self::new(
            Fix32::from_f32(q.x),
            Fix32::from_f32(q.y),
            Fix32::from_f32(q.z),
            Fix32::from_f32(q.w),
        )
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_xyzw(self.x.to_f32(), self.y.to_f32(), self.z.to_f32(), self.w.to_f32())
    }

    /// Creates a quaternion from a unit axis and an angle.
    pub fn from_axis_angle(axis: Vector3, angle: Fix32) -> Self {
        let half_angle = angle * Fix32::HALF;
        let s = half_angle.sin();
        Self::new(axis.x * s, axis.y * s, axis.z * s, half_angle.cos())
    }

    #[inline(always)]
    pub fn length_squared(&self) -> Fix32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    /// Ensures the quaternion has unit length. A zero quaternion becomes the identity.
    pub fn normalize(self) -> Self {
        let length_squared = self.length_squared();
        if length_squared.is_zero() {
            return Self::IDENTITY;
        }
        let length = Fix32::from_raw(sqrt_raw(length_squared.raw() as u32) as i32);
        Self::new(self.x / length, self.y / length, self.z / length, self.w / length)
    }

    #[inline(always)]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Concatenates the transforms of two quaternions together such that the resulting quaternion,
    /// applied as an orientation to a vector v, is equivalent to transformed = (v * a) * b.
    #[inline(always)]
    pub fn concatenate(a: Self, b: Self) -> Self {
        Self::new(
            a.w * b.x + a.x * b.w + a.z * b.y - a.y * b.z,
            a.w * b.y + a.y * b.w + a.x * b.z - a.z * b.x,
            a.w * b.z + a.z * b.w + a.y * b.x - a.x * b.y,
            a.w * b.w - a.x * b.x - a.y * b.y - a.z * b.z,
        )
    }

    /// Transforms the vector using the quaternion, which must be normalized.
    pub fn transform(self, v: Vector3) -> Vector3 {
        // v' = q * v * q^-1, expanded with the conjugate standing in for the inverse.
        let x2 = self.x + self.x;
        let y2 = self.y + self.y;
        let z2 = self.z + self.z;
        let xx2 = self.x * x2;
        let xy2 = self.x * y2;
        let xz2 = self.x * z2;
        let yy2 = self.y * y2;
        let yz2 = self.y * z2;
        let zz2 = self.z * z2;
        let wx2 = self.w * x2;
        let wy2 = self.w * y2;
        let wz2 = self.w * z2;
        Vector3::new(
            v.x * (Fix32::ONE - yy2 - zz2) + v.y * (xy2 - wz2) + v.z * (xz2 + wy2),
            v.x * (xy2 + wz2) + v.y * (Fix32::ONE - xx2 - zz2) + v.z * (yz2 - wx2),
            v.x * (xz2 - wy2) + v.y * (yz2 + wx2) + v.z * (Fix32::ONE - xx2 - yy2),
        )
    }

    /// Advances the orientation by a world space angular velocity over `dt` and renormalizes.
    pub fn integrate(self, angular_velocity: Vector3, dt: Fix32) -> Self {
        let half_dt = dt * Fix32::HALF;
        let spin = Self::new(
            angular_velocity.x * half_dt,
            angular_velocity.y * half_dt,
            angular_velocity.z * half_dt,
            Fix32::ZERO,
        );
        (self + Self::concatenate(self, spin)).normalize()
    }
}

impl Add for Quaternion {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z, self.w + other.w)
    }
}
