use super::fix32::Fix32;
use super::fix32_math::sqrt_raw;
use glam::Vec3;
use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// Three component vector of [`Fix32`].
///
/// Arithmetic is component-wise and saturating, like the scalar operators it is built on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: Fix32,
    pub y: Fix32,
    pub z: Fix32,
}

impl Vector3 {
    pub const ZERO: Self = Self::splat(Fix32::ZERO);
    pub const UNIT_X: Self = Self::new(Fix32::ONE, Fix32::ZERO, Fix32::ZERO);
    pub const UNIT_Y: Self = Self::new(Fix32::ZERO, Fix32::ONE, Fix32::ZERO);
    pub const UNIT_Z: Self = Self::new(Fix32::ZERO, Fix32::ZERO, Fix32::ONE);

    /// Raw bit width the largest component is shifted to before taking a length.
    const NORMALIZED_BITS: i32 = Fix32::FRACTION_BITS as i32;

    /// Constructs a new `Vector3`.
    #[inline(always)]
    pub const fn new(x: Fix32, y: Fix32, z: Fix32) -> Self {
        Self { x, y, z }
    }

    #[inline(always)]
    pub const fn splat(value: Fix32) -> Self {
        Self::new(value, value, value)
    }

    /// Constructs a vector from integer components.
    #[inline(always)]
    pub const fn from_i32(x: i32, y: i32, z: i32) -> Self {
        Self::new(Fix32::from_i32(x), Fix32::from_i32(y), Fix32::from_i32(z))
    }

    /// Explicit, saturating conversion from a float vector.
    #[inline]
    pub fn from_vec3(v: Vec3) -> Self {
        Self::new(Fix32::from_f32(v.x), Fix32::from_f32(v.y), Fix32::from_f32(v.z))
    }

    #[inline]
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x.to_f32(), self.y.to_f32(), self.z.to_f32())
    }

    /// Computes the dot product of two vectors.
    #[inline(always)]
    pub fn dot(self, other: Self) -> Fix32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Computes the cross product of two vectors.
    #[inline(always)]
    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    #[inline(always)]
    pub fn length_squared(self) -> Fix32 {
        self.dot(self)
    }

    /// Shift that brings the largest component magnitude to exactly `NORMALIZED_BITS` bits.
    /// `None` for the zero vector.
    #[inline]
    fn normalizing_shift(self) -> Option<i32> {
        let largest = self
            .x
            .raw()
            .unsigned_abs()
            .max(self.y.raw().unsigned_abs())
            .max(self.z.raw().unsigned_abs());
        if largest == 0 {
            return None;
        }
        let bits = (u32::BITS - largest.leading_zeros()) as i32;
        Some(Self::NORMALIZED_BITS - bits)
    }

    #[inline]
    fn shifted(self, shift: i32) -> Self {
        let shift_component = |c: Fix32| {
            if shift >= 0 {
                Fix32::from_raw(c.raw() << shift)
            } else {
                Fix32::from_raw(c.raw() >> -shift)
            }
        };
        Self::new(shift_component(self.x), shift_component(self.y), shift_component(self.z))
    }

    /// Euclidean length. Rescales internally, so tiny and large vectors keep full precision
    /// instead of underflowing or saturating in the squared sum.
    pub fn length(self) -> Fix32 {
        let Some(shift) = self.normalizing_shift() else {
            return Fix32::ZERO;
        };
        let scaled = self.shifted(shift);
        let scaled_length = sqrt_raw(scaled.length_squared().raw() as u32) as i64;
        let length = if shift >= 0 {
            scaled_length >> shift
        } else {
            scaled_length << -shift
        };
        Fix32::from_raw(length.min(i32::MAX as i64) as i32)
    }

    /// Unit vector in the same direction, or `None` for the zero vector.
    pub fn normalize(self) -> Option<Self> {
        let shift = self.normalizing_shift()?;
        let scaled = self.shifted(shift);
        let length = Fix32::from_raw(sqrt_raw(scaled.length_squared().raw() as u32) as i32);
        Some(scaled / length)
    }

    /// Scales the vector by a scalar.
    #[inline(always)]
    pub fn scale(self, scale: Fix32) -> Self {
        Self::new(self.x * scale, self.y * scale, self.z * scale)
    }

    /// Scales the vector, rounding each component to nearest. See [`Fix32::rounding_mul`].
    #[inline(always)]
    pub fn rounding_scale(self, scale: Fix32) -> Self {
        Self::new(self.x.rounding_mul(scale), self.y.rounding_mul(scale), self.z.rounding_mul(scale))
    }

    #[inline(always)]
    pub fn is_zero(self) -> bool {
        self == Self::ZERO
    }
}

impl Add for Vector3 {
    type Output = Self;

    #[inline(always)]
    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl Sub for Vector3 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl Neg for Vector3 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<Fix32> for Vector3 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, scalar: Fix32) -> Self {
        self.scale(scalar)
    }
}

impl Div<Fix32> for Vector3 {
    type Output = Self;

    #[inline(always)]
    fn div(self, scalar: Fix32) -> Self {
        Self::new(self.x / scalar, self.y / scalar, self.z / scalar)
    }
}

impl AddAssign for Vector3 {
    #[inline(always)]
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl SubAssign for Vector3 {
    #[inline(always)]
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl MulAssign<Fix32> for Vector3 {
    #[inline(always)]
    fn mul_assign(&mut self, scalar: Fix32) {
        *self = *self * scalar;
    }
}
