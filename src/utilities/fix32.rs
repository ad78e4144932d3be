use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Signed Q16.16 fixed-point scalar backed by a native `i32`.
///
/// The arithmetic operators saturate to [`Fix32::MIN`]/[`Fix32::MAX`]. Wrapping arithmetic is
/// available only through the explicitly named `wrapping_*` methods, for call sites that have
/// proven their values stay in range.
///
/// Equality, ordering and hashing are defined on the raw integer.
#[repr(transparent)]
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize), serde(transparent))]
pub struct Fix32(i32);

/// Clamps a widened intermediate back into the `i32` range.
#[inline(always)]
const fn saturate(wide: i64) -> i32 {
    if wide > i32::MAX as i64 {
        i32::MAX
    } else if wide < i32::MIN as i64 {
        i32::MIN
    } else {
        wide as i32
    }
}

impl Fix32 {
    /// Number of fractional bits in the raw representation.
    pub const FRACTION_BITS: u32 = 16;
    pub(crate) const FRACTION_MASK: i32 = (1 << Self::FRACTION_BITS) - 1;
    pub(crate) const ONE_RAW: i32 = 1 << Self::FRACTION_BITS;
    /// Largest integer that survives a round trip through [`Fix32::from_i32`].
    pub const MAX_INTEGER: i32 = i32::MAX >> Self::FRACTION_BITS;
    /// Smallest integer that survives a round trip through [`Fix32::from_i32`].
    pub const MIN_INTEGER: i32 = i32::MIN >> Self::FRACTION_BITS;

    pub const ZERO: Self = Self(0);
    pub const ONE: Self = Self(Self::ONE_RAW);
    pub const NEG_ONE: Self = Self(-Self::ONE_RAW);
    pub const HALF: Self = Self(Self::ONE_RAW >> 1);
    pub const TWO: Self = Self(Self::ONE_RAW << 1);
    pub const MAX: Self = Self(i32::MAX);
    pub const MIN: Self = Self(i32::MIN);
    /// Smallest positive representable value.
    pub const EPSILON: Self = Self(1);

    pub const PI: Self = Self(205_887);
    pub const PI_TIMES_2: Self = Self(411_775);
    pub const PI_OVER_2: Self = Self(102_944);
    pub const E: Self = Self(178_145);
    pub const LN2: Self = Self(45_426);
    pub const LOG2_E: Self = Self(94_548);
    /// Exponents at or above this saturate in [`Fix32::pow2`].
    pub const LOG2_MAX: Self = Self(15 << Self::FRACTION_BITS);
    /// Exponents below this flush to zero in [`Fix32::pow2`].
    pub const LOG2_MIN: Self = Self(-16 << Self::FRACTION_BITS);

    #[inline(always)]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    #[inline(always)]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Converts an integer, saturating outside [`Fix32::MIN_INTEGER`, `Fix32::MAX_INTEGER`].
    #[inline(always)]
    pub const fn from_i32(value: i32) -> Self {
        if value > Self::MAX_INTEGER {
            Self::MAX
        } else if value < Self::MIN_INTEGER {
            Self::MIN
        } else {
            Self(value << Self::FRACTION_BITS)
        }
    }

    /// Integer part, rounded toward negative infinity.
    #[inline(always)]
    pub const fn to_i32(self) -> i32 {
        self.0 >> Self::FRACTION_BITS
    }

    /// Builds `numerator / denominator` exactly as the kernel division would.
    ///
    /// Intended for constants: `Fix32::from_ratio(1, 1000)` is the nearest value below 0.001.
    pub const fn from_ratio(numerator: i32, denominator: i32) -> Self {
        Self::from_i32(numerator).saturating_div(Self::from_i32(denominator))
    }

    /// Converts from `f32`, rounding to nearest and saturating. NaN maps to zero.
    #[inline]
    pub fn from_f32(value: f32) -> Self {
        Self::from_f64(value as f64)
    }

    /// Converts from `f64`, rounding to nearest and saturating. NaN maps to zero.
    #[inline]
    pub fn from_f64(value: f64) -> Self {
        // Float-to-int `as` casts saturate and send NaN to zero.
        Self((value * Self::ONE_RAW as f64).round() as i32)
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.0 as f32 / Self::ONE_RAW as f32
    }

    #[inline]
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / Self::ONE_RAW as f64
    }

    #[inline(always)]
    pub const fn saturating_add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }

    #[inline(always)]
    pub const fn saturating_sub(self, rhs: Self) -> Self {
        Self(self.0.saturating_sub(rhs.0))
    }

    /// Widens both operands, multiplies, shifts the fraction back out and saturates.
    #[inline(always)]
    pub const fn saturating_mul(self, rhs: Self) -> Self {
        Self(saturate((self.0 as i64 * rhs.0 as i64) >> Self::FRACTION_BITS))
    }

    /// Like [`Fix32::saturating_mul`], but rounds the shifted-out fraction to nearest (ties up)
    /// instead of flooring it. Repeated velocity updates use this so they do not drift towards
    /// negative infinity by one ulp per application.
    #[inline(always)]
    pub const fn rounding_mul(self, rhs: Self) -> Self {
        const HALF_ULP: i64 = 1 << (Fix32::FRACTION_BITS - 1);
        Self(saturate((self.0 as i64 * rhs.0 as i64 + HALF_ULP) >> Self::FRACTION_BITS))
    }

    /// Widens and pre-shifts the dividend, then divides by the raw divisor.
    ///
    /// Division by zero returns [`Fix32::MAX`] for non-negative dividends and [`Fix32::MIN`]
    /// otherwise.
    #[inline(always)]
    pub const fn saturating_div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return if self.0 >= 0 { Self::MAX } else { Self::MIN };
        }
        Self(saturate(((self.0 as i64) << Self::FRACTION_BITS) / rhs.0 as i64))
    }

    /// Negation; `MIN` saturates to `MAX`.
    #[inline(always)]
    pub const fn saturating_neg(self) -> Self {
        Self(self.0.saturating_neg())
    }

    /// Absolute value; `MIN` saturates to `MAX`.
    #[inline(always)]
    pub const fn abs(self) -> Self {
        Self(self.0.saturating_abs())
    }

    #[inline(always)]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self(self.0.wrapping_add(rhs.0))
    }

    #[inline(always)]
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self(self.0.wrapping_sub(rhs.0))
    }

    #[inline(always)]
    pub const fn wrapping_mul(self, rhs: Self) -> Self {
        Self(((self.0 as i64 * rhs.0 as i64) >> Self::FRACTION_BITS) as i32)
    }

    /// Like [`Fix32::saturating_div`], but the quotient wraps instead of saturating.
    #[inline(always)]
    pub const fn wrapping_div(self, rhs: Self) -> Self {
        if rhs.0 == 0 {
            return if self.0 >= 0 { Self::MAX } else { Self::MIN };
        }
        Self((((self.0 as i64) << Self::FRACTION_BITS) / rhs.0 as i64) as i32)
    }

    #[inline(always)]
    pub const fn wrapping_neg(self) -> Self {
        Self(self.0.wrapping_neg())
    }

    /// Returns -1, 0 or 1 as a plain integer.
    #[inline(always)]
    pub const fn signum(self) -> i32 {
        self.0.signum()
    }

    #[inline(always)]
    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    #[inline(always)]
    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    #[inline(always)]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[inline(always)]
    pub fn min(self, other: Self) -> Self {
        Ord::min(self, other)
    }

    #[inline(always)]
    pub fn max(self, other: Self) -> Self {
        Ord::max(self, other)
    }

    /// Clamps into `[minimum, maximum]`. Unlike `Ord::clamp`, a reversed range does not panic;
    /// the lower bound wins.
    #[inline(always)]
    pub fn clamp(self, minimum: Self, maximum: Self) -> Self {
        if self > maximum {
            maximum.max(minimum)
        } else if self < minimum {
            minimum
        } else {
            self
        }
    }
}

impl From<i16> for Fix32 {
    #[inline(always)]
    fn from(value: i16) -> Self {
        Self((value as i32) << Self::FRACTION_BITS)
    }
}

impl From<u8> for Fix32 {
    #[inline(always)]
    fn from(value: u8) -> Self {
        Self((value as i32) << Self::FRACTION_BITS)
    }
}

impl Add for Fix32 {
    type Output = Self;

    #[inline(always)]
    fn add(self, rhs: Self) -> Self {
        self.saturating_add(rhs)
    }
}

impl Sub for Fix32 {
    type Output = Self;

    #[inline(always)]
    fn sub(self, rhs: Self) -> Self {
        self.saturating_sub(rhs)
    }
}

impl Mul for Fix32 {
    type Output = Self;

    #[inline(always)]
    fn mul(self, rhs: Self) -> Self {
        self.saturating_mul(rhs)
    }
}

impl Div for Fix32 {
    type Output = Self;

    #[inline(always)]
    fn div(self, rhs: Self) -> Self {
        self.saturating_div(rhs)
    }
}

impl Neg for Fix32 {
    type Output = Self;

    #[inline(always)]
    fn neg(self) -> Self {
        self.saturating_neg()
    }
}

impl AddAssign for Fix32 {
    #[inline(always)]
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for Fix32 {
    #[inline(always)]
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl MulAssign for Fix32 {
    #[inline(always)]
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl DivAssign for Fix32 {
    #[inline(always)]
    fn div_assign(&mut self, rhs: Self) {
        *self = *self / rhs;
    }
}

impl Sum for Fix32 {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Fix32> for Fix32 {
    fn sum<I: Iterator<Item = &'a Fix32>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

impl fmt::Display for Fix32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_f64(), f)
    }
}

impl fmt::Debug for Fix32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fix32({} / raw {})", self.to_f64(), self.0)
    }
}
