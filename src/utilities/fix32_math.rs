//! Elementary functions on [`Fix32`].
//!
//! Everything here is integer arithmetic on the raw representation: trigonometry interpolates the
//! build-time quarter-period tables, `log2` is Turner's bit-by-bit algorithm, `pow2` a power
//! series and `atan` Euler's rational series. Results are identical on every platform.

use super::fix32::Fix32;
use super::fix32_lut::{sin_entry, tan_entry, LUT_SHIFT};
use thiserror::Error;

/// Domain errors raised by the elementary functions.
///
/// These flag invalid setup by the caller; they are never produced by saturating arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    #[error("square root of negative value {0}")]
    NegativeSqrt(Fix32),
    #[error("logarithm of non-positive value {0}")]
    NonPositiveLog(Fix32),
    #[error("inverse trigonometric argument {0} outside [-1, 1]")]
    InverseTrigDomain(Fix32),
    #[error("power of negative base {0}")]
    NegativeBase(Fix32),
}

/// `2^13 * pi` in raw units: the largest power-of-two multiple of pi that fits in an `i32`.
const LARGE_PI_RAW: i32 = 1_686_629_713;
/// `LARGE_PI_RAW >> 12` is two pi, `>> 13` is pi.
const LARGE_PI_TWO_PI_SHIFT: u32 = 12;
const LUT_FRACTION_MASK: i32 = (1 << LUT_SHIFT) - 1;
const ATAN_MAX_ITERATIONS: u32 = 30;

/// Restoring square root on the raw bits, in two passes of 16 result bits each so no
/// intermediate needs more than 32 bits.
pub(crate) fn sqrt_raw(value: u32) -> u32 {
    let mut num = value;
    let mut result: u32 = 0;
    let mut bit: u32 = 1 << 30;
    while bit > num {
        bit >>= 2;
    }

    for pass in 0..2 {
        while bit != 0 {
            if num >= result + bit {
                num -= result + bit;
                result = (result >> 1) + bit;
            } else {
                result >>= 1;
            }
            bit >>= 2;
        }

        if pass == 0 {
            if num > 0xFFFF {
                // The remainder would overflow the shift below; fold half an lsb into both sides.
                num -= result;
                num = (num << 16) - 0x8000;
                result = (result << 16) + 0x8000;
            } else {
                num <<= 16;
                result <<= 16;
            }
            bit = 1 << 14;
        }
    }

    if num > result {
        result += 1;
    }
    result
}

/// Reduces a raw angle into [0, pi/2] and reports whether the sine changes sign.
#[inline(always)]
fn reduce_sine_angle(raw: i32) -> (i32, bool) {
    let mut angle = raw;
    for shift in 0..=LARGE_PI_TWO_PI_SHIFT {
        angle %= LARGE_PI_RAW >> shift;
    }
    if angle < 0 {
        angle += Fix32::PI_TIMES_2.raw();
    }

    let flip_vertical = angle >= Fix32::PI.raw();
    if flip_vertical {
        angle -= Fix32::PI.raw();
    }
    if angle >= Fix32::PI_OVER_2.raw() {
        angle = Fix32::PI.raw() - angle;
    }
    (angle, flip_vertical)
}

impl Fix32 {
    /// Square root. Negative input is a domain error.
    pub fn sqrt(self) -> Result<Self, MathError> {
        if self.is_negative() {
            return Err(MathError::NegativeSqrt(self));
        }
        Ok(Self::from_raw(sqrt_raw(self.raw() as u32) as i32))
    }

    /// Rounds toward negative infinity.
    #[inline(always)]
    pub const fn floor(self) -> Self {
        Self::from_raw(self.raw() & !Self::FRACTION_MASK)
    }

    /// Rounds toward positive infinity, saturating at [`Fix32::MAX`].
    #[inline]
    pub const fn ceil(self) -> Self {
        if self.raw() & Self::FRACTION_MASK != 0 {
            self.floor().saturating_add(Self::ONE)
        } else {
            self
        }
    }

    /// Rounds to nearest; exact halves go to the even neighbor.
    pub const fn round(self) -> Self {
        let fraction = self.raw() & Self::FRACTION_MASK;
        let integral = self.floor();
        let half = Self::HALF.raw();
        if fraction < half {
            integral
        } else if fraction > half || integral.raw() & Self::ONE_RAW != 0 {
            integral.saturating_add(Self::ONE)
        } else {
            integral
        }
    }

    /// Fractional part in [0, 1), such that `x == x.floor() + x.fract()`.
    #[inline(always)]
    pub const fn fract(self) -> Self {
        Self::from_raw(self.raw() & Self::FRACTION_MASK)
    }

    /// Sine, interpolating between the two nearest table entries.
    pub fn sin(self) -> Self {
        let (angle, flip_vertical) = reduce_sine_angle(self.raw());
        let index = (angle >> LUT_SHIFT) as usize;
        let fraction = angle & LUT_FRACTION_MASK;
        let low = sin_entry(index);
        let high = sin_entry(index + 1);
        let value = low + (((high - low) * fraction) >> LUT_SHIFT);
        Self::from_raw(if flip_vertical { -value } else { value })
    }

    /// Sine from the nearest table entry, without interpolation.
    pub fn fast_sin(self) -> Self {
        let (angle, flip_vertical) = reduce_sine_angle(self.raw());
        let index = ((angle + (1 << (LUT_SHIFT - 1))) >> LUT_SHIFT) as usize;
        let value = sin_entry(index);
        Self::from_raw(if flip_vertical { -value } else { value })
    }

    #[inline(always)]
    fn cosine_phase(self) -> Self {
        // sin(x + pi/2) == sin(x - 3pi/2); pick the form that cannot overflow.
        if self.is_positive() {
            self - Self::PI - Self::PI_OVER_2
        } else {
            self + Self::PI_OVER_2
        }
    }

    pub fn cos(self) -> Self {
        self.cosine_phase().sin()
    }

    pub fn fast_cos(self) -> Self {
        self.cosine_phase().fast_sin()
    }

    /// Tangent. Saturates toward [`Fix32::MAX`]/[`Fix32::MIN`] approaching the poles.
    pub fn tan(self) -> Self {
        let mut angle = self.raw();
        for shift in 0..=LARGE_PI_TWO_PI_SHIFT + 1 {
            angle %= LARGE_PI_RAW >> shift;
        }

        let mut flip = false;
        if angle < 0 {
            angle = -angle;
            flip = true;
        }
        if angle > Self::PI_OVER_2.raw() {
            flip = !flip;
            angle = Self::PI.raw() - angle;
        }

        let index = (angle >> LUT_SHIFT) as usize;
        let fraction = (angle & LUT_FRACTION_MASK) as i64;
        let low = tan_entry(index) as i64;
        let high = tan_entry(index + 1) as i64;
        let value = (low + (((high - low) * fraction) >> LUT_SHIFT)).min(i32::MAX as i64) as i32;
        Self::from_raw(if flip { -value } else { value })
    }

    /// Arctangent through Euler's series in `z^2 / (1 + z^2)`.
    pub fn atan(self) -> Self {
        if self.is_zero() {
            return Self::ZERO;
        }

        let negative = self.is_negative();
        let mut z = self.abs();
        let invert = z > Self::ONE;
        if invert {
            z = Self::ONE / z;
        }

        let z_sq = z * z;
        let z_sq_plus_one = z_sq + Self::ONE;
        let dividend_step = z_sq + z_sq;
        let divisor_step = z_sq_plus_one + z_sq_plus_one;

        let mut dividend = dividend_step;
        let mut divisor = z_sq_plus_one * Self::from_i32(3);
        let mut term = Self::ONE;
        let mut series = Self::ONE;
        for _ in 0..ATAN_MAX_ITERATIONS {
            term *= dividend / divisor;
            if term.is_zero() {
                break;
            }
            series += term;
            dividend += dividend_step;
            divisor += divisor_step;
        }

        let mut result = series * z / z_sq_plus_one;
        if invert {
            result = Self::PI_OVER_2 - result;
        }
        if negative {
            -result
        } else {
            result
        }
    }

    /// Four-quadrant arctangent of `self / x`, with `self` as the y coordinate.
    pub fn atan2(self, x: Self) -> Self {
        let y = self;
        if x.is_zero() {
            return match y.signum() {
                1 => Self::PI_OVER_2,
                0 => Self::ZERO,
                _ => -Self::PI_OVER_2,
            };
        }

        let (abs_y, abs_x) = (y.abs(), x.abs());
        let first_quadrant = if abs_y <= abs_x {
            (abs_y / abs_x).atan()
        } else {
            Self::PI_OVER_2 - (abs_x / abs_y).atan()
        };
        let upper_half = if x.is_positive() { first_quadrant } else { Self::PI - first_quadrant };
        if y.is_negative() {
            -upper_half
        } else {
            upper_half
        }
    }

    /// Arccosine in [0, pi]. Arguments outside [-1, 1] are a domain error.
    pub fn acos(self) -> Result<Self, MathError> {
        if self < Self::NEG_ONE || self > Self::ONE {
            return Err(MathError::InverseTrigDomain(self));
        }
        if self.is_zero() {
            return Ok(Self::PI_OVER_2);
        }

        let opposite = (Self::ONE - self * self).sqrt()?;
        let angle = (opposite / self).atan();
        Ok(if self.is_negative() { angle + Self::PI } else { angle })
    }

    /// Arcsine in [-pi/2, pi/2]. Arguments outside [-1, 1] are a domain error.
    pub fn asin(self) -> Result<Self, MathError> {
        Ok(Self::PI_OVER_2 - self.acos()?)
    }

    /// Base-2 logarithm (Turner). Non-positive input is a domain error.
    pub fn log2(self) -> Result<Self, MathError> {
        if !self.is_positive() {
            return Err(MathError::NonPositiveLog(self));
        }

        let mut bit = 1i32 << (Self::FRACTION_BITS - 1);
        let mut exponent = 0i32;
        let mut mantissa = self.raw();
        while mantissa < Self::ONE_RAW {
            mantissa <<= 1;
            exponent -= Self::ONE_RAW;
        }
        while mantissa >= Self::ONE_RAW << 1 {
            mantissa >>= 1;
            exponent += Self::ONE_RAW;
        }

        let mut z = mantissa as i64;
        for _ in 0..Self::FRACTION_BITS {
            z = (z * z) >> Self::FRACTION_BITS;
            if z >= (2i64 << Self::FRACTION_BITS) {
                z >>= 1;
                exponent += bit;
            }
            bit >>= 1;
        }
        Ok(Self::from_raw(exponent))
    }

    /// Natural logarithm. Non-positive input is a domain error.
    pub fn ln(self) -> Result<Self, MathError> {
        Ok(self.log2()? * Self::LN2)
    }

    /// `2^self`, saturating above [`Fix32::LOG2_MAX`] and flushing to zero below
    /// [`Fix32::LOG2_MIN`].
    pub fn pow2(self) -> Self {
        if self.is_zero() {
            return Self::ONE;
        }
        if self >= Self::LOG2_MAX {
            return Self::MAX;
        }
        if self < Self::LOG2_MIN {
            return Self::ZERO;
        }

        let negative = self.is_negative();
        let exponent = self.abs();
        if exponent == Self::ONE {
            return if negative { Self::HALF } else { Self::TWO };
        }

        let integer_part = exponent.to_i32() as u32;
        let fraction = exponent.fract();

        // 2^f = sum (f ln2)^i / i!
        let mut result = Self::ONE;
        let mut term = Self::ONE;
        let mut i = 1;
        while !term.is_zero() {
            term = fraction
                .wrapping_mul(term)
                .wrapping_mul(Self::LN2)
                .saturating_div(Self::from_i32(i));
            result += term;
            i += 1;
        }

        let shifted = ((result.raw() as i64) << integer_part).min(i32::MAX as i64) as i32;
        let result = Self::from_raw(shifted);
        if negative {
            Self::ONE / result
        } else {
            result
        }
    }

    /// `e^self`.
    pub fn exp(self) -> Self {
        (self * Self::LOG2_E).pow2()
    }

    /// `self^exponent` for non-negative bases. A negative base is a domain error.
    pub fn pow(self, exponent: Self) -> Result<Self, MathError> {
        if exponent.is_zero() || self == Self::ONE {
            return Ok(Self::ONE);
        }
        if self.is_negative() {
            return Err(MathError::NegativeBase(self));
        }
        if self.is_zero() {
            return Ok(if exponent.is_negative() { Self::MAX } else { Self::ZERO });
        }
        Ok((exponent * self.log2()?).pow2())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(from: f64, to: f64, count: usize) -> impl Iterator<Item = Fix32> {
        let step = (to - from) / count as f64;
        (0..=count).map(move |i| Fix32::from_f64(from + step * i as f64))
    }

    #[test]
    fn sqrt_is_exact_on_perfect_squares() {
        for root in 0..=181 {
            let square = Fix32::from_i32(root * root);
            assert_eq!(square.sqrt(), Ok(Fix32::from_i32(root)));
        }
        assert_eq!(Fix32::from_ratio(1, 4).sqrt(), Ok(Fix32::HALF));
    }

    #[test]
    fn sqrt_is_within_one_lsb() {
        let mut rng = fastrand::Rng::with_seed(42);
        for _ in 0..50_000 {
            let x = Fix32::from_raw(rng.i32(0..));
            let expected = (x.to_f64().sqrt() * 65536.0).round() as i64;
            let actual = x.sqrt().map(|r| r.raw() as i64);
            assert!(matches!(actual, Ok(r) if (r - expected).abs() <= 1), "sqrt({x:?})");
        }
        assert!(Fix32::MAX.sqrt().is_ok());
    }

    #[test]
    fn sqrt_of_negative_is_a_domain_error() {
        assert_eq!(Fix32::NEG_ONE.sqrt(), Err(MathError::NegativeSqrt(Fix32::NEG_ONE)));
        assert_eq!(Fix32::from_raw(-1).sqrt(), Err(MathError::NegativeSqrt(Fix32::from_raw(-1))));
    }

    #[test]
    fn sin_and_cos_track_reference() {
        for x in samples(-100.0, 100.0, 40_000) {
            let reference = x.to_f64();
            assert!((x.sin().to_f64() - reference.sin()).abs() < 1.5e-4, "sin({x:?})");
            assert!((x.cos().to_f64() - reference.cos()).abs() < 1.5e-4, "cos({x:?})");
        }
    }

    #[test]
    fn pythagorean_identity_holds() {
        for x in samples(-12.0, 12.0, 20_000) {
            let (s, c) = (x.sin(), x.cos());
            let identity = s * s + c * c - Fix32::ONE;
            assert!(identity.abs().to_f64() < 2.0e-4, "identity at {x:?}");
        }
    }

    #[test]
    fn fast_sin_is_coarser_but_close() {
        let mut coarser = false;
        for x in samples(-7.0, 7.0, 10_000) {
            assert!((x.fast_sin().to_f64() - x.to_f64().sin()).abs() < 1.0e-4);
            assert!((x.fast_cos().to_f64() - x.to_f64().cos()).abs() < 1.0e-4);
            coarser |= x.fast_sin() != x.sin();
        }
        assert!(coarser);
    }

    #[test]
    fn trig_handles_extremes_without_panicking() {
        for x in [Fix32::MAX, Fix32::MIN, Fix32::from_i32(30_000), Fix32::from_i32(-30_000)] {
            assert!(x.sin().abs() <= Fix32::ONE);
            assert!(x.cos().abs() <= Fix32::ONE);
            let _ = x.tan();
        }
        assert_eq!(Fix32::ZERO.sin(), Fix32::ZERO);
        assert_eq!(Fix32::PI_OVER_2.sin(), Fix32::ONE);
    }

    #[test]
    fn tan_tracks_reference_away_from_poles() {
        for x in samples(-1.3, 1.3, 10_000) {
            let reference = x.to_f64().tan();
            let error = (x.tan().to_f64() - reference).abs() / reference.abs().max(1.0);
            assert!(error < 1.0e-4, "tan({x:?})");
        }
        assert_eq!(Fix32::PI_OVER_2.tan(), Fix32::MAX);
        assert_eq!((-Fix32::PI_OVER_2).tan(), -Fix32::MAX);
    }

    #[test]
    fn atan_tracks_reference() {
        for z in samples(-40.0, 40.0, 20_000) {
            assert!((z.atan().to_f64() - z.to_f64().atan()).abs() < 5.0e-4, "atan({z:?})");
        }
        assert!((Fix32::MAX.atan() - Fix32::PI_OVER_2).abs() < Fix32::from_ratio(1, 1000));
    }

    #[test]
    fn atan2_covers_all_quadrants() {
        let one = Fix32::ONE;
        let cases = [
            (one, one),
            (one, -one),
            (-one, -one),
            (-one, one),
            (Fix32::from_i32(3), Fix32::HALF),
            (Fix32::from_ratio(-1, 5), Fix32::from_i32(-7)),
        ];
        for (y, x) in cases {
            let expected = y.to_f64().atan2(x.to_f64());
            assert!((y.atan2(x).to_f64() - expected).abs() < 5.0e-4, "atan2({y:?}, {x:?})");
        }
        assert_eq!(one.atan2(Fix32::ZERO), Fix32::PI_OVER_2);
        assert_eq!((-one).atan2(Fix32::ZERO), -Fix32::PI_OVER_2);
        assert_eq!(Fix32::ZERO.atan2(Fix32::ZERO), Fix32::ZERO);
        assert_eq!(Fix32::ZERO.atan2(-one), Fix32::PI);
    }

    #[test]
    fn inverse_trig_checks_domain() {
        let outside = Fix32::ONE + Fix32::EPSILON;
        assert_eq!(outside.acos(), Err(MathError::InverseTrigDomain(outside)));
        assert_eq!((-outside).asin(), Err(MathError::InverseTrigDomain(-outside)));
        assert_eq!(Fix32::ONE.acos(), Ok(Fix32::ZERO));
        assert_eq!(Fix32::NEG_ONE.acos(), Ok(Fix32::PI));
        for x in samples(-1.0, 1.0, 2_000) {
            let acos = x.acos().map(Fix32::to_f64).unwrap_or(f64::NAN);
            let asin = x.asin().map(Fix32::to_f64).unwrap_or(f64::NAN);
            assert!((acos - x.to_f64().acos()).abs() < 2.0e-3, "acos({x:?})");
            assert!((asin - x.to_f64().asin()).abs() < 2.0e-3, "asin({x:?})");
        }
    }

    #[test]
    fn log2_is_exact_on_powers_of_two_and_close_elsewhere() {
        assert_eq!(Fix32::from_i32(8).log2(), Ok(Fix32::from_i32(3)));
        assert_eq!(Fix32::ONE.log2(), Ok(Fix32::ZERO));
        assert_eq!(Fix32::from_ratio(1, 4).log2(), Ok(Fix32::from_i32(-2)));
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..10_000 {
            let x = Fix32::from_raw(rng.i32(1..));
            let log = x.log2().map(Fix32::to_f64).unwrap_or(f64::NAN);
            assert!((log - x.to_f64().log2()).abs() < 1.0e-4, "log2({x:?})");
        }
        assert_eq!(Fix32::ZERO.log2(), Err(MathError::NonPositiveLog(Fix32::ZERO)));
        assert_eq!(Fix32::NEG_ONE.ln(), Err(MathError::NonPositiveLog(Fix32::NEG_ONE)));
        let ln_e = Fix32::E.ln().map(Fix32::to_f64).unwrap_or(f64::NAN);
        assert!((ln_e - 1.0).abs() < 2.0e-4);
    }

    #[test]
    fn pow2_follows_reference() {
        assert_eq!(Fix32::from_i32(3).pow2(), Fix32::from_i32(8));
        assert_eq!(Fix32::NEG_ONE.pow2(), Fix32::HALF);
        assert_eq!(Fix32::LOG2_MAX.pow2(), Fix32::MAX);
        assert_eq!((Fix32::LOG2_MIN - Fix32::ONE).pow2(), Fix32::ZERO);
        for x in samples(-10.0, 14.5, 5_000) {
            let reference = x.to_f64().exp2();
            let error = (x.pow2().to_f64() - reference).abs() / reference.max(1.0);
            assert!(error < 2.0e-4, "pow2({x:?})");
        }
    }

    #[test]
    fn exp_and_pow_compose_log_and_pow2() {
        assert!((Fix32::ONE.exp().to_f64() - core::f64::consts::E).abs() < 1.0e-3);
        assert_eq!(Fix32::TWO.pow(Fix32::from_i32(10)), Ok(Fix32::from_i32(1024)));
        assert_eq!(Fix32::ZERO.pow(Fix32::TWO), Ok(Fix32::ZERO));
        assert_eq!(Fix32::from_i32(5).pow(Fix32::ZERO), Ok(Fix32::ONE));
        assert_eq!(Fix32::NEG_ONE.pow(Fix32::HALF), Err(MathError::NegativeBase(Fix32::NEG_ONE)));
        let damping = Fix32::from_f64(0.97).pow(Fix32::from_ratio(1, 60)).map(Fix32::to_f64);
        assert!(matches!(damping, Ok(d) if (d - 0.97f64.powf(1.0 / 60.0)).abs() < 1.0e-4));
    }

    #[test]
    fn rounding_modes() {
        let x = Fix32::from_f64(2.5);
        assert_eq!(x.floor(), Fix32::from_i32(2));
        assert_eq!(x.ceil(), Fix32::from_i32(3));
        assert_eq!(x.round(), Fix32::from_i32(2));
        assert_eq!(Fix32::from_f64(3.5).round(), Fix32::from_i32(4));
        assert_eq!(Fix32::from_f64(-2.25).floor(), Fix32::from_i32(-3));
        assert_eq!(Fix32::from_f64(-2.25).ceil(), Fix32::from_i32(-2));
        assert_eq!(Fix32::from_f64(-2.75).round(), Fix32::from_i32(-3));
        assert_eq!(Fix32::from_f64(-2.25).fract(), Fix32::from_f64(0.75));
        assert_eq!(Fix32::MAX.ceil(), Fix32::MAX);
        assert_eq!(Fix32::from_i32(4).ceil(), Fix32::from_i32(4));
    }
}
