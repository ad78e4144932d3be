//! Quarter-period sine and tangent tables, generated at build time by `build.rs`.

use super::fix32::Fix32;

include!(concat!(env!("OUT_DIR"), "/fix32_lut.rs"));

const _: () = assert!(LUT_SHIFT == Fix32::FRACTION_BITS - 14);
const _: () = assert!(LUT_LEN == (Fix32::PI_OVER_2.raw() >> LUT_SHIFT) as usize);

/// Sine table entry; indices past the end sit on the peak.
#[inline(always)]
pub(crate) fn sin_entry(index: usize) -> i32 {
    match SIN_LUT.get(index) {
        Some(&value) => value,
        None => Fix32::ONE.raw(),
    }
}

/// Tangent table entry; indices past the end sit on the pole.
#[inline(always)]
pub(crate) fn tan_entry(index: usize) -> i32 {
    match TAN_LUT.get(index) {
        Some(&value) => value,
        None => i32::MAX,
    }
}
