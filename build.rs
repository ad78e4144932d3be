//! Generates the quarter-period sine and tangent lookup tables used by `Fix32`.
//!
//! The tables are evaluated with plain Taylor series on `f64` (only add, multiply and divide),
//! so the generated raw values do not depend on the host's libm.

use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const FRACTION_BITS: u32 = 16;
const LUT_SHIFT: u32 = FRACTION_BITS - 14;
/// Raw value of pi / 2 in Q16.16.
const PI_OVER_2_RAW: i64 = 102_944;
const SERIES_TERMS: u32 = 24;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let lut_len = (PI_OVER_2_RAW >> LUT_SHIFT) as usize;
    let one = (1i64 << FRACTION_BITS) as f64;

    let mut sin_lut = Vec::with_capacity(lut_len);
    let mut tan_lut = Vec::with_capacity(lut_len);
    for index in 0..lut_len {
        let angle = ((index as i64) << LUT_SHIFT) as f64 / one;
        let (sin, cos) = sin_cos_series(angle);
        sin_lut.push(to_raw(sin * one));
        tan_lut.push(to_raw(sin / cos * one));
    }

    let mut source = String::new();
    writeln!(source, "/// Right shift turning a reduced raw angle into a table index.").unwrap();
    writeln!(source, "pub(crate) const LUT_SHIFT: u32 = {LUT_SHIFT};").unwrap();
    writeln!(source, "/// Number of entries sampled over [0, pi/2).").unwrap();
    writeln!(source, "pub(crate) const LUT_LEN: usize = {lut_len};").unwrap();
    write_table(&mut source, "SIN_LUT", &sin_lut);
    write_table(&mut source, "TAN_LUT", &tan_lut);

    let out_dir = env::var("OUT_DIR").expect("cargo sets OUT_DIR for build scripts");
    let destination = Path::new(&out_dir).join("fix32_lut.rs");
    fs::write(&destination, source).expect("failed to write generated lookup tables");
}

/// Evaluates sine and cosine with a fixed number of Taylor terms.
fn sin_cos_series(x: f64) -> (f64, f64) {
    let x2 = x * x;
    let mut sin_term = x;
    let mut cos_term = 1.0;
    let mut sin = 0.0;
    let mut cos = 0.0;
    for n in 0..SERIES_TERMS {
        sin += sin_term;
        cos += cos_term;
        let k = (2 * n + 1) as f64;
        sin_term *= -x2 / ((k + 1.0) * (k + 2.0));
        cos_term *= -x2 / (k * (k + 1.0));
    }
    (sin, cos)
}

fn to_raw(value: f64) -> i32 {
    let rounded = value.round();
    if rounded >= i32::MAX as f64 {
        i32::MAX
    } else if rounded <= i32::MIN as f64 {
        i32::MIN
    } else {
        rounded as i32
    }
}

fn write_table(source: &mut String, name: &str, values: &[i32]) {
    writeln!(source, "pub(crate) static {name}: [i32; LUT_LEN] = [").unwrap();
    for chunk in values.chunks(16) {
        source.push_str("   ");
        for value in chunk {
            write!(source, " {value},").unwrap();
        }
        source.push('\n');
    }
    writeln!(source, "];").unwrap();
}
