//! Fixed-point convention shared with the firmware.
//!
//! Values are signed S16.15: a real number is scaled by `2^15`, truncated
//! toward zero and saturated to the `i32` range. Firmware reads each value as
//! one little-endian 32-bit two's-complement word.

/// Number of fractional bits in the on-chip fixed-point representation.
pub const FRACTIONAL_BITS: u32 = 15;

const SCALE: f64 = (1u32 << FRACTIONAL_BITS) as f64;

/// Converts a real value to its fixed-point representation.
///
/// NaN converts to 0; out-of-range values saturate.
pub fn value_to_fix(value: f64) -> i32 {
    // `as` truncates toward zero and saturates, which is the firmware's
    // conversion for constants.
    (value * SCALE) as i32
}

/// Converts a fixed-point value back to a real value.
pub fn fix_to_value(fix: i32) -> f64 {
    fix as f64 / SCALE
}

/// Converts a slice of real values elementwise.
pub fn fix_slice(values: &[f64]) -> Vec<i32> {
    values.iter().copied().map(value_to_fix).collect()
}
