//! Interpolator implementation constants.
//!
//! This module contains constants that define the characteristics of the
//! polyphase interpolator. They match the widths used by the FPGA
//! implementation, so that the output of this crate is bit-exact with it.

/// Interpolation factor.
///
/// This is also the number of phases of the polyphase decomposition.
pub const INTERPOLATION: usize = 8;

/// Total number of FIR filter coefficients.
pub const NUM_TAPS: usize = 1024;

/// Number of coefficients in each phase.
///
/// This is also the depth of the sample history.
pub const TAPS_PER_PHASE: usize = NUM_TAPS / INTERPOLATION;

/// Number of bits of the input samples.
pub const INPUT_BITS: u32 = 16;

/// Number of bits used for the FIR filter coefficients.
pub const COEFFICIENT_BITS: u32 = 18;

/// Number of bits of the output samples.
pub const OUTPUT_BITS: u32 = 20;

/// Number of fractional bits of the coefficients.
///
/// The coefficients store 8 times a unity-gain prototype filter, so that a
/// phase whose coefficients add up to `1 << COEFFICIENT_FRAC_BITS` has unity
/// gain. Seen from the prototype filter, this is 3 bits to cancel the x8 scale
/// plus 13 bits of width reduction.
pub const COEFFICIENT_FRAC_BITS: u32 = 16;

/// Right shift applied to the multiply-accumulate output.
///
/// Input and output samples share the same LSB weight, so the shift removes
/// exactly the fractional bits of the coefficients.
pub const OUTPUT_SHIFT: u32 = COEFFICIENT_FRAC_BITS;

/// Smallest valid coefficient value.
pub const MIN_COEFF: i32 = -(1 << (COEFFICIENT_BITS - 1));

/// Largest valid coefficient value.
pub const MAX_COEFF: i32 = (1 << (COEFFICIENT_BITS - 1)) - 1;

/// Largest per-phase sum of absolute coefficient values that can never
/// overflow the output.
///
/// The worst case is an input of -32768 on every tap of a phase whose
/// coefficients are all negative. The output is then `32768 * l1 / 2^16`
/// rounded half up, which fits in 20 bits only if it is below `2^19 - 1/2`,
/// that is, if `l1 <= 2^20 - 2`.
pub const MAX_PHASE_L1_NORM: i64 = (1 << (OUTPUT_BITS - INPUT_BITS + OUTPUT_SHIFT)) - 2;
