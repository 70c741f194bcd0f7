//! Fixed-point samples.
//!
//! This module contains the complex sample type [`Iq`] and the
//! [`FixedFormat`] descriptor, which pairs a bit width with the position of
//! the binary point. All the arithmetic of the interpolator is done on
//! integers; the formats are only used to document the scaling and to convert
//! to floating point at the edges.

use crate::constants;

/// Complex (IQ) sample.
///
/// The real and imaginary parts are stored as integers of type `T`. The width
/// and scaling of the integers is given by a [`FixedFormat`] that depends on
/// where the sample lives in the datapath.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Iq<T> {
    /// Real (in-phase) part.
    pub re: T,
    /// Imaginary (quadrature) part.
    pub im: T,
}

impl<T> Iq<T> {
    /// Creates a sample from its real and imaginary parts.
    pub const fn new(re: T, im: T) -> Iq<T> {
        Iq { re, im }
    }
}

/// Input sample: 16-bit signed real and imaginary parts.
pub type InputSample = Iq<i16>;

/// History sample: the input sample sign-extended to 18 bits.
pub type HistorySample = Iq<i32>;

/// Output sample: 20-bit signed real and imaginary parts.
pub type OutputSample = Iq<i32>;

impl InputSample {
    /// Sign-extends the sample to the history width.
    ///
    /// The two guard bits do not change the value of the sample.
    pub fn extend(self) -> HistorySample {
        Iq::new(i32::from(self.re), i32::from(self.im))
    }
}

impl From<InputSample> for HistorySample {
    fn from(value: InputSample) -> HistorySample {
        value.extend()
    }
}

impl OutputSample {
    /// Converts the sample to floating point.
    ///
    /// The scaling maps the input full scale to 1.0.
    pub fn to_f32(self) -> Iq<f32> {
        Iq::new(
            OUTPUT_FORMAT.to_f64(self.re) as f32,
            OUTPUT_FORMAT.to_f64(self.im) as f32,
        )
    }
}

/// Fixed-point format.
///
/// A format is given by the total number of bits of a signed integer and by
/// the number of those bits that are fractional.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct FixedFormat {
    /// Total number of bits, including the sign bit.
    pub bits: u32,
    /// Number of fractional bits.
    pub frac_bits: u32,
}

/// Format of the coefficients (Q2.16).
pub const COEFFICIENT_FORMAT: FixedFormat = FixedFormat {
    bits: constants::COEFFICIENT_BITS,
    frac_bits: constants::COEFFICIENT_FRAC_BITS,
};

/// Format of the output samples (Q5.15).
pub const OUTPUT_FORMAT: FixedFormat = FixedFormat {
    bits: constants::OUTPUT_BITS,
    frac_bits: constants::INPUT_BITS - 1,
};

impl FixedFormat {
    /// Smallest integer representable in this format.
    pub const fn min(&self) -> i64 {
        -(1 << (self.bits - 1))
    }

    /// Largest integer representable in this format.
    pub const fn max(&self) -> i64 {
        (1 << (self.bits - 1)) - 1
    }

    /// Returns `true` if `value` fits in this format without overflow.
    pub fn contains(&self, value: i64) -> bool {
        (self.min()..=self.max()).contains(&value)
    }

    /// Wraps `value` to the width of this format.
    ///
    /// This keeps the `bits` LSBs of the two's complement representation and
    /// sign-extends them, which is what a hardware register of this width does.
    pub fn wrap(&self, value: i64) -> i64 {
        let unused = 64 - self.bits;
        (value << unused) >> unused
    }

    /// Converts an integer in this format to its real value.
    pub fn to_f64(&self, value: i32) -> f64 {
        f64::from(value) / (1u64 << self.frac_bits) as f64
    }

    /// Converts a real value to the nearest integer in this format.
    ///
    /// Returns `None` if the value does not fit.
    pub fn from_f64(&self, value: f64) -> Option<i32> {
        let x = (value * (1u64 << self.frac_bits) as f64).round();
        if x.is_finite() && x >= self.min() as f64 && x <= self.max() as f64 {
            Some(x as i32)
        } else {
            None
        }
    }
}

/// Shifts `value` right by `shift` bits rounding half up.
///
/// The value is first truncated to one bit more than the result. Then that
/// extra bit, which is the MSB of the discarded bits, is added back to the
/// truncated result. This is round-half-up (towards positive infinity on
/// ties), which does not have the negative DC bias of plain truncation.
///
/// `shift` must be at least 1.
pub fn round_shift(value: i64, shift: u32) -> i64 {
    debug_assert!(shift >= 1);
    let t = value >> (shift - 1);
    (t >> 1) + (t & 1)
}
