//! Polyphase multiply-accumulate.
//!
//! This module computes one output sample of one phase of the polyphase
//! interpolator.
//!
//! # Scaling
//!
//! Each product of an 18-bit history sample and an 18-bit coefficient takes 35
//! bits, and the sum of 128 of them takes 42 bits, so a 64-bit accumulator
//! never overflows. The accumulator has [`OUTPUT_SHIFT`] more fractional bits
//! than the output. It is reduced to the output width by shifting it right with
//! round-half-up (see [`round_shift`]) and keeping the 20 LSBs.

use crate::{
    coefficients::CoefficientTable,
    constants::{INTERPOLATION, OUTPUT_SHIFT},
    error::Error,
    fixed::{round_shift, HistorySample, Iq, OutputSample, OUTPUT_FORMAT},
    history::SampleHistory,
};

/// Complex multiply-accumulate register.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Accumulator {
    re: i64,
    im: i64,
}

impl Accumulator {
    /// Creates a cleared accumulator.
    pub fn new() -> Accumulator {
        Accumulator::default()
    }

    /// Adds the product of a sample and a real coefficient.
    pub fn macc(&mut self, sample: HistorySample, coefficient: i32) {
        let coefficient = i64::from(coefficient);
        self.re += i64::from(sample.re) * coefficient;
        self.im += i64::from(sample.im) * coefficient;
    }

    /// Gives the full-precision accumulated value.
    pub fn value(&self) -> Iq<i64> {
        Iq::new(self.re, self.im)
    }

    /// Rounds the accumulator to the output format.
    ///
    /// The result wraps if it does not fit in 20 bits.
    pub fn output(&self) -> OutputSample {
        let reduce = |x: i64| OUTPUT_FORMAT.wrap(round_shift(x, OUTPUT_SHIFT)) as i32;
        Iq::new(reduce(self.re), reduce(self.im))
    }
}

/// Computes the output of one phase.
///
/// The newest sample in the history is multiplied by coefficient `phase`, the
/// next newest by coefficient `phase + 8`, and so on, up to the oldest sample,
/// which is multiplied by coefficient `phase + 1016`.
///
/// The result only depends on the arguments. An error is returned if `phase`
/// is not smaller than 8.
pub fn compute_phase(
    phase: usize,
    history: &SampleHistory,
    coefficients: &CoefficientTable,
) -> Result<OutputSample, Error> {
    if phase >= INTERPOLATION {
        return Err(Error::IndexOutOfRange {
            what: "phase",
            index: phase,
            len: INTERPOLATION,
        });
    }
    let mut acc = Accumulator::new();
    for (sample, coefficient) in history.iter().zip(coefficients.phase(phase)) {
        acc.macc(sample, coefficient);
    }
    Ok(acc.output())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        constants::{self, NUM_TAPS, TAPS_PER_PHASE},
        fixed::InputSample,
    };

    // Straightforward version using read_at() and lookup()
    fn compute_phase_by_index(
        phase: usize,
        history: &SampleHistory,
        coefficients: &CoefficientTable,
    ) -> OutputSample {
        let mut acc = Accumulator::new();
        for tap in 0..TAPS_PER_PHASE {
            let sample = history.read_at(tap).unwrap();
            let coefficient = coefficients.lookup(phase + tap * INTERPOLATION).unwrap();
            acc.macc(sample, coefficient);
        }
        acc.output()
    }

    // Deterministic pseudorandom numbers (xorshift)
    fn pseudorandom(seed: u32, n: usize) -> Vec<u32> {
        let mut x = seed;
        (0..n)
            .map(|_| {
                x ^= x << 13;
                x ^= x >> 17;
                x ^= x << 5;
                x
            })
            .collect()
    }

    fn random_table(seed: u32) -> CoefficientTable {
        let coefficients = pseudorandom(seed, NUM_TAPS)
            .into_iter()
            .map(|x| (x % 4096) as i32 - 2048)
            .collect::<Vec<_>>();
        CoefficientTable::new(&coefficients).unwrap()
    }

    fn random_history(seed: u32) -> SampleHistory {
        let mut history = SampleHistory::new();
        for x in pseudorandom(seed, 200) {
            history.push(InputSample::new(x as i16, (x >> 16) as i16));
        }
        history
    }

    #[test]
    fn matches_indexed_reference() {
        let table = random_table(1);
        let history = random_history(2);
        for phase in 0..INTERPOLATION {
            assert_eq!(
                compute_phase(phase, &history, &table).unwrap(),
                compute_phase_by_index(phase, &history, &table)
            );
        }
    }

    #[test]
    fn pure() {
        let table = random_table(3);
        let history = random_history(4);
        let first = compute_phase(5, &history, &table).unwrap();
        for _ in 0..4 {
            assert_eq!(compute_phase(5, &history, &table).unwrap(), first);
        }
    }

    #[test]
    fn reverse_recency_order() {
        // only coefficient 8 + 3 = 11 (phase 3, tap 1) is non-zero, so the
        // output of phase 3 is the second newest sample
        let mut coefficients = vec![0; NUM_TAPS];
        coefficients[11] = 1 << constants::COEFFICIENT_FRAC_BITS;
        let table = CoefficientTable::new(&coefficients).unwrap();
        let mut history = SampleHistory::new();
        history.push(InputSample::new(100, -100));
        history.push(InputSample::new(200, -200));
        assert_eq!(
            compute_phase(3, &history, &table),
            Ok(Iq::new(100, -100))
        );
        assert_eq!(compute_phase(2, &history, &table), Ok(Iq::new(0, 0)));
    }

    #[test]
    fn rounding() {
        let mut coefficients = vec![0; NUM_TAPS];
        // gain of 0.5
        coefficients[0] = 1 << (constants::COEFFICIENT_FRAC_BITS - 1);
        let table = CoefficientTable::new(&coefficients).unwrap();
        let mut history = SampleHistory::new();
        for (input, expected) in [(3, 2), (-3, -1), (1, 1), (-1, 0), (4, 2), (-4, -2)] {
            history.push(InputSample::new(input, 0));
            assert_eq!(
                compute_phase(0, &history, &table),
                Ok(Iq::new(expected, 0)),
                "input {input}"
            );
        }
    }

    #[test]
    fn wraps_instead_of_saturating() {
        let table = CoefficientTable::new(&[constants::MAX_COEFF; NUM_TAPS]).unwrap();
        let mut history = SampleHistory::new();
        for _ in 0..TAPS_PER_PHASE {
            history.push(InputSample::new(i16::MAX, i16::MIN));
        }
        let mut acc = Accumulator::new();
        for sample in history.iter() {
            acc.macc(sample, constants::MAX_COEFF);
        }
        let expected = acc.value();
        let expected = Iq::new(
            OUTPUT_FORMAT.wrap(round_shift(expected.re, OUTPUT_SHIFT)) as i32,
            OUTPUT_FORMAT.wrap(round_shift(expected.im, OUTPUT_SHIFT)) as i32,
        );
        let output = compute_phase(0, &history, &table).unwrap();
        assert_eq!(output, expected);
        assert!(OUTPUT_FORMAT.contains(output.re.into()));
        assert!(OUTPUT_FORMAT.contains(output.im.into()));
    }

    #[test]
    fn phase_out_of_range() {
        let table = random_table(5);
        let history = SampleHistory::new();
        assert!(matches!(
            compute_phase(8, &history, &table),
            Err(Error::IndexOutOfRange { what: "phase", .. })
        ));
    }
}
