//! Coefficient table.
//!
//! This module contains the [`CoefficientTable`], which holds the 1024 FIR
//! coefficients of the interpolator. The coefficients are stored in natural
//! order. Coefficient `k` belongs to phase `k % 8` and is used at tap position
//! `k / 8` of that phase.

use crate::{
    constants::{self, INTERPOLATION, NUM_TAPS, TAPS_PER_PHASE},
    error::Error,
    fixed::COEFFICIENT_FORMAT,
};

/// FIR coefficient table.
///
/// The table is validated when it is constructed and is immutable afterwards.
///
/// # Overflow precondition
///
/// The interpolator does not saturate. A table can only overflow the 20-bit
/// output if the sum of the absolute values of the coefficients of some phase
/// exceeds [`MAX_PHASE_L1_NORM`](constants::MAX_PHASE_L1_NORM), which is just
/// under 16 times unity gain. Tables obtained from a low-pass design are well below
/// this. [`CoefficientTable::is_overflow_free`] can be used to check a table.
///
/// # Examples
///
/// ```
/// use maia_interp::coefficients::CoefficientTable;
///
/// // A table that repeats each input sample 8 times
/// let mut coefficients = vec![0; 1024];
/// coefficients[..8].fill(1 << 16);
/// let table = CoefficientTable::new(&coefficients)?;
/// assert_eq!(table.lookup(3)?, 65536);
/// assert_eq!(table.phase_gain(5), 1.0);
/// # Ok::<(), maia_interp::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoefficientTable {
    coefficients: [i32; NUM_TAPS],
}

impl CoefficientTable {
    /// Creates a coefficient table.
    ///
    /// The slice must contain exactly [`NUM_TAPS`] coefficients, each of them
    /// fitting in [`COEFFICIENT_BITS`](constants::COEFFICIENT_BITS) bits.
    pub fn new(coefficients: &[i32]) -> Result<CoefficientTable, Error> {
        let coefficients =
            <[i32; NUM_TAPS]>::try_from(coefficients).map_err(|_| Error::CoefficientCount {
                len: coefficients.len(),
                expected: NUM_TAPS,
            })?;
        if let Some((index, &value)) = coefficients
            .iter()
            .enumerate()
            .find(|&(_, &c)| !COEFFICIENT_FORMAT.contains(c.into()))
        {
            return Err(Error::CoefficientRange {
                index,
                value,
                bits: constants::COEFFICIENT_BITS,
            });
        }
        Ok(CoefficientTable { coefficients })
    }

    /// Returns the coefficient with a given index.
    pub fn lookup(&self, index: usize) -> Result<i32, Error> {
        self.coefficients
            .get(index)
            .copied()
            .ok_or(Error::IndexOutOfRange {
                what: "coefficient index",
                index,
                len: NUM_TAPS,
            })
    }

    /// Gives all the coefficients in natural order.
    pub fn as_slice(&self) -> &[i32] {
        &self.coefficients
    }

    /// Returns an iterator over the coefficients of a phase in tap order.
    ///
    /// # Panics
    ///
    /// This function panics if `phase` is greater or equal to
    /// [`INTERPOLATION`].
    pub fn phase(&self, phase: usize) -> impl Iterator<Item = i32> + '_ {
        assert!(phase < INTERPOLATION);
        self.coefficients[phase..]
            .iter()
            .step_by(INTERPOLATION)
            .copied()
    }

    /// Returns the sum of the coefficients of a phase.
    pub fn phase_sum(&self, phase: usize) -> i64 {
        self.phase(phase).map(i64::from).sum()
    }

    /// Returns the sum of the absolute values of the coefficients of a phase.
    pub fn phase_l1_norm(&self, phase: usize) -> i64 {
        self.phase(phase).map(|c| i64::from(c).abs()).sum()
    }

    /// Returns the DC gain of a phase in linear units.
    pub fn phase_gain(&self, phase: usize) -> f64 {
        self.phase_sum(phase) as f64 / (1u64 << constants::COEFFICIENT_FRAC_BITS) as f64
    }

    /// Returns the largest L1 norm over all the phases.
    pub fn max_phase_l1_norm(&self) -> i64 {
        (0..INTERPOLATION)
            .map(|p| self.phase_l1_norm(p))
            .max()
            .unwrap_or(0)
    }

    /// Returns `true` if no input can overflow the output with this table.
    pub fn is_overflow_free(&self) -> bool {
        self.max_phase_l1_norm() <= constants::MAX_PHASE_L1_NORM
    }

    /// Returns a summary of the gain and headroom of the table.
    pub fn summary(&self) -> maia_interp_json::CoefficientSummary {
        maia_interp_json::CoefficientSummary {
            num_coefficients: NUM_TAPS as u32,
            interpolation: INTERPOLATION as u32,
            max_abs_coefficient: self
                .coefficients
                .iter()
                .map(|c| c.unsigned_abs())
                .max()
                .unwrap_or(0),
            phase_gains: (0..INTERPOLATION).map(|p| self.phase_gain(p)).collect(),
            max_phase_l1_norm: self.max_phase_l1_norm().unsigned_abs(),
            overflow_free: self.is_overflow_free(),
        }
    }
}

// Keep TAPS_PER_PHASE and the table layout consistent.
const _: () = assert!(TAPS_PER_PHASE * INTERPOLATION == NUM_TAPS);

impl TryFrom<&maia_interp_json::Coefficients> for CoefficientTable {
    type Error = Error;

    fn try_from(value: &maia_interp_json::Coefficients) -> Result<CoefficientTable, Error> {
        CoefficientTable::new(&value.coefficients)
    }
}

impl From<&CoefficientTable> for maia_interp_json::Coefficients {
    fn from(value: &CoefficientTable) -> maia_interp_json::Coefficients {
        maia_interp_json::Coefficients {
            coefficients: value.as_slice().to_vec(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn ramp() -> Vec<i32> {
        (0..NUM_TAPS as i32).map(|k| k - 512).collect()
    }

    #[test]
    fn wrong_length() {
        let err = CoefficientTable::new(&[0; 1023]).unwrap_err();
        assert_eq!(
            err,
            Error::CoefficientCount {
                len: 1023,
                expected: 1024
            }
        );
        assert!(err.is_configuration());
        assert!(CoefficientTable::new(&[]).is_err());
        assert!(CoefficientTable::new(&[0; 1025]).is_err());
    }

    #[test]
    fn out_of_range() {
        let mut coefficients = vec![0; NUM_TAPS];
        coefficients[17] = constants::MAX_COEFF;
        coefficients[18] = constants::MIN_COEFF;
        assert!(CoefficientTable::new(&coefficients).is_ok());
        coefficients[100] = constants::MAX_COEFF + 1;
        assert_eq!(
            CoefficientTable::new(&coefficients),
            Err(Error::CoefficientRange {
                index: 100,
                value: 131072,
                bits: 18
            })
        );
        coefficients[100] = 0;
        coefficients[1023] = constants::MIN_COEFF - 1;
        assert!(matches!(
            CoefficientTable::new(&coefficients),
            Err(Error::CoefficientRange { index: 1023, .. })
        ));
    }

    #[test]
    fn lookup() {
        let table = CoefficientTable::new(&ramp()).unwrap();
        assert_eq!(table.lookup(0), Ok(-512));
        assert_eq!(table.lookup(1023), Ok(511));
        assert_eq!(
            table.lookup(1024),
            Err(Error::IndexOutOfRange {
                what: "coefficient index",
                index: 1024,
                len: 1024
            })
        );
    }

    #[test]
    fn phases() {
        let table = CoefficientTable::new(&ramp()).unwrap();
        for p in 0..INTERPOLATION {
            let phase = table.phase(p).collect::<Vec<_>>();
            assert_eq!(phase.len(), TAPS_PER_PHASE);
            for (tap, &c) in phase.iter().enumerate() {
                assert_eq!(c, table.lookup(p + tap * INTERPOLATION).unwrap());
            }
        }
        // sum over k of (8k + p - 512) for k = 0..128
        assert_eq!(table.phase_sum(0), 8 * 127 * 128 / 2 - 512 * 128);
        assert_eq!(table.phase_sum(3), table.phase_sum(0) + 3 * 128);
    }

    #[test]
    fn gains_and_headroom() {
        let mut coefficients = vec![0; NUM_TAPS];
        // each phase adds up to 1 << 16
        for (k, c) in coefficients.iter_mut().enumerate() {
            *c = if k / INTERPOLATION % 2 == 0 { 1536 } else { -512 };
        }
        let table = CoefficientTable::new(&coefficients).unwrap();
        for p in 0..INTERPOLATION {
            assert_eq!(table.phase_gain(p), 1.0);
            assert_eq!(table.phase_l1_norm(p), 64 * 2048);
        }
        assert!(table.is_overflow_free());
        let summary = table.summary();
        assert_eq!(summary.num_coefficients, 1024);
        assert_eq!(summary.interpolation, 8);
        assert_eq!(summary.max_abs_coefficient, 1536);
        assert_eq!(summary.phase_gains, vec![1.0; 8]);
        assert_eq!(summary.max_phase_l1_norm, 131072);
        assert!(summary.overflow_free);

        let table = CoefficientTable::new(&[constants::MAX_COEFF; NUM_TAPS]).unwrap();
        assert!(!table.is_overflow_free());
    }

    // Phase 0 taps 0..8 get MIN_COEFF, except for `raised` of them, which get
    // MIN_COEFF + 1
    fn negative_phase(raised: usize) -> CoefficientTable {
        let mut coefficients = vec![0; NUM_TAPS];
        for tap in 0..INTERPOLATION {
            coefficients[tap * INTERPOLATION] = if tap < raised {
                constants::MIN_COEFF + 1
            } else {
                constants::MIN_COEFF
            };
        }
        CoefficientTable::new(&coefficients).unwrap()
    }

    fn full_scale_negative_output(table: &CoefficientTable) -> crate::fixed::OutputSample {
        let mut history = crate::history::SampleHistory::new();
        for _ in 0..INTERPOLATION {
            history.push(crate::fixed::InputSample::new(i16::MIN, i16::MIN));
        }
        crate::accumulator::compute_phase(0, &history, table).unwrap()
    }

    #[test]
    fn overflow_boundary() {
        // L1 norm 2^20 - 1: the output is 2^19 - 1/2, which rounds up to 2^19
        // and wraps
        let table = negative_phase(1);
        assert_eq!(table.max_phase_l1_norm(), (1 << 20) - 1);
        assert!(!table.is_overflow_free());
        assert!(!table.summary().overflow_free);
        assert_eq!(full_scale_negative_output(&table).re, -(1 << 19));

        // L1 norm 2^20 - 2: the output is exactly 2^19 - 1
        let table = negative_phase(2);
        assert_eq!(table.max_phase_l1_norm(), constants::MAX_PHASE_L1_NORM);
        assert!(table.is_overflow_free());
        let output = full_scale_negative_output(&table);
        assert_eq!(output.re, (1 << 19) - 1);
        assert_eq!(output.im, (1 << 19) - 1);
    }

    #[test]
    fn json_conversion() {
        let table = CoefficientTable::new(&ramp()).unwrap();
        let json = maia_interp_json::Coefficients::from(&table);
        assert_eq!(json.coefficients, ramp());
        assert_eq!(CoefficientTable::try_from(&json), Ok(table));
        let short = maia_interp_json::Coefficients {
            coefficients: vec![1, 2, 3],
        };
        assert!(CoefficientTable::try_from(&short).is_err());
    }
}
