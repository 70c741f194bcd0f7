//! Interpolator errors.

use thiserror::Error;

/// Interpolator error.
///
/// These are the errors that can be returned by the interpolator core. Host
/// code usually converts them into an [`anyhow::Error`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The coefficient table does not have the required number of
    /// coefficients.
    #[error("coefficient table has {len} coefficients, but {expected} are required")]
    CoefficientCount {
        /// Number of coefficients supplied.
        len: usize,
        /// Number of coefficients required.
        expected: usize,
    },
    /// A coefficient does not fit in the coefficient width.
    #[error("coefficient {index} with value {value} does not fit in {bits} bits")]
    CoefficientRange {
        /// Index of the offending coefficient.
        index: usize,
        /// Value of the offending coefficient.
        value: i32,
        /// Coefficient width.
        bits: u32,
    },
    /// An index is out of range.
    #[error("{what} {index} out of range (must be less than {len})")]
    IndexOutOfRange {
        /// Kind of index (coefficient index, history offset or phase).
        what: &'static str,
        /// Value of the index.
        index: usize,
        /// Length of the indexed range.
        len: usize,
    },
    /// The input/output handshake has not been respected.
    #[error("sequencing violation: {0}")]
    Sequencing(#[from] SequencingViolation),
}

/// Handshake protocol misuse.
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SequencingViolation {
    /// An output was requested while the interpolator is waiting for an input
    /// sample.
    #[error("output requested before supplying the next input sample")]
    OutputBeforeSample,
    /// An input sample was supplied while outputs for the previous sample are
    /// still pending.
    #[error("input sample supplied while {pending} outputs are still pending")]
    SampleOutOfTurn {
        /// Number of outputs that remain to be produced for the current sample.
        pending: usize,
    },
}

impl Error {
    /// Returns `true` if this is a configuration error.
    ///
    /// Configuration errors are produced when building a coefficient table
    /// from invalid values.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::CoefficientCount { .. } | Error::CoefficientRange { .. }
        )
    }
}
