//! maia-interp-json contains the JSON schemas used by maia-interp.

#![warn(missing_docs)]

use serde::{Deserialize, Serialize};

/// Coefficient file JSON schema.
///
/// This JSON schema corresponds to the files written by `maia-interp design`
/// and read by `maia-interp interpolate`. It contains the full coefficient
/// table of the interpolator, in natural (non-polyphase) order.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct Coefficients {
    /// FIR filter coefficients.
    ///
    /// Each coefficient is an 18-bit signed integer. A phase whose
    /// coefficients add up to 2^16 has unity gain.
    pub coefficients: Vec<i32>,
}

/// Filter design JSON schema.
///
/// This JSON schema contains the requirements for the interpolator low-pass
/// filter. All the fields are optional. Defaults are applied for missing
/// fields when the design is calculated.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct FilterDesign {
    /// Transition bandwidth.
    ///
    /// This is given as a fraction of the input Nyquist band. The passband
    /// ends at `(1 - transition_bandwidth)` times the input Nyquist frequency.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_bandwidth: Option<f64>,
    /// Passband ripple (in linear units).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passband_ripple: Option<f64>,
    /// Stopband attenuation in dB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopband_attenuation_db: Option<f64>,
    /// Use 1/f response in the stopband.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stopband_one_over_f: Option<bool>,
}

/// Coefficient table summary JSON schema.
///
/// This JSON schema is printed by `maia-interp info`. It describes the gain
/// and headroom of a coefficient table.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CoefficientSummary {
    /// Total number of coefficients.
    pub num_coefficients: u32,
    /// Interpolation factor (number of phases).
    pub interpolation: u32,
    /// Largest coefficient absolute value.
    pub max_abs_coefficient: u32,
    /// DC gain of each of the phases in linear units.
    pub phase_gains: Vec<f64>,
    /// Largest sum of absolute coefficient values over the phases.
    pub max_phase_l1_norm: u64,
    /// The table cannot overflow the output for any input.
    pub overflow_free: bool,
}

/// Interpolator state.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum InterpolatorState {
    /// Waiting for a request to compute the next output.
    Idle,
    /// Computing one output.
    Accumulating,
    /// Advancing to the next phase.
    AdvancePhase,
    /// Waiting for the next input sample.
    RequestNextSample,
}

impl std::fmt::Display for InterpolatorState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(
            f,
            "{}",
            match self {
                InterpolatorState::Idle => "idle",
                InterpolatorState::Accumulating => "accumulating",
                InterpolatorState::AdvancePhase => "advance phase",
                InterpolatorState::RequestNextSample => "request next sample",
            }
        )
    }
}

/// Interpolator status JSON schema.
///
/// This JSON schema is printed by `maia-interp interpolate` once the input has
/// been processed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
pub struct InterpolatorStatus {
    /// Current state of the controller.
    pub state: InterpolatorState,
    /// Phase of the next output.
    pub phase: u32,
    /// Number of input samples consumed.
    pub input_samples: u64,
    /// Number of output samples produced.
    pub output_samples: u64,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn state_display() {
        assert_eq!(InterpolatorState::Idle.to_string(), "idle");
        assert_eq!(
            InterpolatorState::RequestNextSample.to_string(),
            "request next sample"
        );
    }
}
