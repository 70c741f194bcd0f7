//! Interpolation controller.
//!
//! This module contains the [`Interpolator`], which sequences the computation
//! of the output samples and the intake of input samples. The interpolator is
//! driven by two requests from the caller:
//!
//! - [`Interpolator::next_output`] computes the next output sample.
//! - [`Interpolator::push_sample`] supplies the next input sample.
//!
//! Each input sample gives exactly 8 output samples, one for each phase in
//! order 0 to 7. The interpolator signals that it needs a new input sample
//! through [`Interpolator::needs_sample`] once the 8 outputs of the current
//! sample have been produced. Requests made out of turn are rejected with a
//! [`SequencingViolation`].

use crate::{
    accumulator::compute_phase,
    coefficients::CoefficientTable,
    constants::INTERPOLATION,
    error::{Error, SequencingViolation},
    fixed::{InputSample, OutputSample},
    history::SampleHistory,
};

/// Controller state.
pub use maia_interp_json::InterpolatorState as State;

/// Polyphase 8x interpolator.
///
/// The interpolator owns the coefficient table and the sample history. It
/// starts in the [`State::RequestNextSample`] state with a zero-filled
/// history, so the first 8 outputs correspond to the first input sample.
///
/// # Examples
///
/// ```
/// use maia_interp::{CoefficientTable, InputSample, Interpolator};
///
/// // Zero-order hold: each input sample is repeated 8 times.
/// let mut coefficients = vec![0; 1024];
/// coefficients[..8].fill(1 << 16);
/// let mut interpolator = Interpolator::new(CoefficientTable::new(&coefficients)?);
///
/// assert!(interpolator.needs_sample());
/// interpolator.push_sample(InputSample::new(1000, -1000))?;
/// for _ in 0..8 {
///     let output = interpolator.next_output()?;
///     assert_eq!((output.re, output.im), (1000, -1000));
/// }
/// assert!(interpolator.needs_sample());
/// # Ok::<(), maia_interp::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Interpolator {
    coefficients: CoefficientTable,
    history: SampleHistory,
    phase: usize,
    state: State,
    input_samples: u64,
    output_samples: u64,
}

impl Interpolator {
    /// Creates a new interpolator using a coefficient table.
    pub fn new(coefficients: CoefficientTable) -> Interpolator {
        if !coefficients.is_overflow_free() {
            tracing::warn!(
                max_phase_l1_norm = coefficients.max_phase_l1_norm(),
                "coefficient table can overflow the output"
            );
        }
        Interpolator {
            coefficients,
            history: SampleHistory::new(),
            phase: 0,
            state: State::RequestNextSample,
            input_samples: 0,
            output_samples: 0,
        }
    }

    /// Creates a new interpolator from a list of coefficients.
    ///
    /// An error is returned if the coefficients do not form a valid
    /// [`CoefficientTable`].
    pub fn from_coefficients(coefficients: &[i32]) -> Result<Interpolator, Error> {
        Ok(Interpolator::new(CoefficientTable::new(coefficients)?))
    }

    /// Returns `true` if the interpolator is waiting for an input sample.
    pub fn needs_sample(&self) -> bool {
        self.state == State::RequestNextSample
    }

    /// Gives the current state of the controller.
    ///
    /// Outside of the calls to [`Interpolator::next_output`], the state is
    /// always [`State::Idle`] or [`State::RequestNextSample`].
    pub fn state(&self) -> State {
        self.state
    }

    /// Gives the phase of the next output sample.
    pub fn phase(&self) -> usize {
        self.phase
    }

    /// Gives the number of input samples consumed so far.
    pub fn input_samples(&self) -> u64 {
        self.input_samples
    }

    /// Gives the number of output samples produced so far.
    pub fn output_samples(&self) -> u64 {
        self.output_samples
    }

    /// Gives access to the coefficient table.
    pub fn coefficients(&self) -> &CoefficientTable {
        &self.coefficients
    }

    /// Gives access to the sample history.
    pub fn history(&self) -> &SampleHistory {
        &self.history
    }

    /// Supplies the next input sample.
    ///
    /// This can only be called when [`Interpolator::needs_sample`] returns
    /// `true`. Otherwise a [`SequencingViolation::SampleOutOfTurn`] error is
    /// returned and the sample is discarded.
    pub fn push_sample(&mut self, sample: InputSample) -> Result<(), Error> {
        if self.state != State::RequestNextSample {
            return Err(SequencingViolation::SampleOutOfTurn {
                pending: INTERPOLATION - self.phase,
            }
            .into());
        }
        self.history.push(sample);
        self.input_samples += 1;
        self.transition(State::Idle);
        Ok(())
    }

    /// Computes the next output sample.
    ///
    /// This can only be called when the interpolator is not waiting for an
    /// input sample. Otherwise a [`SequencingViolation::OutputBeforeSample`]
    /// error is returned.
    pub fn next_output(&mut self) -> Result<OutputSample, Error> {
        if self.state != State::Idle {
            return Err(SequencingViolation::OutputBeforeSample.into());
        }
        self.transition(State::Accumulating);
        let output = self.accumulate()?;
        self.advance_phase();
        self.output_samples += 1;
        Ok(output)
    }

    // Accumulating: computes the output of the current phase.
    fn accumulate(&mut self) -> Result<OutputSample, Error> {
        let output = compute_phase(self.phase, &self.history, &self.coefficients)?;
        self.transition(State::AdvancePhase);
        Ok(output)
    }

    // AdvancePhase: moves to the next phase, requesting a new input sample
    // after the last phase.
    fn advance_phase(&mut self) {
        self.phase = (self.phase + 1) % INTERPOLATION;
        if self.phase == 0 {
            self.transition(State::RequestNextSample);
        } else {
            self.transition(State::Idle);
        }
    }

    fn transition(&mut self, state: State) {
        tracing::trace!(from = %self.state, to = %state, phase = self.phase, "state transition");
        self.state = state;
    }

    /// Interpolates a block of input samples.
    ///
    /// For each sample in `input`, the sample is supplied to the interpolator
    /// and its 8 output samples are appended to `output`. The interpolator
    /// must be waiting for an input sample when this is called, and it is
    /// waiting for an input sample again when this returns.
    pub fn process(
        &mut self,
        input: &[InputSample],
        output: &mut Vec<OutputSample>,
    ) -> Result<(), Error> {
        output.reserve(input.len() * INTERPOLATION);
        for &sample in input {
            self.push_sample(sample)?;
            for _ in 0..INTERPOLATION {
                output.push(self.next_output()?);
            }
        }
        Ok(())
    }

    /// Resets the interpolator.
    ///
    /// The history is cleared and the interpolator waits for an input sample
    /// at phase 0, as a newly constructed interpolator. The coefficient table
    /// is kept.
    pub fn reset(&mut self) {
        self.history.clear();
        self.phase = 0;
        self.input_samples = 0;
        self.output_samples = 0;
        self.transition(State::RequestNextSample);
    }

    /// Returns the status of the interpolator.
    pub fn status(&self) -> maia_interp_json::InterpolatorStatus {
        maia_interp_json::InterpolatorStatus {
            state: self.state,
            phase: self.phase as u32,
            input_samples: self.input_samples,
            output_samples: self.output_samples,
        }
    }
}
