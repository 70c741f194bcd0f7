//! Sample history.
//!
//! The [`SampleHistory`] is a ring buffer with the last 128 input samples,
//! which are the samples that take part in the computation of each output.

use crate::{
    constants::TAPS_PER_PHASE,
    error::Error,
    fixed::{HistorySample, InputSample},
};

const HISTORY_MASK: usize = TAPS_PER_PHASE - 1;
const _: () = assert!(TAPS_PER_PHASE.is_power_of_two());

/// Sample history.
///
/// The history is a fixed-size array together with a write cursor. The cursor
/// points to the slot of the oldest sample, which is the slot overwritten by
/// the next [`push`](SampleHistory::push). The newest sample is just behind the
/// cursor. Samples are stored sign-extended to 18 bits.
///
/// A new history is filled with zeros, which is the value that the samples
/// before the first input sample take.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SampleHistory {
    samples: [HistorySample; TAPS_PER_PHASE],
    cursor: usize,
}

impl SampleHistory {
    /// Creates a zero-filled history.
    pub fn new() -> SampleHistory {
        SampleHistory {
            samples: [HistorySample::default(); TAPS_PER_PHASE],
            cursor: 0,
        }
    }

    /// Stores a new sample, overwriting the oldest one.
    pub fn push(&mut self, sample: InputSample) {
        self.samples[self.cursor] = sample.extend();
        self.cursor = (self.cursor + 1) & HISTORY_MASK;
    }

    /// Returns the sample that is `offset` positions older than the newest.
    ///
    /// An `offset` of 0 gives the newest sample and an offset of 127 gives the
    /// oldest.
    pub fn read_at(&self, offset: usize) -> Result<HistorySample, Error> {
        if offset >= TAPS_PER_PHASE {
            return Err(Error::IndexOutOfRange {
                what: "history offset",
                index: offset,
                len: TAPS_PER_PHASE,
            });
        }
        Ok(self.samples[self.cursor.wrapping_sub(1 + offset) & HISTORY_MASK])
    }

    /// Returns the newest sample.
    pub fn newest(&self) -> HistorySample {
        self.samples[self.cursor.wrapping_sub(1) & HISTORY_MASK]
    }

    /// Returns an iterator over all the samples, from newest to oldest.
    ///
    /// The iterator yields the same samples as calling
    /// [`read_at`](SampleHistory::read_at) with offsets 0 to 127.
    pub fn iter(&self) -> impl Iterator<Item = HistorySample> + '_ {
        let (recent, old) = self.samples.split_at(self.cursor);
        recent.iter().rev().chain(old.iter().rev()).copied()
    }

    /// Sets all the samples to zero and rewinds the cursor.
    pub fn clear(&mut self) {
        *self = SampleHistory::new();
    }
}

impl Default for SampleHistory {
    fn default() -> SampleHistory {
        SampleHistory::new()
    }
}
