//! maia-interp is part of Maia SDR. It implements an 8x polyphase FIR
//! interpolator for complex (IQ) samples, modelling bit-exactly the fixed-point
//! datapath of the FPGA interpolator: 16-bit input samples, a 1024-tap filter
//! with 18-bit coefficients split into 8 phases of 128 taps, and 20-bit output
//! samples.
//!
//! The core of the crate is the [`Interpolator`], which produces exactly 8
//! output samples for each input sample. Besides the core, the crate contains
//! the filter design routines, SigMF metadata support, and the `maia-interp`
//! command line application, which interpolates IQ recordings.

#![warn(missing_docs)]

pub mod accumulator;
pub mod app;
pub mod args;
pub mod coefficients;
pub mod constants;
pub mod design;
pub mod error;
pub mod fixed;
pub mod history;
pub mod interpolator;
pub mod sigmf;
pub mod stream;

pub use coefficients::CoefficientTable;
pub use error::{Error, SequencingViolation};
pub use fixed::{InputSample, Iq, OutputSample};
pub use interpolator::Interpolator;
