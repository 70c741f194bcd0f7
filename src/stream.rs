//! Sample stream processing.
//!
//! This module connects the [`Interpolator`] to byte streams. Input samples
//! are read in `ci16_le` format (interleaved 16-bit little-endian I and Q) and
//! output samples are written either in `ci32_le` format, which keeps the 20
//! bits of each output sign-extended to 32 bits, or in `cf32_le` format, scaled
//! so that the input full scale maps to 1.0.

use crate::{
    constants::INTERPOLATION,
    fixed::{InputSample, Iq, OutputSample, OUTPUT_FORMAT},
    interpolator::Interpolator,
    sigmf::{Datatype, Endianness, Field, SampleFormat},
};
use anyhow::{Context, Result};
use std::io::{ErrorKind, Read, Write};

/// Output sample format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// 32-bit little-endian signed integers.
    #[default]
    Ci32,
    /// 32-bit little-endian IEEE 754 floating point.
    Cf32,
}

impl OutputFormat {
    /// Number of bytes taken by one complex sample.
    pub fn sample_size(&self) -> usize {
        8
    }

    /// Gives the SigMF datatype of this format.
    pub fn datatype(&self) -> Datatype {
        let format = match self {
            OutputFormat::Ci32 => SampleFormat::I32(Endianness::Le),
            OutputFormat::Cf32 => SampleFormat::F32(Endianness::Le),
        };
        Datatype {
            field: Field::Complex,
            format,
        }
    }

    fn encode(&self, sample: OutputSample, buffer: &mut Vec<u8>) {
        match self {
            OutputFormat::Ci32 => {
                buffer.extend_from_slice(&sample.re.to_le_bytes());
                buffer.extend_from_slice(&sample.im.to_le_bytes());
            }
            OutputFormat::Cf32 => {
                let sample = sample.to_f32();
                buffer.extend_from_slice(&sample.re.to_le_bytes());
                buffer.extend_from_slice(&sample.im.to_le_bytes());
            }
        }
    }
}

/// Datatype of the input streams.
pub const INPUT_DATATYPE: Datatype = Datatype {
    field: Field::Complex,
    format: SampleFormat::I16(Endianness::Le),
};

/// Reader of `ci16_le` input samples.
///
/// The reader buffers blocks of samples from the underlying reader.
#[derive(Debug)]
pub struct SampleReader<R> {
    reader: R,
    buffer: Vec<u8>,
    position: usize,
    end: usize,
    trailing_bytes: usize,
}

const INPUT_SAMPLE_SIZE: usize = 4;

impl<R: Read> SampleReader<R> {
    /// Creates a sample reader that reads up to `block_size` samples at a
    /// time.
    pub fn new(reader: R, block_size: usize) -> SampleReader<R> {
        SampleReader {
            reader,
            buffer: vec![0; block_size.max(1) * INPUT_SAMPLE_SIZE],
            position: 0,
            end: 0,
            trailing_bytes: 0,
        }
    }

    /// Reads the next sample.
    ///
    /// Returns `None` at the end of the stream. An incomplete sample at the end
    /// of the stream is discarded; its size can be obtained with
    /// [`SampleReader::trailing_bytes`].
    pub fn next_sample(&mut self) -> Result<Option<InputSample>> {
        if self.end - self.position < INPUT_SAMPLE_SIZE && !self.fill()? {
            return Ok(None);
        }
        let bytes = &self.buffer[self.position..self.position + INPUT_SAMPLE_SIZE];
        self.position += INPUT_SAMPLE_SIZE;
        Ok(Some(Iq::new(
            i16::from_le_bytes([bytes[0], bytes[1]]),
            i16::from_le_bytes([bytes[2], bytes[3]]),
        )))
    }

    /// Gives the number of bytes of an incomplete sample found at the end of
    /// the stream.
    pub fn trailing_bytes(&self) -> usize {
        self.trailing_bytes
    }

    // Refills the buffer. Returns false if there is not a full sample left.
    fn fill(&mut self) -> Result<bool> {
        self.buffer.copy_within(self.position..self.end, 0);
        self.end -= self.position;
        self.position = 0;
        while self.end < self.buffer.len() {
            match self.reader.read(&mut self.buffer[self.end..]) {
                Ok(0) => break,
                Ok(n) => self.end += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e).context("failed to read input samples"),
            }
        }
        if self.end < INPUT_SAMPLE_SIZE {
            self.trailing_bytes = self.end;
            return Ok(false);
        }
        Ok(true)
    }
}

/// Stream processing statistics.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct Stats {
    /// Number of input samples read.
    pub input_samples: u64,
    /// Number of output samples written.
    pub output_samples: u64,
    /// Number of output samples whose real or imaginary part reached the
    /// output full scale.
    pub full_scale_samples: u64,
}

/// Interpolates a whole stream.
///
/// Samples are pulled from `input` each time the interpolator requests one,
/// and the 8 outputs of each sample are written to `output` in the given
/// format. Processing stops at the end of the input stream, with the
/// interpolator waiting for a new sample.
pub fn run<R: Read, W: Write>(
    interpolator: &mut Interpolator,
    input: &mut SampleReader<R>,
    output: &mut W,
    format: OutputFormat,
    block_size: usize,
) -> Result<Stats> {
    let block_size = block_size.max(1) * INTERPOLATION;
    let mut buffer = Vec::with_capacity(block_size * format.sample_size());
    let mut stats = Stats::default();
    loop {
        if interpolator.needs_sample() {
            if buffer.len() >= block_size * format.sample_size() {
                output
                    .write_all(&buffer)
                    .context("failed to write output samples")?;
                buffer.clear();
            }
            match input.next_sample()? {
                Some(sample) => {
                    interpolator.push_sample(sample)?;
                    stats.input_samples += 1;
                }
                None => break,
            }
        }
        let sample = interpolator.next_output()?;
        if is_full_scale(sample) {
            stats.full_scale_samples += 1;
        }
        format.encode(sample, &mut buffer);
        stats.output_samples += 1;
    }
    output
        .write_all(&buffer)
        .context("failed to write output samples")?;
    output.flush().context("failed to flush output")?;
    if input.trailing_bytes() != 0 {
        tracing::warn!(
            "discarded {} trailing bytes at the end of the input",
            input.trailing_bytes()
        );
    }
    if stats.full_scale_samples != 0 {
        tracing::warn!(
            "{} output samples reached full scale",
            stats.full_scale_samples
        );
    }
    Ok(stats)
}

fn is_full_scale(sample: OutputSample) -> bool {
    let full_scale = |x: i32| {
        let x = i64::from(x);
        x == OUTPUT_FORMAT.min() || x == OUTPUT_FORMAT.max()
    };
    full_scale(sample.re) || full_scale(sample.im)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::NUM_TAPS;

    fn zero_order_hold() -> Interpolator {
        let mut coefficients = vec![0; NUM_TAPS];
        coefficients[..INTERPOLATION].fill(1 << 16);
        Interpolator::from_coefficients(&coefficients).unwrap()
    }

    fn ci16_bytes(samples: &[(i16, i16)]) -> Vec<u8> {
        samples
            .iter()
            .flat_map(|&(re, im)| re.to_le_bytes().into_iter().chain(im.to_le_bytes()))
            .collect()
    }

    #[test]
    fn reader() {
        let bytes = ci16_bytes(&[(1, -1), (300, -300), (i16::MIN, i16::MAX)]);
        // block size smaller than the number of samples
        let mut reader = SampleReader::new(&bytes[..], 2);
        assert_eq!(reader.next_sample().unwrap(), Some(Iq::new(1, -1)));
        assert_eq!(reader.next_sample().unwrap(), Some(Iq::new(300, -300)));
        assert_eq!(
            reader.next_sample().unwrap(),
            Some(Iq::new(i16::MIN, i16::MAX))
        );
        assert_eq!(reader.next_sample().unwrap(), None);
        assert_eq!(reader.trailing_bytes(), 0);
    }

    #[test]
    fn reader_trailing_bytes() {
        let mut bytes = ci16_bytes(&[(5, 6)]);
        bytes.extend_from_slice(&[1, 2, 3]);
        let mut reader = SampleReader::new(&bytes[..], 16);
        assert_eq!(reader.next_sample().unwrap(), Some(Iq::new(5, 6)));
        assert_eq!(reader.next_sample().unwrap(), None);
        assert_eq!(reader.trailing_bytes(), 3);
    }

    #[test]
    fn run_ci32() {
        let bytes = ci16_bytes(&[(1000, -1000), (-5, 7)]);
        let mut reader = SampleReader::new(&bytes[..], 1);
        let mut output = Vec::new();
        let mut interpolator = zero_order_hold();
        let stats = run(
            &mut interpolator,
            &mut reader,
            &mut output,
            OutputFormat::Ci32,
            1,
        )
        .unwrap();
        assert_eq!(
            stats,
            Stats {
                input_samples: 2,
                output_samples: 16,
                full_scale_samples: 0
            }
        );
        assert_eq!(output.len(), 16 * 8);
        let words = output
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes(b.try_into().unwrap()))
            .collect::<Vec<_>>();
        for k in 0..8 {
            assert_eq!(&words[2 * k..2 * k + 2], &[1000i32, -1000]);
            assert_eq!(&words[16 + 2 * k..16 + 2 * k + 2], &[-5i32, 7]);
        }
        assert!(interpolator.needs_sample());
    }

    #[test]
    fn run_cf32() {
        let bytes = ci16_bytes(&[(16384, -32768)]);
        let mut reader = SampleReader::new(&bytes[..], 64);
        let mut output = Vec::new();
        run(
            &mut zero_order_hold(),
            &mut reader,
            &mut output,
            OutputFormat::Cf32,
            64,
        )
        .unwrap();
        let values = output
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes(b.try_into().unwrap()))
            .collect::<Vec<_>>();
        assert_eq!(values.len(), 16);
        for pair in values.chunks_exact(2) {
            assert_eq!(pair, &[0.5f32, -1.0]);
        }
    }

    #[test]
    fn empty_input() {
        let mut reader = SampleReader::new(std::io::empty(), 16);
        let mut output = Vec::new();
        let stats = run(
            &mut zero_order_hold(),
            &mut reader,
            &mut output,
            OutputFormat::Ci32,
            16,
        )
        .unwrap();
        assert_eq!(stats, Stats::default());
        assert!(output.is_empty());
    }

    #[test]
    fn datatypes() {
        assert_eq!(OutputFormat::Ci32.datatype().to_string(), "ci32_le");
        assert_eq!(OutputFormat::Cf32.datatype().to_string(), "cf32_le");
        assert_eq!(INPUT_DATATYPE.to_string(), "ci16_le");
    }
}
