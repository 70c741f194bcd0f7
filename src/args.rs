//! maia-interp CLI arguments.
//!
//! This module contains the definition of the CLI arguments for the
//! maia-interp application.

use crate::stream::OutputFormat;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// maia-interp CLI arguments.
#[derive(Parser, Debug, Clone, PartialEq)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// Command to run
    #[clap(subcommand)]
    pub command: Command,
}

/// maia-interp commands.
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Design an interpolator filter and write its coefficients as JSON
    Design {
        /// Transition bandwidth, as a fraction of the input Nyquist band
        #[clap(long)]
        transition_bandwidth: Option<f64>,
        /// Passband ripple
        #[clap(long)]
        passband_ripple: Option<f64>,
        /// Stopband attenuation in dB
        #[clap(long)]
        stopband_attenuation_db: Option<f64>,
        /// Use a flat stopband instead of a 1/f stopband
        #[clap(long)]
        no_one_over_f: bool,
        /// Output file (stdout if not given)
        #[clap(long)]
        output: Option<PathBuf>,
    },
    /// Print a summary of a coefficient table as JSON
    Info {
        /// Coefficients JSON file (the default design is used if not given)
        #[clap(long)]
        coefficients: Option<PathBuf>,
    },
    /// Interpolate a ci16_le IQ file by 8
    Interpolate {
        /// Input file
        #[clap(long)]
        input: PathBuf,
        /// Output file
        #[clap(long)]
        output: PathBuf,
        /// Coefficients JSON file (the default design is used if not given)
        #[clap(long)]
        coefficients: Option<PathBuf>,
        /// Output sample format
        #[clap(long, value_enum, default_value_t)]
        format: OutputFormat,
        /// Input sample rate in samples per second
        #[clap(long)]
        sample_rate: Option<f64>,
        /// Center frequency in Hz
        #[clap(long)]
        frequency: Option<f64>,
        /// Number of input samples processed per block
        #[clap(long, default_value_t = 4096)]
        block_size: usize,
    },
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn interpolate() {
        let args = Args::parse_from([
            "maia-interp",
            "interpolate",
            "--input",
            "in.sigmf-data",
            "--output",
            "out.sigmf-data",
            "--format",
            "cf32",
        ]);
        match args.command {
            Command::Interpolate {
                input,
                output,
                coefficients,
                format,
                sample_rate,
                block_size,
                ..
            } => {
                assert_eq!(input, PathBuf::from("in.sigmf-data"));
                assert_eq!(output, PathBuf::from("out.sigmf-data"));
                assert_eq!(coefficients, None);
                assert_eq!(format, OutputFormat::Cf32);
                assert_eq!(sample_rate, None);
                assert_eq!(block_size, 4096);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn design() {
        let args = Args::parse_from([
            "maia-interp",
            "design",
            "--transition-bandwidth",
            "0.2",
            "--no-one-over-f",
        ]);
        assert_eq!(
            args.command,
            Command::Design {
                transition_bandwidth: Some(0.2),
                passband_ripple: None,
                stopband_attenuation_db: None,
                no_one_over_f: true,
                output: None,
            }
        );
    }
}
