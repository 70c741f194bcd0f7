//! maia-interp application.
//!
//! This module contains a top-level structure [`App`] that represents the whole
//! maia-interp application. The application is built from the CLI arguments,
//! which loads or designs the coefficient table and checks the input files, and
//! then it is run.

use crate::{
    args::{Args, Command},
    coefficients::CoefficientTable,
    constants::INTERPOLATION,
    design,
    interpolator::Interpolator,
    sigmf::{self, Metadata},
    stream::{self, OutputFormat, SampleReader, INPUT_DATATYPE},
};
use anyhow::{Context, Result};
use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

/// maia-interp application.
///
/// This struct represents the maia-interp application. It holds the work
/// prepared from the CLI arguments, which is carried out by [`App::run`].
#[derive(Debug)]
pub struct App {
    task: Task,
}

#[derive(Debug)]
enum Task {
    Design {
        table: CoefficientTable,
        output: Option<PathBuf>,
    },
    Info {
        table: CoefficientTable,
    },
    Interpolate(Box<Interpolation>),
}

#[derive(Debug)]
struct Interpolation {
    interpolator: Interpolator,
    input: PathBuf,
    output: PathBuf,
    format: OutputFormat,
    block_size: usize,
    metadata: Option<Metadata>,
}

impl App {
    /// Creates a new application.
    #[tracing::instrument(name = "App::new", level = "debug")]
    pub fn new(args: &Args) -> Result<App> {
        let task = match &args.command {
            Command::Design {
                transition_bandwidth,
                passband_ripple,
                stopband_attenuation_db,
                no_one_over_f,
                output,
            } => {
                let design = maia_interp_json::FilterDesign {
                    transition_bandwidth: *transition_bandwidth,
                    passband_ripple: *passband_ripple,
                    stopband_attenuation_db: *stopband_attenuation_db,
                    stopband_one_over_f: Some(!no_one_over_f),
                };
                Task::Design {
                    table: design::make_design(&design)?,
                    output: output.clone(),
                }
            }
            Command::Info { coefficients } => Task::Info {
                table: load_coefficients(coefficients.as_deref())?,
            },
            Command::Interpolate {
                input,
                output,
                coefficients,
                format,
                sample_rate,
                frequency,
                block_size,
            } => {
                let interpolator = Interpolator::new(load_coefficients(coefficients.as_deref())?);
                let metadata = output_metadata(input, output, *format, *sample_rate, *frequency)?;
                Task::Interpolate(Box::new(Interpolation {
                    interpolator,
                    input: input.clone(),
                    output: output.clone(),
                    format: *format,
                    block_size: *block_size,
                    metadata,
                }))
            }
        };
        Ok(App { task })
    }

    /// Runs the application.
    ///
    /// The results of the application (coefficient tables, summaries and
    /// interpolator status) are printed to stdout as JSON.
    #[tracing::instrument(name = "App::run", level = "debug", skip_all)]
    pub fn run(self) -> Result<()> {
        match self.task {
            Task::Design { table, output } => {
                let json = to_json(&maia_interp_json::Coefficients::from(&table))?;
                match output {
                    Some(path) => std::fs::write(&path, json)
                        .with_context(|| format!("failed to write {}", path.display()))?,
                    None => print!("{json}"),
                }
            }
            Task::Info { table } => print!("{}", to_json(&table.summary())?),
            Task::Interpolate(mut interpolation) => {
                let status = interpolation.run()?;
                print!("{}", to_json(&status)?);
            }
        }
        Ok(())
    }
}

impl Interpolation {
    fn run(&mut self) -> Result<maia_interp_json::InterpolatorStatus> {
        let input = File::open(&self.input)
            .with_context(|| format!("failed to open {}", self.input.display()))?;
        let mut input = SampleReader::new(input, self.block_size);
        let output = File::create(&self.output)
            .with_context(|| format!("failed to create {}", self.output.display()))?;
        let mut output = BufWriter::new(output);
        let stats = stream::run(
            &mut self.interpolator,
            &mut input,
            &mut output,
            self.format,
            self.block_size,
        )?;
        tracing::info!(
            input_samples = stats.input_samples,
            output_samples = stats.output_samples,
            "interpolation done"
        );
        if let (Some(metadata), Some(path)) = (&self.metadata, sigmf::meta_path(&self.output)) {
            metadata.write(&path)?;
        }
        Ok(self.interpolator.status())
    }
}

fn load_coefficients(path: Option<&Path>) -> Result<CoefficientTable> {
    let Some(path) = path else {
        tracing::debug!("using default filter design");
        return design::default_design();
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let coefficients: maia_interp_json::Coefficients = serde_json::from_str(&json)
        .with_context(|| format!("failed to parse {}", path.display()))?;
    CoefficientTable::try_from(&coefficients)
        .with_context(|| format!("invalid coefficient table in {}", path.display()))
}

// Builds the SigMF metadata of the output, if the output is a SigMF recording.
// The sample rate and frequency given in the CLI take precedence over the
// metadata of the input.
fn output_metadata(
    input: &Path,
    output: &Path,
    format: OutputFormat,
    sample_rate: Option<f64>,
    frequency: Option<f64>,
) -> Result<Option<Metadata>> {
    let input_metadata = match sigmf::meta_path(input) {
        Some(path) if path.exists() => {
            let metadata = Metadata::read(&path)?;
            anyhow::ensure!(
                metadata.datatype() == INPUT_DATATYPE,
                "input datatype is {}, but only {} is supported",
                metadata.datatype(),
                INPUT_DATATYPE
            );
            Some(metadata)
        }
        _ => None,
    };
    if sigmf::meta_path(output).is_none() {
        return Ok(None);
    }
    let mut metadata = input_metadata.unwrap_or_else(|| {
        Metadata::new(
            INPUT_DATATYPE,
            sample_rate.unwrap_or(0.0),
            frequency.unwrap_or(0.0),
        )
    });
    if let Some(sample_rate) = sample_rate {
        metadata.set_sample_rate(sample_rate);
    }
    if let Some(frequency) = frequency {
        metadata.set_frequency(frequency);
    }
    if metadata.sample_rate() == 0.0 {
        tracing::warn!("input sample rate unknown; writing a sample rate of 0 to SigMF metadata");
    }
    Ok(Some(metadata.interpolated(format.datatype(), INTERPOLATION)))
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    Ok(json)
}
