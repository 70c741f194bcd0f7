//! SigMF format.
//!
//! This module contains a minimal implementation of [SigMF](https://github.com/gnuradio/SigMF/),
//! sufficient to read the metadata of an input recording and to write the
//! metadata of the interpolated recording.

use anyhow::{Context, Result};
use chrono::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};

const SIGMF_VERSION: &str = "1.0.0";
const SIGMF_RECORDER: &str = concat!("Maia SDR interpolator v", env!("CARGO_PKG_VERSION"));

/// SigMF metadata.
///
/// This structure can be used to create and edit SigMF metadata, and convert it
/// to and from JSON format for its storage in a `.sigmf-meta` file.
///
/// # Examples
/// ```
/// use maia_interp::sigmf::{Datatype, Endianness, Field, Metadata, SampleFormat};
/// let datatype = Datatype { field: Field::Complex, format: SampleFormat::I16(Endianness::Le) };
/// let sample_rate = 1e6; // 1 Msps
/// let frequency = 100e6; // 100 MHz
/// let metadata = Metadata::new(datatype, sample_rate, frequency);
/// println!("{}", metadata.to_json());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    datatype: Datatype,
    sample_rate: f64,
    description: String,
    author: String,
    frequency: f64,
    datetime: DateTime<Utc>,
}

/// SigMF datatype.
///
/// A datatype is formed by a field, which can be either real or complex, and a
/// sample format.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Datatype {
    /// Datatype field.
    ///
    /// This indicates if the signal is complex (IQ) or real.
    pub field: Field,
    /// Datatype sample format.
    ///
    /// The sample format indicates the width and format (floating point or
    /// integer) of the samples.
    pub format: SampleFormat,
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> Result<(), std::fmt::Error> {
        let field = match self.field {
            Field::Real => "r",
            Field::Complex => "c",
        };
        let (format, endianness) = match self.format {
            SampleFormat::F32(e) => ("f32", Some(e)),
            SampleFormat::F64(e) => ("f64", Some(e)),
            SampleFormat::I32(e) => ("i32", Some(e)),
            SampleFormat::I16(e) => ("i16", Some(e)),
            SampleFormat::U32(e) => ("u32", Some(e)),
            SampleFormat::U16(e) => ("u16", Some(e)),
            SampleFormat::I8 => ("i8", None),
            SampleFormat::U8 => ("u8", None),
        };
        let endianness = match endianness {
            Some(e) => match e {
                Endianness::Le => "_le",
                Endianness::Be => "_be",
            },
            None => "",
        };
        write!(f, "{field}{format}{endianness}")
    }
}

impl std::str::FromStr for Datatype {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Datatype> {
        let unknown = || anyhow::anyhow!("unknown SigMF datatype {s:?}");
        let (field, rest) = if let Some(rest) = s.strip_prefix('c') {
            (Field::Complex, rest)
        } else if let Some(rest) = s.strip_prefix('r') {
            (Field::Real, rest)
        } else {
            return Err(unknown());
        };
        let (format, endianness) = match rest.split_once('_') {
            Some((format, "le")) => (format, Some(Endianness::Le)),
            Some((format, "be")) => (format, Some(Endianness::Be)),
            Some(_) => return Err(unknown()),
            None => (rest, None),
        };
        let format = match (format, endianness) {
            ("f32", Some(e)) => SampleFormat::F32(e),
            ("f64", Some(e)) => SampleFormat::F64(e),
            ("i32", Some(e)) => SampleFormat::I32(e),
            ("i16", Some(e)) => SampleFormat::I16(e),
            ("u32", Some(e)) => SampleFormat::U32(e),
            ("u16", Some(e)) => SampleFormat::U16(e),
            ("i8", None) => SampleFormat::I8,
            ("u8", None) => SampleFormat::U8,
            _ => return Err(unknown()),
        };
        Ok(Datatype { field, format })
    }
}

/// Datatype field.
///
/// A datatype [field](https://en.wikipedia.org/wiki/Field_(mathematics)) is used
/// to indicate if the signal is complex (IQ) or real.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Field {
    /// Real field.
    Real,
    /// Complex field.
    Complex,
}

/// Sample format.
///
/// The sample format indicates the width and type (floating point or integer)
/// of the numbers used to represent the signal samples.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SampleFormat {
    /// 32-bit IEEE 754 floating point.
    F32(Endianness),
    /// 64-bit IEEE 754 floating point.
    F64(Endianness),
    /// 32-bit signed integer.
    I32(Endianness),
    /// 16-bit signed integer.
    I16(Endianness),
    /// 32-bit unsigned integer.
    U32(Endianness),
    /// 16-bit unsigned integer.
    U16(Endianness),
    /// 8-bit signed integer.
    I8,
    /// 8-bit unsigned integer.
    U8,
}

/// Endianness.
///
/// The endianness indicates the order of the bytes forming a multi-byte number
/// in memory or in a file.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Endianness {
    /// Little-endian.
    Le,
    /// Big-endian.
    Be,
}

impl Metadata {
    /// Creates a new SigMF metadata object.
    ///
    /// The datatype, sample rate and frequency are mandatory parameters. The
    /// datetime field is set to the current time. The description and author
    /// fields are initialized to empty strings.
    pub fn new(datatype: Datatype, sample_rate: f64, frequency: f64) -> Metadata {
        Metadata {
            datatype,
            sample_rate,
            description: String::new(),
            author: String::new(),
            frequency,
            datetime: Utc::now(),
        }
    }

    /// Gives the value of the datatype field.
    pub fn datatype(&self) -> Datatype {
        self.datatype
    }

    /// Sets the value datatype field.
    pub fn set_datatype(&mut self, datatype: Datatype) {
        self.datatype = datatype;
    }

    /// Gives the value of the sample rate field (in samples per second).
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Sets the value of the sample rate field.
    pub fn set_sample_rate(&mut self, sample_rate: f64) {
        self.sample_rate = sample_rate;
    }

    /// Gives the value of the description field.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Sets the value of the description field.
    pub fn set_description(&mut self, description: &str) {
        self.description.replace_range(.., description);
    }

    /// Gives the value of the author field.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Sets the value of the author field.
    pub fn set_author(&mut self, author: &str) {
        self.author.replace_range(.., author);
    }

    /// Gives the value of the frequency field (in Hz).
    pub fn frequency(&self) -> f64 {
        self.frequency
    }

    /// Sets the value of the frequency field.
    pub fn set_frequency(&mut self, frequency: f64) {
        self.frequency = frequency;
    }

    /// Sets the value of the datetime field.
    pub fn set_datetime(&mut self, datetime: DateTime<Utc>) {
        self.datetime = datetime;
    }

    /// Returns the metadata of the interpolated recording.
    ///
    /// The sample rate is multiplied by the `interpolation` factor and the
    /// datatype is replaced by the output `datatype`. The remaining fields are
    /// kept.
    pub fn interpolated(&self, datatype: Datatype, interpolation: usize) -> Metadata {
        let mut metadata = self.clone();
        metadata.set_datatype(datatype);
        metadata.set_sample_rate(self.sample_rate * interpolation as f64);
        if metadata.description.is_empty() {
            metadata.set_description(&format!("{interpolation}x interpolation"));
        } else {
            metadata.set_description(&format!(
                "{} ({interpolation}x interpolation)",
                self.description
            ));
        }
        metadata
    }

    /// Returns a string that represents the metadata in JSON.
    ///
    /// The formatting of the JSON is compliant with the SigMF standard.
    pub fn to_json(&self) -> String {
        let json = self.to_json_value();
        let mut s = serde_json::to_string_pretty(&json).unwrap_or_default();
        s.push('\n'); // to_string_pretty does not include a final \n
        s
    }

    /// Returns a JSON [`serde_json::Value`] that represents the metadata in JSON.
    ///
    /// The formatting of the JSON is compliant with the SigMF standard.
    pub fn to_json_value(&self) -> serde_json::Value {
        json!({
            "global": {
                "core:datatype": self.datatype.to_string(),
                "core:version": SIGMF_VERSION,
                "core:sample_rate": self.sample_rate,
                "core:description": self.description,
                "core:author": self.author,
                "core:recorder": SIGMF_RECORDER
            },
            "captures": [
                {
                    "core:sample_start": 0,
                    "core:frequency": self.frequency,
                    "core:datetime": self.datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
                }
            ],
            "annotations": []
        })
    }

    /// Parses SigMF metadata from its JSON representation.
    ///
    /// The datatype and sample rate are mandatory. The frequency and datetime
    /// are taken from the first capture, if present. Missing optional fields
    /// take the same values as in [`Metadata::new`].
    pub fn from_json(json: &str) -> Result<Metadata> {
        let value: serde_json::Value =
            serde_json::from_str(json).context("SigMF metadata is not valid JSON")?;
        let global = &value["global"];
        let datatype = global["core:datatype"]
            .as_str()
            .context("SigMF metadata has no core:datatype")?
            .parse()?;
        let sample_rate = global["core:sample_rate"]
            .as_f64()
            .context("SigMF metadata has no core:sample_rate")?;
        let capture = &value["captures"][0];
        let mut metadata =
            Metadata::new(datatype, sample_rate, capture["core:frequency"].as_f64().unwrap_or(0.0));
        if let Some(description) = global["core:description"].as_str() {
            metadata.set_description(description);
        }
        if let Some(author) = global["core:author"].as_str() {
            metadata.set_author(author);
        }
        if let Some(datetime) = capture["core:datetime"].as_str() {
            let datetime = DateTime::parse_from_rfc3339(datetime)
                .with_context(|| format!("invalid SigMF datetime {datetime:?}"))?;
            metadata.set_datetime(datetime.with_timezone(&Utc));
        }
        Ok(metadata)
    }

    /// Reads SigMF metadata from a `.sigmf-meta` file.
    pub fn read(path: &Path) -> Result<Metadata> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Metadata::from_json(&json).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Writes SigMF metadata to a `.sigmf-meta` file.
    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json())
            .with_context(|| format!("failed to write {}", path.display()))
    }
}

/// Returns the path of the `.sigmf-meta` file that corresponds to a
/// `.sigmf-data` file.
///
/// Returns `None` if `path` does not have the `.sigmf-data` extension.
pub fn meta_path(data_path: &Path) -> Option<PathBuf> {
    if data_path.extension()? == "sigmf-data" {
        Some(data_path.with_extension("sigmf-meta"))
    } else {
        None
    }
}
