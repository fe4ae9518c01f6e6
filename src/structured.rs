//! # Structured (HDF5-like) ATM1B container
//!
//! ILATM1B v2 granules are hierarchical containers: every field is a named
//! one-dimensional variable and the reference frame is stored as ancillary
//! metadata. The crate does not bundle a reader for the container format
//! itself; callers plug one in through [`StructuredOpener`], which hands back a
//! [`StructuredSource`].
//!
//! ## Variable table
//!
//! | field         | path                                   | scale | kind  |
//! |---------------|----------------------------------------|-------|-------|
//! | `rel_time`    | `instrument_parameters/rel_time`       | 1000  | `i32` |
//! | `latitude`    | `latitude`                             |       |       |
//! | `longitude`   | `longitude`                            |       |       |
//! | `elevation`   | `elevation`                            |       |       |
//! | `xmt_sigstr`  | `instrument_parameters/xmt_sigstr`     |       |       |
//! | `rcv_sigstr`  | `instrument_parameters/rcv_sigstr`     |       |       |
//! | `azimuth`     | `instrument_parameters/azimuth`        | 1000  | `i32` |
//! | `pitch`       | `instrument_parameters/pitch`          | 1000  | `i32` |
//! | `roll`        | `instrument_parameters/roll`           | 1000  | `i32` |
//! | `gps_pdop`    | `instrument_parameters/gps_pdop`       | 10    | `i32` |
//! | `pulse_width` | `instrument_parameters/pulse_width`    | 1     | `u32` |
//! | `gps_time`    | `instrument_parameters/time_hhmmss`    | 1000  | `u32` |
//!
//! A scale and a cast are applied only when both are declared. Casts truncate
//! toward zero.

use std::collections::{BTreeMap, HashMap};

use crate::atm1b::RawFile;
use crate::conversion::normalize_longitude;
use crate::iceflow_errors::IceflowError;
use crate::point::{Atm1bInstrument, DecodedRow};
use crate::qfit::{NumericKind, QfitField};

/// Path of the reference frame string array.
pub const REFERENCE_FRAME_PATH: &str = "ancillary_data/reference_frame";

/// Read access to the variables of one opened container.
pub trait StructuredSource: Send + Sync {
    /// All values of a numeric variable, widened to `f64`.
    fn variable(&self, path: &str) -> Result<Vec<f64>, IceflowError>;

    /// All values of a string variable.
    fn strings(&self, path: &str) -> Result<Vec<String>, IceflowError>;
}

/// Opens the structured container held by a [`RawFile`].
pub trait StructuredOpener: Send + Sync {
    fn open(&self, file: &RawFile) -> Result<Box<dyn StructuredSource>, IceflowError>;
}

impl<F> StructuredOpener for F
where
    F: Fn(&RawFile) -> Result<Box<dyn StructuredSource>, IceflowError> + Send + Sync,
{
    fn open(&self, file: &RawFile) -> Result<Box<dyn StructuredSource>, IceflowError> {
        self(file)
    }
}

/// A container whose variables are already in memory.
///
/// Useful for callers that decode the container themselves and for tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InMemoryContainer {
    variables: BTreeMap<String, Vec<f64>>,
    strings: BTreeMap<String, Vec<String>>,
}

impl InMemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, path: impl Into<String>, values: Vec<f64>) -> Self {
        self.variables.insert(path.into(), values);
        self
    }

    pub fn with_strings(mut self, path: impl Into<String>, values: Vec<String>) -> Self {
        self.strings.insert(path.into(), values);
        self
    }
}

impl StructuredSource for InMemoryContainer {
    fn variable(&self, path: &str) -> Result<Vec<f64>, IceflowError> {
        self.variables
            .get(path)
            .cloned()
            .ok_or_else(|| IceflowError::MissingVariable(path.to_string()))
    }

    fn strings(&self, path: &str) -> Result<Vec<String>, IceflowError> {
        self.strings
            .get(path)
            .cloned()
            .ok_or_else(|| IceflowError::MissingVariable(path.to_string()))
    }
}

/// One entry of the variable table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StructuredVariable {
    pub field: QfitField,
    pub path: &'static str,
    pub scale: Option<f64>,
    pub kind: Option<NumericKind>,
}

const fn plain(field: QfitField, path: &'static str) -> StructuredVariable {
    StructuredVariable {
        field,
        path,
        scale: None,
        kind: None,
    }
}

const fn scaled(
    field: QfitField,
    path: &'static str,
    scale: f64,
    kind: NumericKind,
) -> StructuredVariable {
    StructuredVariable {
        field,
        path,
        scale: Some(scale),
        kind: Some(kind),
    }
}

pub const ILATM1B_V2_VARIABLES: [StructuredVariable; 12] = [
    scaled(QfitField::RelTime, "instrument_parameters/rel_time", 1000.0, NumericKind::I32),
    plain(QfitField::Latitude, "latitude"),
    plain(QfitField::Longitude, "longitude"),
    plain(QfitField::Elevation, "elevation"),
    plain(QfitField::XmtSigstr, "instrument_parameters/xmt_sigstr"),
    plain(QfitField::RcvSigstr, "instrument_parameters/rcv_sigstr"),
    scaled(QfitField::Azimuth, "instrument_parameters/azimuth", 1000.0, NumericKind::I32),
    scaled(QfitField::Pitch, "instrument_parameters/pitch", 1000.0, NumericKind::I32),
    scaled(QfitField::Roll, "instrument_parameters/roll", 1000.0, NumericKind::I32),
    scaled(QfitField::GpsPdop, "instrument_parameters/gps_pdop", 10.0, NumericKind::I32),
    scaled(QfitField::PulseWidth, "instrument_parameters/pulse_width", 1.0, NumericKind::U32),
    scaled(QfitField::GpsTime, "instrument_parameters/time_hhmmss", 1000.0, NumericKind::U32),
];

impl StructuredVariable {
    fn convert(&self, value: f64) -> f64 {
        match (self.scale, self.kind) {
            (Some(scale), Some(NumericKind::I32)) => f64::from((value * scale) as i32),
            (Some(scale), Some(NumericKind::U32)) => f64::from((value * scale) as u32),
            _ => value,
        }
    }

    /// Read the variable from `source` and apply its declared conversion.
    pub fn read(&self, source: &dyn StructuredSource) -> Result<Vec<f64>, IceflowError> {
        Ok(source
            .variable(self.path)?
            .into_iter()
            .map(|v| self.convert(v))
            .collect())
    }
}

/// Read every variable of the table into [`DecodedRow`]s.
///
/// Arguments
/// -----------------
/// * `source`: An opened ILATM1B v2 container.
///
/// Return
/// ----------
/// * One row per sample, longitude wrapped into [-180, 180) and passive fields
///   left `None`. All variables must have the length of `latitude`, otherwise
///   [`IceflowError::VariableLengthMismatch`] is returned.
pub fn decode_structured(source: &dyn StructuredSource) -> Result<Vec<DecodedRow>, IceflowError> {
    let mut columns: HashMap<QfitField, Vec<f64>> = HashMap::new();
    for variable in &ILATM1B_V2_VARIABLES {
        columns.insert(variable.field, variable.read(source)?);
    }

    let expected = columns[&QfitField::Latitude].len();
    for variable in &ILATM1B_V2_VARIABLES {
        let found = columns[&variable.field].len();
        if found != expected {
            return Err(IceflowError::VariableLengthMismatch {
                name: variable.path.to_string(),
                expected,
                found,
            });
        }
    }

    let column = |field: QfitField| &columns[&field];

    Ok((0..expected)
        .map(|i| DecodedRow {
            latitude: column(QfitField::Latitude)[i],
            longitude: normalize_longitude(column(QfitField::Longitude)[i]),
            elevation: column(QfitField::Elevation)[i] as f32,
            instrument: Atm1bInstrument {
                rel_time: column(QfitField::RelTime)[i],
                xmt_sigstr: column(QfitField::XmtSigstr)[i],
                rcv_sigstr: column(QfitField::RcvSigstr)[i],
                azimuth: column(QfitField::Azimuth)[i],
                pitch: column(QfitField::Pitch)[i],
                roll: column(QfitField::Roll)[i],
                gps_time: column(QfitField::GpsTime)[i],
                gps_pdop: Some(column(QfitField::GpsPdop)[i]),
                pulse_width: Some(column(QfitField::PulseWidth)[i]),
                ..Atm1bInstrument::default()
            },
        })
        .collect())
}
