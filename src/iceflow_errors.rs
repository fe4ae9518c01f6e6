use chrono::NaiveDate;
use thiserror::Error;

use crate::qfit::QfitFormatError;

#[derive(Error, Debug)]
pub enum IceflowError {
    #[error("Unable to perform file operation: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Error while reading CSV parameters: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Error during the QFIT decoding: {0}")]
    QfitDecodeError(#[from] QfitFormatError),

    #[error("Failed to recognize {0} as ATM1B data")]
    UnrecognizedProduct(String),

    #[error("Failed to extract date from filename: {0}")]
    FilenameDate(String),

    #[error("Invalid packed time of day (HHMMSSmmm): {0}")]
    InvalidTimeOfDay(i64),

    #[error("ITRF not found for date {0}")]
    ItrfNotFoundForDate(NaiveDate),

    #[error("Unrecognized reference frame string: {0}")]
    InvalidReferenceFrame(String),

    #[error(
        "The provided ITRF string was not recognized: {0}. ITRF strings should be in the form 'ITRFYYYY'."
    )]
    InvalidTargetFrame(String),

    #[error("No tectonic plate found for centroid (lon = {lon}, lat = {lat})")]
    PlateNotResolved { lon: f64, lat: f64 },

    #[error("Variable not found in structured container: {0}")]
    MissingVariable(String),

    #[error("Variable {name} has {found} values, expected {expected}")]
    VariableLengthMismatch {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("No structured container reader configured for {0}")]
    StructuredReaderUnavailable(String),

    #[error("Geodesy engine failure: {0}")]
    GeodesyEngine(String),

    #[error("Geodesy engine returned {found} coordinates, expected {expected}")]
    EngineLengthMismatch { expected: usize, found: usize },
}

impl PartialEq for IceflowError {
    fn eq(&self, other: &Self) -> bool {
        use IceflowError::*;
        match (self, other) {
            // opaque wrapped errors: equal when the variant matches
            (IoError(_), IoError(_)) => true,
            (CsvError(_), CsvError(_)) => true,

            (QfitDecodeError(a), QfitDecodeError(b)) => a == b,
            (UnrecognizedProduct(a), UnrecognizedProduct(b)) => a == b,
            (FilenameDate(a), FilenameDate(b)) => a == b,
            (InvalidTimeOfDay(a), InvalidTimeOfDay(b)) => a == b,
            (ItrfNotFoundForDate(a), ItrfNotFoundForDate(b)) => a == b,
            (InvalidReferenceFrame(a), InvalidReferenceFrame(b)) => a == b,
            (InvalidTargetFrame(a), InvalidTargetFrame(b)) => a == b,
            (
                PlateNotResolved { lon: a, lat: b },
                PlateNotResolved { lon: c, lat: d },
            ) => a == c && b == d,
            (MissingVariable(a), MissingVariable(b)) => a == b,
            (
                VariableLengthMismatch {
                    name: a,
                    expected: b,
                    found: c,
                },
                VariableLengthMismatch {
                    name: d,
                    expected: e,
                    found: f,
                },
            ) => a == d && b == e && c == f,
            (StructuredReaderUnavailable(a), StructuredReaderUnavailable(b)) => a == b,
            (GeodesyEngine(a), GeodesyEngine(b)) => a == b,
            (
                EngineLengthMismatch {
                    expected: a,
                    found: b,
                },
                EngineLengthMismatch {
                    expected: c,
                    found: d,
                },
            ) => a == c && b == d,

            _ => false,
        }
    }
}
