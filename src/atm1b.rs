//! # ATM1B granules
//!
//! Airborne Topographic Mapper L1B elevation granules come in three products,
//! recognized from the filename:
//!
//! | product      | years     | container  | date token                |
//! |--------------|-----------|------------|---------------------------|
//! | `BLATM1B` v1 | 1993–2008 | QFIT       | `BLATM1B_YYYYMMDD` or `BLATM1B_YYMMDD` |
//! | `ILATM1B` v1 | 2009–2012 | QFIT       | `_YYYYMMDD_`              |
//! | `ILATM1B` v2 | 2013+     | structured | `_YYYYMMDD_`              |
//!
//! [`read_atm1b`] composes the pipeline for one file:
//!
//! 1. product and acquisition date from the filename,
//! 2. container from the extension (`.qi` sniffed into a [`RecordLayout`], `.h5`
//!    opened through a [`StructuredOpener`]),
//! 3. record decoding,
//! 4. one reference frame for the whole file,
//! 5. a UTC instant per record.
//!
//! ## Example filenames
//!
//! ```text
//! ILATM1B_20140430_110310.ATM4BT4.h5
//! ILATM1B_20111104_181304.ATM4BT4.qi
//! BLATM1B_20060522_145449.qi
//! BLATM1B_20041127atm2_210316jr.lutF.qi
//! ```

use std::fmt;
use std::sync::LazyLock;

use camino::{Utf8Path, Utf8PathBuf};
use chrono::NaiveDate;
use log::debug;
use regex::Regex;

use crate::iceflow_errors::IceflowError;
use crate::itrf::resolver::{resolve_qfit_frame, resolve_structured_frame};
use crate::itrf::ItrfFrame;
use crate::point::PointMeasurement;
use crate::qfit::record::{decode_records, split_records};
use crate::qfit::sniffer::sniff_layout;
use crate::qfit::RecordLayout;
use crate::structured::{decode_structured, StructuredOpener};
use crate::time::{blatm1b_date, ilatm1b_date, LeapSeconds, TimeResolver};

static PRODUCT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d{4})\d{4}").expect("valid product year regex"));

/// Bytes of one input file and the name it was read under.
#[derive(Debug, Clone, PartialEq)]
pub struct RawFile {
    pub path: Utf8PathBuf,
    pub bytes: Vec<u8>,
}

impl RawFile {
    pub fn new(path: impl Into<Utf8PathBuf>, bytes: Vec<u8>) -> Self {
        RawFile {
            path: path.into(),
            bytes,
        }
    }

    /// Read a whole file from disk.
    pub fn read(path: &Utf8Path) -> Result<Self, IceflowError> {
        let bytes = std::fs::read(path)?;
        Ok(RawFile::new(path, bytes))
    }

    /// Last path component, used for product and date recognition.
    pub fn file_name(&self) -> &str {
        self.path.file_name().unwrap_or(self.path.as_str())
    }
}

/// The three ATM1B products.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Atm1bProduct {
    Blatm1bV1,
    Ilatm1bV1,
    Ilatm1bV2,
}

impl Atm1bProduct {
    /// Recognize the product from a filename.
    ///
    /// A `BLATM1B_` prefix always means BLATM1B v1, whatever the date width.
    /// Otherwise the year of the first `_YYYYMMDD` token decides: 2013 and later
    /// is ILATM1B v2, 2009 to 2012 ILATM1B v1, earlier years BLATM1B v1.
    pub fn from_filename(filename: &str) -> Result<Self, IceflowError> {
        if filename.contains("BLATM1B_") {
            return Ok(Atm1bProduct::Blatm1bV1);
        }

        let year: i32 = PRODUCT_YEAR
            .captures(filename)
            .and_then(|caps| caps[1].parse().ok())
            .ok_or_else(|| IceflowError::UnrecognizedProduct(filename.to_string()))?;

        Ok(match year {
            y if y >= 2013 => Atm1bProduct::Ilatm1bV2,
            y if y >= 2009 => Atm1bProduct::Ilatm1bV1,
            _ => Atm1bProduct::Blatm1bV1,
        })
    }

    /// `true` when this product is distributed in `container`: ILATM1B v2 in
    /// the structured container, the two v1 products as QFIT.
    pub fn matches(&self, container: &Container) -> bool {
        matches!(
            (self, container),
            (Atm1bProduct::Ilatm1bV2, Container::Structured)
                | (
                    Atm1bProduct::Blatm1bV1 | Atm1bProduct::Ilatm1bV1,
                    Container::Flat(_)
                )
        )
    }

    /// Acquisition date, with the filename pattern of this product.
    pub fn file_date(&self, filename: &str) -> Result<NaiveDate, IceflowError> {
        match self {
            Atm1bProduct::Blatm1bV1 => blatm1b_date(filename),
            Atm1bProduct::Ilatm1bV1 | Atm1bProduct::Ilatm1bV2 => ilatm1b_date(filename),
        }
    }
}

impl fmt::Display for Atm1bProduct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Atm1bProduct::Blatm1bV1 => "BLATM1B v1",
            Atm1bProduct::Ilatm1bV1 => "ILATM1B v1",
            Atm1bProduct::Ilatm1bV2 => "ILATM1B v2",
        };
        write!(f, "{s}")
    }
}

/// Physical container of a granule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// QFIT fixed-width binary records
    Flat(RecordLayout),
    /// Hierarchical container with named variables
    Structured,
}

impl Container {
    /// Pick the container from the file extension, sniffing flat files.
    ///
    /// Return
    /// ----------
    /// * `.qi` → [`Container::Flat`] with the sniffed layout, `.h5` →
    ///   [`Container::Structured`], anything else
    ///   [`IceflowError::UnrecognizedProduct`].
    pub fn detect(file: &RawFile) -> Result<Self, IceflowError> {
        match file.path.extension().map(str::to_ascii_lowercase).as_deref() {
            Some("qi") => Ok(Container::Flat(sniff_layout(&file.bytes)?)),
            Some("h5") => Ok(Container::Structured),
            _ => Err(IceflowError::UnrecognizedProduct(file.file_name().to_string())),
        }
    }
}

/// A decoded granule: every record as a tagged point.
#[derive(Debug, Clone, PartialEq)]
pub struct Atm1bGranule {
    pub filename: String,
    pub product: Atm1bProduct,
    pub container: Container,
    pub file_date: NaiveDate,
    pub reference_frame: ItrfFrame,
    pub points: Vec<PointMeasurement>,
}

/// Decode one ATM1B file.
///
/// Arguments
/// -----------------
/// * `file`: The file bytes and name.
/// * `leap_seconds`: GPS−UTC table used for the acquisition date.
/// * `opener`: Reader for structured containers, if any.
///
/// Return
/// ----------
/// * The granule, or the first error. A structured file without an opener fails
///   with [`IceflowError::StructuredReaderUnavailable`]. A 14-word file whose
///   records are all invalid yields a granule without points.
///
/// See also
/// ------------
/// * [`crate::qfit`] – QFIT sniffing and decoding.
/// * [`crate::itrf::resolver`] – Frame resolution.
/// * [`TimeResolver`] – Packed time of day to UTC.
pub fn read_atm1b(
    file: &RawFile,
    leap_seconds: &dyn LeapSeconds,
    opener: Option<&dyn StructuredOpener>,
) -> Result<Atm1bGranule, IceflowError> {
    let filename = file.file_name();
    let product = Atm1bProduct::from_filename(filename)?;
    let file_date = product.file_date(filename)?;
    let container = Container::detect(file)?;
    if !product.matches(&container) {
        return Err(IceflowError::UnrecognizedProduct(filename.to_string()));
    }
    debug!("Reading {filename} as {product} ({container:?}) acquired {file_date}");

    let (rows, reference_frame) = match container {
        Container::Flat(layout) => {
            let records = split_records(&file.bytes, layout)?;
            let frame = resolve_qfit_frame(filename, &records.header.text(), file_date)?;
            (decode_records(&records), frame)
        }
        Container::Structured => {
            let opener = opener
                .ok_or_else(|| IceflowError::StructuredReaderUnavailable(filename.to_string()))?;
            let source = opener.open(file)?;
            let rows = decode_structured(source.as_ref())?;
            (rows, resolve_structured_frame(source.as_ref())?)
        }
    };

    let time = TimeResolver::new(file_date, leap_seconds);
    let points = rows
        .into_iter()
        .map(|row| {
            let utc = time.utc_datetime(row.packed_time())?;
            Ok(row.into_point(utc, reference_frame.clone()))
        })
        .collect::<Result<Vec<_>, IceflowError>>()?;

    Ok(Atm1bGranule {
        filename: filename.to_string(),
        product,
        container,
        file_date,
        reference_frame,
        points,
    })
}
