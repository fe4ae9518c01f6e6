//! # QFIT flat binary records
//!
//! Decoding of the legacy **QFIT** fixed-width binary format written by the
//! Airborne Topographic Mapper (ATM) laser altimeters.
//!
//! ## File structure
//!
//! A QFIT file is a flat sequence of records. Every record holds `N` signed
//! 32-bit integers (`N ∈ {10, 12, 14}`) in a single byte order:
//!
//! ```text
//! +----------------+----------------+-----+----------------+----------------+-----
//! | record 0       | header rec 1   | ... | header rec k   | data record    | ...
//! | word0 = 4·N    | word0 < 0      |     | word0 < 0      | word0 >= 0     |
//! +----------------+----------------+-----+----------------+----------------+-----
//! ```
//!
//! * The first word of the file is the **record size in bytes**; it fixes both the
//!   byte order ([`sniffer`]) and the field family.
//! * Record 0 is always a header; following records whose first word is negative
//!   are header records too. Their remaining bytes carry ASCII text, which is where
//!   the reference frame of the survey is sometimes written ([`header`]).
//! * The remaining records are data, decoded by [`record`].
//!
//! ## See also
//! ------------
//! * [`sniffer::sniff_layout`] – Byte order and field family from the first word.
//! * [`record::decode_qfit`] – Header stripping, filtering, scaling and augmentation.
//! * [`header::QfitHeader`] – Header text reassembly.
//! * <https://nsidc.org/sites/nsidc.org/files/files/ReadMe_qfit.txt>

pub mod header;
pub mod record;
pub mod sniffer;

use std::fmt;

use nom::number::Endianness;
use thiserror::Error;

use crate::constants::QFIT_WORD_SIZE;

/// File-level QFIT decoding failures.
///
/// Variants
/// -----------------
/// * `TooShort` – Fewer than 4 bytes; the record size word cannot be read.
/// * `InvalidRecordSize` – The first word is ≥ 100 in both byte orders.
/// * `UnsupportedFieldCount` – The record size is not 40, 48 or 56 bytes.
/// * `TruncatedRecord` – The buffer length is not a multiple of the record size.
/// * `EmptyFile` – Not even the leading header record is present.
/// * `WordParsing` – nom failed to read a record word.
#[derive(Error, Debug, PartialEq)]
pub enum QfitFormatError {
    #[error("File is too short to hold a record size word ({0} bytes)")]
    TooShort(usize),
    #[error("Invalid record size found: {big_endian} (big-endian) / {little_endian} (little-endian)")]
    InvalidRecordSize { big_endian: i32, little_endian: i32 },
    #[error("Unsupported record size of {0} bytes (expected 40, 48 or 56)")]
    UnsupportedFieldCount(i32),
    #[error("Buffer of {len} bytes is not a whole number of {record_size}-byte records")]
    TruncatedRecord { len: usize, record_size: usize },
    #[error("File contains no record")]
    EmptyFile,
    #[error("Error during the nom parsing: {0}")]
    WordParsing(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endian {
    Big,
    Little,
}

impl From<Endian> for Endianness {
    fn from(endian: Endian) -> Self {
        match endian {
            Endian::Big => Endianness::Big,
            Endian::Little => Endianness::Little,
        }
    }
}

/// Named QFIT fields, in the union of the three families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QfitField {
    RelTime,
    Latitude,
    Longitude,
    Elevation,
    XmtSigstr,
    RcvSigstr,
    Azimuth,
    Pitch,
    Roll,
    GpsPdop,
    PulseWidth,
    PassiveSignal,
    PassiveFootprintLatitude,
    PassiveFootprintLongitude,
    PassiveFootprintSynthesizedElevation,
    GpsTime,
}

impl QfitField {
    pub fn name(&self) -> &'static str {
        match self {
            QfitField::RelTime => "rel_time",
            QfitField::Latitude => "latitude",
            QfitField::Longitude => "longitude",
            QfitField::Elevation => "elevation",
            QfitField::XmtSigstr => "xmt_sigstr",
            QfitField::RcvSigstr => "rcv_sigstr",
            QfitField::Azimuth => "azimuth",
            QfitField::Pitch => "pitch",
            QfitField::Roll => "roll",
            QfitField::GpsPdop => "gps_pdop",
            QfitField::PulseWidth => "pulse_width",
            QfitField::PassiveSignal => "passive_signal",
            QfitField::PassiveFootprintLatitude => "passive_footprint_latitude",
            QfitField::PassiveFootprintLongitude => "passive_footprint_longitude",
            QfitField::PassiveFootprintSynthesizedElevation => {
                "passive_footprint_synthesized_elevation"
            }
            QfitField::GpsTime => "gps_time",
        }
    }
}

impl fmt::Display for QfitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Numeric representation of a stored field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    I32,
    U32,
}

/// One `(name, byte-width, numeric-kind)` entry of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: QfitField,
    pub width: usize,
    pub kind: NumericKind,
}

const fn word(field: QfitField) -> FieldSpec {
    FieldSpec {
        field,
        width: QFIT_WORD_SIZE,
        kind: NumericKind::I32,
    }
}

const FIELDS_10: [FieldSpec; 10] = [
    word(QfitField::RelTime),
    word(QfitField::Latitude),
    word(QfitField::Longitude),
    word(QfitField::Elevation),
    word(QfitField::XmtSigstr),
    word(QfitField::RcvSigstr),
    word(QfitField::Azimuth),
    word(QfitField::Pitch),
    word(QfitField::Roll),
    word(QfitField::GpsTime),
];

const FIELDS_12: [FieldSpec; 12] = [
    word(QfitField::RelTime),
    word(QfitField::Latitude),
    word(QfitField::Longitude),
    word(QfitField::Elevation),
    word(QfitField::XmtSigstr),
    word(QfitField::RcvSigstr),
    word(QfitField::Azimuth),
    word(QfitField::Pitch),
    word(QfitField::Roll),
    word(QfitField::GpsPdop),
    word(QfitField::PulseWidth),
    word(QfitField::GpsTime),
];

const FIELDS_14: [FieldSpec; 14] = [
    word(QfitField::RelTime),
    word(QfitField::Latitude),
    word(QfitField::Longitude),
    word(QfitField::Elevation),
    word(QfitField::XmtSigstr),
    word(QfitField::RcvSigstr),
    word(QfitField::Azimuth),
    word(QfitField::Pitch),
    word(QfitField::Roll),
    word(QfitField::PassiveSignal),
    word(QfitField::PassiveFootprintLatitude),
    word(QfitField::PassiveFootprintLongitude),
    word(QfitField::PassiveFootprintSynthesizedElevation),
    word(QfitField::GpsTime),
];

/// Field-count family of a QFIT file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QfitFamily {
    Words10,
    Words12,
    Words14,
}

impl QfitFamily {
    pub fn from_field_count(count: i32) -> Option<Self> {
        match count {
            10 => Some(QfitFamily::Words10),
            12 => Some(QfitFamily::Words12),
            14 => Some(QfitFamily::Words14),
            _ => None,
        }
    }

    pub fn field_count(&self) -> usize {
        self.fields().len()
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        match self {
            QfitFamily::Words10 => &FIELDS_10,
            QfitFamily::Words12 => &FIELDS_12,
            QfitFamily::Words14 => &FIELDS_14,
        }
    }
}

/// One of the six compiled-in QFIT layouts: a field family in a byte order.
///
/// See also
/// ------------
/// * [`sniffer::sniff_layout`] – Selects the layout from the file's first word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RecordLayout {
    pub family: QfitFamily,
    pub endian: Endian,
}

impl RecordLayout {
    pub const ALL: [RecordLayout; 6] = [
        RecordLayout::new(QfitFamily::Words10, Endian::Big),
        RecordLayout::new(QfitFamily::Words10, Endian::Little),
        RecordLayout::new(QfitFamily::Words12, Endian::Big),
        RecordLayout::new(QfitFamily::Words12, Endian::Little),
        RecordLayout::new(QfitFamily::Words14, Endian::Big),
        RecordLayout::new(QfitFamily::Words14, Endian::Little),
    ];

    pub const fn new(family: QfitFamily, endian: Endian) -> Self {
        RecordLayout { family, endian }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.family.fields()
    }

    pub fn field_count(&self) -> usize {
        self.family.field_count()
    }

    /// Size of one record in bytes.
    pub fn record_size(&self) -> usize {
        self.fields().iter().map(|f| f.width).sum()
    }

    /// Position of `field` in this layout, if the family carries it.
    pub fn index_of(&self, field: QfitField) -> Option<usize> {
        self.fields().iter().position(|spec| spec.field == field)
    }
}

impl fmt::Display for RecordLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let endian = match self.endian {
            Endian::Big => "big-endian",
            Endian::Little => "little-endian",
        };
        write!(f, "{}-word {endian}", self.field_count())
    }
}

#[cfg(test)]
mod qfit_layout_test {
    use super::*;

    #[test]
    fn test_record_sizes() {
        let sizes: Vec<usize> = RecordLayout::ALL.iter().map(|l| l.record_size()).collect();
        assert_eq!(sizes, vec![40, 40, 48, 48, 56, 56]);
    }

    #[test]
    fn test_shared_leading_fields() {
        for layout in RecordLayout::ALL {
            assert_eq!(layout.index_of(QfitField::RelTime), Some(0));
            assert_eq!(layout.index_of(QfitField::Latitude), Some(1));
            assert_eq!(layout.index_of(QfitField::Longitude), Some(2));
            assert_eq!(layout.index_of(QfitField::Elevation), Some(3));
            assert_eq!(
                layout.index_of(QfitField::GpsTime),
                Some(layout.field_count() - 1)
            );
        }
    }

    #[test]
    fn test_family_specific_fields() {
        let l10 = RecordLayout::new(QfitFamily::Words10, Endian::Big);
        let l12 = RecordLayout::new(QfitFamily::Words12, Endian::Big);
        let l14 = RecordLayout::new(QfitFamily::Words14, Endian::Little);

        assert_eq!(l10.index_of(QfitField::GpsPdop), None);
        assert_eq!(l12.index_of(QfitField::PulseWidth), Some(10));
        assert_eq!(l12.index_of(QfitField::PassiveSignal), None);
        assert_eq!(l14.index_of(QfitField::PassiveSignal), Some(9));
        assert_eq!(l14.index_of(QfitField::GpsPdop), None);
    }

    #[test]
    fn test_layout_display() {
        let layout = RecordLayout::new(QfitFamily::Words12, Endian::Little);
        assert_eq!(layout.to_string(), "12-word little-endian");
    }
}
