//! Fixed-width QFIT record decoding.
//!
//! [`split_records`] cuts the buffer into records, reads every word with the
//! layout's byte order and separates the header block from the data block.
//! [`decode_qfit`] then turns data records into [`DecodedRow`]s:
//!
//! 1. 14-word files only: records with `latitude == 0` or `elevation == -9999`
//!    are passive-channel faults and are dropped.
//! 2. Latitude/longitude are divided by 1e6, longitude is wrapped into [-180, 180).
//! 3. Elevation millimeters become single precision meters.
//! 4. Instrument fields the family lacks are left `None`.

use log::{info, warn};
use nom::multi::count;
use nom::number::complete::i32 as word_i32;
use nom::number::Endianness;
use nom::IResult;

use crate::constants::INVALID_ELEVATION_MM;
use crate::conversion::{microdegrees_to_degrees, millimeters_to_meters, normalize_longitude};
use crate::point::{Atm1bInstrument, DecodedRow};

use super::header::QfitHeader;
use super::{QfitFamily, QfitField, QfitFormatError, RecordLayout};

/// A QFIT buffer cut into its header block and its data records.
#[derive(Debug, Clone, PartialEq)]
pub struct QfitRecords<'a> {
    pub layout: RecordLayout,
    pub header: QfitHeader<'a>,
    pub data: Vec<Vec<i32>>,
}

fn record_words(input: &[u8], endian: Endianness, n: usize) -> IResult<&[u8], Vec<i32>> {
    count(word_i32(endian), n)(input)
}

/// Cut `bytes` into records and strip the header block.
///
/// Record 0 is always a header. Scanning forward, every record whose first word
/// is negative is a header record as well; the first non-negative first word
/// starts the data block.
///
/// Arguments
/// -----------------
/// * `bytes`: The whole QFIT file.
/// * `layout`: The layout returned by [`super::sniffer::sniff_layout`].
///
/// Return
/// ----------
/// * The split records, or a [`QfitFormatError`] if the buffer is not a whole
///   number of records or holds none at all.
pub fn split_records(
    bytes: &[u8],
    layout: RecordLayout,
) -> Result<QfitRecords<'_>, QfitFormatError> {
    let record_size = layout.record_size();
    if bytes.len() % record_size != 0 {
        return Err(QfitFormatError::TruncatedRecord {
            len: bytes.len(),
            record_size,
        });
    }

    let chunks: Vec<&[u8]> = bytes.chunks_exact(record_size).collect();
    if chunks.is_empty() {
        return Err(QfitFormatError::EmptyFile);
    }

    let endian = Endianness::from(layout.endian);
    let mut words = chunks
        .iter()
        .map(|chunk| {
            record_words(chunk, endian, layout.field_count())
                .map(|(_, w)| w)
                .map_err(|e| QfitFormatError::WordParsing(e.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut idx = 1;
    while idx < words.len() && words[idx][0] < 0 {
        idx += 1;
    }

    let data = words.split_off(idx);

    Ok(QfitRecords {
        layout,
        header: QfitHeader::new(chunks[1..idx].to_vec()),
        data,
    })
}

fn is_valid_passive_record(layout: &RecordLayout, words: &[i32]) -> bool {
    let lat = layout.index_of(QfitField::Latitude).map(|i| words[i]);
    let elev = layout.index_of(QfitField::Elevation).map(|i| words[i]);
    lat != Some(0) && elev != Some(INVALID_ELEVATION_MM)
}

impl DecodedRow {
    /// Build a row from one data record of `layout`.
    ///
    /// The nine leading fields and the trailing `gps_time` share their position in
    /// every family; the family specific ones are looked up by name and stay `None`
    /// when the family does not carry them.
    pub(crate) fn from_words(layout: &RecordLayout, words: &[i32]) -> Self {
        let optional = |field: QfitField| layout.index_of(field).map(|i| f64::from(words[i]));
        let gps_time = words[layout.field_count() - 1];

        DecodedRow {
            latitude: microdegrees_to_degrees(words[1]),
            longitude: normalize_longitude(microdegrees_to_degrees(words[2])),
            elevation: millimeters_to_meters(words[3]),
            instrument: Atm1bInstrument {
                rel_time: f64::from(words[0]),
                xmt_sigstr: f64::from(words[4]),
                rcv_sigstr: f64::from(words[5]),
                azimuth: f64::from(words[6]),
                pitch: f64::from(words[7]),
                roll: f64::from(words[8]),
                gps_time: f64::from(gps_time),
                gps_pdop: optional(QfitField::GpsPdop),
                pulse_width: optional(QfitField::PulseWidth),
                passive_signal: optional(QfitField::PassiveSignal),
                passive_footprint_latitude: optional(QfitField::PassiveFootprintLatitude),
                passive_footprint_longitude: optional(QfitField::PassiveFootprintLongitude),
                passive_footprint_synthesized_elevation: optional(
                    QfitField::PassiveFootprintSynthesizedElevation,
                ),
            },
        }
    }
}

/// Decode the data records of an already split QFIT buffer.
///
/// Arguments
/// -----------------
/// * `records`: Output of [`split_records`].
///
/// Return
/// ----------
/// * The decoded rows. An empty vector is returned when the 14-word validity
///   filter removes every record.
pub fn decode_records(records: &QfitRecords<'_>) -> Vec<DecodedRow> {
    let layout = records.layout;

    let valid: Vec<&Vec<i32>> = if layout.family == QfitFamily::Words14 {
        info!("Before filter: {} records", records.data.len());
        let kept: Vec<&Vec<i32>> = records
            .data
            .iter()
            .filter(|w| is_valid_passive_record(&layout, w))
            .collect();
        info!("After filter: {} records", kept.len());

        if kept.is_empty() {
            warn!("After removal of bad data, file contains no valid data.");
            return Vec::new();
        }
        kept
    } else {
        records.data.iter().collect()
    };

    valid
        .into_iter()
        .map(|words| DecodedRow::from_words(&layout, words))
        .collect()
}

/// Decode a whole QFIT buffer with the given layout.
///
/// See also
/// ------------
/// * [`split_records`] – Header stripping.
/// * [`decode_records`] – Filtering, scaling and augmentation.
pub fn decode_qfit(bytes: &[u8], layout: RecordLayout) -> Result<Vec<DecodedRow>, QfitFormatError> {
    let records = split_records(bytes, layout)?;
    Ok(decode_records(&records))
}
