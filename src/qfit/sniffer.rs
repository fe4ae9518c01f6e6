//! Byte order and field family detection for QFIT files.
//!
//! The first 32-bit word of a QFIT file is the record size in bytes. It is read
//! big-endian first; a value of 100 or more cannot be a record size, so the same
//! word is re-read little-endian. The interpretation that yields a plausible size
//! fixes the byte order, and `size / 4` selects the field family.

use nom::number::complete::{be_i32, le_i32};
use nom::IResult;

use crate::constants::{MAX_RECORD_SIZE, QFIT_WORD_SIZE};

use super::{Endian, QfitFamily, QfitFormatError, RecordLayout};

fn first_word(input: &[u8], endian: Endian) -> IResult<&[u8], i32> {
    match endian {
        Endian::Big => be_i32(input),
        Endian::Little => le_i32(input),
    }
}

/// Read the record size word and return the winning byte order with the size.
///
/// Arguments
/// -----------------
/// * `bytes`: The whole file, or at least its first four bytes.
///
/// Return
/// ----------
/// * `(endian, record_size)` or a [`QfitFormatError`] if the buffer is too short or
///   neither byte order yields a size below 100.
pub fn sniff_record_size(bytes: &[u8]) -> Result<(Endian, i32), QfitFormatError> {
    let (_, big_endian) =
        first_word(bytes, Endian::Big).map_err(|_| QfitFormatError::TooShort(bytes.len()))?;
    if big_endian < MAX_RECORD_SIZE {
        return Ok((Endian::Big, big_endian));
    }

    let (_, little_endian) =
        first_word(bytes, Endian::Little).map_err(|_| QfitFormatError::TooShort(bytes.len()))?;
    if little_endian < MAX_RECORD_SIZE {
        return Ok((Endian::Little, little_endian));
    }

    Err(QfitFormatError::InvalidRecordSize {
        big_endian,
        little_endian,
    })
}

/// Determine the [`RecordLayout`] of a QFIT buffer from its own first word.
///
/// Arguments
/// -----------------
/// * `bytes`: Raw file content.
///
/// Return
/// ----------
/// * The layout among the six compiled-in ones, or
///   [`QfitFormatError::UnsupportedFieldCount`] when the record size is not
///   exactly 40, 48 or 56 bytes.
///
/// See also
/// ------------
/// * [`sniff_record_size`] – Byte order detection.
/// * [`RecordLayout::ALL`] – The candidate layouts.
pub fn sniff_layout(bytes: &[u8]) -> Result<RecordLayout, QfitFormatError> {
    let (endian, record_size) = sniff_record_size(bytes)?;

    if record_size <= 0 || record_size as usize % QFIT_WORD_SIZE != 0 {
        return Err(QfitFormatError::UnsupportedFieldCount(record_size));
    }

    let family = QfitFamily::from_field_count(record_size / QFIT_WORD_SIZE as i32)
        .ok_or(QfitFormatError::UnsupportedFieldCount(record_size))?;

    Ok(RecordLayout::new(family, endian))
}
