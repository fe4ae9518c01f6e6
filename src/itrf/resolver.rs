//! # Reference frame of a granule
//!
//! One frame is resolved per file, never per record.
//!
//! * **Structured container**: the frame is stored in the ancillary metadata
//!   ([`crate::structured::REFERENCE_FRAME_PATH`]) and used as is, after
//!   normalization.
//! * **QFIT file**: the reassembled header text is searched for `itrf` followed
//!   by 2 to 4 digits. A single distinct token wins, even when the date table
//!   disagrees (a warning is logged). No token, or several distinct tokens, and
//!   the date table of [`super::granule_ranges`] decides alone.
//!
//! ## See also
//! ------------
//! * [`super::find_frame_tokens`] – Header token search.
//! * [`super::granule_ranges::resolve_frame_by_date`] – Date fallback.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::iceflow_errors::IceflowError;
use crate::structured::{StructuredSource, REFERENCE_FRAME_PATH};

use super::granule_ranges::resolve_frame_by_date;
use super::{find_frame_tokens, ItrfFrame};

/// Frame of a QFIT file from its header text, with the date table as fallback.
///
/// Arguments
/// -----------------
/// * `filename`: Only used in log messages.
/// * `header_text`: Output of [`crate::qfit::header::QfitHeader::text`].
/// * `file_date`: Acquisition date of the granule.
///
/// Return
/// ----------
/// * The header frame when exactly one distinct token is present, the date
///   table frame otherwise. Fails with [`IceflowError::ItrfNotFoundForDate`]
///   when the header does not decide and the date is outside every range.
pub fn resolve_qfit_frame(
    filename: &str,
    header_text: &str,
    file_date: NaiveDate,
) -> Result<ItrfFrame, IceflowError> {
    let tokens = find_frame_tokens(header_text);

    if let [token] = tokens.as_slice() {
        let from_header: ItrfFrame = token.parse()?;
        match resolve_frame_by_date(file_date) {
            Ok(from_date) if from_date != from_header => warn!(
                "ITRF in qfit header for {filename} is inconsistent with expected ITRF for {file_date}. \
                 Header has {from_header}, expected {from_date}. Using {from_header}."
            ),
            Ok(_) => {}
            Err(_) => debug!(
                "No date-range ITRF for {file_date}; using header value {from_header} for {filename}"
            ),
        }
        return Ok(from_header);
    }

    let from_date = resolve_frame_by_date(file_date)?;
    if tokens.is_empty() {
        warn!("Failed to find ITRF in qfit header for {filename}. Falling back on {from_date} for {file_date}");
    } else {
        warn!(
            "Found several ITRFs ({}) in qfit header for {filename}. Falling back on {from_date} for {file_date}",
            tokens.join(", ")
        );
    }
    Ok(from_date)
}

/// Frame of a structured container from its ancillary metadata.
///
/// Return
/// ----------
/// * The first string of the reference frame variable, normalized. An empty
///   variable is reported as [`IceflowError::MissingVariable`].
pub fn resolve_structured_frame(source: &dyn StructuredSource) -> Result<ItrfFrame, IceflowError> {
    let frames = source.strings(REFERENCE_FRAME_PATH)?;
    let first = frames
        .first()
        .ok_or_else(|| IceflowError::MissingVariable(REFERENCE_FRAME_PATH.to_string()))?;
    first.trim_end_matches('\0').parse()
}
