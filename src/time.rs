//! # Acquisition time reconstruction
//!
//! QFIT and structured ATM1B records only store a packed **time of day**
//! (`HHMMSSmmm`, GPS time); the calendar date lives in the filename. This module
//! rebuilds a UTC instant per record:
//!
//! 1. Parse the acquisition date from the filename ([`ilatm1b_date`], [`blatm1b_date`]).
//! 2. Split the packed integer into hour, minute, second and millisecond
//!    ([`decode_time_of_day`]).
//! 3. Subtract the GPS−UTC leap-second count in effect on the acquisition date
//!    ([`LeapSeconds`]). The correction is taken once per file, from its date.
//!
//! It also provides [`decimal_year`], the time input of the epoch propagation step.
//!
//! ## See also
//! ------------
//! * [`hifitime`] – Source of the default leap-second table ([`GpsLeapSeconds`]).
//! * [`crate::atm1b`] – Picks the filename pattern from the product.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Timelike, Utc};
use hifitime::Epoch;
use regex::Regex;

use crate::constants::{DecimalYear, TAI_MINUS_GPS_SECONDS};
use crate::iceflow_errors::IceflowError;

/// Leap-second collaborator: GPS−UTC in whole seconds for a calendar date.
pub trait LeapSeconds: Send + Sync {
    fn leap_seconds(&self, date: NaiveDate) -> i64;
}

impl<F> LeapSeconds for F
where
    F: Fn(NaiveDate) -> i64 + Send + Sync,
{
    fn leap_seconds(&self, date: NaiveDate) -> i64 {
        self(date)
    }
}

/// GPS−UTC offset derived from hifitime's IERS leap-second table.
///
/// hifitime reports TAI−UTC; GPS time runs a constant 19 s behind TAI, so
/// GPS−UTC = TAI−UTC − 19. Dates before the GPS epoch yield 0.
#[derive(Debug, Clone, Copy, Default)]
pub struct GpsLeapSeconds;

impl LeapSeconds for GpsLeapSeconds {
    fn leap_seconds(&self, date: NaiveDate) -> i64 {
        let epoch = Epoch::from_gregorian_utc_at_midnight(
            date.year(),
            date.month() as u8,
            date.day() as u8,
        );
        let tai_utc = epoch.leap_seconds(true).unwrap_or(0.0);
        (tai_utc - TAI_MINUS_GPS_SECONDS).max(0.0).round() as i64
    }
}

static ILATM1B_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_(\d{8})_").expect("valid ILATM1B date regex"));
static BLATM1B_DATE_8: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BLATM1B_(\d{8})").expect("valid BLATM1B date regex"));
static BLATM1B_DATE_6: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BLATM1B_(\d{6})").expect("valid BLATM1B date regex"));

fn parse_yyyymmdd(digits: &str, filename: &str) -> Result<NaiveDate, IceflowError> {
    NaiveDate::parse_from_str(digits, "%Y%m%d")
        .map_err(|_| IceflowError::FilenameDate(filename.to_string()))
}

/// Acquisition date of an ILATM1B granule, from its `_YYYYMMDD_` token.
///
/// Arguments
/// -----------------
/// * `filename`: e.g. `ILATM1B_20111104_181304.ATM4BT4.qi`
///
/// Return
/// ----------
/// * The calendar date, or [`IceflowError::FilenameDate`].
pub fn ilatm1b_date(filename: &str) -> Result<NaiveDate, IceflowError> {
    let caps = ILATM1B_DATE
        .captures(filename)
        .ok_or_else(|| IceflowError::FilenameDate(filename.to_string()))?;
    parse_yyyymmdd(&caps[1], filename)
}

/// Acquisition date of a BLATM1B granule.
///
/// An 8-digit token after `BLATM1B_` is a full `YYYYMMDD` date. Older granules
/// only carry `YYMMDD`: two-digit years above 9 are 1900s, the others 2000s.
///
/// Arguments
/// -----------------
/// * `filename`: e.g. `BLATM1B_20060522_145449.qi` or `BLATM1B_930623_1.qi`
///
/// Return
/// ----------
/// * The calendar date, or [`IceflowError::FilenameDate`].
pub fn blatm1b_date(filename: &str) -> Result<NaiveDate, IceflowError> {
    if let Some(caps) = BLATM1B_DATE_8.captures(filename) {
        return parse_yyyymmdd(&caps[1], filename);
    }

    let caps = BLATM1B_DATE_6
        .captures(filename)
        .ok_or_else(|| IceflowError::FilenameDate(filename.to_string()))?;
    let short = &caps[1];
    let yy: u32 = short[..2]
        .parse()
        .map_err(|_| IceflowError::FilenameDate(filename.to_string()))?;
    let century = if yy > 9 { "19" } else { "20" };

    parse_yyyymmdd(&format!("{century}{short}"), filename)
}

/// Split a packed `HHMMSSmmm` integer.
///
/// Return
/// ----------
/// * `(hour, minute, second, millisecond)`, or [`IceflowError::InvalidTimeOfDay`]
///   for negative values and out-of-range components.
pub fn decode_time_of_day(packed: i64) -> Result<(u32, u32, u32, u32), IceflowError> {
    if packed < 0 {
        return Err(IceflowError::InvalidTimeOfDay(packed));
    }

    let hour = packed / 10_000_000;
    let minute = (packed % 10_000_000) / 100_000;
    let second = (packed % 100_000) / 1_000;
    let millisecond = packed % 1_000;

    if hour > 23 || minute > 59 || second > 59 {
        return Err(IceflowError::InvalidTimeOfDay(packed));
    }

    Ok((
        hour as u32,
        minute as u32,
        second as u32,
        millisecond as u32,
    ))
}

/// Per-file time reconstruction: the file date and its leap-second correction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeResolver {
    file_date: NaiveDate,
    leap_seconds: i64,
}

impl TimeResolver {
    /// Look up the leap-second count once for the whole file.
    pub fn new(file_date: NaiveDate, table: &dyn LeapSeconds) -> Self {
        TimeResolver {
            file_date,
            leap_seconds: table.leap_seconds(file_date),
        }
    }

    pub fn file_date(&self) -> NaiveDate {
        self.file_date
    }

    pub fn leap_seconds(&self) -> i64 {
        self.leap_seconds
    }

    /// UTC instant of a record from its packed GPS time of day.
    ///
    /// Arguments
    /// -----------------
    /// * `packed`: `HHMMSSmmm` time of day.
    ///
    /// Return
    /// ----------
    /// * `file_date + time_of_day − leap_seconds`, in UTC.
    pub fn utc_datetime(&self, packed: i64) -> Result<DateTime<Utc>, IceflowError> {
        let (h, m, s, ms) = decode_time_of_day(packed)?;
        let naive = self
            .file_date
            .and_hms_milli_opt(h, m, s, ms)
            .ok_or(IceflowError::InvalidTimeOfDay(packed))?;

        Ok(naive.and_utc() - TimeDelta::seconds(self.leap_seconds))
    }
}

/// Express a UTC instant as `year + elapsed / year_length`.
///
/// Elapsed time is counted in whole calendar seconds from January 1st, 00:00 UTC,
/// ignoring leap seconds (POSIX time), so the fraction does not drift with the
/// local time zone or the leap-second table.
pub fn decimal_year(instant: &DateTime<Utc>) -> DecimalYear {
    let year = instant.year();
    let elapsed =
        i64::from(instant.ordinal0()) * 86_400 + i64::from(instant.num_seconds_from_midnight());
    let days_in_year = if NaiveDate::from_ymd_opt(year, 2, 29).is_some() {
        366
    } else {
        365
    };

    f64::from(year) + elapsed as f64 / (days_in_year * 86_400) as f64
}
