//! # Decoded rows and point measurements
//!
//! Two shapes flow through the pipeline:
//!
//! - [`DecodedRow`]: one record of an ATM1B file after scaling and longitude
//!   normalization, but before its timestamp and reference frame are known.
//! - [`PointMeasurement`]: a fully tagged point, with a UTC instant and the
//!   terrestrial reference frame its coordinates are expressed in.
//!
//! ## Uniform field set
//!
//! QFIT files come in 10, 12 and 14 word families and the structured container
//! carries yet another subset. [`Atm1bInstrument`] is the union of every family's
//! instrument fields: fields the source family does not carry are `None`, never
//! zero, since zero is a valid instrument reading.
//!
//! ```text
//! family      gps_pdop  pulse_width  passive_* (4 fields)
//! 10-word     None      None         None
//! 12-word     Some      Some         None
//! 14-word     None      None         Some
//! structured  Some      Some         None
//! ```

use chrono::{DateTime, Utc};

use crate::constants::{Degree, Meter};
use crate::conversion::widen_elevation;
use crate::itrf::ItrfFrame;

/// ATM1B instrument fields, in their stored (unscaled) units.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Atm1bInstrument {
    pub rel_time: f64,
    pub xmt_sigstr: f64,
    pub rcv_sigstr: f64,
    pub azimuth: f64,
    pub pitch: f64,
    pub roll: f64,
    /// Packed time of day, `HHMMSSmmm`
    pub gps_time: f64,
    pub gps_pdop: Option<f64>,
    pub pulse_width: Option<f64>,
    pub passive_signal: Option<f64>,
    pub passive_footprint_latitude: Option<f64>,
    pub passive_footprint_longitude: Option<f64>,
    pub passive_footprint_synthesized_elevation: Option<f64>,
}

impl Atm1bInstrument {
    /// The six fields that only the 12 and 14 word families carry.
    pub fn family_specific_fields(&self) -> [Option<f64>; 6] {
        [
            self.gps_pdop,
            self.pulse_width,
            self.passive_signal,
            self.passive_footprint_latitude,
            self.passive_footprint_longitude,
            self.passive_footprint_synthesized_elevation,
        ]
    }
}

/// One decoded ATM1B record, coordinates already scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRow {
    /// Degrees north
    pub latitude: Degree,
    /// Degrees east in [-180, 180)
    pub longitude: Degree,
    /// Meters above the ellipsoid
    pub elevation: f32,
    pub instrument: Atm1bInstrument,
}

impl DecodedRow {
    /// The packed `HHMMSSmmm` time of day of this record.
    pub fn packed_time(&self) -> i64 {
        self.instrument.gps_time as i64
    }

    pub(crate) fn into_point(
        self,
        utc_datetime: DateTime<Utc>,
        reference_frame: ItrfFrame,
    ) -> PointMeasurement<Atm1bInstrument> {
        PointMeasurement {
            utc_datetime,
            latitude: self.latitude,
            longitude: self.longitude,
            elevation: widen_elevation(self.elevation),
            reference_frame,
            instrument: self.instrument,
        }
    }
}

/// A point tagged with its acquisition instant and reference frame.
///
/// `T` carries the instrument specific payload, which the harmonizer never
/// looks at; it only rewrites the coordinates and the frame tag.
#[derive(Debug, Clone, PartialEq)]
pub struct PointMeasurement<T = Atm1bInstrument> {
    pub utc_datetime: DateTime<Utc>,
    pub latitude: Degree,
    pub longitude: Degree,
    pub elevation: Meter,
    pub reference_frame: ItrfFrame,
    pub instrument: T,
}
