//! # Constants and type definitions for Iceflow
//!
//! This module centralizes the **scale factors**, **sentinel values**, **ellipsoid
//! parameters** and **type aliases** shared by the decoders and the coordinate
//! harmonization engine.
//!
//! ## Overview
//!
//! - QFIT storage conventions (micro-degrees, millimeters, record size bound)
//! - Instrument fault sentinels
//! - GPS/TAI time offset used to turn TAI−UTC into GPS−UTC
//! - WGS84 ellipsoid and angular unit conversions used by the Helmert engine

// -------------------------------------------------------------------------------------------------
// QFIT storage conventions
// -------------------------------------------------------------------------------------------------

/// Stored latitude/longitude are integers in micro-degrees
pub const MICRODEGREES_PER_DEGREE: f64 = 1e6;

/// Stored elevations are integers in millimeters
pub const MILLIMETERS_PER_METER: f64 = 1e3;

/// Any first word at or above this value cannot be a QFIT record size
pub const MAX_RECORD_SIZE: i32 = 100;

/// Every QFIT field is a 4-byte signed integer
pub const QFIT_WORD_SIZE: usize = 4;

/// Elevation (mm) written by the passive channel when the sensor faulted
pub const INVALID_ELEVATION_MM: i32 = -9999;

/// Longitudes at or above this value are wrapped into [-180, 180)
pub const LONGITUDE_WRAP: f64 = 180.0;

// -------------------------------------------------------------------------------------------------
// Time
// -------------------------------------------------------------------------------------------------

/// TAI − GPS, constant since the GPS epoch (1980-01-06)
pub const TAI_MINUS_GPS_SECONDS: f64 = 19.0;

// -------------------------------------------------------------------------------------------------
// Geodesy
// -------------------------------------------------------------------------------------------------

/// WGS84 semi-major axis in meters
pub const WGS84_SEMI_MAJOR_AXIS: f64 = 6_378_137.0;

/// WGS84 flattening
pub const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

/// WGS84 first eccentricity squared
pub const WGS84_ECC2: f64 = WGS84_FLATTENING * (2.0 - WGS84_FLATTENING);

/// Milliarcseconds → radians
pub const RADMAS: f64 = std::f64::consts::PI / 648_000_000.0;

/// Millimeters → meters
pub const MM_TO_M: f64 = 1e-3;

/// Parts per billion → unitless scale
pub const PPB: f64 = 1e-9;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Distance in meters
pub type Meter = f64;
/// Calendar instant as `year + fraction_of_year`
pub type DecimalYear = f64;
/// Tectonic plate identifier (e.g. `"NOAM"`)
pub type PlateId = String;
