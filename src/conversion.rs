use crate::constants::{Degree, Meter, LONGITUDE_WRAP, MICRODEGREES_PER_DEGREE, MILLIMETERS_PER_METER};

/// Map a longitude from [0, 360) to the canonical [-180, 180) domain.
///
/// Arguments
/// ---------
/// * `lon`: longitude in degrees
///
/// Return
/// ----------
/// * `lon - 360` when `lon >= 180`, `lon` otherwise
pub fn normalize_longitude(lon: Degree) -> Degree {
    if lon >= LONGITUDE_WRAP {
        lon - 360.0
    } else {
        lon
    }
}

/// Stored micro-degrees to degrees
pub(crate) fn microdegrees_to_degrees(value: i32) -> Degree {
    f64::from(value) / MICRODEGREES_PER_DEGREE
}

/// Stored millimeters to meters, kept in single precision as the instrument resolution allows
pub(crate) fn millimeters_to_meters(value: i32) -> f32 {
    (f64::from(value) / MILLIMETERS_PER_METER) as f32
}

/// Widen a single precision elevation to the working precision of the harmonizer
pub(crate) fn widen_elevation(value: f32) -> Meter {
    f64::from(value)
}
