//! # Built-in geodesy engine
//!
//! [`HelmertEngine`] implements [`GeodesyEngine`] without any external geodesy
//! library. For each row it:
//!
//! 1. converts geodetic `(lon, lat, h)` to geocentric cartesian coordinates on
//!    the WGS84 ellipsoid,
//! 2. applies the 14-parameter Helmert transformation between the source and
//!    target frames, evaluated at the row's decimal year,
//! 3. optionally propagates the position to the target epoch with the rigid
//!    rotation of a tectonic plate,
//! 4. converts back to geodetic coordinates.
//!
//! ## Parameters
//!
//! Helmert parameters follow the IERS position vector convention:
//!
//! ```text
//! X_to = X_from + T + D·X_from + R × X_from
//! P(t) = P(epoch) + Ṗ·(t − epoch)
//! ```
//!
//! with `T` in millimeters, `D` in parts per billion and `R` in milliarcseconds
//! (rates per year). When only the `to → from` set is registered, its negation
//! is used, which is exact to first order.
//!
//! Plate motion uses an Euler pole `Ω` in milliarcseconds per year:
//!
//! ```text
//! X(t_epoch) = X(t) + (Ω × X(t))·(t_epoch − t)
//! ```
//!
//! Both tables are plain CSV files, see [`HelmertEngine::from_csv_readers`].

use std::collections::HashMap;
use std::io::Read;

use nalgebra::Vector3;
use serde::Deserialize;

use crate::constants::{
    DecimalYear, Degree, Meter, MM_TO_M, PPB, RADMAS, WGS84_ECC2, WGS84_SEMI_MAJOR_AXIS,
};
use crate::iceflow_errors::IceflowError;

use super::transformation::{CoordinateArrays, Coordinates, GeodesyEngine, TransformationSpec};
use super::ItrfFrame;

const MAX_LATITUDE_ITERATIONS: usize = 10;
const LATITUDE_TOLERANCE: f64 = 1e-14;

/// Geodetic coordinates (degrees, meters above the WGS84 ellipsoid) to ECEF meters.
pub fn geodetic_to_ecef(lon: Degree, lat: Degree, h: Meter) -> Vector3<f64> {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_lon, cos_lon) = lon.to_radians().sin_cos();
    let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECC2 * sin_lat * sin_lat).sqrt();

    Vector3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - WGS84_ECC2) + h) * sin_lat,
    )
}

/// ECEF meters to geodetic `(lon, lat, h)`.
///
/// The latitude is refined by fixed-point iteration; the height formula stays
/// well conditioned at the poles.
pub fn ecef_to_geodetic(x: &Vector3<f64>) -> (Degree, Degree, Meter) {
    let p = x.x.hypot(x.y);
    let lon = x.y.atan2(x.x);

    let mut lat = x.z.atan2(p * (1.0 - WGS84_ECC2));
    for _ in 0..MAX_LATITUDE_ITERATIONS {
        let sin_lat = lat.sin();
        let n = WGS84_SEMI_MAJOR_AXIS / (1.0 - WGS84_ECC2 * sin_lat * sin_lat).sqrt();
        let next = (x.z + WGS84_ECC2 * n * sin_lat).atan2(p);
        let done = (next - lat).abs() < LATITUDE_TOLERANCE;
        lat = next;
        if done {
            break;
        }
    }

    let (sin_lat, cos_lat) = lat.sin_cos();
    let h = p * cos_lat + x.z * sin_lat
        - WGS84_SEMI_MAJOR_AXIS * (1.0 - WGS84_ECC2 * sin_lat * sin_lat).sqrt();

    (lon.to_degrees(), lat.to_degrees(), h)
}

/// One row of the Helmert parameter table.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct HelmertParameters {
    pub from: String,
    pub to: String,
    /// Reference epoch of the parameters, decimal year
    pub epoch: f64,
    pub tx: f64,
    pub ty: f64,
    pub tz: f64,
    pub d: f64,
    pub rx: f64,
    pub ry: f64,
    pub rz: f64,
    pub dtx: f64,
    pub dty: f64,
    pub dtz: f64,
    pub dd: f64,
    pub drx: f64,
    pub dry: f64,
    pub drz: f64,
}

/// Helmert parameters evaluated at one instant, in SI units.
#[derive(Debug, Clone, Copy, PartialEq)]
struct HelmertAt {
    translation: Vector3<f64>,
    scale: f64,
    rotation: Vector3<f64>,
}

impl HelmertAt {
    fn apply(&self, x: &Vector3<f64>) -> Vector3<f64> {
        x + self.translation + x * self.scale + self.rotation.cross(x)
    }
}

impl HelmertParameters {
    fn at(&self, t: DecimalYear, sign: f64) -> HelmertAt {
        let dt = t - self.epoch;
        let value = |p: f64, rate: f64| sign * (p + rate * dt);

        HelmertAt {
            translation: Vector3::new(
                value(self.tx, self.dtx),
                value(self.ty, self.dty),
                value(self.tz, self.dtz),
            ) * MM_TO_M,
            scale: value(self.d, self.dd) * PPB,
            rotation: Vector3::new(
                value(self.rx, self.drx),
                value(self.ry, self.dry),
                value(self.rz, self.drz),
            ) * RADMAS,
        }
    }
}

/// One row of the plate motion table: the Euler pole of `plate` in `frame`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlateMotion {
    pub frame: String,
    pub plate: String,
    pub omega_x: f64,
    pub omega_y: f64,
    pub omega_z: f64,
}

impl PlateMotion {
    /// Euler pole in radians per year.
    fn omega(&self) -> Vector3<f64> {
        Vector3::new(self.omega_x, self.omega_y, self.omega_z) * RADMAS
    }
}

/// Helmert + plate-motion geodesy engine.
#[derive(Debug, Clone, Default)]
pub struct HelmertEngine {
    helmert: HashMap<(ItrfFrame, ItrfFrame), HelmertParameters>,
    plates: HashMap<(ItrfFrame, String), PlateMotion>,
}

impl HelmertEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a Helmert parameter set; frame names are normalized.
    pub fn with_helmert(mut self, params: HelmertParameters) -> Result<Self, IceflowError> {
        let key: (ItrfFrame, ItrfFrame) = (params.from.parse()?, params.to.parse()?);
        self.helmert.insert(key, params);
        Ok(self)
    }

    /// Register the Euler pole of a plate in a frame.
    pub fn with_plate_motion(mut self, motion: PlateMotion) -> Result<Self, IceflowError> {
        let key: (ItrfFrame, String) = (motion.frame.parse()?, motion.plate.to_uppercase());
        self.plates.insert(key, motion);
        Ok(self)
    }

    /// Load both tables from CSV.
    ///
    /// Arguments
    /// -----------------
    /// * `helmert`: columns `from,to,epoch,tx,ty,tz,d,rx,ry,rz,dtx,dty,dtz,dd,drx,dry,drz`
    /// * `plates`: columns `frame,plate,omega_x,omega_y,omega_z`
    ///
    /// Return
    /// ----------
    /// * The engine, or the first CSV or frame-name error encountered.
    pub fn from_csv_readers<H: Read, P: Read>(helmert: H, plates: P) -> Result<Self, IceflowError> {
        let mut engine = HelmertEngine::new();

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(helmert);
        for record in reader.deserialize::<HelmertParameters>() {
            engine = engine.with_helmert(record?)?;
        }

        let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(plates);
        for record in reader.deserialize::<PlateMotion>() {
            engine = engine.with_plate_motion(record?)?;
        }

        Ok(engine)
    }

    /// Parameters from `source` to `target` and the sign to apply them with.
    fn helmert_for(
        &self,
        source: &ItrfFrame,
        target: &ItrfFrame,
    ) -> Result<(&HelmertParameters, f64), IceflowError> {
        if let Some(p) = self.helmert.get(&(source.clone(), target.clone())) {
            return Ok((p, 1.0));
        }
        if let Some(p) = self.helmert.get(&(target.clone(), source.clone())) {
            return Ok((p, -1.0));
        }
        Err(IceflowError::GeodesyEngine(format!(
            "no Helmert parameters between {source} and {target}"
        )))
    }

    fn plate_for(&self, frame: &ItrfFrame, plate: &str) -> Result<&PlateMotion, IceflowError> {
        self.plates
            .get(&(frame.clone(), plate.to_uppercase()))
            .ok_or_else(|| {
                IceflowError::GeodesyEngine(format!("no motion model for plate {plate} in {frame}"))
            })
    }
}

impl GeodesyEngine for HelmertEngine {
    fn transform(
        &self,
        spec: &TransformationSpec,
        input: &CoordinateArrays,
    ) -> Result<Coordinates, IceflowError> {
        let n = input.common_len().ok_or_else(|| {
            IceflowError::GeodesyEngine(format!("input arrays of unequal length for {spec}"))
        })?;

        let helmert = if spec.needs_helmert() {
            Some(self.helmert_for(&spec.source_frame, &spec.target_frame)?)
        } else {
            None
        };

        let plate_motion = match (spec.target_epoch, spec.plate_motion()) {
            (Some(_), Some((epoch, plate))) => {
                Some((epoch, self.plate_for(&spec.target_frame, plate)?.omega()))
            }
            (Some(_), None) => {
                return Err(IceflowError::GeodesyEngine(format!(
                    "target epoch requested without a plate for {spec}"
                )))
            }
            (None, _) => None,
        };

        let mut output = Coordinates {
            longitude: Vec::with_capacity(n),
            latitude: Vec::with_capacity(n),
            elevation: Vec::with_capacity(n),
        };

        for i in 0..n {
            let t = input.decimal_year[i];
            let mut x = geodetic_to_ecef(input.longitude[i], input.latitude[i], input.elevation[i]);

            if let Some((params, sign)) = helmert {
                x = params.at(t, sign).apply(&x);
            }
            if let Some((epoch, omega)) = plate_motion {
                x += omega.cross(&x) * (epoch - t);
            }

            let (lon, lat, h) = ecef_to_geodetic(&x);
            output.longitude.push(lon);
            output.latitude.push(lat);
            output.elevation.push(h);
        }

        Ok(output)
    }
}
