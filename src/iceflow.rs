//! # Iceflow: collaborators and entry points
//!
//! This module defines [`Iceflow`], the façade that wires together the
//! external collaborators the decoding and harmonization steps depend on:
//!
//! 1. **Leap-second table**: GPS−UTC for an acquisition date, defaults to
//!    [`GpsLeapSeconds`].
//! 2. **Structured container opener**: turns ILATM1B v2 bytes into a
//!    [`StructuredSource`](crate::structured::StructuredSource). None by default.
//! 3. **Plate locator**: tectonic plate of a group centroid, used when an epoch
//!    is requested without a plate. None by default.
//! 4. **Geodesy engine**: the frame transformation itself, defaults to an empty
//!    [`HelmertEngine`] (only same-frame pass-through works until parameters
//!    are supplied).
//!
//! ## Typical usage
//!
//! ```rust, no_run
//! use camino::Utf8Path;
//! use iceflow::iceflow::Iceflow;
//! use iceflow::itrf::harmonizer::HarmonizeOptions;
//! use iceflow::itrf::helmert::HelmertEngine;
//!
//! let helmert = std::fs::File::open("helmert.csv").unwrap();
//! let plates = std::fs::File::open("plates.csv").unwrap();
//! let engine = HelmertEngine::from_csv_readers(helmert, plates).unwrap();
//!
//! let iceflow = Iceflow::new().with_geodesy_engine(engine);
//! let granule = iceflow
//!     .read_file(Utf8Path::new("ILATM1B_20111104_181304.ATM4BT4.qi"))
//!     .unwrap();
//! let points = iceflow
//!     .harmonize(granule.points, &HarmonizeOptions::new("ITRF2014"))
//!     .unwrap();
//! ```
//!
//! ## See also
//! ------------
//! * [`crate::atm1b::read_atm1b`] – Per-file decoding pipeline.
//! * [`CoordinateHarmonizer`] – Per-frame grouping and transformation.

use camino::Utf8Path;

use crate::atm1b::{read_atm1b, Atm1bGranule, RawFile};
use crate::iceflow_errors::IceflowError;
use crate::itrf::harmonizer::{CoordinateHarmonizer, HarmonizeOptions, PlateLocator};
use crate::itrf::helmert::HelmertEngine;
use crate::itrf::transformation::GeodesyEngine;
use crate::point::PointMeasurement;
use crate::structured::StructuredOpener;
use crate::time::{GpsLeapSeconds, LeapSeconds};

pub struct Iceflow {
    leap_seconds: Box<dyn LeapSeconds>,
    opener: Option<Box<dyn StructuredOpener>>,
    plates: Option<Box<dyn PlateLocator>>,
    engine: Box<dyn GeodesyEngine>,
}

impl Default for Iceflow {
    fn default() -> Self {
        Self::new()
    }
}

impl Iceflow {
    /// Context with the default leap-second table and an empty Helmert engine.
    pub fn new() -> Self {
        Iceflow {
            leap_seconds: Box::new(GpsLeapSeconds),
            opener: None,
            plates: None,
            engine: Box::new(HelmertEngine::new()),
        }
    }

    pub fn with_leap_seconds(mut self, table: impl LeapSeconds + 'static) -> Self {
        self.leap_seconds = Box::new(table);
        self
    }

    pub fn with_structured_opener(mut self, opener: impl StructuredOpener + 'static) -> Self {
        self.opener = Some(Box::new(opener));
        self
    }

    pub fn with_plate_locator(mut self, plates: impl PlateLocator + 'static) -> Self {
        self.plates = Some(Box::new(plates));
        self
    }

    pub fn with_geodesy_engine(mut self, engine: impl GeodesyEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Decode an in-memory ATM1B file.
    ///
    /// See also
    /// ------------
    /// * [`read_atm1b`] – The decoding pipeline.
    pub fn read(&self, file: &RawFile) -> Result<Atm1bGranule, IceflowError> {
        read_atm1b(file, self.leap_seconds.as_ref(), self.opener.as_deref())
    }

    /// Read an ATM1B file from disk and decode it.
    pub fn read_file(&self, path: &Utf8Path) -> Result<Atm1bGranule, IceflowError> {
        self.read(&RawFile::read(path)?)
    }

    /// Bring `points` to the frame (and epoch) described by `options`.
    pub fn harmonize<T>(
        &self,
        points: Vec<PointMeasurement<T>>,
        options: &HarmonizeOptions,
    ) -> Result<Vec<PointMeasurement<T>>, IceflowError> {
        let mut harmonizer = CoordinateHarmonizer::new(self.engine.as_ref());
        if let Some(plates) = self.plates.as_deref() {
            harmonizer = harmonizer.with_plate_locator(plates);
        }
        harmonizer.harmonize(points, options)
    }
}

#[cfg(test)]
mod iceflow_test {
    use chrono::NaiveDate;

    use super::*;
    use crate::itrf::transformation::{CoordinateArrays, Coordinates, TransformationSpec};

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_shareable_across_threads() {
        assert_send_sync::<Iceflow>();
        assert_send_sync::<CoordinateHarmonizer<'static>>();

        let iceflow = std::sync::Arc::new(Iceflow::new().with_leap_seconds(|_: NaiveDate| 15i64));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let iceflow = std::sync::Arc::clone(&iceflow);
                std::thread::spawn(move || {
                    let points: Vec<PointMeasurement<()>> = Vec::new();
                    iceflow.harmonize(points, &HarmonizeOptions::new("ITRF2008"))
                })
            })
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), Ok(Vec::new()));
        }
    }

    #[test]
    fn test_missing_file() {
        let iceflow = Iceflow::new();
        let result = iceflow.read_file(Utf8Path::new("does/not/exist/ILATM1B_20111104_1.qi"));
        assert!(matches!(result, Err(IceflowError::IoError(_))));
    }

    #[test]
    fn test_default_engine_only_passes_through() {
        let iceflow = Iceflow::new().with_leap_seconds(|_: NaiveDate| 0i64);
        let points: Vec<PointMeasurement<()>> = Vec::new();
        assert_eq!(
            iceflow.harmonize(points, &HarmonizeOptions::new("ITRF2014")),
            Ok(Vec::new())
        );
    }

    #[test]
    fn test_plate_locator_is_forwarded() {
        let engine = |spec: &TransformationSpec, input: &CoordinateArrays| {
            assert_eq!(spec.plate.as_deref(), Some("ANTA"));
            Ok::<_, IceflowError>(Coordinates {
                longitude: input.longitude.clone(),
                latitude: input.latitude.clone(),
                elevation: input.elevation.clone(),
            })
        };
        let iceflow = Iceflow::new()
            .with_geodesy_engine(engine)
            .with_plate_locator(|_: f64, _: f64| Some("ANTA".to_string()));

        let point = PointMeasurement {
            utc_datetime: NaiveDate::from_ymd_opt(2009, 10, 20)
                .unwrap()
                .and_hms_opt(15, 0, 0)
                .unwrap()
                .and_utc(),
            latitude: -75.0,
            longitude: -100.0,
            elevation: 1200.0,
            reference_frame: "ITRF2005".parse().unwrap(),
            instrument: (),
        };
        let out = iceflow
            .harmonize(
                vec![point],
                &HarmonizeOptions::new("ITRF2005").with_target_epoch(2010.0),
            )
            .unwrap();
        assert_eq!(out[0].reference_frame.as_str(), "ITRF2005");
    }
}
