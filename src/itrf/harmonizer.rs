//! # Coordinate harmonization
//!
//! Bring a set of points, possibly expressed in several reference frames, to a
//! single target frame and optionally to a target epoch.
//!
//! Points are grouped by their current frame. For each group:
//!
//! * already in the target frame and no epoch requested: passed through as is,
//!   coordinates and tag untouched;
//! * otherwise: a [`TransformationSpec`] is built, a plate is inferred from the
//!   group centroid when an epoch is requested without one, every row gets its
//!   decimal year, the [`GeodesyEngine`] transforms the group and every row is
//!   re-tagged with the target frame.
//!
//! Groups come back in frame order; rows keep their order inside a group.
//!
//! ## See also
//! ------------
//! * [`crate::time::decimal_year`] – Time input of the epoch propagation.
//! * [`super::helmert::HelmertEngine`] – A ready-made engine.

use std::collections::BTreeMap;

use log::{debug, info};
use serde::Deserialize;

use crate::constants::{DecimalYear, Degree, PlateId};
use crate::iceflow_errors::IceflowError;
use crate::point::PointMeasurement;
use crate::time::decimal_year;

use super::transformation::{CoordinateArrays, GeodesyEngine, TransformationSpec};
use super::ItrfFrame;

/// Plate-boundary collaborator: which tectonic plate contains a location.
pub trait PlateLocator: Send + Sync {
    fn plate_for(&self, lon: Degree, lat: Degree) -> Option<PlateId>;
}

impl<F> PlateLocator for F
where
    F: Fn(Degree, Degree) -> Option<PlateId> + Send + Sync,
{
    fn plate_for(&self, lon: Degree, lat: Degree) -> Option<PlateId> {
        self(lon, lat)
    }
}

/// Request of a harmonization call.
///
/// Deserializable so it can be read straight from a configuration file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HarmonizeOptions {
    pub target_frame: String,
    #[serde(default)]
    pub target_epoch: Option<DecimalYear>,
    #[serde(default)]
    pub plate: Option<PlateId>,
}

impl HarmonizeOptions {
    pub fn new(target_frame: impl Into<String>) -> Self {
        HarmonizeOptions {
            target_frame: target_frame.into(),
            target_epoch: None,
            plate: None,
        }
    }

    pub fn with_target_epoch(mut self, epoch: DecimalYear) -> Self {
        self.target_epoch = Some(epoch);
        self
    }

    pub fn with_plate(mut self, plate: impl Into<PlateId>) -> Self {
        self.plate = Some(plate.into());
        self
    }

    /// The target frame, validated and normalized.
    ///
    /// Return
    /// ----------
    /// * The frame, or [`IceflowError::InvalidTargetFrame`] with the raw string.
    pub fn target(&self) -> Result<ItrfFrame, IceflowError> {
        self.target_frame
            .parse()
            .map_err(|_| IceflowError::InvalidTargetFrame(self.target_frame.clone()))
    }
}

/// Groups points by frame and drives the geodesy engine.
pub struct CoordinateHarmonizer<'a> {
    engine: &'a dyn GeodesyEngine,
    plates: Option<&'a dyn PlateLocator>,
}

impl<'a> CoordinateHarmonizer<'a> {
    pub fn new(engine: &'a dyn GeodesyEngine) -> Self {
        CoordinateHarmonizer {
            engine,
            plates: None,
        }
    }

    pub fn with_plate_locator(mut self, plates: &'a dyn PlateLocator) -> Self {
        self.plates = Some(plates);
        self
    }

    fn resolve_plate(
        &self,
        options: &HarmonizeOptions,
        arrays: &CoordinateArrays,
    ) -> Result<Option<PlateId>, IceflowError> {
        if options.target_epoch.is_none() {
            return Ok(None);
        }
        if let Some(plate) = &options.plate {
            return Ok(Some(plate.clone()));
        }

        let (lon, lat) = arrays.centroid().unwrap_or((f64::NAN, f64::NAN));
        let plate = self
            .plates
            .and_then(|locator| locator.plate_for(lon, lat))
            .ok_or(IceflowError::PlateNotResolved { lon, lat })?;
        debug!("Inferred plate {plate} from centroid ({lon}, {lat})");

        Ok(Some(plate))
    }

    /// Bring every point to `options.target_frame`.
    ///
    /// Arguments
    /// -----------------
    /// * `points`: Points in any mix of frames.
    /// * `options`: Target frame, optional epoch and plate.
    ///
    /// Return
    /// ----------
    /// * The harmonized points, or the first error. The target frame is checked
    ///   before any group is touched. An epoch without a plate that can be
    ///   resolved fails with [`IceflowError::PlateNotResolved`]; an engine
    ///   returning a different number of rows fails with
    ///   [`IceflowError::EngineLengthMismatch`].
    pub fn harmonize<T>(
        &self,
        points: Vec<PointMeasurement<T>>,
        options: &HarmonizeOptions,
    ) -> Result<Vec<PointMeasurement<T>>, IceflowError> {
        let target = options.target()?;

        let mut groups: BTreeMap<ItrfFrame, Vec<PointMeasurement<T>>> = BTreeMap::new();
        for point in points {
            groups
                .entry(point.reference_frame.clone())
                .or_default()
                .push(point);
        }

        let mut harmonized = Vec::new();
        for (source, group) in groups {
            if source == target && options.target_epoch.is_none() {
                debug!("{} points already in {target}, passing through", group.len());
                harmonized.extend(group);
                continue;
            }

            harmonized.extend(self.transform_group(source, &target, group, options)?);
        }

        Ok(harmonized)
    }

    fn transform_group<T>(
        &self,
        source: ItrfFrame,
        target: &ItrfFrame,
        mut group: Vec<PointMeasurement<T>>,
        options: &HarmonizeOptions,
    ) -> Result<Vec<PointMeasurement<T>>, IceflowError> {
        let mut arrays = CoordinateArrays::with_capacity(group.len());
        for point in &group {
            arrays.push(
                point.longitude,
                point.latitude,
                point.elevation,
                decimal_year(&point.utc_datetime),
            );
        }

        let spec = TransformationSpec {
            source_frame: source,
            target_frame: target.clone(),
            target_epoch: options.target_epoch,
            plate: self.resolve_plate(options, &arrays)?,
        };
        info!("Transforming {} points: {spec}", group.len());

        let coords = self.engine.transform(&spec, &arrays)?;
        match coords.common_len() {
            Some(n) if n == group.len() => {}
            _ => {
                return Err(IceflowError::EngineLengthMismatch {
                    expected: group.len(),
                    found: coords.longitude.len(),
                })
            }
        }

        for (i, point) in group.iter_mut().enumerate() {
            point.longitude = coords.longitude[i];
            point.latitude = coords.latitude[i];
            point.elevation = coords.elevation[i];
            point.reference_frame = target.clone();
        }

        Ok(group)
    }
}
