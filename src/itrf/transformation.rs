//! Transformation requests handed to the geodesy engine.
//!
//! A [`TransformationSpec`] is built once per source-frame group by the
//! harmonizer. The engine receives it together with column arrays of the group
//! and must return coordinates of the same length, in the same order.

use std::fmt;

use crate::constants::{DecimalYear, Degree, Meter, PlateId};
use crate::iceflow_errors::IceflowError;

use super::ItrfFrame;

/// What to do with one group of points.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformationSpec {
    pub source_frame: ItrfFrame,
    pub target_frame: ItrfFrame,
    /// Decimal year to propagate the coordinates to
    pub target_epoch: Option<DecimalYear>,
    /// Plate motion model used for the propagation
    pub plate: Option<PlateId>,
}

impl TransformationSpec {
    /// `true` when the frames differ and a Helmert step is needed.
    pub fn needs_helmert(&self) -> bool {
        self.source_frame != self.target_frame
    }

    /// `(target_epoch, plate)` when a plate-motion step is needed.
    pub fn plate_motion(&self) -> Option<(DecimalYear, &str)> {
        match (self.target_epoch, self.plate.as_deref()) {
            (Some(epoch), Some(plate)) => Some((epoch, plate)),
            _ => None,
        }
    }

    /// The equivalent PROJ pipeline definition.
    ///
    /// Geodetic degrees are converted to radians, then to geocentric cartesian
    /// coordinates on the WGS84 ellipsoid. The optional Helmert step reads the
    /// `target:source` parameters from the target frame's init file and inverts
    /// them. The optional plate-motion step propagates to `target_epoch`.
    /// Everything is then converted back to geodetic degrees.
    ///
    /// Frame names go through [`ItrfFrame::engine_name`].
    pub fn proj_pipeline(&self) -> String {
        let target = self.target_frame.engine_name();

        let helmert_step = if self.needs_helmert() {
            format!(
                "+step +inv +init={target}:{} ",
                self.source_frame.engine_name()
            )
        } else {
            String::new()
        };

        let plate_step = match self.plate_motion() {
            Some((epoch, plate)) => format!("+step +init={target}:{plate} +t_epoch={epoch} "),
            None => String::new(),
        };

        format!(
            "+proj=pipeline +ellps=WGS84 \
             +step +proj=unitconvert +xy_in=deg +xy_out=rad \
             +step +proj=latlon \
             +step +proj=cart \
             {helmert_step}\
             {plate_step}\
             +step +inv +proj=cart \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg"
        )
    }
}

impl fmt::Display for TransformationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source_frame, self.target_frame)?;
        if let Some((epoch, plate)) = self.plate_motion() {
            write!(f, " @ {epoch} ({plate})")?;
        }
        Ok(())
    }
}

/// Column arrays of one group, as sent to the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateArrays {
    pub longitude: Vec<Degree>,
    pub latitude: Vec<Degree>,
    pub elevation: Vec<Meter>,
    pub decimal_year: Vec<DecimalYear>,
}

impl CoordinateArrays {
    pub fn with_capacity(n: usize) -> Self {
        CoordinateArrays {
            longitude: Vec::with_capacity(n),
            latitude: Vec::with_capacity(n),
            elevation: Vec::with_capacity(n),
            decimal_year: Vec::with_capacity(n),
        }
    }

    pub fn push(&mut self, lon: Degree, lat: Degree, elev: Meter, t: DecimalYear) {
        self.longitude.push(lon);
        self.latitude.push(lat);
        self.elevation.push(elev);
        self.decimal_year.push(t);
    }

    pub fn len(&self) -> usize {
        self.longitude.len()
    }

    pub fn is_empty(&self) -> bool {
        self.longitude.is_empty()
    }

    /// Length shared by the four arrays, `None` if they disagree.
    pub fn common_len(&self) -> Option<usize> {
        let n = self.longitude.len();
        (self.latitude.len() == n && self.elevation.len() == n && self.decimal_year.len() == n)
            .then_some(n)
    }

    /// Arithmetic mean of longitude and latitude, `None` for an empty group.
    pub fn centroid(&self) -> Option<(Degree, Degree)> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        Some((
            self.longitude.iter().sum::<f64>() / n,
            self.latitude.iter().sum::<f64>() / n,
        ))
    }
}

/// Coordinates returned by the engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coordinates {
    pub longitude: Vec<Degree>,
    pub latitude: Vec<Degree>,
    pub elevation: Vec<Meter>,
}

impl Coordinates {
    /// Length shared by the three arrays, `None` if they disagree.
    pub fn common_len(&self) -> Option<usize> {
        let n = self.longitude.len();
        (self.latitude.len() == n && self.elevation.len() == n).then_some(n)
    }
}

/// Geodesy transform collaborator.
pub trait GeodesyEngine: Send + Sync {
    fn transform(
        &self,
        spec: &TransformationSpec,
        input: &CoordinateArrays,
    ) -> Result<Coordinates, IceflowError>;
}

impl<F> GeodesyEngine for F
where
    F: Fn(&TransformationSpec, &CoordinateArrays) -> Result<Coordinates, IceflowError>
        + Send
        + Sync,
{
    fn transform(
        &self,
        spec: &TransformationSpec,
        input: &CoordinateArrays,
    ) -> Result<Coordinates, IceflowError> {
        self(spec, input)
    }
}

#[cfg(test)]
mod transformation_test {
    use super::*;

    fn frame(s: &str) -> ItrfFrame {
        s.parse().unwrap()
    }

    #[test]
    fn test_pipeline_helmert_only() {
        let spec = TransformationSpec {
            source_frame: frame("ITRF2008"),
            target_frame: frame("ITRF2014"),
            target_epoch: None,
            plate: None,
        };
        assert_eq!(
            spec.proj_pipeline(),
            "+proj=pipeline +ellps=WGS84 \
             +step +proj=unitconvert +xy_in=deg +xy_out=rad \
             +step +proj=latlon +step +proj=cart \
             +step +inv +init=ITRF2014:ITRF2008 \
             +step +inv +proj=cart \
             +step +proj=unitconvert +xy_in=rad +xy_out=deg"
        );
    }

    #[test]
    fn test_pipeline_epoch_only() {
        let spec = TransformationSpec {
            source_frame: frame("ITRF2014"),
            target_frame: frame("ITRF2014"),
            target_epoch: Some(2010.5),
            plate: Some("NOAM".into()),
        };
        let pipeline = spec.proj_pipeline();
        assert!(!pipeline.contains("+inv +init"));
        assert!(pipeline.contains("+step +init=ITRF2014:NOAM +t_epoch=2010.5 +step +inv +proj=cart"));
    }

    #[test]
    fn test_pipeline_uses_engine_alias() {
        let spec = TransformationSpec {
            source_frame: frame("ITRF2000"),
            target_frame: frame("ITRF2014"),
            target_epoch: None,
            plate: None,
        };
        assert!(spec.proj_pipeline().contains("+init=ITRF2014:ITRF20 "));
        assert_eq!(spec.to_string(), "ITRF2000 -> ITRF2014");
    }

    #[test]
    fn test_centroid() {
        let mut arrays = CoordinateArrays::with_capacity(2);
        assert_eq!(arrays.centroid(), None);
        arrays.push(-50.0, 70.0, 1.0, 2010.0);
        arrays.push(-40.0, 68.0, 2.0, 2010.0);
        assert_eq!(arrays.centroid(), Some((-45.0, 69.0)));
        assert_eq!(arrays.common_len(), Some(2));

        arrays.decimal_year.pop();
        assert_eq!(arrays.common_len(), None);
    }

    #[test]
    fn test_coordinates_len() {
        let coords = Coordinates {
            longitude: vec![1.0, 2.0],
            latitude: vec![1.0, 2.0],
            elevation: vec![1.0],
        };
        assert_eq!(coords.common_len(), None);
    }
}
