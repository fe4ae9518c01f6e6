//! # International Terrestrial Reference Frames
//!
//! Everything that deals with *which* frame a point is expressed in and with
//! moving points between frames.
//!
//! ## Frame strings
//!
//! A frame is written `ITRF` followed by 2 to 4 digits (`ITRF93`, `ITRF2008`).
//! Legacy files also use a handful of aliases; they are normalized as soon as a
//! frame enters the crate:
//!
//! | seen in data | tag used on points | name sent to the geodesy engine |
//! |--------------|--------------------|---------------------------------|
//! | `ITRF05`     | `ITRF2005`         | `ITRF2005`                      |
//! | `ITRF08`     | `ITRF2008`         | `ITRF2008`                      |
//! | `ITRF2000`   | `ITRF2000`         | `ITRF20`                        |
//!
//! ## Submodules
//!
//! * [`granule_ranges`] – Date-range fallback table for ATM1B granules.
//! * [`resolver`] – Frame of a file from metadata, header text or date.
//! * [`transformation`] – Per-group transformation spec and the geodesy engine seam.
//! * [`harmonizer`] – Groups points by frame and brings them to a target frame.
//! * [`helmert`] – A built-in geodesy engine (Helmert + plate motion).

pub mod granule_ranges;
pub mod harmonizer;
pub mod helmert;
pub mod resolver;
pub mod transformation;

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;

use crate::iceflow_errors::IceflowError;

/// Frames known to be handled by the downstream transformation engine.
pub const SUPPORTED_ITRFS: [&str; 9] = [
    "ITRF93", "ITRF94", "ITRF96", "ITRF97", "ITRF2000", "ITRF2005", "ITRF2008", "ITRF2014",
    "ITRF2020",
];

static FRAME_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^ITRF\d{2,4}$").expect("valid frame regex"));

static FRAME_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)itrf\d{2,4}").expect("valid frame token regex"));

/// `true` when `s` is exactly `ITRF` followed by 2 to 4 digits.
pub fn is_valid_frame_string(s: &str) -> bool {
    FRAME_STRING.is_match(s)
}

/// Upper-case `s` and expand the two-digit aliases `ITRF05` and `ITRF08`.
pub fn normalize_itrf(s: &str) -> String {
    let upper = s.trim().to_uppercase();
    match upper.as_str() {
        "ITRF05" => "ITRF2005".to_string(),
        "ITRF08" => "ITRF2008".to_string(),
        _ => upper,
    }
}

/// Distinct frame tokens found in free text, case-insensitive, normalized, sorted.
pub fn find_frame_tokens(text: &str) -> Vec<String> {
    FRAME_TOKEN
        .find_iter(text)
        .map(|m| normalize_itrf(m.as_str()))
        .unique()
        .sorted()
        .collect()
}

/// A validated, normalized reference frame tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItrfFrame(String);

impl ItrfFrame {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of this frame as the geodesy engine expects it (`ITRF2000` → `ITRF20`).
    pub fn engine_name(&self) -> &str {
        match self.0.as_str() {
            "ITRF2000" => "ITRF20",
            other => other,
        }
    }

    pub fn is_supported(&self) -> bool {
        SUPPORTED_ITRFS.contains(&self.0.as_str())
    }
}

impl FromStr for ItrfFrame {
    type Err = IceflowError;

    /// Normalize then validate a frame string.
    ///
    /// Return
    /// ----------
    /// * The frame, or [`IceflowError::InvalidReferenceFrame`] carrying the input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize_itrf(s);
        if is_valid_frame_string(&normalized) {
            Ok(ItrfFrame(normalized))
        } else {
            Err(IceflowError::InvalidReferenceFrame(s.to_string()))
        }
    }
}

impl fmt::Display for ItrfFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod itrf_test {
    use super::*;

    #[test]
    fn test_is_valid_frame_string() {
        assert!(is_valid_frame_string("ITRF2008"));
        assert!(is_valid_frame_string("ITRF88"));
        assert!(is_valid_frame_string("ITRF20"));
        assert!(!is_valid_frame_string("Not an ITRF string"));
        assert!(!is_valid_frame_string("ITRF"));
        assert!(!is_valid_frame_string("ITRF2"));
        assert!(!is_valid_frame_string("ITRF20200"));
        assert!(!is_valid_frame_string("itrf2008"));
    }

    #[test]
    fn test_normalize_itrf() {
        assert_eq!(normalize_itrf("itrf05"), "ITRF2005");
        assert_eq!(normalize_itrf("ITRF08"), "ITRF2008");
        assert_eq!(normalize_itrf("itrf2000"), "ITRF2000");
        assert_eq!(normalize_itrf("ITRF2014"), "ITRF2014");
    }

    #[test]
    fn test_frame_parsing() {
        let frame: ItrfFrame = "itrf08".parse().unwrap();
        assert_eq!(frame.as_str(), "ITRF2008");
        assert!(frame.is_supported());

        assert_eq!(
            "WGS84".parse::<ItrfFrame>(),
            Err(IceflowError::InvalidReferenceFrame("WGS84".into()))
        );
    }

    #[test]
    fn test_engine_name() {
        let frame: ItrfFrame = "ITRF2000".parse().unwrap();
        assert_eq!(frame.as_str(), "ITRF2000");
        assert_eq!(frame.engine_name(), "ITRF20");

        let frame: ItrfFrame = "ITRF97".parse().unwrap();
        assert_eq!(frame.engine_name(), "ITRF97");
    }

    #[test]
    fn test_find_frame_tokens() {
        let text = "ATM QFIT itrf2005 ellipsoid WGS84, ITRF2005 realization";
        assert_eq!(find_frame_tokens(text), vec!["ITRF2005".to_string()]);

        let text = "itrf97 then itrf2000";
        assert_eq!(
            find_frame_tokens(text),
            vec!["ITRF2000".to_string(), "ITRF97".to_string()]
        );

        // aliases collapse onto the full name
        assert_eq!(
            find_frame_tokens("itrf08 / ITRF2008"),
            vec!["ITRF2008".to_string()]
        );

        assert!(find_frame_tokens("no frame here").is_empty());
    }
}
