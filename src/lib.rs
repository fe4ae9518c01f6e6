//! # Iceflow
//!
//! Decoding and reference-frame harmonization of airborne laser altimetry
//! (ATM1B) elevation granules.
//!
//! ## Pipeline
//!
//! ```text
//! RawFile ──► qfit::sniffer ──► qfit::record ──┐
//!    │                                         ├─► time ──► PointMeasurement ──► itrf::harmonizer
//!    └──────► structured ──────────────────────┘      ▲
//!                     itrf::resolver (one frame per file)
//! ```
//!
//! * [`qfit`] – QFIT binary layout detection and record decoding.
//! * [`structured`] – Variable table of the structured (ILATM1B v2) container.
//! * [`time`] – Filename dates, packed time of day, leap seconds, decimal years.
//! * [`itrf`] – Frame strings, date-range fallback, frame resolution and harmonization.
//! * [`atm1b`] – Product recognition and the per-file pipeline.
//! * [`iceflow`] – The [`Iceflow`](crate::iceflow::Iceflow) façade holding the collaborators.

pub mod atm1b;
pub mod constants;
pub mod conversion;
pub mod iceflow;
pub mod iceflow_errors;
pub mod itrf;
pub mod point;
pub mod qfit;
pub mod structured;
pub mod time;

pub use crate::iceflow::Iceflow;
pub use crate::iceflow_errors::IceflowError;
pub use crate::itrf::ItrfFrame;
pub use crate::point::{Atm1bInstrument, PointMeasurement};
