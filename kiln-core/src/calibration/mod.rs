//! Oven rate calibration
//!
//! Measures how fast the oven heats and cools so programs can be checked
//! against what the hardware can actually do.

pub mod procedure;

pub use procedure::{CalibrationError, CalibrationPhase, CalibrationSettings, RateCalibrator};
