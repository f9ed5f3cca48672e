//! Configuration type definitions
//!
//! Every field has a default so a partial configuration file is valid.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::program::AMBIENT_TEMP_C;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Ambient temperature is not finite
    InvalidAmbient,
    /// Tick interval must be positive
    InvalidTickInterval,
    /// Rate tolerance must be non-negative
    InvalidTolerance,
    /// At least one device error must be tolerated
    InvalidErrorLimit,
    /// Calibration margin must be non-negative
    InvalidMargin,
    /// Cooling window must be positive
    InvalidCoolWindow,
    /// Heating timeout must be positive
    InvalidHeatTimeout,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            ConfigError::InvalidAmbient => "ambient_temp_c must be finite",
            ConfigError::InvalidTickInterval => "tick_interval_s must be positive",
            ConfigError::InvalidTolerance => "rate_tolerance_c must not be negative",
            ConfigError::InvalidErrorLimit => "max_device_errors must be at least 1",
            ConfigError::InvalidMargin => "calibration.margin_c must not be negative",
            ConfigError::InvalidCoolWindow => "calibration.cool_window_s must be positive",
            ConfigError::InvalidHeatTimeout => "calibration.heat_timeout_s must be positive",
        };
        f.write_str(msg)
    }
}

/// Calibration procedure settings
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CalibrationConfig {
    /// Default target is `max_temp - margin_c`
    pub margin_c: f32,
    /// Pause at the target between heating and cooling (s)
    pub settle_time_s: u32,
    /// Cooling measurement window (s)
    pub cool_window_s: u32,
    /// Give up if the target is not reached within this time (s)
    pub heat_timeout_s: u32,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            margin_c: 20.0,
            settle_time_s: 20,
            cool_window_s: 300,
            heat_timeout_s: 3600,
        }
    }
}

/// Oven controller configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OvenConfig {
    /// Starting temperature of programs, and the target of an empty one (°C)
    pub ambient_temp_c: f32,
    /// Period of the control tick (s)
    pub tick_interval_s: f64,
    /// Slack added to the rate envelope (°C)
    pub rate_tolerance_c: f32,
    /// Consecutive failed reads before failing safe
    pub max_device_errors: u8,
    pub calibration: CalibrationConfig,
}

impl Default for OvenConfig {
    fn default() -> Self {
        Self {
            ambient_temp_c: AMBIENT_TEMP_C,
            tick_interval_s: 1.0,
            rate_tolerance_c: 2.0,
            max_device_errors: 3,
            calibration: CalibrationConfig::default(),
        }
    }
}

impl OvenConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.ambient_temp_c.is_finite() {
            return Err(ConfigError::InvalidAmbient);
        }
        if !(self.tick_interval_s.is_finite() && self.tick_interval_s > 0.0) {
            return Err(ConfigError::InvalidTickInterval);
        }
        if !(self.rate_tolerance_c >= 0.0) {
            return Err(ConfigError::InvalidTolerance);
        }
        if self.max_device_errors == 0 {
            return Err(ConfigError::InvalidErrorLimit);
        }
        if !(self.calibration.margin_c >= 0.0) {
            return Err(ConfigError::InvalidMargin);
        }
        if self.calibration.cool_window_s == 0 {
            return Err(ConfigError::InvalidCoolWindow);
        }
        if self.calibration.heat_timeout_s == 0 {
            return Err(ConfigError::InvalidHeatTimeout);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = OvenConfig::default();
        assert_eq!(config.ambient_temp_c, 25.0);
        assert_eq!(config.tick_interval_s, 1.0);
        assert_eq!(config.calibration.cool_window_s, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = OvenConfig::default();
        config.tick_interval_s = 0.0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTickInterval));

        let mut config = OvenConfig::default();
        config.rate_tolerance_c = f32::NAN;
        assert_eq!(config.validate(), Err(ConfigError::InvalidTolerance));

        let mut config = OvenConfig::default();
        config.max_device_errors = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidErrorLimit));

        let mut config = OvenConfig::default();
        config.calibration.cool_window_s = 0;
        assert_eq!(config.validate(), Err(ConfigError::InvalidCoolWindow));
    }
}
