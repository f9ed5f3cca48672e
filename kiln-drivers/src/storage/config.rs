//! Controller configuration files
//!
//! ```toml
//! ambient_temp_c = 22.0
//! rate_tolerance_c = 3.0
//!
//! [calibration]
//! cool_window_s = 120
//! ```
//!
//! Missing keys keep their defaults.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use kiln_core::config::{ConfigError, OvenConfig};

/// Errors loading a configuration file
#[derive(Debug)]
pub enum ConfigLoadError {
    /// File could not be read
    Io(io::Error),
    /// TOML parsing failed
    Parse(toml::de::Error),
    /// Parsed values are out of range
    Invalid(ConfigError),
}

impl fmt::Display for ConfigLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigLoadError::Io(e) => write!(f, "cannot read config: {}", e),
            ConfigLoadError::Parse(e) => write!(f, "invalid config: {}", e),
            ConfigLoadError::Invalid(e) => write!(f, "invalid config: {}", e),
        }
    }
}

impl std::error::Error for ConfigLoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigLoadError::Io(e) => Some(e),
            ConfigLoadError::Parse(e) => Some(e),
            ConfigLoadError::Invalid(_) => None,
        }
    }
}

impl From<io::Error> for ConfigLoadError {
    fn from(e: io::Error) -> Self {
        ConfigLoadError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigLoadError {
    fn from(e: toml::de::Error) -> Self {
        ConfigLoadError::Parse(e)
    }
}

impl From<ConfigError> for ConfigLoadError {
    fn from(e: ConfigError) -> Self {
        ConfigLoadError::Invalid(e)
    }
}

/// Parse and validate a TOML configuration
pub fn parse_config(input: &str) -> Result<OvenConfig, ConfigLoadError> {
    let config: OvenConfig = toml::from_str(input)?;
    config.validate()?;
    Ok(config)
}

/// Load a configuration file
pub fn load_config(path: impl AsRef<Path>) -> Result<OvenConfig, ConfigLoadError> {
    let text = fs::read_to_string(path)?;
    let config = parse_config(&text)?;
    info!("loaded configuration");
    Ok(config)
}
