//! Host file storage
//!
//! - Rate calibration records (postcard + CRC)
//! - Program files
//! - TOML controller configuration

pub mod calibration;
pub mod config;
pub mod program;

pub use calibration::FileCalibrationStore;
pub use config::{load_config, parse_config, ConfigLoadError};
pub use program::{load_program_file, save_program_file, ProgramIoError};
