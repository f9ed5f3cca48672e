//! Configuration types
//!
//! Controller settings (loaded from TOML by the drivers crate) and the
//! persisted rate calibration record.

pub mod calibration;
pub mod types;

pub use calibration::*;
pub use types::*;
