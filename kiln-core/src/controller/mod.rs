//! Oven controller
//!
//! Orchestrates program execution, calibration and rate safety for one
//! heater.

pub mod command;
pub mod error;
pub mod oven;

#[cfg(test)]
pub(crate) mod mock;

pub use command::Response;
pub use error::{OvenError, ParameterError};
pub use oven::{OvenController, OvenStatus};
