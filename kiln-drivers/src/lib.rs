//! Heater drivers and host storage
//!
//! This crate provides concrete implementations of the traits defined
//! in kiln-core:
//!
//! - Heaters (bang-bang over a sensor and an output, simulated plant)
//! - GPIO heater output over `embedded-hal`
//! - Wall-clock reactor (`std`)
//! - Calibration, program and config files (`std`)

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod heater;

#[cfg(feature = "std")]
pub mod reactor;
#[cfg(feature = "std")]
pub mod storage;

pub use heater::{BangBangConfig, BangBangHeater, GpioHeater, SimulatedHeater};

#[cfg(feature = "std")]
pub use reactor::StdReactor;
#[cfg(feature = "std")]
pub use storage::{load_config, FileCalibrationStore};
