//! Core logic for the oven temperature-program controller
//!
//! This crate contains all application logic that does not depend on
//! specific hardware or host implementations:
//!
//! - Easing curves, segments and programs
//! - Rate calibration procedure
//! - Rate safety monitoring
//! - State machine and oven controller
//! - Hardware and host abstraction traits (heater, timer, storage)
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

#[macro_use]
mod fmt;

pub mod calibration;
pub mod config;
pub mod controller;
pub mod program;
pub mod safety;
pub mod state;
pub mod traits;

pub use controller::{OvenController, OvenError, OvenStatus, Response};
