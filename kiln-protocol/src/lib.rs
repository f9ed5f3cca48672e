//! Oven command protocol
//!
//! This crate parses the text commands accepted by the oven controller.
//! Commands follow the G-code extended-command style used by 3D printer
//! hosts:
//! ```text
//! ADD_SEGMENT TEMP=250 RAMP_TIME=600 HOLD_TIME=120 METHOD=sine_in_out
//! EXECUTE_PROGRAM WAIT=1
//! CANCEL_PROGRAM
//! PROGRAM_CLEAR
//! CALIBRATE_OVEN TARGET=260 COOL_WAIT=300
//! ```
//!
//! Parsing borrows from the input line and never allocates.

#![no_std]
#![deny(unsafe_code)]

pub mod commands;
pub mod gcode;

pub use commands::{CommandError, OvenCommand, COMMANDS};
pub use gcode::{GcodeError, GcodeLine, MAX_PARAMS};
