//! Controller error taxonomy

use core::fmt;

use kiln_protocol::CommandError;

use crate::calibration::CalibrationError;
use crate::config::ConfigError;
use crate::program::{ProgramFileError, ProgramFull, RateRejection};
use crate::safety::RateViolation;
use crate::traits::{DeviceError, PersistenceError};

/// Rejected command parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParameterError {
    /// Duration parameter is negative
    NegativeDuration(&'static str),
    /// Easing name or code is not known
    UnknownMethod,
    /// Target is not finite, negative, or above the heater limit
    TargetOutOfRange,
    /// Cooling window must be positive
    CoolWindow,
    /// Command line could not be parsed
    Command(CommandError),
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterError::NegativeDuration(key) => write!(f, "{} must not be negative", key),
            ParameterError::UnknownMethod => f.write_str("unknown easing method"),
            ParameterError::TargetOutOfRange => f.write_str("target temperature out of range"),
            ParameterError::CoolWindow => f.write_str("COOL_WAIT must be positive"),
            ParameterError::Command(e) => write!(f, "{}", e),
        }
    }
}

/// Errors returned by the oven controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenError {
    InvalidParameter(ParameterError),
    /// Heating or cooling rate not measured yet
    Uncalibrated,
    /// Segment asks for a faster change than the oven can do
    RateRejected(RateRejection),
    /// Nothing to execute
    EmptyProgram,
    /// Temperature left the rate envelope; the program was aborted
    RateViolation(RateViolation),
    Persistence(PersistenceError),
    Device(DeviceError),
    Calibration(CalibrationError),
    Config(ConfigError),
    /// A program or calibration is running
    Busy,
    /// A fault must be acknowledged with cancel or clear first
    Faulted,
    /// Controller was shut down
    Shutdown,
    /// No room for more segments
    ProgramFull,
}

impl From<ParameterError> for OvenError {
    fn from(e: ParameterError) -> Self {
        OvenError::InvalidParameter(e)
    }
}

impl From<CommandError> for OvenError {
    fn from(e: CommandError) -> Self {
        OvenError::InvalidParameter(ParameterError::Command(e))
    }
}

impl From<RateRejection> for OvenError {
    fn from(e: RateRejection) -> Self {
        OvenError::RateRejected(e)
    }
}

impl From<RateViolation> for OvenError {
    fn from(e: RateViolation) -> Self {
        OvenError::RateViolation(e)
    }
}

impl From<PersistenceError> for OvenError {
    fn from(e: PersistenceError) -> Self {
        OvenError::Persistence(e)
    }
}

impl From<ProgramFileError> for OvenError {
    fn from(e: ProgramFileError) -> Self {
        OvenError::Persistence(PersistenceError::Malformed(e))
    }
}

impl From<DeviceError> for OvenError {
    fn from(e: DeviceError) -> Self {
        OvenError::Device(e)
    }
}

impl From<CalibrationError> for OvenError {
    fn from(e: CalibrationError) -> Self {
        OvenError::Calibration(e)
    }
}

impl From<ConfigError> for OvenError {
    fn from(e: ConfigError) -> Self {
        OvenError::Config(e)
    }
}

impl From<ProgramFull> for OvenError {
    fn from(_: ProgramFull) -> Self {
        OvenError::ProgramFull
    }
}

impl fmt::Display for OvenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OvenError::InvalidParameter(e) => write!(f, "invalid parameter: {}", e),
            OvenError::Uncalibrated => {
                f.write_str("oven is not calibrated, run CALIBRATE_OVEN first")
            }
            OvenError::RateRejected(r) => write!(
                f,
                "segment needs {:.3} C/s but the oven manages {:.3} C/s",
                r.requested, r.available
            ),
            OvenError::EmptyProgram => {
                f.write_str("no program to execute, use ADD_SEGMENT first")
            }
            OvenError::RateViolation(v) => write!(f, "program aborted: {}", v),
            OvenError::Persistence(e) => write!(f, "{}", e),
            OvenError::Device(e) => write!(f, "{}", e),
            OvenError::Calibration(e) => write!(f, "{}", e),
            OvenError::Config(e) => write!(f, "invalid configuration: {}", e),
            OvenError::Busy => f.write_str("oven is busy"),
            OvenError::Faulted => f.write_str("oven is in fault, cancel or clear to acknowledge"),
            OvenError::Shutdown => f.write_str("oven controller is shut down"),
            OvenError::ProgramFull => f.write_str("program is full"),
        }
    }
}
