//! Persistence abstraction for calibration results

use core::fmt;

use crate::config::RateCalibration;
use crate::program::ProgramFileError;

/// Errors loading or saving persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PersistenceError {
    /// A program file line could not be parsed
    Malformed(ProgramFileError),
    /// Nothing stored
    NotFound,
    /// Read or write failed
    Io,
    /// Serialization failed
    Encode,
    /// Deserialization failed
    Decode,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

impl From<ProgramFileError> for PersistenceError {
    fn from(e: ProgramFileError) -> Self {
        PersistenceError::Malformed(e)
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Malformed(e) => write!(f, "malformed program: {}", e),
            PersistenceError::NotFound => f.write_str("no stored data"),
            PersistenceError::Io => f.write_str("storage I/O failed"),
            PersistenceError::Encode => f.write_str("serialization failed"),
            PersistenceError::Decode => f.write_str("deserialization failed"),
            PersistenceError::InvalidFormat => f.write_str("invalid magic or version"),
            PersistenceError::CrcMismatch => f.write_str("CRC mismatch"),
        }
    }
}

/// Storage for the measured heating and cooling rates
pub trait CalibrationStore {
    /// Load stored rates, `Ok(None)` if nothing was saved yet
    fn load(&mut self) -> Result<Option<RateCalibration>, PersistenceError>;

    /// Replace the stored rates
    fn save(&mut self, calibration: &RateCalibration) -> Result<(), PersistenceError>;
}
