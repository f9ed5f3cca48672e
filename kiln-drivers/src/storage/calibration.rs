//! Calibration data persistence
//!
//! Loads and saves the measured rates to a small binary file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use kiln_core::config::RateCalibration;
use kiln_core::traits::{CalibrationStore, PersistenceError};

/// Maximum serialized calibration size
const MAX_CALIBRATION_SIZE: usize = 64;

/// Calibration store backed by a single file
#[derive(Debug, Clone)]
pub struct FileCalibrationStore {
    path: PathBuf,
}

impl FileCalibrationStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the stored record; a missing file is not an error
    pub fn clear(&mut self) -> Result<(), PersistenceError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(_) => Err(PersistenceError::Io),
        }
    }
}

impl CalibrationStore for FileCalibrationStore {
    fn load(&mut self) -> Result<Option<RateCalibration>, PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("no calibration file");
                return Ok(None);
            }
            Err(_) => return Err(PersistenceError::Io),
        };

        debug!("read {} bytes of calibration", bytes.len());

        let data: RateCalibration =
            postcard::from_bytes(&bytes).map_err(|_| PersistenceError::Decode)?;

        // Validate magic and version
        if !data.is_valid() {
            return Err(PersistenceError::InvalidFormat);
        }

        if !data.verify_crc() {
            warn!("calibration CRC mismatch");
            return Err(PersistenceError::CrcMismatch);
        }

        Ok(Some(data))
    }

    /// Updates the CRC before saving
    fn save(&mut self, calibration: &RateCalibration) -> Result<(), PersistenceError> {
        let mut data = *calibration;
        data.update_crc();

        let mut buffer = [0u8; MAX_CALIBRATION_SIZE];
        let bytes =
            postcard::to_slice(&data, &mut buffer).map_err(|_| PersistenceError::Encode)?;

        // Write next to the target and rename so a crash never leaves half a record
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &*bytes).map_err(|_| PersistenceError::Io)?;
        fs::rename(&tmp, &self.path).map_err(|_| PersistenceError::Io)?;

        info!(
            "saved calibration: heat {} C/s, cool {} C/s",
            data.heat_rate,
            data.cool_rate
        );
        Ok(())
    }
}
