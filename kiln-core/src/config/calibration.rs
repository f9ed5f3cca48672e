//! Rate calibration data
//!
//! Stores the measured heating and cooling rates. The record carries a
//! magic number, a version and a CRC32 so a corrupt or foreign file is
//! rejected on load.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Magic number to identify valid calibration data
pub const CALIBRATION_MAGIC: u32 = 0x5241_5445; // "RATE"

/// Current calibration data version
pub const CALIBRATION_VERSION: u8 = 1;

/// Measured oven rates
///
/// A rate of 0 means "not measured". Programs only execute when both rates
/// are positive.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RateCalibration {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Heating rate (°C/s)
    pub heat_rate: f32,
    /// Cooling rate (°C/s)
    pub cool_rate: f32,
    /// CRC32 over magic..cool_rate
    pub crc: u32,
}

impl Default for RateCalibration {
    fn default() -> Self {
        Self::uncalibrated()
    }
}

impl RateCalibration {
    /// Rates that block execution until a calibration runs
    pub const fn uncalibrated() -> Self {
        Self {
            magic: CALIBRATION_MAGIC,
            version: CALIBRATION_VERSION,
            heat_rate: 0.0,
            cool_rate: 0.0,
            crc: 0,
        }
    }

    /// Create a record with a valid CRC
    pub fn new(heat_rate: f32, cool_rate: f32) -> Self {
        let mut cal = Self {
            heat_rate,
            cool_rate,
            ..Self::uncalibrated()
        };
        cal.update_crc();
        cal
    }

    /// Check if both rates were measured
    pub fn is_calibrated(&self) -> bool {
        self.heat_rate > 0.0 && self.cool_rate > 0.0
    }

    /// Check if magic and version match
    pub fn is_valid(&self) -> bool {
        self.magic == CALIBRATION_MAGIC && self.version == CALIBRATION_VERSION
    }

    /// Calculate CRC32 for the data (excluding the crc field itself)
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFF_FFFF;
        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);
        crc = crc32_update(crc, &self.heat_rate.to_le_bytes());
        crc = crc32_update(crc, &self.cool_rate.to_le_bytes());
        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// CRC32 update (IEEE 802.3 polynomial, reflected)
fn crc32_update(mut crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB8_8320;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            crc = if crc & 1 != 0 { (crc >> 1) ^ POLY } else { crc >> 1 };
        }
    }

    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uncalibrated_default() {
        let cal = RateCalibration::default();
        assert!(cal.is_valid());
        assert!(!cal.is_calibrated());
    }

    #[test]
    fn test_one_rate_is_not_enough() {
        assert!(!RateCalibration::new(1.5, 0.0).is_calibrated());
        assert!(!RateCalibration::new(0.0, 0.4).is_calibrated());
        assert!(RateCalibration::new(1.5, 0.4).is_calibrated());
    }

    #[test]
    fn test_crc_consistency() {
        let mut cal = RateCalibration::new(0.5, 0.2);
        assert!(cal.verify_crc());

        cal.cool_rate = 0.3;
        assert!(!cal.verify_crc());

        cal.update_crc();
        assert!(cal.verify_crc());
    }

    #[test]
    fn test_crc32_check_value() {
        // Standard check value for "123456789"
        assert_eq!(!crc32_update(0xFFFF_FFFF, b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_foreign_magic_is_invalid() {
        let mut cal = RateCalibration::new(0.5, 0.2);
        cal.magic = 0x5049_4443;
        assert!(!cal.is_valid());
    }
}
