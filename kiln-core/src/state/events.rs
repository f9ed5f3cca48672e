//! Events that trigger state transitions

use super::machine::ErrorKind;

/// Events that can trigger state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    // Command events
    /// Program execution requested
    Execute,
    /// Program cancelled or cleared; also acknowledges a fault
    Cancel,
    /// Rate calibration requested
    StartCalibration,
    /// Controller is shutting down
    Shutdown,

    // Tick events
    /// Every segment of the program completed
    ProgramFinished,
    /// Both rates measured
    CalibrationComplete,
    /// Calibration stopped without a result
    CalibrationFailed,

    // Safety events
    /// Fault detected by the safety checks
    FaultDetected(ErrorKind),
}
