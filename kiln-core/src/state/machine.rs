//! State machine definition
//!
//! Heater behavior is a function of the current state and an event.

use super::events::Event;

/// Controller states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenState {
    /// Nothing running; programs may be edited
    Idle,
    /// Program executing
    Running,
    /// Rate calibration in progress
    Calibrating,
    /// Program finished; heater off
    Complete,
    /// Fault detected; heater off until acknowledged
    Fault(ErrorKind),
    /// Terminal; every command is refused
    Shutdown,
}

/// Types of faults that stop a program
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorKind {
    /// Temperature left the calibrated rate envelope
    RateViolation,
    /// Heater reads failed repeatedly
    DeviceFault,
}

impl OvenState {
    /// Check if the periodic tick has work to do
    pub fn is_busy(&self) -> bool {
        matches!(self, OvenState::Running | OvenState::Calibrating)
    }

    /// Check if this is a fault state
    pub fn is_fault(&self) -> bool {
        matches!(self, OvenState::Fault(_))
    }

    /// Process an event and return the next state
    pub fn transition(self, event: Event) -> Self {
        use Event::*;
        use OvenState::*;

        match (self, event) {
            // Shutdown is terminal and reachable from anywhere
            (OvenState::Shutdown, _) | (_, Event::Shutdown) => OvenState::Shutdown,

            // Idle and Complete behave the same
            (Idle | Complete, Execute) => Running,
            (Idle | Complete, StartCalibration) => Calibrating,
            (Complete, Cancel) => Idle,

            // Running transitions
            (Running, ProgramFinished) => Complete,
            (Running, Cancel) => Idle,
            (Running, FaultDetected(kind)) => Fault(kind),

            // Calibrating transitions
            (Calibrating, CalibrationComplete) => Idle,
            (Calibrating, CalibrationFailed) => Idle,
            (Calibrating, Cancel) => Idle,
            (Calibrating, FaultDetected(kind)) => Fault(kind),

            // Fault transitions
            (Fault(_), Cancel) => Idle,

            // Default: stay in current state
            _ => self,
        }
    }
}
