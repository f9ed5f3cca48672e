//! Heating/cooling rate measurement
//!
//! The procedure heats to a test temperature, holds it while the reading
//! settles, then switches the heater off and measures the cooling slope:
//!
//! ```text
//! Idle -> Heating -> Settling -> Cooling -> Complete
//!            \__________\___________\_____> Failed
//! ```
//!
//! It never touches the heater itself. The controller feeds it one sample
//! per tick and applies the heater command it returns.

use core::fmt;

use crate::config::RateCalibration;

/// Calibration failure reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationError {
    /// Target not reached before the heating timeout
    Timeout,
    /// Temperature did not rise while heating
    NoHeating,
    /// Temperature did not fall during the cooling window
    NoCooling,
    /// Target is not above the current temperature or above the heater limit
    InvalidTarget,
    /// Cancelled by the user
    Cancelled,
    /// Temperature sensor failed repeatedly
    SensorFault,
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            CalibrationError::Timeout => "calibration target not reached in time",
            CalibrationError::NoHeating => "temperature did not rise while heating",
            CalibrationError::NoCooling => "temperature did not fall while cooling",
            CalibrationError::InvalidTarget => "calibration target out of range",
            CalibrationError::Cancelled => "calibration cancelled",
            CalibrationError::SensorFault => "sensor fault during calibration",
        };
        f.write_str(msg)
    }
}

/// Calibration phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPhase {
    /// Not running
    Idle,
    /// Heater on, waiting for the test temperature
    Heating,
    /// Holding the test temperature before the cooling measurement
    Settling,
    /// Heater off, measuring the cooling slope
    Cooling,
    /// Both rates measured
    Complete,
    Failed(CalibrationError),
}

/// Parameters for one calibration run
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSettings {
    /// Test temperature (°C)
    pub target_c: f32,
    /// Pause at the test temperature after heating (s)
    pub settle_time_s: u32,
    /// Cooling measurement window (s)
    pub cool_window_s: u32,
    /// Heating gives up after this long (s)
    pub heat_timeout_s: u32,
}

/// Tick-driven rate calibration state machine
#[derive(Debug, Clone)]
pub struct RateCalibrator {
    settings: CalibrationSettings,
    phase: CalibrationPhase,
    /// Time the current phase began
    phase_start: f64,
    /// Rounded temperature when the current phase began
    phase_start_temp: f32,
    heat_rate: f32,
    result: Option<RateCalibration>,
}

impl RateCalibrator {
    /// Create an idle calibrator
    pub fn new(settings: CalibrationSettings) -> Self {
        Self {
            settings,
            phase: CalibrationPhase::Idle,
            phase_start: 0.0,
            phase_start_temp: 0.0,
            heat_rate: 0.0,
            result: None,
        }
    }

    pub fn settings(&self) -> &CalibrationSettings {
        &self.settings
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Measured rates, once complete
    pub fn result(&self) -> Option<RateCalibration> {
        self.result
    }

    /// Check if the procedure stopped (successfully or not)
    pub fn is_finished(&self) -> bool {
        matches!(
            self.phase,
            CalibrationPhase::Complete | CalibrationPhase::Failed(_)
        )
    }

    /// Begin heating; returns the target the heater must be set to
    pub fn start(&mut self, now: f64, temp: f32) -> f32 {
        self.phase = CalibrationPhase::Heating;
        self.phase_start = now;
        self.phase_start_temp = libm::roundf(temp);
        self.heat_rate = 0.0;
        self.result = None;
        info!(
            "calibration heating from {} to {}",
            self.phase_start_temp,
            self.settings.target_c
        );
        self.settings.target_c
    }

    /// Abort; the heater must be switched off
    pub fn cancel(&mut self) {
        if !self.is_finished() {
            self.phase = CalibrationPhase::Failed(CalibrationError::Cancelled);
        }
    }

    /// Mark the run failed from outside (sensor faults)
    pub fn fail(&mut self, err: CalibrationError) {
        self.phase = CalibrationPhase::Failed(err);
    }

    /// Feed one sample
    ///
    /// Returns a new heater target when the heater must change.
    pub fn update(&mut self, now: f64, temp: f32) -> Option<f32> {
        let sample = libm::roundf(temp);
        let elapsed = now - self.phase_start;

        match self.phase {
            CalibrationPhase::Heating => {
                if sample >= self.settings.target_c {
                    let rate = if elapsed > 0.0 {
                        (sample - self.phase_start_temp) / elapsed as f32
                    } else {
                        0.0
                    };
                    if rate <= 0.0 {
                        return self.abort(CalibrationError::NoHeating);
                    }
                    self.heat_rate = rate;
                    info!("heating rate {} C/s, settling", rate);
                    self.enter(CalibrationPhase::Settling, now, sample);
                    None
                } else if elapsed >= self.settings.heat_timeout_s as f64 {
                    self.abort(CalibrationError::Timeout)
                } else {
                    None
                }
            }
            CalibrationPhase::Settling => {
                if elapsed >= self.settings.settle_time_s as f64 {
                    debug!("heater off, measuring cooling from {}", sample);
                    self.enter(CalibrationPhase::Cooling, now, sample);
                    Some(0.0)
                } else {
                    None
                }
            }
            CalibrationPhase::Cooling => {
                if elapsed >= self.settings.cool_window_s as f64 {
                    let rate = (self.phase_start_temp - sample) / elapsed as f32;
                    if rate <= 0.0 {
                        self.phase = CalibrationPhase::Failed(CalibrationError::NoCooling);
                        warn!("no cooling measured");
                        return None;
                    }
                    info!("cooling rate {} C/s", rate);
                    self.result = Some(RateCalibration::new(self.heat_rate, rate));
                    self.phase = CalibrationPhase::Complete;
                }
                None
            }
            _ => None,
        }
    }

    fn enter(&mut self, phase: CalibrationPhase, now: f64, sample: f32) {
        self.phase = phase;
        self.phase_start = now;
        self.phase_start_temp = sample;
    }

    fn abort(&mut self, err: CalibrationError) -> Option<f32> {
        warn!("calibration failed: {}", err);
        self.phase = CalibrationPhase::Failed(err);
        Some(0.0)
    }
}
