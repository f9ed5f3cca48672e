//! In-memory collaborators for controller tests

use crate::config::RateCalibration;
use crate::traits::{
    CalibrationStore, DeviceError, Heater, PersistenceError, Reactor, SensorError, NEVER,
};

/// Heater whose temperature jumps to every non-zero target
pub struct FakeHeater {
    pub temp: f32,
    pub target: f32,
    pub max_temp: f32,
    /// Number of `set_target` calls
    pub writes: usize,
    pub fail_reads: bool,
    /// Reported instead of `temp` when set
    pub override_temp: Option<f32>,
}

impl FakeHeater {
    pub fn new(temp: f32, max_temp: f32) -> Self {
        Self {
            temp,
            target: 0.0,
            max_temp,
            writes: 0,
            fail_reads: false,
            override_temp: None,
        }
    }
}

impl Heater for FakeHeater {
    fn get_temperature(&mut self, _now: f64) -> Result<(f32, f32), DeviceError> {
        if self.fail_reads {
            return Err(SensorError::OpenCircuit.into());
        }
        Ok((self.override_temp.unwrap_or(self.temp), self.target))
    }

    fn set_target(&mut self, target_c: f32) -> Result<(), DeviceError> {
        self.writes += 1;
        self.target = target_c;
        if target_c > 0.0 {
            self.temp = target_c;
        }
        Ok(())
    }

    fn max_temp(&self) -> f32 {
        self.max_temp
    }
}

/// Manually advanced clock
pub struct FakeReactor {
    pub now: f64,
    pub waketime: f64,
}

impl FakeReactor {
    pub fn new() -> Self {
        Self {
            now: 0.0,
            waketime: NEVER,
        }
    }
}

impl Reactor for FakeReactor {
    fn monotonic(&self) -> f64 {
        self.now
    }

    fn update_timer(&mut self, waketime: f64) {
        self.waketime = waketime;
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub stored: Option<RateCalibration>,
    /// Last record passed to `save`
    pub saved: Option<RateCalibration>,
}

impl MemoryStore {
    pub fn with(rates: RateCalibration) -> Self {
        Self {
            stored: Some(rates),
            saved: None,
        }
    }
}

impl CalibrationStore for MemoryStore {
    fn load(&mut self) -> Result<Option<RateCalibration>, PersistenceError> {
        Ok(self.stored)
    }

    fn save(&mut self, calibration: &RateCalibration) -> Result<(), PersistenceError> {
        self.stored = Some(*calibration);
        self.saved = Some(*calibration);
        Ok(())
    }
}
