//! Simulated heater
//!
//! A deterministic thermal plant for host runs and tests. The oven heats
//! at a constant rate until it reaches the target and otherwise cools at
//! a constant rate, never below `max(target, ambient)`. Time only moves
//! when the heater is read.

use kiln_core::traits::{DeviceError, Heater, SensorError};

/// Linear heater model
#[derive(Debug, Clone)]
pub struct SimulatedHeater {
    temp: f64,
    target: f32,
    heat_rate: f64,
    cool_rate: f64,
    ambient: f64,
    max_temp: f32,
    last_time: Option<f64>,
    failing_reads: u32,
}

impl SimulatedHeater {
    /// Create a plant resting at `ambient`
    ///
    /// Rates are in °C/s.
    pub fn new(ambient: f32, heat_rate: f32, cool_rate: f32, max_temp: f32) -> Self {
        Self {
            temp: ambient as f64,
            target: 0.0,
            heat_rate: heat_rate as f64,
            cool_rate: cool_rate as f64,
            ambient: ambient as f64,
            max_temp,
            last_time: None,
            failing_reads: 0,
        }
    }

    /// Current plant temperature, without advancing time
    pub fn temperature(&self) -> f32 {
        self.temp as f32
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    /// Make the next `count` reads fail like a disconnected sensor
    pub fn fail_reads(&mut self, count: u32) {
        self.failing_reads = count;
    }

    /// Force the plant temperature, e.g. to simulate a door opening
    pub fn set_temperature(&mut self, temp: f32) {
        self.temp = temp as f64;
    }

    /// Move the plant forward to `now`
    fn advance(&mut self, now: f64) {
        let dt = match self.last_time {
            Some(last) if now > last => now - last,
            Some(_) => return,
            None => 0.0,
        };
        self.last_time = Some(now);

        let target = self.target as f64;
        if target > self.temp {
            self.temp = (self.temp + self.heat_rate * dt).min(target);
        } else {
            let floor = target.max(self.ambient);
            if self.temp > floor {
                self.temp = (self.temp - self.cool_rate * dt).max(floor);
            }
        }
    }
}

impl Heater for SimulatedHeater {
    fn get_temperature(&mut self, now: f64) -> Result<(f32, f32), DeviceError> {
        self.advance(now);
        if self.failing_reads > 0 {
            self.failing_reads -= 1;
            return Err(SensorError::OpenCircuit.into());
        }
        Ok((self.temp as f32, self.target))
    }

    fn set_target(&mut self, target_c: f32) -> Result<(), DeviceError> {
        self.target = if target_c > 0.0 {
            target_c.min(self.max_temp)
        } else {
            0.0
        };
        Ok(())
    }

    fn max_temp(&self) -> f32 {
        self.max_temp
    }
}
