//! Bang-bang heater
//!
//! Simple on/off control with hysteresis. Regulation runs on every
//! temperature read, so the controller's tick doubles as the control loop.

use kiln_core::traits::{DeviceError, Heater, HeaterOutput, TemperatureSensor};

/// Bang-bang heater configuration
#[derive(Debug, Clone)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BangBangConfig {
    /// Maximum allowed temperature (°C × 10)
    pub max_temp_x10: i16,
    /// Hysteresis (°C × 10)
    pub hysteresis_x10: i16,
}

impl Default for BangBangConfig {
    fn default() -> Self {
        Self {
            max_temp_x10: 3000, // 300.0°C
            hysteresis_x10: 20, // 2.0°C
        }
    }
}

/// Heater driven by a temperature sensor and an on/off output
///
/// Turns the output on when the temperature drops below
/// (target - hysteresis) and off above (target + hysteresis). A target of
/// 0 keeps the output off.
pub struct BangBangHeater<S, O> {
    sensor: S,
    output: O,
    config: BangBangConfig,
    target_x10: i16,
    last_temp_x10: Option<i16>,
}

impl<S: TemperatureSensor, O: HeaterOutput> BangBangHeater<S, O> {
    /// Create a heater with the output switched off
    pub fn new(sensor: S, mut output: O, config: BangBangConfig) -> Self {
        output.set_on(false);
        Self {
            sensor,
            output,
            config,
            target_x10: 0,
            last_temp_x10: None,
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn config(&self) -> &BangBangConfig {
        &self.config
    }

    /// Last successful reading (°C × 10)
    pub fn last_temp_x10(&self) -> Option<i16> {
        self.last_temp_x10
    }

    /// Check if the last reading is inside the hysteresis band
    pub fn is_at_target(&self) -> bool {
        match self.last_temp_x10 {
            Some(temp) => (temp - self.target_x10).abs() <= self.config.hysteresis_x10,
            None => false,
        }
    }

    fn regulate(&mut self, temp_x10: i16) {
        if self.target_x10 <= 0 {
            self.output.set_on(false);
            return;
        }

        // Never exceed max temperature
        if temp_x10 >= self.config.max_temp_x10 {
            if self.output.is_on() {
                warn!("heater at limit ({} x0.1 C), output off", temp_x10);
            }
            self.output.set_on(false);
            return;
        }

        let low_threshold = self.target_x10 - self.config.hysteresis_x10;
        let high_threshold = self.target_x10 + self.config.hysteresis_x10;

        if temp_x10 < low_threshold {
            self.output.set_on(true);
        } else if temp_x10 > high_threshold {
            self.output.set_on(false);
        }
        // Inside the band: keep the current state
    }
}

impl<S: TemperatureSensor, O: HeaterOutput> Heater for BangBangHeater<S, O> {
    fn get_temperature(&mut self, _now: f64) -> Result<(f32, f32), DeviceError> {
        let temp_x10 = match self.sensor.read_celsius_x10() {
            Ok(t) => t,
            Err(e) => {
                // No feedback, no heating
                self.output.set_on(false);
                return Err(e.into());
            }
        };
        self.last_temp_x10 = Some(temp_x10);
        self.regulate(temp_x10);

        Ok((temp_x10 as f32 / 10.0, self.target_x10 as f32 / 10.0))
    }

    fn set_target(&mut self, target_c: f32) -> Result<(), DeviceError> {
        let target_x10 = libm::roundf(target_c * 10.0);
        self.target_x10 = if target_x10.is_finite() && target_x10 > 0.0 {
            (target_x10 as i16).min(self.config.max_temp_x10)
        } else {
            0
        };

        if self.target_x10 == 0 {
            self.output.set_on(false);
        }
        Ok(())
    }

    fn max_temp(&self) -> f32 {
        self.config.max_temp_x10 as f32 / 10.0
    }
}
