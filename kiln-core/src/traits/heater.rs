//! Heater and temperature sensor traits

use core::fmt;

/// Errors that can occur with temperature sensing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// Sensor disconnected (open circuit)
    OpenCircuit,
    /// Sensor shorted to ground
    ShortCircuit,
    /// Reading out of expected range
    OutOfRange,
    /// ADC conversion error
    ConversionError,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            SensorError::OpenCircuit => "sensor open circuit",
            SensorError::ShortCircuit => "sensor short circuit",
            SensorError::OutOfRange => "sensor reading out of range",
            SensorError::ConversionError => "sensor conversion failed",
        };
        f.write_str(msg)
    }
}

/// Errors reported by a heater device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// Temperature could not be read
    Sensor(SensorError),
    /// Output could not be driven
    Output,
}

impl From<SensorError> for DeviceError {
    fn from(e: SensorError) -> Self {
        DeviceError::Sensor(e)
    }
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::Sensor(e) => write!(f, "heater read failed: {}", e),
            DeviceError::Output => f.write_str("heater output failed"),
        }
    }
}

/// Trait for temperature sensors
///
/// Implementations should handle the specific sensor type (NTC thermistor,
/// thermocouple, PT100, etc.)
pub trait TemperatureSensor {
    /// Read the current temperature in degrees Celsius
    ///
    /// Returns a fixed-point value with 0.1°C resolution.
    /// For example, 245.5°C is returned as 2455.
    fn read_celsius_x10(&mut self) -> Result<i16, SensorError>;

    /// Read the current temperature as a float
    fn read_celsius(&mut self) -> Result<f32, SensorError> {
        self.read_celsius_x10().map(|t| t as f32 / 10.0)
    }
}

/// Trait for heater output control
///
/// Implementations control the heater element via GPIO, PWM, or SSR.
pub trait HeaterOutput {
    /// Turn the heater on or off
    fn set_on(&mut self, on: bool);

    /// Check if the heater is currently on
    fn is_on(&self) -> bool;
}

/// Snapshot of a heater
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HeaterStatus {
    /// Measured temperature (°C)
    pub temperature: f32,
    /// Commanded target (°C, 0 = off)
    pub target: f32,
    /// Highest target the heater accepts (°C)
    pub max_temp: f32,
}

/// A heater with temperature feedback, driven by target temperature
///
/// The oven controller owns exactly one heater and only ever talks to it
/// through this trait.
pub trait Heater {
    /// Read `(current, target)` at time `now`
    fn get_temperature(&mut self, now: f64) -> Result<(f32, f32), DeviceError>;

    /// Command a new target temperature; 0 turns the heater off
    fn set_target(&mut self, target_c: f32) -> Result<(), DeviceError>;

    /// Highest target the heater accepts
    fn max_temp(&self) -> f32;

    /// Read a status snapshot
    fn get_status(&mut self, now: f64) -> Result<HeaterStatus, DeviceError> {
        let (temperature, target) = self.get_temperature(now)?;
        Ok(HeaterStatus {
            temperature,
            target,
            max_temp: self.max_temp(),
        })
    }
}
