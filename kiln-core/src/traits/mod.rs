//! Hardware and host abstraction traits
//!
//! These traits define the interface between the oven controller and the
//! heater, timer and storage implementations it is given.

pub mod heater;
pub mod reactor;
pub mod store;

pub use heater::{DeviceError, Heater, HeaterOutput, HeaterStatus, SensorError, TemperatureSensor};
pub use reactor::{Reactor, NEVER};
pub use store::{CalibrationStore, PersistenceError};
