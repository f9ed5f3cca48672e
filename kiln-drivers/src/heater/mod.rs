//! Heater implementations

pub mod bang_bang;
pub mod gpio;
pub mod simulated;

pub use bang_bang::{BangBangConfig, BangBangHeater};
pub use gpio::GpioHeater;
pub use simulated::SimulatedHeater;
