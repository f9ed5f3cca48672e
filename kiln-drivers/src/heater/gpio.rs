//! GPIO heater output
//!
//! Switches the heater element through an `embedded-hal` output pin,
//! directly or via an SSR/MOSFET.

use embedded_hal::digital::{OutputPin, PinState};
use kiln_core::traits::HeaterOutput;

/// Heater output on a GPIO pin
///
/// The pin can be active-high (default) or active-low. A failed pin write
/// leaves the logical state unchanged, so `is_on` reports what the pin
/// last accepted.
pub struct GpioHeater<P> {
    pin: P,
    /// If true, heater ON = pin LOW
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> GpioHeater<P> {
    /// Create an output and drive it off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut heater = Self {
            pin,
            inverted,
            // Forces the first write through
            on: true,
        };
        heater.set_on(false);
        heater
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    /// For active-low SSRs
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Release the pin
    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: OutputPin> HeaterOutput for GpioHeater<P> {
    fn set_on(&mut self, on: bool) {
        let level = PinState::from(on != self.inverted);
        match self.pin.set_state(level) {
            Ok(()) => self.on = on,
            Err(_) => warn!("heater pin write failed"),
        }
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
