//! Wall-clock reactor
//!
//! Monotonic time from [`Instant`] and a single pending wake time. The
//! [`run`] loop sleeps until the armed time and ticks the controller, the
//! host counterpart of a firmware tick task.

use std::thread;
use std::time::{Duration, Instant};

use kiln_core::traits::{CalibrationStore, Heater, Reactor, NEVER};
use kiln_core::{OvenController, OvenError};

/// Reactor backed by the system monotonic clock
#[derive(Debug, Clone)]
pub struct StdReactor {
    start: Instant,
    waketime: f64,
}

impl Default for StdReactor {
    fn default() -> Self {
        Self::new()
    }
}

impl StdReactor {
    /// Create a reactor whose clock starts at 0 now
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            waketime: NEVER,
        }
    }

    /// Pending wake time ([`NEVER`] when disarmed)
    pub fn waketime(&self) -> f64 {
        self.waketime
    }

    pub fn is_armed(&self) -> bool {
        self.waketime.is_finite()
    }

    /// Sleep until the wake time, returning the time actually reached
    ///
    /// Returns `None` when disarmed.
    pub fn wait(&self) -> Option<f64> {
        if !self.is_armed() {
            return None;
        }
        let remaining = self.waketime - self.monotonic();
        if remaining > 0.0 {
            thread::sleep(Duration::from_secs_f64(remaining));
        }
        Some(self.monotonic())
    }
}

impl Reactor for StdReactor {
    fn monotonic(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    fn update_timer(&mut self, waketime: f64) {
        self.waketime = waketime;
    }
}

/// Tick the controller until nothing is armed
///
/// Errors that leave the tick armed (a single failed heater read) are
/// logged and the loop goes on; anything that disarms ends the run.
pub fn run<H: Heater, S: CalibrationStore>(
    oven: &mut OvenController<H, StdReactor, S>,
) -> Result<(), OvenError> {
    while let Some(now) = oven.reactor().wait() {
        match oven.tick(now) {
            Ok(_) => {}
            Err(e) if oven.reactor().is_armed() => warn!("tick failed: {}", e),
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
