//! Rate envelope monitor
//!
//! Each tick the new reading is compared with the previous one. While the
//! program target is rising the oven may not heat faster than the
//! calibrated heating rate (plus tolerance) nor cool noticeably; falling
//! targets are the mirror image. Steady targets are not checked.

use core::fmt;

/// Direction of the active program segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TargetTrend {
    Rising,
    Falling,
    Steady,
}

impl TargetTrend {
    /// Trend of a segment moving from `from` to `to`
    pub fn between(from: f32, to: f32) -> Self {
        if to > from {
            TargetTrend::Rising
        } else if to < from {
            TargetTrend::Falling
        } else {
            TargetTrend::Steady
        }
    }
}

/// A reading outside the allowed envelope
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateViolation {
    pub trend: TargetTrend,
    /// Measured temperature (°C)
    pub observed: f32,
    /// Envelope lower bound (°C)
    pub min: f32,
    /// Envelope upper bound (°C)
    pub max: f32,
}

impl fmt::Display for RateViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "temperature {:.1} outside [{:.1}, {:.1}] while {:?}",
            self.observed, self.min, self.max, self.trend
        )
    }
}

/// Safety condition status
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SafetyStatus {
    /// All conditions normal
    Ok,
    /// Safety condition violated
    Fault(RateViolation),
}

/// Rate and device-health monitor for one running program
#[derive(Debug, Clone)]
pub struct RateMonitor {
    /// Slack on both sides of the envelope (°C)
    tolerance_c: f32,
    /// Previous `(time, temperature)` sample
    last: Option<(f64, f32)>,
    /// Consecutive failed reads
    device_errors: u8,
    max_device_errors: u8,
}

impl RateMonitor {
    /// Create a new monitor
    pub fn new(tolerance_c: f32, max_device_errors: u8) -> Self {
        Self {
            tolerance_c,
            last: None,
            device_errors: 0,
            max_device_errors,
        }
    }

    /// Forget previous samples and error counts
    pub fn reset(&mut self) {
        self.last = None;
        self.device_errors = 0;
    }

    /// Check a new reading against the envelope and record it
    ///
    /// The first reading after a reset is only recorded.
    pub fn check(
        &mut self,
        now: f64,
        temp: f32,
        trend: TargetTrend,
        heat_rate: f32,
        cool_rate: f32,
    ) -> SafetyStatus {
        self.clear_device_errors();
        let Some((prev_time, prev_temp)) = self.last.replace((now, temp)) else {
            return SafetyStatus::Ok;
        };

        let dt = (now - prev_time).max(0.0) as f32;
        let tol = self.tolerance_c;
        let (min, max) = match trend {
            TargetTrend::Rising => (prev_temp - tol, prev_temp + heat_rate * dt + tol),
            TargetTrend::Falling => (prev_temp - cool_rate * dt - tol, prev_temp + tol),
            TargetTrend::Steady => return SafetyStatus::Ok,
        };

        if temp < min || temp > max {
            SafetyStatus::Fault(RateViolation {
                trend,
                observed: temp,
                min,
                max,
            })
        } else {
            SafetyStatus::Ok
        }
    }

    /// Count a failed read
    ///
    /// Returns true once the consecutive failure limit is reached.
    pub fn record_device_error(&mut self) -> bool {
        self.device_errors = self.device_errors.saturating_add(1);
        self.device_errors >= self.max_device_errors
    }

    /// Reset the failure count after a successful read
    pub fn clear_device_errors(&mut self) {
        self.device_errors = 0;
    }

    /// Get number of consecutive failed reads
    pub fn device_errors(&self) -> u8 {
        self.device_errors
    }
}
