//! Safety monitoring
//!
//! Detects readings that a correctly working oven cannot produce and
//! counts consecutive device failures.

pub mod monitor;

pub use monitor::{RateMonitor, RateViolation, SafetyStatus, TargetTrend};
