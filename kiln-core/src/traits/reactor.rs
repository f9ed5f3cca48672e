//! Cooperative timer abstraction
//!
//! The controller runs on a single periodic tick. Whoever owns the
//! controller calls `tick(now)` once the armed wake time is reached and
//! arms the returned time again.

/// Wake time meaning "disarmed"
pub const NEVER: f64 = f64::INFINITY;

/// Clock and single-slot timer
pub trait Reactor {
    /// Monotonic time in seconds
    fn monotonic(&self) -> f64;

    /// Arm the tick at `waketime`, replacing any pending wake time
    ///
    /// [`NEVER`] disarms.
    fn update_timer(&mut self, waketime: f64);
}
