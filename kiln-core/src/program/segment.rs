//! Program segments
//!
//! A segment is the atomic unit of execution: a target temperature, a
//! duration and an easing method. Only the timing state (`start_time`,
//! `position`) changes while the program runs.

use super::easing::EasingKind;

/// Role of a segment inside its `add_segment` pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SegmentKind {
    /// Moves from the previous temperature to the target
    Ramp,
    /// Keeps the ramp's target for a while
    Hold,
}

/// A single scheduled temperature objective
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Segment {
    /// Target temperature (°C)
    target: f32,
    /// Duration in seconds
    duration_s: u32,
    /// Interpolation method
    method: EasingKind,
    /// Ramp or hold
    kind: SegmentKind,
    /// Monotonic time the segment became active
    start_time: Option<f64>,
    /// Elapsed time accumulated by the program (seconds)
    position: f64,
}

impl Segment {
    /// Create a ramp segment
    pub const fn ramp(target: f32, duration_s: u32, method: EasingKind) -> Self {
        Self {
            target,
            duration_s,
            method,
            kind: SegmentKind::Ramp,
            start_time: None,
            position: 0.0,
        }
    }

    /// Create a hold segment (method is always `None`)
    pub const fn hold(target: f32, duration_s: u32) -> Self {
        Self {
            target,
            duration_s,
            method: EasingKind::None,
            kind: SegmentKind::Hold,
            start_time: None,
            position: 0.0,
        }
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn duration_s(&self) -> u32 {
        self.duration_s
    }

    pub fn method(&self) -> EasingKind {
        self.method
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    pub fn start_time(&self) -> Option<f64> {
        self.start_time
    }

    /// Elapsed time accumulated while active, never above the duration
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Mark the segment active at `now`
    pub fn start(&mut self, now: f64) {
        self.start_time = Some(now);
    }

    /// Forget timing state so the segment can run again
    pub fn reset(&mut self) {
        self.start_time = None;
        self.position = 0.0;
    }

    /// Whole seconds since the segment started (0 if not started)
    pub fn runtime(&self, now: f64) -> f64 {
        match self.start_time {
            Some(start) => libm::round(now - start),
            None => 0.0,
        }
    }

    /// Check if the segment's duration has elapsed
    ///
    /// Uses `>=` so a skipped tick cannot leave the program stuck.
    pub fn is_done(&self, now: f64) -> bool {
        if self.duration_s == 0 {
            return true;
        }
        self.runtime(now) >= self.duration_s as f64
    }

    /// Accumulate elapsed time, clamped to `[0, duration]`
    pub fn advance(&mut self, dt: f64) {
        let limit = self.duration_s as f64;
        self.position = (self.position + dt.max(0.0)).min(limit);
    }

    /// Time the segment is due to finish (`None` before it starts)
    pub fn end_time(&self) -> Option<f64> {
        self.start_time.map(|start| start + self.duration_s as f64)
    }

    /// Cap `position` at the time elapsed since the segment started
    pub fn clamp_to(&mut self, now: f64) {
        if let Some(start) = self.start_time {
            self.position = self.position.min((now - start).max(0.0));
        }
    }

    /// Normalized progress `position / duration` (1.0 for zero duration)
    pub fn progress(&self) -> f32 {
        if self.duration_s == 0 {
            1.0
        } else {
            (self.position / self.duration_s as f64) as f32
        }
    }

    /// Temperature at the current position when starting from `from`
    pub fn interpolate(&self, from: f32) -> f32 {
        if !self.method.interpolates() {
            return self.target;
        }
        from + (self.target - from) * self.method.ease(self.progress())
    }
}
