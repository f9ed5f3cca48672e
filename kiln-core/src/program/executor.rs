//! Program execution
//!
//! A program is an ordered list of segments with a cursor pointing at the
//! active one. Each tick the controller asks the program for the
//! instantaneous target with [`Program::get_step`]; the program advances
//! over finished segments and interpolates inside the active one.

use heapless::Vec;

use super::easing::EasingKind;
use super::segment::{Segment, SegmentKind};

/// Maximum segments per program (each `add_segment` uses one or two)
pub const MAX_SEGMENTS: usize = 64;

/// Temperature an empty program reports, and the default starting point
pub const AMBIENT_TEMP_C: f32 = 25.0;

/// The program has no room for another ramp/hold pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramFull;

/// A segment transition that the oven cannot physically achieve
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RateRejection {
    /// Rate the segment asks for (°C/s)
    pub requested: f32,
    /// Calibrated rate in the same direction (°C/s)
    pub available: f32,
}

/// Check that moving from `from` to `to` within `ramp_time_s` fits the
/// calibrated rates
pub fn check_rate(
    from: f32,
    to: f32,
    ramp_time_s: u32,
    heat_rate: f32,
    cool_rate: f32,
) -> Result<(), RateRejection> {
    let delta = to - from;
    let distance = libm::fabsf(delta);
    let ramp = ramp_time_s as f32;

    let available = if delta > 0.0 {
        heat_rate
    } else if delta < 0.0 {
        cool_rate
    } else {
        return Ok(());
    };

    if ramp * available < distance {
        return Err(RateRejection {
            requested: distance / ramp,
            available,
        });
    }
    Ok(())
}

/// One `add_segment` call as stored in program files
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SegmentRecord {
    pub target: f32,
    pub ramp_time_s: u32,
    pub hold_time_s: u32,
    pub method: EasingKind,
}

/// Iterator over the structural ramp/hold pairs of a program
pub struct Records<'a> {
    segments: &'a [Segment],
    index: usize,
}

impl<'a> Iterator for Records<'a> {
    type Item = SegmentRecord;

    fn next(&mut self) -> Option<Self::Item> {
        let ramp = self.segments.get(self.index)?;
        self.index += 1;

        let hold_time_s = match self.segments.get(self.index) {
            Some(next) if next.kind() == SegmentKind::Hold => {
                self.index += 1;
                next.duration_s()
            }
            _ => 0,
        };

        Some(SegmentRecord {
            target: ramp.target(),
            ramp_time_s: ramp.duration_s(),
            hold_time_s,
            method: ramp.method(),
        })
    }
}

/// Temperature program
#[derive(Debug, Clone)]
pub struct Program {
    segments: Vec<Segment, MAX_SEGMENTS>,
    /// Index of the active segment; `len` means finished
    cursor: usize,
    /// Time of the previous `get_step`
    prev_time: f64,
    /// Temperature the active segment interpolates from
    prev_temp: f32,
    /// Temperature the first segment starts from
    start_temp: f32,
}

impl Default for Program {
    fn default() -> Self {
        Self::new()
    }
}

impl Program {
    /// Create an empty program starting from ambient
    pub const fn new() -> Self {
        Self::with_start_temp(AMBIENT_TEMP_C)
    }

    /// Create an empty program with a custom starting temperature
    pub const fn with_start_temp(start_temp: f32) -> Self {
        Self {
            segments: Vec::new(),
            cursor: 0,
            prev_time: 0.0,
            prev_temp: start_temp,
            start_temp,
        }
    }

    pub fn set_start_temp(&mut self, start_temp: f32) {
        self.start_temp = start_temp;
    }

    pub fn start_temp(&self) -> f32 {
        self.start_temp
    }

    /// Append a ramp and, when `hold_time_s > 0`, a hold at the same target
    ///
    /// Either both segments are added or neither.
    pub fn add_segment(
        &mut self,
        target: f32,
        ramp_time_s: u32,
        method: EasingKind,
        hold_time_s: u32,
    ) -> Result<(), ProgramFull> {
        let needed = if hold_time_s > 0 { 2 } else { 1 };
        if self.segments.capacity() - self.segments.len() < needed {
            return Err(ProgramFull);
        }

        self.segments
            .push(Segment::ramp(target, ramp_time_s, method))
            .map_err(|_| ProgramFull)?;
        if hold_time_s > 0 {
            self.segments
                .push(Segment::hold(target, hold_time_s))
                .map_err(|_| ProgramFull)?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Check if every segment has completed
    pub fn is_done(&self) -> bool {
        self.cursor >= self.segments.len()
    }

    /// Number of execution segments (holds included)
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments.get(self.cursor)
    }

    /// Target of the final segment, or the start temperature if empty
    pub fn last_target(&self) -> f32 {
        self.segments
            .last()
            .map(Segment::target)
            .unwrap_or(self.start_temp)
    }

    /// Target of the active segment, or the last target when done
    pub fn current_target(&self) -> f32 {
        self.current_segment()
            .map(Segment::target)
            .unwrap_or_else(|| self.last_target())
    }

    /// Temperature the active segment started from
    pub fn current_origin(&self) -> f32 {
        self.prev_temp
    }

    /// Structural ramp/hold pairs in insertion order
    pub fn records(&self) -> Records<'_> {
        Records {
            segments: &self.segments,
            index: 0,
        }
    }

    /// Check every transition against the calibrated rates
    pub fn validate_rates(&self, heat_rate: f32, cool_rate: f32) -> Result<(), RateRejection> {
        let mut from = self.start_temp;
        for record in self.records() {
            check_rate(from, record.target, record.ramp_time_s, heat_rate, cool_rate)?;
            from = record.target;
        }
        Ok(())
    }

    /// Rewind to the first segment without arming it
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.prev_temp = self.start_temp;
        for segment in self.segments.iter_mut() {
            segment.reset();
        }
    }

    /// Rewind and arm the first segment at `now`
    pub fn start(&mut self, now: f64) {
        self.reset();
        self.prev_time = now;
        if let Some(first) = self.segments.first_mut() {
            first.start(now);
        }
    }

    /// Compute the target temperature at `now`
    ///
    /// Finished segments are skipped first. The next segment starts from
    /// the previous target at the time the previous segment was due to end,
    /// so a late tick never credits it with time it was not active.
    pub fn get_step(&mut self, now: f64) -> f32 {
        while let Some(segment) = self.segments.get(self.cursor) {
            if !segment.is_done(now) {
                break;
            }
            let boundary = segment.end_time().unwrap_or(now);
            self.prev_temp = segment.target();
            self.cursor += 1;
            if let Some(next) = self.segments.get_mut(self.cursor) {
                next.start(boundary);
                debug!("segment {} active, target {}", self.cursor, next.target());
            }
        }

        let dt = now - self.prev_time;
        self.prev_time = now;

        let prev_temp = self.prev_temp;
        match self.segments.get_mut(self.cursor) {
            Some(segment) => {
                if segment.method().interpolates() {
                    segment.advance(dt);
                    segment.clamp_to(now);
                }
                segment.interpolate(prev_temp)
            }
            None => self.last_target(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn test_add_segment_pairs_ramp_and_hold() {
        let mut program = Program::new();
        program
            .add_segment(100.0, 60, EasingKind::Linear, 30)
            .unwrap();

        assert_eq!(program.len(), 2);
        assert_eq!(
            program.segments()[0],
            Segment::ramp(100.0, 60, EasingKind::Linear)
        );
        assert_eq!(program.segments()[1], Segment::hold(100.0, 30));
    }

    #[test]
    fn test_add_segment_without_hold() {
        let mut program = Program::new();
        program.add_segment(80.0, 10, EasingKind::QuadIn, 0).unwrap();
        assert_eq!(program.len(), 1);
        assert_eq!(program.segments()[0].kind(), SegmentKind::Ramp);
    }

    #[test]
    fn test_add_segment_is_atomic_when_full() {
        let mut program = Program::new();
        for _ in 0..MAX_SEGMENTS - 1 {
            program.add_segment(50.0, 10, EasingKind::Linear, 0).unwrap();
        }
        // One slot left, a pair does not fit
        assert_eq!(
            program.add_segment(60.0, 10, EasingKind::Linear, 5),
            Err(ProgramFull)
        );
        assert_eq!(program.len(), MAX_SEGMENTS - 1);

        program.add_segment(60.0, 10, EasingKind::Linear, 0).unwrap();
        assert_eq!(program.len(), MAX_SEGMENTS);
    }

    #[test]
    fn test_empty_program() {
        let mut program = Program::new();
        assert!(program.is_empty());
        assert!(program.is_done());
        assert_eq!(program.current_target(), AMBIENT_TEMP_C);
        assert_eq!(program.get_step(10.0), AMBIENT_TEMP_C);
    }

    #[test]
    fn test_ramp_then_hold_scenario() {
        let mut program = Program::new();
        program
            .add_segment(100.0, 60, EasingKind::Linear, 30)
            .unwrap();
        program.start(0.0);

        let expected = [
            (0.0, 25.0),
            (15.0, 43.75),
            (30.0, 62.5),
            (45.0, 81.25),
            (60.0, 100.0),
            (75.0, 100.0),
        ];
        for (now, temp) in expected {
            assert!(!program.is_done(), "done early at {}", now);
            let step = program.get_step(now);
            assert!(close(step, temp), "t={} got {} want {}", now, step, temp);
        }

        assert_eq!(program.get_step(90.0), 100.0);
        assert!(program.is_done());
        assert_eq!(program.current_target(), 100.0);
    }

    #[test]
    fn test_boundary_tick_starts_next_segment_from_previous_target() {
        let mut program = Program::new();
        program.add_segment(100.0, 10, EasingKind::Linear, 0).unwrap();
        program.add_segment(50.0, 10, EasingKind::Linear, 0).unwrap();
        program.start(0.0);

        assert!(close(program.get_step(5.0), 62.5));
        // The first ramp completes at t=10; the second starts there from 100
        assert!(close(program.get_step(10.0), 100.0));
        assert_eq!(program.cursor(), 1);
        assert!(close(program.get_step(15.0), 75.0));
        assert_eq!(program.get_step(20.0), 50.0);
        assert!(program.is_done());
    }

    #[test]
    fn test_late_tick_does_not_run_next_segment_ahead() {
        let mut late = Program::new();
        late.add_segment(100.0, 10, EasingKind::Linear, 0).unwrap();
        late.add_segment(50.0, 10, EasingKind::Linear, 0).unwrap();
        late.start(0.0);
        // Skipped every tick up to t=12: 2 s into the second ramp
        assert!(close(late.get_step(12.0), 90.0));
        assert_eq!(late.segments()[1].start_time(), Some(10.0));

        let mut regular = late.clone();
        regular.start(0.0);
        for now in [5.0, 10.0] {
            regular.get_step(now);
        }
        assert!(close(regular.get_step(12.0), 90.0));
    }

    #[test]
    fn test_none_method_holds_target_immediately() {
        let mut program = Program::new();
        program.add_segment(150.0, 30, EasingKind::None, 0).unwrap();
        program.start(0.0);
        assert_eq!(program.get_step(0.0), 150.0);
        assert_eq!(program.get_step(10.0), 150.0);
    }

    #[test]
    fn test_zero_duration_segments_are_skipped() {
        let mut program = Program::new();
        program.add_segment(40.0, 0, EasingKind::Linear, 0).unwrap();
        program.add_segment(60.0, 20, EasingKind::Linear, 0).unwrap();
        program.start(0.0);

        assert!(close(program.get_step(0.0), 40.0));
        assert_eq!(program.cursor(), 1);
        assert!(close(program.get_step(10.0), 50.0));
    }

    #[test]
    fn test_restart_rewinds() {
        let mut program = Program::new();
        program.add_segment(100.0, 10, EasingKind::Linear, 0).unwrap();
        program.start(0.0);
        program.get_step(20.0);
        assert!(program.is_done());

        program.start(100.0);
        assert!(!program.is_done());
        assert!(close(program.get_step(105.0), 62.5));
    }

    #[test]
    fn test_reset_does_not_arm() {
        let mut program = Program::new();
        program.add_segment(100.0, 10, EasingKind::Linear, 0).unwrap();
        program.reset();
        assert_eq!(program.cursor(), 0);
        assert_eq!(program.segments()[0].start_time(), None);
    }

    #[test]
    fn test_records_regroup_pairs() {
        let mut program = Program::new();
        program.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();
        program.add_segment(200.0, 120, EasingKind::SineIn, 0).unwrap();
        program.add_segment(50.0, 300, EasingKind::None, 10).unwrap();

        let records: std::vec::Vec<_> = program.records().collect();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].hold_time_s, 30);
        assert_eq!(records[1].hold_time_s, 0);
        assert_eq!(records[1].method, EasingKind::SineIn);
        assert_eq!(records[2].method, EasingKind::None);
        assert_eq!(records[2].hold_time_s, 10);
    }

    #[test]
    fn test_check_rate() {
        // 175 °C in 1 s with 1 °C/s available
        assert_eq!(
            check_rate(25.0, 200.0, 1, 1.0, 1.0),
            Err(RateRejection {
                requested: 175.0,
                available: 1.0
            })
        );
        assert!(check_rate(25.0, 200.0, 175, 1.0, 1.0).is_ok());
        assert!(check_rate(200.0, 100.0, 10, 1.0, 20.0).is_ok());
        assert!(check_rate(200.0, 100.0, 10, 20.0, 1.0).is_err());
        assert!(check_rate(100.0, 100.0, 0, 0.0, 0.0).is_ok());
    }

    #[test]
    fn test_validate_rates_walks_from_start() {
        let mut program = Program::new();
        program.add_segment(100.0, 75, EasingKind::Linear, 30).unwrap();
        program.add_segment(40.0, 60, EasingKind::Linear, 0).unwrap();

        assert!(program.validate_rates(1.0, 1.0).is_ok());
        assert!(program.validate_rates(0.5, 1.0).is_err());
        assert!(program.validate_rates(1.0, 0.5).is_err());
    }
}
