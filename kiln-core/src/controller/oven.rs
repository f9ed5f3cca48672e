//! Oven controller
//!
//! Owns the program, the heater handle and the periodic tick. All
//! operations are synchronous; the tick is driven by whoever owns the
//! [`Reactor`] and calls [`OvenController::tick`] at the armed wake time.

use core::fmt;

use crate::calibration::{
    CalibrationError, CalibrationPhase, CalibrationSettings, RateCalibrator,
};
use crate::config::{OvenConfig, RateCalibration};
use crate::program::{check_rate, parse_program, write_program, EasingKind, Program};
use crate::safety::{RateMonitor, SafetyStatus, TargetTrend};
use crate::state::{ErrorKind, Event, OvenState};
use crate::traits::{
    CalibrationStore, DeviceError, Heater, HeaterStatus, PersistenceError, Reactor, NEVER,
};

use super::error::{OvenError, ParameterError};

/// Snapshot of the controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OvenStatus {
    pub state: OvenState,
    /// Both rates measured
    pub calibrated: bool,
    pub heat_rate: f32,
    pub cool_rate: f32,
    /// Heater snapshot, `None` if the read failed
    pub heater: Option<HeaterStatus>,
    /// Active segment while running
    pub segment_index: Option<usize>,
    pub segment_count: usize,
    /// Target of the active segment while running
    pub segment_target: Option<f32>,
    /// Phase of the current or last calibration
    pub calibration: Option<CalibrationPhase>,
    /// Armed wake time ([`NEVER`] when disarmed)
    pub next_wake: f64,
}

/// Temperature program controller for a single heater
pub struct OvenController<H, R, S> {
    heater: H,
    reactor: R,
    store: S,
    config: OvenConfig,
    program: Program,
    rates: RateCalibration,
    state: OvenState,
    /// Last target sent to the heater
    prev_target: f32,
    monitor: RateMonitor,
    calibrator: Option<RateCalibrator>,
    next_wake: f64,
}

impl<H: Heater, R: Reactor, S: CalibrationStore> OvenController<H, R, S> {
    /// Create a controller, loading stored rates
    ///
    /// A missing or unreadable calibration leaves the oven uncalibrated.
    pub fn new(heater: H, reactor: R, mut store: S, config: OvenConfig) -> Result<Self, OvenError> {
        config.validate()?;

        let rates = match store.load() {
            Ok(Some(rates)) if rates.is_valid() => {
                info!(
                    "loaded rates: heat {} C/s, cool {} C/s",
                    rates.heat_rate,
                    rates.cool_rate
                );
                rates
            }
            Ok(Some(_)) => {
                warn!("stored calibration has wrong format, ignoring");
                RateCalibration::uncalibrated()
            }
            Ok(None) => {
                debug!("no stored calibration");
                RateCalibration::uncalibrated()
            }
            Err(e) => {
                warn!("failed to load calibration: {}", e);
                RateCalibration::uncalibrated()
            }
        };

        Ok(Self {
            heater,
            reactor,
            store,
            config,
            program: Program::with_start_temp(config.ambient_temp_c),
            rates,
            state: OvenState::Idle,
            prev_target: 0.0,
            monitor: RateMonitor::new(config.rate_tolerance_c, config.max_device_errors),
            calibrator: None,
            next_wake: NEVER,
        })
    }

    pub fn state(&self) -> OvenState {
        self.state
    }

    pub fn config(&self) -> &OvenConfig {
        &self.config
    }

    pub fn rates(&self) -> &RateCalibration {
        &self.rates
    }

    /// Check if a program or calibration is in progress
    ///
    /// Hosts honoring `EXECUTE_PROGRAM WAIT=1` block until this is false.
    pub fn is_active(&self) -> bool {
        self.state.is_busy()
    }

    pub fn is_calibrated(&self) -> bool {
        self.rates.is_calibrated()
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// Last target sent to the heater
    pub fn prev_target(&self) -> f32 {
        self.prev_target
    }

    /// Armed wake time ([`NEVER`] when disarmed)
    pub fn next_wake(&self) -> f64 {
        self.next_wake
    }

    pub fn heater(&self) -> &H {
        &self.heater
    }

    pub fn heater_mut(&mut self) -> &mut H {
        &mut self.heater
    }

    pub fn reactor(&self) -> &R {
        &self.reactor
    }

    pub fn reactor_mut(&mut self) -> &mut R {
        &mut self.reactor
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Append a ramp (and optional hold) to the program
    ///
    /// When calibrated, the transition from the current last target must
    /// fit the measured rates. Uncalibrated programs are checked at
    /// [`execute`](Self::execute) instead.
    pub fn add_segment(
        &mut self,
        target: f32,
        ramp_time_s: u32,
        method: EasingKind,
        hold_time_s: u32,
    ) -> Result<(), OvenError> {
        self.ensure_idle()?;
        self.check_target(target)?;

        if self.rates.is_calibrated() {
            if let Err(rejection) = check_rate(
                self.program.last_target(),
                target,
                ramp_time_s,
                self.rates.heat_rate,
                self.rates.cool_rate,
            ) {
                warn!(
                    "segment rejected: needs {} C/s, have {} C/s",
                    rejection.requested,
                    rejection.available
                );
                return Err(rejection.into());
            }
        }

        self.program
            .add_segment(target, ramp_time_s, method, hold_time_s)?;
        info!(
            "segment added: {} C, ramp {} s, hold {} s",
            target,
            ramp_time_s,
            hold_time_s
        );
        Ok(())
    }

    /// Start the program from its first segment
    pub fn execute(&mut self) -> Result<(), OvenError> {
        self.ensure_alive()?;
        if self.state.is_fault() {
            return Err(OvenError::Faulted);
        }
        if self.state.is_busy() {
            return Err(OvenError::Busy);
        }
        if !self.rates.is_calibrated() {
            warn!("execute refused: oven not calibrated");
            return Err(OvenError::Uncalibrated);
        }
        if self.program.is_empty() {
            return Err(OvenError::EmptyProgram);
        }
        self.program
            .validate_rates(self.rates.heat_rate, self.rates.cool_rate)?;

        let now = self.reactor.monotonic();
        self.program.start(now);
        self.monitor.reset();
        self.prev_target = 0.0;
        self.state = self.state.transition(Event::Execute);
        self.arm(now);

        info!("executing program with {} segments", self.program.len());
        Ok(())
    }

    /// Stop whatever is running and switch the heater off
    ///
    /// Safe in any state; also acknowledges a fault.
    pub fn cancel(&mut self) -> Result<(), OvenError> {
        self.ensure_alive()?;

        self.disarm();
        if let Some(calibrator) = self.calibrator.as_mut() {
            calibrator.cancel();
        }
        if self.state.is_busy() {
            info!("oven program cancelled");
        }
        self.state = self.state.transition(Event::Cancel);
        self.prev_target = 0.0;
        self.heater.set_target(0.0)?;
        Ok(())
    }

    /// Cancel and discard the program
    pub fn clear(&mut self) -> Result<(), OvenError> {
        let cancelled = self.cancel();
        if !matches!(cancelled, Err(OvenError::Shutdown)) {
            self.program = Program::with_start_temp(self.config.ambient_temp_c);
            debug!("program cleared");
        }
        cancelled
    }

    /// Start a rate calibration
    ///
    /// `target` defaults to the heater limit minus the configured margin
    /// and must lie above the current temperature; `cool_window_s`
    /// defaults to the configured window.
    pub fn calibrate(
        &mut self,
        target: Option<f32>,
        cool_window_s: Option<u32>,
    ) -> Result<(), OvenError> {
        self.ensure_alive()?;
        if self.state.is_fault() {
            return Err(OvenError::Faulted);
        }
        if self.state.is_busy() {
            return Err(OvenError::Busy);
        }

        let max_temp = self.heater.max_temp();
        let target = target.unwrap_or(max_temp - self.config.calibration.margin_c);
        let cool_window_s = cool_window_s.unwrap_or(self.config.calibration.cool_window_s);
        if cool_window_s == 0 {
            return Err(ParameterError::CoolWindow.into());
        }

        let now = self.reactor.monotonic();
        let (current, _) = self.heater.get_temperature(now)?;
        if !(target.is_finite() && target > current && target <= max_temp) {
            return Err(ParameterError::TargetOutOfRange.into());
        }

        let mut calibrator = RateCalibrator::new(CalibrationSettings {
            target_c: target,
            settle_time_s: self.config.calibration.settle_time_s,
            cool_window_s,
            heat_timeout_s: self.config.calibration.heat_timeout_s,
        });
        let heater_target = calibrator.start(now, current);
        self.heater.set_target(heater_target)?;

        self.prev_target = heater_target;
        self.calibrator = Some(calibrator);
        self.monitor.reset();
        self.state = self.state.transition(Event::StartCalibration);
        self.arm(now);
        Ok(())
    }

    /// Stop everything for good
    pub fn shutdown(&mut self) -> Result<(), OvenError> {
        self.disarm();
        if let Some(calibrator) = self.calibrator.as_mut() {
            calibrator.cancel();
        }
        self.prev_target = 0.0;
        self.state = self.state.transition(Event::Shutdown);
        info!("oven controller shut down");
        self.heater.set_target(0.0)?;
        Ok(())
    }

    /// Periodic tick
    ///
    /// Returns the next wake time ([`NEVER`] when nothing is left to do).
    pub fn tick(&mut self, now: f64) -> Result<f64, OvenError> {
        match self.state {
            OvenState::Running => self.tick_program(now),
            OvenState::Calibrating => self.tick_calibration(now),
            _ => Ok(self.disarm()),
        }
    }

    fn tick_program(&mut self, now: f64) -> Result<f64, OvenError> {
        let (temp, _) = match self.heater.get_temperature(now) {
            Ok(reading) => reading,
            Err(e) => return self.device_error(now, e),
        };

        if self.program.is_done() {
            info!("program finished");
            self.state = self.state.transition(Event::ProgramFinished);
            self.prev_target = 0.0;
            self.disarm();
            self.heater.set_target(0.0)?;
            return Ok(NEVER);
        }

        let trend = TargetTrend::between(
            self.program.current_origin(),
            self.program.current_target(),
        );
        let status = self.monitor.check(
            now,
            temp,
            trend,
            self.rates.heat_rate,
            self.rates.cool_rate,
        );
        if let SafetyStatus::Fault(violation) = status {
            error!(
                "rate violation: {} C outside [{}, {}]",
                violation.observed,
                violation.min,
                violation.max
            );
            self.fail_safe(ErrorKind::RateViolation);
            return Err(violation.into());
        }

        let target = self.program.get_step(now);
        if target != self.prev_target {
            if let Err(e) = self.heater.set_target(target) {
                return self.device_error(now, e);
            }
            self.prev_target = target;
        }

        Ok(self.arm(now + self.config.tick_interval_s))
    }

    fn tick_calibration(&mut self, now: f64) -> Result<f64, OvenError> {
        let (temp, _) = match self.heater.get_temperature(now) {
            Ok(reading) => reading,
            Err(e) => return self.device_error(now, e),
        };
        self.monitor.clear_device_errors();

        let Some(calibrator) = self.calibrator.as_mut() else {
            self.state = self.state.transition(Event::CalibrationFailed);
            return Ok(self.disarm());
        };
        let command = calibrator.update(now, temp);
        let phase = calibrator.phase();
        let result = calibrator.result();

        if let Some(target) = command {
            if let Err(e) = self.heater.set_target(target) {
                return self.device_error(now, e);
            }
            self.prev_target = target;
        }

        match phase {
            CalibrationPhase::Complete => {
                let saved = match result {
                    Some(rates) => {
                        info!(
                            "calibration complete: heat {} C/s, cool {} C/s",
                            rates.heat_rate,
                            rates.cool_rate
                        );
                        self.rates = rates;
                        self.store.save(&rates)
                    }
                    None => Ok(()),
                };
                self.finish_calibration(Event::CalibrationComplete)?;
                saved?;
                Ok(NEVER)
            }
            CalibrationPhase::Failed(err) => {
                self.finish_calibration(Event::CalibrationFailed)?;
                Err(err.into())
            }
            _ => Ok(self.arm(now + self.config.tick_interval_s)),
        }
    }

    fn finish_calibration(&mut self, event: Event) -> Result<(), OvenError> {
        self.state = self.state.transition(event);
        self.disarm();
        if self.prev_target != 0.0 {
            self.prev_target = 0.0;
            self.heater.set_target(0.0)?;
        }
        Ok(())
    }

    /// Count a failed heater access, failing safe at the limit
    fn device_error(&mut self, now: f64, err: DeviceError) -> Result<f64, OvenError> {
        warn!("heater error: {}", err);
        if self.monitor.record_device_error() {
            error!(
                "heater failed {} times in a row, failing safe",
                self.monitor.device_errors()
            );
            self.fail_safe(ErrorKind::DeviceFault);
        } else {
            self.arm(now + self.config.tick_interval_s);
        }
        Err(err.into())
    }

    /// Abort: disarm, heater off, enter the fault state
    fn fail_safe(&mut self, kind: ErrorKind) {
        self.disarm();
        if let Some(calibrator) = self.calibrator.as_mut() {
            if !calibrator.is_finished() {
                calibrator.fail(CalibrationError::SensorFault);
            }
        }
        self.prev_target = 0.0;
        self.state = self.state.transition(Event::FaultDetected(kind));
        if let Err(e) = self.heater.set_target(0.0) {
            error!("could not switch heater off: {}", e);
        }
    }

    /// Replace the program with one parsed from a program file
    ///
    /// Nothing changes unless every line parses and every segment is
    /// acceptable.
    pub fn load_program(&mut self, text: &str) -> Result<(), OvenError> {
        self.ensure_idle()?;

        let mut program = parse_program(text)?;
        program.set_start_temp(self.config.ambient_temp_c);
        for record in program.records() {
            self.check_target(record.target)?;
        }
        if self.rates.is_calibrated() {
            program.validate_rates(self.rates.heat_rate, self.rates.cool_rate)?;
        }

        info!("loaded program with {} segments", program.len());
        self.program = program;
        Ok(())
    }

    /// Write the program in program file format
    pub fn write_program<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        write_program(&self.program, out)
    }

    /// Install rates, e.g. restored from another store
    pub fn set_calibration(&mut self, rates: RateCalibration) -> Result<(), OvenError> {
        self.ensure_idle()?;
        if !rates.is_valid() {
            return Err(PersistenceError::InvalidFormat.into());
        }
        self.rates = rates;
        Ok(())
    }

    /// Snapshot for reporting
    pub fn status(&mut self, now: f64) -> OvenStatus {
        let running = self.state == OvenState::Running && !self.program.is_done();
        OvenStatus {
            state: self.state,
            calibrated: self.rates.is_calibrated(),
            heat_rate: self.rates.heat_rate,
            cool_rate: self.rates.cool_rate,
            heater: self.heater.get_status(now).ok(),
            segment_index: running.then(|| self.program.cursor()),
            segment_count: self.program.len(),
            segment_target: running.then(|| self.program.current_target()),
            calibration: self.calibrator.as_ref().map(RateCalibrator::phase),
            next_wake: self.next_wake,
        }
    }

    fn ensure_alive(&self) -> Result<(), OvenError> {
        if self.state == OvenState::Shutdown {
            return Err(OvenError::Shutdown);
        }
        Ok(())
    }

    fn ensure_idle(&self) -> Result<(), OvenError> {
        self.ensure_alive()?;
        if self.state.is_busy() {
            return Err(OvenError::Busy);
        }
        Ok(())
    }

    fn check_target(&self, target: f32) -> Result<(), OvenError> {
        if !(target.is_finite() && target >= 0.0 && target <= self.heater.max_temp()) {
            return Err(ParameterError::TargetOutOfRange.into());
        }
        Ok(())
    }

    fn arm(&mut self, waketime: f64) -> f64 {
        self.next_wake = waketime;
        self.reactor.update_timer(waketime);
        waketime
    }

    fn disarm(&mut self) -> f64 {
        self.arm(NEVER)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::mock::{FakeHeater, FakeReactor, MemoryStore};

    type Oven = OvenController<FakeHeater, FakeReactor, MemoryStore>;

    fn oven(heat_rate: f32, cool_rate: f32) -> Oven {
        let store = MemoryStore::with(RateCalibration::new(heat_rate, cool_rate));
        OvenController::new(
            FakeHeater::new(25.0, 280.0),
            FakeReactor::new(),
            store,
            OvenConfig::default(),
        )
        .unwrap()
    }

    fn uncalibrated() -> Oven {
        OvenController::new(
            FakeHeater::new(25.0, 280.0),
            FakeReactor::new(),
            MemoryStore::default(),
            OvenConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_loads_rates_from_store() {
        let oven = oven(2.0, 1.0);
        assert!(oven.is_calibrated());
        assert_eq!(oven.rates().heat_rate, 2.0);
        assert!(!uncalibrated().is_calibrated());
    }

    #[test]
    fn test_corrupt_store_leaves_uncalibrated() {
        let mut rates = RateCalibration::new(2.0, 1.0);
        rates.magic = 0;
        let oven = OvenController::new(
            FakeHeater::new(25.0, 280.0),
            FakeReactor::new(),
            MemoryStore::with(rates),
            OvenConfig::default(),
        )
        .unwrap();
        assert!(!oven.is_calibrated());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = OvenConfig::default();
        config.tick_interval_s = 0.0;
        let result = OvenController::new(
            FakeHeater::new(25.0, 280.0),
            FakeReactor::new(),
            MemoryStore::default(),
            config,
        );
        assert!(matches!(result, Err(OvenError::Config(_))));
    }

    #[test]
    fn test_scenario_ramp_and_hold() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();
        oven.execute().unwrap();
        assert_eq!(oven.state(), OvenState::Running);
        assert_eq!(oven.reactor().waketime, 0.0);

        let expected = [
            (0.0, 25.0),
            (15.0, 43.75),
            (30.0, 62.5),
            (45.0, 81.25),
            (60.0, 100.0),
            (75.0, 100.0),
            (90.0, 100.0),
        ];
        for (now, temp) in expected {
            let wake = oven.tick(now).unwrap();
            assert_eq!(wake, now + 1.0);
            let target = oven.heater().target;
            assert!((target - temp).abs() < 1e-3, "t={} got {}", now, target);
        }

        assert_eq!(oven.tick(91.0), Ok(NEVER));
        assert_eq!(oven.heater().target, 0.0);
        assert_eq!(oven.state(), OvenState::Complete);
        assert_eq!(oven.reactor().waketime, NEVER);
    }

    #[test]
    fn test_heater_only_commanded_on_change() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();
        oven.execute().unwrap();

        oven.tick(0.0).unwrap();
        oven.tick(60.0).unwrap();
        let writes = oven.heater().writes;
        oven.tick(75.0).unwrap();
        oven.tick(80.0).unwrap();
        assert_eq!(oven.heater().writes, writes);
    }

    #[test]
    fn test_execute_uncalibrated() {
        let mut oven = uncalibrated();
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        assert_eq!(oven.execute(), Err(OvenError::Uncalibrated));
        assert_eq!(oven.state(), OvenState::Idle);
        assert_eq!(oven.next_wake(), NEVER);
    }

    #[test]
    fn test_execute_empty() {
        let mut oven = oven(2.0, 1.0);
        assert_eq!(oven.execute(), Err(OvenError::EmptyProgram));
    }

    #[test]
    fn test_add_segment_rate_rejected() {
        let mut oven = oven(1.0, 1.0);
        let err = oven.add_segment(200.0, 1, EasingKind::Linear, 0);
        assert!(matches!(err, Err(OvenError::RateRejected(_))));
        assert!(oven.program().is_empty());
    }

    #[test]
    fn test_add_segment_cooling_rejected() {
        let mut oven = oven(10.0, 0.5);
        oven.add_segment(200.0, 60, EasingKind::Linear, 0).unwrap();
        assert!(matches!(
            oven.add_segment(100.0, 60, EasingKind::Linear, 0),
            Err(OvenError::RateRejected(_))
        ));
        oven.add_segment(100.0, 200, EasingKind::Linear, 0).unwrap();
    }

    #[test]
    fn test_uncalibrated_segments_checked_at_execute() {
        let mut oven = uncalibrated();
        oven.add_segment(200.0, 1, EasingKind::Linear, 0).unwrap();
        oven.set_calibration(RateCalibration::new(1.0, 1.0)).unwrap();
        assert!(matches!(oven.execute(), Err(OvenError::RateRejected(_))));
        assert_eq!(oven.state(), OvenState::Idle);
    }

    #[test]
    fn test_target_limits() {
        let mut oven = oven(10.0, 10.0);
        let out_of_range = Err(OvenError::InvalidParameter(ParameterError::TargetOutOfRange));
        assert_eq!(oven.add_segment(300.0, 600, EasingKind::Linear, 0), out_of_range);
        assert_eq!(oven.add_segment(-1.0, 600, EasingKind::Linear, 0), out_of_range);
        assert_eq!(oven.add_segment(f32::NAN, 600, EasingKind::Linear, 0), out_of_range);
    }

    #[test]
    fn test_add_segment_while_running_is_busy() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        assert_eq!(
            oven.add_segment(120.0, 60, EasingKind::Linear, 0),
            Err(OvenError::Busy)
        );
        assert_eq!(oven.execute(), Err(OvenError::Busy));
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.tick(0.0).unwrap();
        oven.tick(30.0).unwrap();

        oven.cancel().unwrap();
        assert_eq!(oven.state(), OvenState::Idle);
        assert_eq!(oven.heater().target, 0.0);
        assert_eq!(oven.next_wake(), NEVER);
        oven.cancel().unwrap();
        assert_eq!(oven.state(), OvenState::Idle);

        // Program is kept and can run again
        assert_eq!(oven.program().len(), 1);
        oven.execute().unwrap();
    }

    #[test]
    fn test_clear_discards_program() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.clear().unwrap();
        assert!(oven.program().is_empty());
        assert_eq!(oven.state(), OvenState::Idle);
        oven.clear().unwrap();
    }

    #[test]
    fn test_rate_violation_aborts() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.tick(0.0).unwrap();

        // Runaway heater: 25 -> 80 in one second
        oven.heater_mut().override_temp = Some(80.0);
        let err = oven.tick(1.0);
        assert!(matches!(err, Err(OvenError::RateViolation(_))));
        assert_eq!(oven.state(), OvenState::Fault(ErrorKind::RateViolation));
        assert_eq!(oven.heater().target, 0.0);
        assert_eq!(oven.next_wake(), NEVER);

        // Fault must be acknowledged
        assert_eq!(oven.execute(), Err(OvenError::Faulted));
        oven.cancel().unwrap();
        assert_eq!(oven.state(), OvenState::Idle);
    }

    #[test]
    fn test_device_errors_fail_safe_after_limit() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.tick(0.0).unwrap();

        oven.heater_mut().fail_reads = true;
        assert!(matches!(oven.tick(1.0), Err(OvenError::Device(_))));
        assert_eq!(oven.state(), OvenState::Running);
        assert_eq!(oven.next_wake(), 2.0);
        assert!(matches!(oven.tick(2.0), Err(OvenError::Device(_))));
        assert!(matches!(oven.tick(3.0), Err(OvenError::Device(_))));
        assert_eq!(oven.state(), OvenState::Fault(ErrorKind::DeviceFault));
        assert_eq!(oven.next_wake(), NEVER);
        assert_eq!(oven.heater().target, 0.0);
    }

    #[test]
    fn test_single_device_error_recovers() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.tick(0.0).unwrap();

        oven.heater_mut().fail_reads = true;
        assert!(oven.tick(1.0).is_err());
        oven.heater_mut().fail_reads = false;
        assert_eq!(oven.tick(2.0), Ok(3.0));
        assert_eq!(oven.state(), OvenState::Running);
    }

    #[test]
    fn test_calibration_runs_on_tick() {
        let mut config = OvenConfig::default();
        config.calibration.settle_time_s = 2;
        let mut oven = OvenController::new(
            FakeHeater::new(25.0, 280.0),
            FakeReactor::new(),
            MemoryStore::default(),
            config,
        )
        .unwrap();

        oven.calibrate(Some(100.0), Some(10)).unwrap();
        assert_eq!(oven.state(), OvenState::Calibrating);
        assert_eq!(oven.heater().target, 100.0);
        assert_eq!(oven.execute(), Err(OvenError::Busy));

        // Heats 25 -> 100 in 15 s
        oven.heater_mut().override_temp = Some(100.0);
        assert_eq!(oven.tick(15.0), Ok(16.0));
        // Held at the target while settling
        assert_eq!(oven.heater().target, 100.0);

        oven.tick(17.0).unwrap();
        assert_eq!(oven.heater().target, 0.0);
        oven.heater_mut().override_temp = Some(90.0);
        assert_eq!(oven.tick(27.0), Ok(NEVER));

        assert_eq!(oven.state(), OvenState::Idle);
        assert_eq!(oven.status(27.0).calibration, Some(CalibrationPhase::Complete));
        assert!(oven.is_calibrated());
        assert_eq!(oven.rates().heat_rate, 5.0);
        assert_eq!(oven.rates().cool_rate, 1.0);
        assert_eq!(oven.store().saved, Some(*oven.rates()));
    }

    #[test]
    fn test_calibration_target_validation() {
        let mut oven = uncalibrated();
        assert_eq!(
            oven.calibrate(Some(20.0), None),
            Err(OvenError::InvalidParameter(ParameterError::TargetOutOfRange))
        );
        assert_eq!(
            oven.calibrate(Some(300.0), None),
            Err(OvenError::InvalidParameter(ParameterError::TargetOutOfRange))
        );
        assert_eq!(
            oven.calibrate(None, Some(0)),
            Err(OvenError::InvalidParameter(ParameterError::CoolWindow))
        );
        oven.calibrate(None, None).unwrap();
        assert_eq!(oven.heater().target, 260.0);
    }

    #[test]
    fn test_cancel_calibration() {
        let mut oven = uncalibrated();
        oven.calibrate(None, None).unwrap();
        oven.cancel().unwrap();
        assert_eq!(oven.state(), OvenState::Idle);
        assert_eq!(oven.heater().target, 0.0);
        assert!(!oven.is_calibrated());
        assert_eq!(
            oven.status(0.0).calibration,
            Some(CalibrationPhase::Failed(CalibrationError::Cancelled))
        );
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 0).unwrap();
        oven.execute().unwrap();
        oven.tick(0.0).unwrap();

        oven.shutdown().unwrap();
        assert_eq!(oven.state(), OvenState::Shutdown);
        assert_eq!(oven.heater().target, 0.0);
        assert_eq!(oven.next_wake(), NEVER);

        assert_eq!(oven.cancel(), Err(OvenError::Shutdown));
        assert_eq!(oven.clear(), Err(OvenError::Shutdown));
        assert_eq!(oven.execute(), Err(OvenError::Shutdown));
        assert_eq!(
            oven.add_segment(50.0, 60, EasingKind::Linear, 0),
            Err(OvenError::Shutdown)
        );
        assert_eq!(oven.tick(5.0), Ok(NEVER));
    }

    #[test]
    fn test_load_program_is_atomic() {
        let mut oven = oven(1.0, 1.0);
        oven.add_segment(50.0, 60, EasingKind::Linear, 0).unwrap();

        let err = oven.load_program("100:600:30:1\n150:60:0:x\n");
        assert!(matches!(
            err,
            Err(OvenError::Persistence(PersistenceError::Malformed(_)))
        ));
        assert_eq!(oven.program().len(), 1);

        // Parses, but too fast for 1 C/s
        let err = oven.load_program("200:10:0:1\n");
        assert!(matches!(err, Err(OvenError::RateRejected(_))));
        assert_eq!(oven.program().len(), 1);

        oven.load_program("100:600:30:1\n150:60:0:4\n").unwrap();
        assert_eq!(oven.program().len(), 3);
    }

    #[test]
    fn test_write_program() {
        let mut oven = oven(10.0, 10.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();
        let mut out = std::string::String::new();
        oven.write_program(&mut out).unwrap();
        assert_eq!(out, "100:60:30:1\n");
    }

    #[test]
    fn test_status_while_running() {
        let mut oven = oven(2.0, 1.0);
        oven.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();

        let idle = oven.status(0.0);
        assert_eq!(idle.state, OvenState::Idle);
        assert!(idle.calibrated);
        assert_eq!(idle.segment_index, None);
        assert_eq!(idle.segment_count, 2);

        oven.execute().unwrap();
        oven.tick(0.0).unwrap();
        oven.tick(60.0).unwrap();
        let running = oven.status(60.0);
        assert_eq!(running.segment_index, Some(1));
        assert_eq!(running.segment_target, Some(100.0));
        assert_eq!(running.next_wake, 61.0);
        assert_eq!(running.heater.map(|h| h.max_temp), Some(280.0));
    }
}
