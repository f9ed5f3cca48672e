//! Command dispatch
//!
//! Maps parsed [`OvenCommand`]s onto controller operations and renders the
//! console reply.

use core::fmt;

use kiln_protocol::OvenCommand;

use crate::program::EasingKind;
use crate::traits::{CalibrationStore, Heater, Reactor};

use super::error::{OvenError, ParameterError};
use super::oven::OvenController;

/// Successful command outcome
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Response {
    SegmentAdded {
        temp: f32,
        ramp_time_s: u32,
        hold_time_s: u32,
        method: EasingKind,
    },
    /// Program started; with `wait` the host holds further commands until
    /// the controller is no longer active
    Executing { wait: bool },
    Cancelled,
    Cleared,
    CalibrationStarted { target: f32 },
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Response::SegmentAdded {
                temp,
                ramp_time_s,
                hold_time_s,
                method,
            } => {
                write!(
                    f,
                    "Segment added: Temp={}, Ramp={}s, Hold={}s",
                    temp, ramp_time_s, hold_time_s
                )?;
                if *method != EasingKind::Linear {
                    write!(f, ", Method={}", method.name())?;
                }
                Ok(())
            }
            Response::Executing { .. } => f.write_str("Executing oven program..."),
            Response::Cancelled => f.write_str("Oven program cancelled."),
            Response::Cleared => f.write_str("Oven program cleared."),
            Response::CalibrationStarted { target } => {
                write!(f, "Calibrating oven: heating to {}", target)
            }
        }
    }
}

fn non_negative(value: i32, key: &'static str) -> Result<u32, ParameterError> {
    u32::try_from(value).map_err(|_| ParameterError::NegativeDuration(key))
}

impl<H: Heater, R: Reactor, S: CalibrationStore> OvenController<H, R, S> {
    /// Run a parsed command
    pub fn handle_command(&mut self, command: &OvenCommand<'_>) -> Result<Response, OvenError> {
        match *command {
            OvenCommand::AddSegment {
                temp,
                ramp_time,
                hold_time,
                method,
            } => {
                let ramp_time_s = non_negative(ramp_time, "RAMP_TIME")?;
                let hold_time_s = non_negative(hold_time, "HOLD_TIME")?;
                let method = match method {
                    Some(value) => {
                        EasingKind::parse(value).ok_or(ParameterError::UnknownMethod)?
                    }
                    None => EasingKind::default(),
                };
                self.add_segment(temp, ramp_time_s, method, hold_time_s)?;
                Ok(Response::SegmentAdded {
                    temp,
                    ramp_time_s,
                    hold_time_s,
                    method,
                })
            }
            OvenCommand::Execute { wait } => {
                self.execute()?;
                Ok(Response::Executing { wait })
            }
            OvenCommand::Cancel => {
                self.cancel()?;
                Ok(Response::Cancelled)
            }
            OvenCommand::Clear => {
                self.clear()?;
                Ok(Response::Cleared)
            }
            OvenCommand::Calibrate { target, cool_wait } => {
                let cool_window_s = cool_wait
                    .map(|value| non_negative(value, "COOL_WAIT"))
                    .transpose()?;
                self.calibrate(target, cool_window_s)?;
                Ok(Response::CalibrationStarted {
                    target: self.prev_target(),
                })
            }
        }
    }

    /// Parse and run one command line
    pub fn handle_line(&mut self, line: &str) -> Result<Response, OvenError> {
        let command = match OvenCommand::parse(line) {
            Ok(command) => command,
            Err(e) => {
                warn!("rejected command: {}", e);
                return Err(e.into());
            }
        };
        debug!("command {}", command.name());
        self.handle_command(&command)
    }
}
