//! Oven commands parsed from command lines
//!
//! Values are only checked for syntax here. Range checks (negative
//! durations, unknown easing names, temperatures above the heater limit)
//! belong to the controller that executes the command.

use crate::gcode::{GcodeError, GcodeLine};

// Command names
pub const CMD_ADD_SEGMENT: &str = "ADD_SEGMENT";
pub const CMD_EXECUTE: &str = "EXECUTE_PROGRAM";
pub const CMD_CANCEL: &str = "CANCEL_PROGRAM";
pub const CMD_CLEAR: &str = "PROGRAM_CLEAR";
pub const CMD_CALIBRATE: &str = "CALIBRATE_OVEN";

// Help texts
pub const ADD_SEGMENT_HELP: &str =
    "Add a program segment: TEMP, RAMP_TIME (sec), HOLD_TIME (sec), METHOD (easing)";
pub const EXECUTE_HELP: &str =
    "Execute the program. Add WAIT=1 to pause G-code processing until the program finishes.";
pub const CANCEL_HELP: &str = "Cancel execution of the current program";
pub const CLEAR_HELP: &str = "Clear the current program from memory";
pub const CALIBRATE_HELP: &str =
    "Measure heating and cooling rates: TARGET (C), COOL_WAIT (sec)";

/// All commands with their help text, in registration order
pub const COMMANDS: [(&str, &str); 5] = [
    (CMD_ADD_SEGMENT, ADD_SEGMENT_HELP),
    (CMD_EXECUTE, EXECUTE_HELP),
    (CMD_CANCEL, CANCEL_HELP),
    (CMD_CLEAR, CLEAR_HELP),
    (CMD_CALIBRATE, CALIBRATE_HELP),
];

/// Errors produced while turning a line into a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Line could not be tokenized
    Gcode(GcodeError),
    /// Command name is not one of [`COMMANDS`]
    UnknownCommand,
    /// Required parameter is absent
    MissingParam(&'static str),
    /// Parameter value is not a valid number or flag
    InvalidValue(&'static str),
}

impl From<GcodeError> for CommandError {
    fn from(e: GcodeError) -> Self {
        CommandError::Gcode(e)
    }
}

impl core::fmt::Display for CommandError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            CommandError::Gcode(e) => write!(f, "malformed command line: {:?}", e),
            CommandError::UnknownCommand => f.write_str("unknown command"),
            CommandError::MissingParam(key) => write!(f, "missing parameter {}", key),
            CommandError::InvalidValue(key) => write!(f, "invalid value for {}", key),
        }
    }
}

/// A command for the oven controller
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OvenCommand<'a> {
    /// Append a ramp (and optional hold) to the program
    AddSegment {
        temp: f32,
        ramp_time: i32,
        hold_time: i32,
        /// Easing name or numeric code, `None` = linear
        method: Option<&'a str>,
    },
    /// Start the loaded program
    Execute {
        /// Caller should hold further G-code until the program finishes
        wait: bool,
    },
    /// Stop the running program
    Cancel,
    /// Stop and discard the program
    Clear,
    /// Run the rate calibration
    Calibrate {
        target: Option<f32>,
        cool_wait: Option<i32>,
    },
}

impl<'a> OvenCommand<'a> {
    /// Tokenize and parse a line
    pub fn parse(line: &'a str) -> Result<Self, CommandError> {
        let gcode = GcodeLine::parse(line)?;
        Self::from_gcode(&gcode)
    }

    /// Build a command from an already tokenized line
    pub fn from_gcode(line: &GcodeLine<'a>) -> Result<Self, CommandError> {
        if line.is(CMD_ADD_SEGMENT) {
            Ok(OvenCommand::AddSegment {
                temp: require(get_float(line, "TEMP")?, "TEMP")?,
                ramp_time: require(get_int(line, "RAMP_TIME")?, "RAMP_TIME")?,
                hold_time: get_int(line, "HOLD_TIME")?.unwrap_or(0),
                method: line.get("METHOD"),
            })
        } else if line.is(CMD_EXECUTE) {
            let wait = match get_int(line, "WAIT")? {
                None | Some(0) => false,
                Some(1) => true,
                Some(_) => return Err(CommandError::InvalidValue("WAIT")),
            };
            Ok(OvenCommand::Execute { wait })
        } else if line.is(CMD_CANCEL) {
            Ok(OvenCommand::Cancel)
        } else if line.is(CMD_CLEAR) {
            Ok(OvenCommand::Clear)
        } else if line.is(CMD_CALIBRATE) {
            Ok(OvenCommand::Calibrate {
                target: get_float(line, "TARGET")?,
                cool_wait: get_int(line, "COOL_WAIT")?,
            })
        } else {
            Err(CommandError::UnknownCommand)
        }
    }

    /// Canonical command name
    pub fn name(&self) -> &'static str {
        match self {
            OvenCommand::AddSegment { .. } => CMD_ADD_SEGMENT,
            OvenCommand::Execute { .. } => CMD_EXECUTE,
            OvenCommand::Cancel => CMD_CANCEL,
            OvenCommand::Clear => CMD_CLEAR,
            OvenCommand::Calibrate { .. } => CMD_CALIBRATE,
        }
    }

    /// Help text for this command
    pub fn help(&self) -> &'static str {
        let name = self.name();
        COMMANDS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, h)| *h)
            .unwrap_or("")
    }
}

fn require<T>(value: Option<T>, key: &'static str) -> Result<T, CommandError> {
    value.ok_or(CommandError::MissingParam(key))
}

fn get_float(line: &GcodeLine<'_>, key: &'static str) -> Result<Option<f32>, CommandError> {
    match line.get(key) {
        None => Ok(None),
        Some(raw) => match raw.parse::<f32>() {
            Ok(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(CommandError::InvalidValue(key)),
        },
    }
}

fn get_int(line: &GcodeLine<'_>, key: &'static str) -> Result<Option<i32>, CommandError> {
    match line.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<i32>()
            .map(Some)
            .map_err(|_| CommandError::InvalidValue(key)),
    }
}
