//! Program files on disk
//!
//! Thin wrappers that move program text between files and a controller.
//! Parsing and validation stay in the controller, so a bad file never
//! replaces the loaded program.

use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use kiln_core::traits::{CalibrationStore, Heater, Reactor};
use kiln_core::{OvenController, OvenError};

/// Errors moving a program between a file and the controller
#[derive(Debug)]
pub enum ProgramIoError {
    /// File could not be read or written
    Io(io::Error),
    /// The controller rejected the program
    Oven(OvenError),
    /// Formatting the program failed
    Format,
}

impl fmt::Display for ProgramIoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgramIoError::Io(e) => write!(f, "program file: {}", e),
            ProgramIoError::Oven(e) => write!(f, "program rejected: {}", e),
            ProgramIoError::Format => f.write_str("program could not be formatted"),
        }
    }
}

impl std::error::Error for ProgramIoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProgramIoError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ProgramIoError {
    fn from(e: io::Error) -> Self {
        ProgramIoError::Io(e)
    }
}

impl From<OvenError> for ProgramIoError {
    fn from(e: OvenError) -> Self {
        ProgramIoError::Oven(e)
    }
}

/// Replace the controller's program with the contents of a file
pub fn load_program_file<H, R, S>(
    oven: &mut OvenController<H, R, S>,
    path: impl AsRef<Path>,
) -> Result<(), ProgramIoError>
where
    H: Heater,
    R: Reactor,
    S: CalibrationStore,
{
    let text = fs::read_to_string(path)?;
    oven.load_program(&text)?;
    Ok(())
}

/// Write the controller's program to a file
pub fn save_program_file<H, R, S>(
    oven: &OvenController<H, R, S>,
    path: impl AsRef<Path>,
) -> Result<(), ProgramIoError>
where
    H: Heater,
    R: Reactor,
    S: CalibrationStore,
{
    let mut text = String::new();
    oven.write_program(&mut text)
        .map_err(|_| ProgramIoError::Format)?;
    fs::write(path, text)?;
    debug!("program saved");
    Ok(())
}
