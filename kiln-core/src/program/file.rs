//! Program file format
//!
//! One structural segment per line:
//! ```text
//! # target:ramp_time:hold_time:method
//! 100:60:30:1
//! 250.5:600:0:16
//! ```
//! `method` is the numeric easing code. Blank lines and `#` comments are
//! ignored. Any malformed line fails the whole parse.

use core::fmt::{self, Write};

use super::easing::EasingKind;
use super::executor::Program;

/// Field separator
pub const SEPARATOR: char = ':';

/// Comment prefix
pub const COMMENT_PREFIX: char = '#';

/// Why a line was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Not exactly four fields
    FieldCount,
    InvalidTarget,
    InvalidRampTime,
    InvalidHoldTime,
    /// Not a known easing code
    InvalidMethod,
    /// More segments than a program can hold
    ProgramFull,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            LineError::FieldCount => "expected target:ramp_time:hold_time:method",
            LineError::InvalidTarget => "invalid target temperature",
            LineError::InvalidRampTime => "invalid ramp time",
            LineError::InvalidHoldTime => "invalid hold time",
            LineError::InvalidMethod => "unknown easing method code",
            LineError::ProgramFull => "too many segments",
        };
        f.write_str(msg)
    }
}

/// A malformed line, with its 1-based line number
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ProgramFileError {
    pub line: usize,
    pub kind: LineError,
}

impl fmt::Display for ProgramFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

/// Parse a program file
///
/// Returns a fresh program; the caller's program is untouched on error.
pub fn parse_program(text: &str) -> Result<Program, ProgramFileError> {
    let mut program = Program::new();

    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with(COMMENT_PREFIX) {
            continue;
        }

        let fail = |kind| ProgramFileError {
            line: idx + 1,
            kind,
        };

        let mut fields = line.split(SEPARATOR).map(str::trim);
        let (Some(target), Some(ramp), Some(hold), Some(method), None) = (
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
            fields.next(),
        ) else {
            return Err(fail(LineError::FieldCount));
        };

        let target: f32 = match target.parse() {
            Ok(t) if f32::is_finite(t) => t,
            _ => return Err(fail(LineError::InvalidTarget)),
        };
        let ramp: u32 = ramp.parse().map_err(|_| fail(LineError::InvalidRampTime))?;
        let hold: u32 = hold.parse().map_err(|_| fail(LineError::InvalidHoldTime))?;
        let method = method
            .parse::<u8>()
            .ok()
            .and_then(EasingKind::from_code)
            .ok_or(fail(LineError::InvalidMethod))?;

        program
            .add_segment(target, ramp, method, hold)
            .map_err(|_| fail(LineError::ProgramFull))?;
    }

    Ok(program)
}

/// Write a program in file format, one structural segment per line
pub fn write_program<W: Write>(program: &Program, out: &mut W) -> fmt::Result {
    for record in program.records() {
        writeln!(
            out,
            "{}{sep}{}{sep}{}{sep}{}",
            record.target,
            record.ramp_time_s,
            record.hold_time_s,
            record.method.code(),
            sep = SEPARATOR,
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::SegmentKind;

    #[test]
    fn test_parse_expands_holds() {
        let program = parse_program("100:60:30:1\n250:600:0:16\n").unwrap();
        assert_eq!(program.len(), 3);
        assert_eq!(program.segments()[1].kind(), SegmentKind::Hold);
        assert_eq!(program.segments()[2].method(), EasingKind::SineInOut);
    }

    #[test]
    fn test_parse_skips_blank_and_comments() {
        let text = "# bake\n\n  100:60:0:1  \n# done\n";
        let program = parse_program(text).unwrap();
        assert_eq!(program.len(), 1);
    }

    #[test]
    fn test_field_count_names_line() {
        let err = parse_program("100:60:30:1\n100:60:30\n").unwrap_err();
        assert_eq!(
            err,
            ProgramFileError {
                line: 2,
                kind: LineError::FieldCount
            }
        );

        let err = parse_program("100:60:30:1:7").unwrap_err();
        assert_eq!(err.kind, LineError::FieldCount);
    }

    #[test]
    fn test_non_numeric_fields() {
        assert_eq!(
            parse_program("hot:60:30:1").unwrap_err().kind,
            LineError::InvalidTarget
        );
        assert_eq!(
            parse_program("100:-5:30:1").unwrap_err().kind,
            LineError::InvalidRampTime
        );
        assert_eq!(
            parse_program("100:60:x:1").unwrap_err().kind,
            LineError::InvalidHoldTime
        );
        assert_eq!(
            parse_program("100:60:30:17").unwrap_err().kind,
            LineError::InvalidMethod
        );
        assert_eq!(
            parse_program("inf:60:30:1").unwrap_err().kind,
            LineError::InvalidTarget
        );
    }

    #[test]
    fn test_too_many_segments() {
        let mut text = std::string::String::new();
        for _ in 0..40 {
            text.push_str("100:10:10:1\n");
        }
        let err = parse_program(&text).unwrap_err();
        assert_eq!(err.kind, LineError::ProgramFull);
        assert_eq!(err.line, 33);
    }

    #[test]
    fn test_write_then_parse_preserves_pairs() {
        let mut program = Program::new();
        program.add_segment(100.0, 60, EasingKind::Linear, 30).unwrap();
        program.add_segment(180.5, 300, EasingKind::CubicInOut, 0).unwrap();
        program.add_segment(60.0, 900, EasingKind::None, 120).unwrap();

        let mut text = std::string::String::new();
        write_program(&program, &mut text).unwrap();
        assert_eq!(text, "100:60:30:1\n180.5:300:0:7\n60:900:120:0\n");

        let loaded = parse_program(&text).unwrap();
        assert_eq!(loaded.segments(), program.segments());
    }

    #[test]
    fn test_error_display() {
        let err = ProgramFileError {
            line: 4,
            kind: LineError::InvalidMethod,
        };
        assert_eq!(
            std::format!("{}", err),
            "line 4: unknown easing method code"
        );
    }
}
