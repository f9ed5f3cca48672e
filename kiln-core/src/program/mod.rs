//! Temperature programs
//!
//! Turns `add_segment` requests into execution segments and computes the
//! interpolated target while a program runs.

pub mod easing;
pub mod executor;
pub mod file;
pub mod segment;

pub use easing::EasingKind;
pub use executor::{
    check_rate, Program, ProgramFull, RateRejection, Records, SegmentRecord, AMBIENT_TEMP_C,
    MAX_SEGMENTS,
};
pub use file::{parse_program, write_program, LineError, ProgramFileError};
pub use segment::{Segment, SegmentKind};
