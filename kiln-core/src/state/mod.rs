//! Controller state machine
//!
//! The state machine is explicit, finite, and deterministic. The
//! controller performs side effects; this module only decides where an
//! event leads.

pub mod events;
pub mod machine;

pub use events::Event;
pub use machine::{ErrorKind, OvenState};
