//! Durable game history.
//!
//! - `record`: the record kinds, one JSON object per line
//! - `log`: the append-only NDJSON writer
//! - `resume`: rebuilding a resumable state from a log

pub mod record;
pub mod log;
pub mod resume;

pub use record::{now_ms, GameEvent};
pub use log::{EventLog, EventLogError};
pub use resume::{reconstruct, reconstruct_from_reader, ReconstructionError, ResumePoint, ResumeSource};
