//! Domain model types (pure).
//!
//! All types in this module are pure data; I/O lives in `source` and `report`.

pub mod error;
pub mod log_line;
pub mod malformed_line;
pub mod stats;

// Re-export for convenience
pub use error::{AppError, InputError, ParseError, ReduceError, ReportError};
pub use log_line::{ErrorRecord, LogLine, TimerEvent};
pub use malformed_line::MalformedLine;
pub use stats::{ReductionMode, RunAccumulator, RunLatency, StepAggregate};
