//! qprof: query-profiling log reducer.
//!
//! Folds per-worker step-timer files into a per-step report, and reduces
//! per-run query output into a single latency figure (geometric mean in ms
//! or arithmetic mean in µs), surfacing error-marker lines along the way.
//!
//! Everything below `pipeline` is pure over its inputs; `pipeline` and the
//! binary own the file system and the standard streams.

pub mod aggregate;
pub mod config;
pub mod logging;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod reduce;
pub mod report;
pub mod source;
