//! Error types for qprof.
//!
//! This module defines a hierarchical error taxonomy using `thiserror` for structured error
//! handling. Every domain error converts into [`AppError`] via `From`, so the pipeline
//! composes with `?` from the source reader up to `main`.
//!
//! # Error Hierarchy
//!
//! - [`AppError`] - Top-level error wrapping all domain-specific failures
//!   - [`InputError`] - Log source failures (missing source, read failure)
//!   - [`ParseError`] - A timer line with a corrupt numeric payload
//!   - [`ReduceError`] - Finalization refused (no timer events)
//!   - [`ReportError`] - Report artifact could not be created or written
//!   - `std::io::Error` - stdout / diagnostic stream write failures
//!
//! # Error Recovery Strategy
//!
//! Every variant here is **fatal**: the invocation aborts and no report is produced.
//! Lines whose shape matches no known grammar are not errors at all; they are recorded
//! as [`MalformedLine`](crate::model::MalformedLine) and skipped. Error-marker lines in
//! run output are domain data ([`ErrorRecord`](crate::model::ErrorRecord)).

use crate::model::ReductionMode;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level error encompassing all fatal failure modes.
///
/// # Examples
///
/// ```no_run
/// use qprof::model::error::{AppError, InputError};
///
/// fn run() -> Result<(), AppError> {
///     // InputError automatically converts to AppError via From
///     open_sources()?;
///     Ok(())
/// }
/// # fn open_sources() -> Result<(), InputError> { Ok(()) }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// A required log source is missing or unreadable.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// A structurally valid timer line carried an unparsable value.
    #[error("Failed to parse timer log: {0}")]
    Parse(#[from] ParseError),

    /// The reduction could not be finalized.
    #[error("Failed to reduce run latency: {0}")]
    Reduce(#[from] ReduceError),

    /// The report could not be produced.
    #[error("Failed to write report: {0}")]
    Report(#[from] ReportError),

    /// Writing to stdout or the live diagnostic stream failed (for example, a broken pipe).
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),
}

/// Errors encountered when opening or reading log sources.
///
/// # Recovery Patterns
///
/// None. A missing source would make every downstream statistic silently under-count,
/// so the whole aggregation aborts. Sources are local files that the cluster finished
/// writing before this tool runs; there is no retry.
#[derive(Debug, Error)]
pub enum InputError {
    /// An expected log source does not exist.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use qprof::model::error::InputError;
    ///
    /// let err = InputError::SourceNotFound {
    ///     path: PathBuf::from("./timer3.txt")
    /// };
    /// assert!(err.to_string().contains("./timer3.txt"));
    /// ```
    #[error("Source not found: {}", .path.display())]
    SourceNotFound {
        /// The path that was expected to exist.
        path: PathBuf,
    },

    /// An I/O failure while opening or reading a source that does exist.
    #[error("IO error reading {}: {source}", .path.display())]
    Read {
        /// The source being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors encountered while classifying timer lines.
///
/// A line that does not look like a timer line is skipped. A line that does look like
/// one but whose value cannot be parsed is reported here, because silently dropping it
/// would corrupt the average.
#[derive(Debug, Error)]
pub enum ParseError {
    /// The duration token of a well-shaped timer line is not a finite, non-negative number.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use qprof::model::error::ParseError;
    ///
    /// let err = ParseError::MalformedTimerValue {
    ///     source_path: PathBuf::from("./timer0.txt"),
    ///     line: 12,
    ///     value: "12.x5ms".to_string(),
    /// };
    /// let msg = err.to_string();
    /// assert!(msg.contains("./timer0.txt:12"));
    /// assert!(msg.contains("'12.x5ms'"));
    /// ```
    #[error("Malformed timer value '{value}' at {}:{line}", .source_path.display())]
    MalformedTimerValue {
        /// The source containing the line.
        source_path: PathBuf,
        /// The 1-based line number within the source.
        line: usize,
        /// The offending value token (empty when the token is missing).
        value: String,
    },
}

/// Errors raised when finalizing a run-latency reduction.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReduceError {
    /// No `[Timer]` token was folded, so neither mean is defined.
    ///
    /// A run that produced zero successful queries is an expected operational condition;
    /// this is reported explicitly instead of producing NaN.
    #[error("No timer events found for {mode} reduction")]
    NoTimerEvents {
        /// The reduction that was being finalized.
        mode: ReductionMode,
    },
}

/// Errors raised while creating the report artifact.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The report directory could not be created.
    #[error("Failed to create report directory {}: {source}", .path.display())]
    DirectoryCreation {
        /// Directory that failed to be created.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The report file could not be created or written.
    #[error("Failed to write report file {}: {source}", .path.display())]
    Write {
        /// The report file path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Every candidate file name for this timestamp is already taken.
    #[error("No free report file name for stem '{stem}' in {}", .dir.display())]
    NameExhausted {
        /// Directory the report was to be written into.
        dir: PathBuf,
        /// Timestamped file stem that was tried.
        stem: String,
    },
}
