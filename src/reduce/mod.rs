//! Run-latency reduction over repeated-run output logs.
//!
//! Both reduction modes scan lines with `parser::scan_run_line`; they differ
//! only in the [`ReductionMode`] that normalizes and finalizes the values.

use crate::model::{
    AppError, ErrorRecord, LogLine, ParseError, ReduceError, ReductionMode, RunAccumulator,
    RunLatency,
};
use crate::parser;
use crate::source::SourceSet;
use std::io::Write;
use tracing::{info, warn};

/// Reducer state for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct RunLatencyReducer {
    accumulator: RunAccumulator,
    errors: Vec<ErrorRecord>,
}

impl RunLatencyReducer {
    /// Create a reducer for `mode`.
    pub fn new(mode: ReductionMode) -> Self {
        Self {
            accumulator: RunAccumulator::new(mode),
            errors: Vec::new(),
        }
    }

    /// Geometric mean in milliseconds.
    pub fn geometric_mean() -> Self {
        Self::new(ReductionMode::GeometricMean)
    }

    /// Arithmetic mean in microseconds.
    pub fn arithmetic_mean() -> Self {
        Self::new(ReductionMode::ArithmeticMean)
    }

    /// The reduction mode.
    pub fn mode(&self) -> ReductionMode {
        self.accumulator.mode()
    }

    /// Fold one line.
    ///
    /// Returns the captured error record when the line carried an error
    /// marker.
    ///
    /// # Errors
    ///
    /// Returns `parser::InvalidValue` when a `[Timer]` marker is not
    /// followed by a usable value.
    pub fn fold_line(
        &mut self,
        line: &LogLine,
    ) -> Result<Option<&ErrorRecord>, parser::InvalidValue> {
        let scan = parser::scan_run_line(&line.text)?;
        let mode = self.mode();

        for timer in &scan.timers {
            self.accumulator
                .fold(mode.normalize(timer.value, timer.millis));
        }

        if !scan.is_error() {
            return Ok(None);
        }
        self.errors.push(ErrorRecord::new(
            line.source_index,
            line.line_number,
            line.text.as_str(),
        ));
        Ok(self.errors.last())
    }

    /// Consume every line of every source in `sources`.
    ///
    /// In modes that report errors live, each error line is written to
    /// `diagnostics` the moment it is read.
    ///
    /// # Errors
    ///
    /// - `InputError::SourceNotFound` if a source is missing
    /// - `ParseError::MalformedTimerValue` for a `[Timer]` without a usable value
    /// - `AppError::Output` if writing to `diagnostics` fails
    pub fn consume<W: Write>(
        &mut self,
        sources: &SourceSet,
        diagnostics: &mut W,
    ) -> Result<(), AppError> {
        let live = self.mode().reports_errors_live();

        for line in sources.lines()? {
            let line = line?;
            let captured = self.fold_line(&line).map_err(|invalid| {
                ParseError::MalformedTimerValue {
                    source_path: sources
                        .path(line.source_index)
                        .map(|p| p.to_path_buf())
                        .unwrap_or_default(),
                    line: line.line_number,
                    value: invalid.value,
                }
            })?;

            if let Some(record) = captured {
                warn!(
                    source = record.source_index(),
                    line = record.line_number(),
                    "Error marker in run output"
                );
                if live {
                    writeln!(diagnostics, "{}", record.line())?;
                }
            }
        }

        info!(
            mode = %self.mode(),
            sources = sources.len(),
            timers = self.accumulator.count(),
            errors = self.errors.len(),
            "Run output reduced"
        );
        Ok(())
    }

    /// Error lines captured so far, in encounter order.
    pub fn errors(&self) -> &[ErrorRecord] {
        &self.errors
    }

    /// The underlying accumulator.
    pub fn accumulator(&self) -> &RunAccumulator {
        &self.accumulator
    }

    /// Finalize the reduction.
    ///
    /// # Errors
    ///
    /// Returns `ReduceError::NoTimerEvents` if no `[Timer]` token was folded.
    pub fn finalize(&self) -> Result<RunLatency, ReduceError> {
        self.accumulator.finalize()
    }
}
