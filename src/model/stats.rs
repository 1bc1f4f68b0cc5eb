//! Running latency statistics.
//!
//! This module provides the two accumulators the reducers fold into:
//! [`StepAggregate`] for per-step timer summaries and [`RunAccumulator`] for
//! end-to-end run latency. Neither buffers the numeric values it has seen;
//! `StepAggregate` only keeps the raw formatted tokens for the audit dump.

use crate::model::{ReduceError, TimerEvent};
use std::fmt;

// ===== StepAggregate =====

/// Aggregated timings for one step label across every worker source.
///
/// # Invariants
///
/// - `count` equals the number of events folded (always >= 1)
/// - `min <= mean() <= max`
/// - `raw_values` holds one entry per folded event, in fold order
#[derive(Debug, Clone, PartialEq)]
pub struct StepAggregate {
    count: u64,
    sum: f64,
    min: f64,
    max: f64,
    raw_values: Vec<String>,
}

impl StepAggregate {
    /// Create an aggregate from the first event observed for a label.
    pub fn new(event: &TimerEvent) -> Self {
        Self {
            count: 1,
            sum: event.duration_ms,
            min: event.duration_ms,
            max: event.duration_ms,
            raw_values: vec![event.raw.clone()],
        }
    }

    /// Fold another event for the same label.
    ///
    /// `min` and `max` are only replaced on a strict comparison, so ties keep
    /// the first-seen value.
    pub fn record(&mut self, event: &TimerEvent) {
        let duration = event.duration_ms;
        self.count += 1;
        self.sum += duration;
        if duration < self.min {
            self.min = duration;
        }
        if duration > self.max {
            self.max = duration;
        }
        self.raw_values.push(event.raw.clone());
    }

    /// Merge a partial aggregate for the same label into this one.
    ///
    /// Count, extremes and raw values match folding `other`'s events after
    /// this aggregate's events; `sum` matches up to floating-point rounding.
    /// Merging per-source partials in source order is deterministic.
    pub fn merge(&mut self, other: StepAggregate) {
        self.count += other.count;
        self.sum += other.sum;
        if other.min < self.min {
            self.min = other.min;
        }
        if other.max > self.max {
            self.max = other.max;
        }
        self.raw_values.extend(other.raw_values);
    }

    /// Number of events folded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all folded durations, in milliseconds.
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Smallest folded duration, in milliseconds.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Largest folded duration, in milliseconds.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Average duration in milliseconds.
    ///
    /// Clamped into `[min, max]`: summing many equal values can leave
    /// `sum / count` one ulp outside the observed range.
    pub fn mean(&self) -> f64 {
        (self.sum / self.count as f64).clamp(self.min, self.max)
    }

    /// Raw formatted values in the order they were folded.
    pub fn raw_values(&self) -> &[String] {
        &self.raw_values
    }
}

// ===== ReductionMode =====

/// How run-output timer values are normalized and reduced.
///
/// Both modes share one tokenizer; they differ only in the unit values are
/// normalized to and in how the accumulator is finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReductionMode {
    /// Geometric mean over values normalized to milliseconds.
    GeometricMean,
    /// Arithmetic mean over values normalized to microseconds.
    ArithmeticMean,
}

impl ReductionMode {
    /// Normalize a `[Timer]` value to this mode's unit.
    ///
    /// `millis` is true when the unit token was exactly `ms`. Every other
    /// unit (including a missing one) is taken to be microseconds.
    pub fn normalize(self, value: f64, millis: bool) -> f64 {
        match (self, millis) {
            (ReductionMode::GeometricMean, true) => value,
            (ReductionMode::GeometricMean, false) => value / 1000.0,
            (ReductionMode::ArithmeticMean, true) => value * 1000.0,
            (ReductionMode::ArithmeticMean, false) => value,
        }
    }

    /// Unit label of the finalized value.
    pub fn unit(self) -> &'static str {
        match self {
            ReductionMode::GeometricMean => "ms",
            ReductionMode::ArithmeticMean => "us",
        }
    }

    /// Whether error lines are echoed while scanning rather than after.
    pub fn reports_errors_live(self) -> bool {
        matches!(self, ReductionMode::ArithmeticMean)
    }
}

impl fmt::Display for ReductionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReductionMode::GeometricMean => f.write_str("geometric-mean"),
            ReductionMode::ArithmeticMean => f.write_str("arithmetic-mean"),
        }
    }
}

// ===== RunAccumulator =====

/// Accumulator for end-to-end run latency.
///
/// The multiplicative product is held as a sum of natural logarithms so a
/// long series of large durations cannot overflow `f64`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunAccumulator {
    mode: ReductionMode,
    count: u64,
    log_product: f64,
    sum: f64,
}

impl RunAccumulator {
    /// Create an empty accumulator for the given mode.
    pub fn new(mode: ReductionMode) -> Self {
        Self {
            mode,
            count: 0,
            log_product: 0.0,
            sum: 0.0,
        }
    }

    /// Fold one value that is already normalized to the mode's unit.
    pub fn fold(&mut self, normalized: f64) {
        self.count += 1;
        match self.mode {
            ReductionMode::GeometricMean => self.log_product += normalized.ln(),
            ReductionMode::ArithmeticMean => self.sum += normalized,
        }
    }

    /// The reduction mode.
    pub fn mode(&self) -> ReductionMode {
        self.mode
    }

    /// Number of `[Timer]` tokens folded.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Running product of folded values (geometric mode).
    pub fn product(&self) -> f64 {
        self.log_product.exp()
    }

    /// Running sum of folded values (arithmetic mode).
    pub fn sum(&self) -> f64 {
        self.sum
    }

    /// Finalize the reduction.
    ///
    /// # Errors
    ///
    /// Returns `ReduceError::NoTimerEvents` if nothing was folded.
    pub fn finalize(&self) -> Result<RunLatency, ReduceError> {
        if self.count == 0 {
            return Err(ReduceError::NoTimerEvents { mode: self.mode });
        }
        let n = self.count as f64;
        let value = match self.mode {
            ReductionMode::GeometricMean => (self.log_product / n).exp(),
            ReductionMode::ArithmeticMean => self.sum / n,
        };
        Ok(RunLatency {
            mode: self.mode,
            value,
            count: self.count,
        })
    }
}

/// A finalized run latency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunLatency {
    /// Reduction that produced the value.
    pub mode: ReductionMode,
    /// The mean, in `mode.unit()`.
    pub value: f64,
    /// Number of timer tokens it was computed from.
    pub count: u64,
}
