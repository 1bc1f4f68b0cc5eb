//! Timer log line classification.
//!
//! This module provides pure functions that classify a raw line before any
//! numeric work happens:
//! - step-timer lines become [`StepLine`]
//! - run-output lines become [`RunLineScan`]
//!
//! Whether a line is a timer line at all is decided by shape alone. Only once
//! a line is known to be a timer line is its value parsed, and a bad value is
//! then an error rather than a skip.

use crate::model::TimerEvent;

/// Marker preceding `<value> <unit>` in run output.
pub const TIMER_MARKER: &str = "[Timer]";

/// Accepted error marker spellings (exact, case-sensitive).
///
/// Upstream logging is inconsistent about how it tags errors, so every
/// spelling seen in practice is accepted.
pub const ERROR_MARKERS: [&str; 5] = ["[Error]", "error", "Error", "[error]", "Error:"];

const MILLIS_SUFFIX: &str = "ms";

/// A value token that could not be parsed as a duration.
///
/// Carries the token so the caller can attach source and line context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidValue {
    /// The offending token (empty if it was missing).
    pub value: String,
}

impl InvalidValue {
    fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

// ===== Step-timer lines =====

/// Classification of one step-timer line.
#[derive(Debug, Clone, PartialEq)]
pub enum StepLine {
    /// Empty or whitespace-only.
    Blank,
    /// A well-formed timing event.
    Timer(TimerEvent),
    /// Token count matches neither timer grammar.
    Unrecognized {
        /// Number of whitespace-separated tokens found.
        token_count: usize,
    },
}

/// Classify a step-timer line.
///
/// Accepted shapes:
/// - `<label> <value>ms`
/// - `<label> <meta> <value>ms` (the middle token is discarded)
///
/// # Errors
///
/// Returns `InvalidValue` when the line has one of the accepted shapes but
/// its value token is not a finite, non-negative number.
pub fn classify_step_line(text: &str) -> Result<StepLine, InvalidValue> {
    let tokens: Vec<&str> = text.split_whitespace().collect();

    let (label, value) = match tokens.as_slice() {
        [] => return Ok(StepLine::Blank),
        [label, value] | [label, _, value] => (*label, *value),
        _ => {
            return Ok(StepLine::Unrecognized {
                token_count: tokens.len(),
            })
        }
    };

    let duration_ms = parse_step_duration(value).ok_or_else(|| InvalidValue::new(value))?;
    Ok(StepLine::Timer(TimerEvent::new(label, duration_ms, value)))
}

/// Parse a step-timer value token such as `12.5ms`.
///
/// The `ms` suffix is optional; a bare number is read as milliseconds.
pub fn parse_step_duration(token: &str) -> Option<f64> {
    let number = token.strip_suffix(MILLIS_SUFFIX).unwrap_or(token);
    parse_duration(number)
}

fn parse_duration(number: &str) -> Option<f64> {
    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        // -0.0 passes the filter; adding +0.0 clears its sign bit
        .map(|v| v + 0.0)
}

// ===== Run-output lines =====

/// One `[Timer] <value> <unit>` occurrence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunTimer {
    /// The raw numeric value.
    pub value: f64,
    /// True when the unit token was exactly `ms`; otherwise microseconds.
    pub millis: bool,
}

/// Everything of interest found on one run-output line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunLineScan {
    /// Timer occurrences, in token order.
    pub timers: Vec<RunTimer>,
    /// The first error marker found on the line, if any.
    pub error_marker: Option<&'static str>,
}

impl RunLineScan {
    /// Whether the line carried an error marker.
    pub fn is_error(&self) -> bool {
        self.error_marker.is_some()
    }

    /// Whether the line carried neither a timer nor an error marker.
    pub fn is_unrecognized(&self) -> bool {
        self.timers.is_empty() && self.error_marker.is_none()
    }
}

/// Scan a free-form run-output line for timer and error markers.
///
/// Every token position is inspected. For `[Timer]` at index `i`, token
/// `i + 1` is the value and token `i + 2` the unit; a missing unit token is
/// treated like any other non-`ms` unit.
///
/// # Errors
///
/// Returns `InvalidValue` when a `[Timer]` marker is not followed by a
/// finite, non-negative number.
pub fn scan_run_line(text: &str) -> Result<RunLineScan, InvalidValue> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut scan = RunLineScan::default();

    for (i, token) in tokens.iter().enumerate() {
        if *token == TIMER_MARKER {
            let value_token = tokens.get(i + 1).copied().unwrap_or("");
            let value = parse_duration(value_token).ok_or_else(|| InvalidValue::new(value_token))?;
            let millis = tokens.get(i + 2).is_some_and(|unit| *unit == MILLIS_SUFFIX);
            scan.timers.push(RunTimer { value, millis });
        } else if scan.error_marker.is_none() {
            scan.error_marker = ERROR_MARKERS.iter().copied().find(|m| m == token);
        }
    }

    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===== classify_step_line Tests =====

    #[test]
    fn two_token_line_yields_timer_event() {
        let line = classify_step_line("stepA 12.5ms").unwrap();
        assert_eq!(line, StepLine::Timer(TimerEvent::new("stepA", 12.5, "12.5ms")));
    }

    #[test]
    fn three_token_line_discards_middle_token() {
        let two = classify_step_line("stepA 12.5ms").unwrap();
        let three = classify_step_line("stepA extra 12.5ms").unwrap();
        assert_eq!(two, three);
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let line = classify_step_line("\t scan   3ms  ").unwrap();
        assert_eq!(line, StepLine::Timer(TimerEvent::new("scan", 3.0, "3ms")));
    }

    #[test]
    fn blank_lines_are_blank() {
        assert_eq!(classify_step_line("").unwrap(), StepLine::Blank);
        assert_eq!(classify_step_line("   \t ").unwrap(), StepLine::Blank);
    }

    #[test]
    fn other_token_counts_are_unrecognized() {
        assert_eq!(
            classify_step_line("lonely").unwrap(),
            StepLine::Unrecognized { token_count: 1 }
        );
        assert_eq!(
            classify_step_line("worker 3 finished in 12ms").unwrap(),
            StepLine::Unrecognized { token_count: 5 }
        );
    }

    #[test]
    fn bare_number_is_read_as_milliseconds() {
        let line = classify_step_line("scan 7").unwrap();
        assert_eq!(line, StepLine::Timer(TimerEvent::new("scan", 7.0, "7")));
    }

    #[test]
    fn corrupt_value_on_timer_shaped_line_is_an_error() {
        assert_eq!(
            classify_step_line("scan 12.x5ms"),
            Err(InvalidValue::new("12.x5ms"))
        );
        assert_eq!(
            classify_step_line("scan meta 5us"),
            Err(InvalidValue::new("5us"))
        );
    }

    #[test]
    fn negative_and_non_finite_values_are_rejected() {
        assert!(classify_step_line("scan -1ms").is_err());
        assert!(classify_step_line("scan NaNms").is_err());
        assert!(classify_step_line("scan infms").is_err());
    }

    #[test]
    fn negative_zero_is_read_as_positive_zero() {
        let StepLine::Timer(event) = classify_step_line("scan -0ms").unwrap() else {
            panic!("expected a timer event");
        };
        assert_eq!(event.duration_ms, 0.0);
        assert!(event.duration_ms.is_sign_positive());
        assert_eq!(event.raw, "-0ms");

        let scan = scan_run_line("[Timer] -0.0 ms").unwrap();
        assert!(scan.timers[0].value.is_sign_positive());
    }

    // ===== scan_run_line Tests =====

    #[test]
    fn timer_marker_is_found_at_any_position() {
        let scan = scan_run_line("q7 done: [Timer] 42 ms for query").unwrap();
        assert_eq!(
            scan.timers,
            vec![RunTimer {
                value: 42.0,
                millis: true
            }]
        );
        assert!(!scan.is_error());
    }

    #[test]
    fn non_ms_or_missing_unit_is_microseconds() {
        let us = scan_run_line("[Timer] 1500 us").unwrap();
        assert!(!us.timers[0].millis);

        let missing = scan_run_line("[Timer] 1500").unwrap();
        assert_eq!(
            missing.timers,
            vec![RunTimer {
                value: 1500.0,
                millis: false
            }]
        );
    }

    #[test]
    fn every_timer_marker_on_a_line_is_counted() {
        let scan = scan_run_line("[Timer] 1 ms [Timer] 2000 us").unwrap();
        assert_eq!(scan.timers.len(), 2);
        assert!(scan.timers[0].millis);
        assert!(!scan.timers[1].millis);
    }

    #[test]
    fn every_error_spelling_is_recognized() {
        for marker in ERROR_MARKERS {
            let scan = scan_run_line(&format!("query 3 {} something broke", marker)).unwrap();
            assert_eq!(scan.error_marker, Some(marker), "marker {:?}", marker);
        }
    }

    #[test]
    fn error_markers_are_case_sensitive_and_exact() {
        for line in ["ERROR here", "errors happened", "[ERROR] x", "Error:: x", "noerror"] {
            let scan = scan_run_line(line).unwrap();
            assert!(!scan.is_error(), "{:?} should not be an error line", line);
        }
    }

    #[test]
    fn line_can_carry_timer_and_error() {
        let scan = scan_run_line("[Timer] 3 ms Error: partial result").unwrap();
        assert_eq!(scan.timers.len(), 1);
        assert_eq!(scan.error_marker, Some("Error:"));
    }

    #[test]
    fn plain_chatter_is_unrecognized() {
        let scan = scan_run_line("loading partition 4 of 8").unwrap();
        assert!(scan.is_unrecognized());
    }

    #[test]
    fn timer_without_value_is_an_error() {
        assert_eq!(scan_run_line("[Timer]"), Err(InvalidValue::new("")));
        assert_eq!(
            scan_run_line("[Timer] fast ms"),
            Err(InvalidValue::new("fast"))
        );
    }
}
