//! Line-level types produced while scanning log sources.

/// One raw line read from a log source.
///
/// Ephemeral: produced and consumed within a single pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    /// Index of the originating source within its `SourceSet`.
    pub source_index: usize,
    /// 1-based line number within the source.
    pub line_number: usize,
    /// Line text with the trailing newline removed.
    pub text: String,
}

/// A timing event parsed from a step-timer line.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerEvent {
    /// Step label, the aggregation key.
    pub label: String,
    /// Duration in milliseconds (finite, non-negative).
    pub duration_ms: f64,
    /// The value token exactly as it appeared, for the audit dump.
    pub raw: String,
}

impl TimerEvent {
    /// Create a timer event.
    pub fn new(label: impl Into<String>, duration_ms: f64, raw: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            duration_ms,
            raw: raw.into(),
        }
    }
}

/// A run-output line that carried an error marker.
///
/// Captured verbatim, in encounter order, never deduplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorRecord {
    source_index: usize,
    line_number: usize,
    line: String,
}

impl ErrorRecord {
    /// Capture an error line.
    pub fn new(source_index: usize, line_number: usize, line: impl Into<String>) -> Self {
        Self {
            source_index,
            line_number,
            line: line.into(),
        }
    }

    /// Index of the source the line came from.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// 1-based line number within the source.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// The original line.
    pub fn line(&self) -> &str {
        &self.line
    }
}
