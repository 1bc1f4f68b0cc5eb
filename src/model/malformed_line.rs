//! Records for step-timer lines that match no known shape.
//!
//! Upstream timer files contain non-timer chatter. A line whose token count
//! fits neither timer grammar becomes a MalformedLine and is skipped.

/// A line skipped because its shape matched no timer grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    source_index: usize,
    line_number: usize,
    token_count: usize,
}

impl MalformedLine {
    /// Create a new malformed line record.
    ///
    /// # Arguments
    ///
    /// * `source_index` - Index of the source within its `SourceSet`
    /// * `line_number` - The line number in the source (1-indexed)
    /// * `token_count` - Number of whitespace-separated tokens on the line
    pub fn new(source_index: usize, line_number: usize, token_count: usize) -> Self {
        Self {
            source_index,
            line_number,
            token_count,
        }
    }

    /// Get the source index.
    pub fn source_index(&self) -> usize {
        self.source_index
    }

    /// Get the line number where the line was found.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Get the number of tokens the line had.
    pub fn token_count(&self) -> usize {
        self.token_count
    }
}
