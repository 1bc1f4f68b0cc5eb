//! Step-timer aggregation across worker sources.
//!
//! [`StepTimerAggregator`] owns the label -> [`StepAggregate`] map for one
//! invocation. Lines are classified by `parser::classify_step_line` and each
//! timer event is folded as it is read; raw durations are never buffered.

use crate::model::{AppError, MalformedLine, ParseError, StepAggregate, TimerEvent};
use crate::parser::{self, StepLine};
use crate::source::SourceSet;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Per-label running statistics for one invocation.
///
/// Labels are kept in a `BTreeMap`, so iteration order is lexicographic and
/// reports built from it are deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepTimerAggregator {
    steps: BTreeMap<String, StepAggregate>,
    events: u64,
    skipped: Vec<MalformedLine>,
}

impl StepTimerAggregator {
    /// Create an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one timer event into its label's aggregate.
    pub fn record(&mut self, event: &TimerEvent) {
        self.events += 1;
        match self.steps.entry(event.label.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(StepAggregate::new(event));
            }
            Entry::Occupied(mut slot) => slot.get_mut().record(event),
        }
    }

    /// Consume every line of every source in `sources`.
    ///
    /// Blank lines are skipped. Lines of any other shape are skipped and
    /// remembered as [`MalformedLine`]s.
    ///
    /// # Errors
    ///
    /// - `InputError::SourceNotFound` if a source is missing (nothing is folded)
    /// - `ParseError::MalformedTimerValue` for a timer-shaped line with a bad value
    pub fn consume(&mut self, sources: &SourceSet) -> Result<(), AppError> {
        for line in sources.lines()? {
            let line = line?;
            let classified = parser::classify_step_line(&line.text).map_err(|invalid| {
                ParseError::MalformedTimerValue {
                    source_path: sources
                        .path(line.source_index)
                        .map(|p| p.to_path_buf())
                        .unwrap_or_default(),
                    line: line.line_number,
                    value: invalid.value,
                }
            })?;

            match classified {
                StepLine::Blank => {}
                StepLine::Timer(event) => self.record(&event),
                StepLine::Unrecognized { token_count } => {
                    debug!(
                        source = line.source_index,
                        line = line.line_number,
                        token_count,
                        "Skipping line with unrecognized shape"
                    );
                    self.skipped.push(MalformedLine::new(
                        line.source_index,
                        line.line_number,
                        token_count,
                    ));
                }
            }
        }

        info!(
            sources = sources.len(),
            labels = self.steps.len(),
            events = self.events,
            skipped = self.skipped.len(),
            "Step timers aggregated"
        );
        Ok(())
    }

    /// Merge a partial aggregator (for example, one per source) into this one.
    ///
    /// Applying merges in source order gives the same result as one
    /// sequential fold over all sources, up to rounding of the per-label sums.
    pub fn merge(&mut self, other: StepTimerAggregator) {
        self.events += other.events;
        self.skipped.extend(other.skipped);
        for (label, partial) in other.steps {
            match self.steps.entry(label) {
                Entry::Vacant(slot) => {
                    slot.insert(partial);
                }
                Entry::Occupied(mut slot) => slot.get_mut().merge(partial),
            }
        }
    }

    /// Aggregates keyed by label, in lexicographic label order.
    pub fn steps(&self) -> &BTreeMap<String, StepAggregate> {
        &self.steps
    }

    /// Aggregate for a single label.
    pub fn get(&self, label: &str) -> Option<&StepAggregate> {
        self.steps.get(label)
    }

    /// Total number of events folded across all labels.
    pub fn event_count(&self) -> u64 {
        self.events
    }

    /// Lines skipped because their shape was unrecognized.
    pub fn skipped(&self) -> &[MalformedLine] {
        &self.skipped
    }

    /// Consume the aggregator, returning the label map.
    pub fn into_steps(self) -> BTreeMap<String, StepAggregate> {
        self.steps
    }
}
