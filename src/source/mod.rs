//! Log input sources.
//!
//! This module provides the ordered set of per-worker or per-run log files a
//! reduction consumes:
//! - `SourceSet` names the files (fixed worker range or caller range)
//! - `LogLines` reads them lazily, one after another, in order
//! - `FileSource` reads a single file

use crate::model::error::InputError;
use crate::model::LogLine;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod file;

pub use file::FileSource;

/// File naming scheme for repeated-run output logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLayout {
    /// `<prefix>/output/outputworker<N>`
    Worker,
    /// `<prefix>/output/output<N>`
    Plain,
}

impl RunLayout {
    fn file_name(self, index: u32) -> String {
        match self {
            RunLayout::Worker => format!("outputworker{}", index),
            RunLayout::Plain => format!("output{}", index),
        }
    }
}

/// Ordered collection of log sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceSet {
    paths: Vec<PathBuf>,
}

impl SourceSet {
    /// Worker timer files `dir/timer<N>.txt` for `N in 0..worker_count`.
    pub fn step_timers(dir: impl AsRef<Path>, worker_count: u32) -> Self {
        let dir = dir.as_ref();
        Self {
            paths: (0..worker_count)
                .map(|n| dir.join(format!("timer{}.txt", n)))
                .collect(),
        }
    }

    /// Run output files for the half-open index range `runs`.
    pub fn run_outputs(prefix: impl AsRef<Path>, runs: Range<u32>, layout: RunLayout) -> Self {
        let output_dir = prefix.as_ref().join("output");
        Self {
            paths: runs.map(|n| output_dir.join(layout.file_name(n))).collect(),
        }
    }

    /// Explicit list of sources, read in the given order.
    pub fn from_paths(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            paths: paths.into_iter().collect(),
        }
    }

    /// All source paths, in read order.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Path of the source at `index`.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.paths.get(index).map(PathBuf::as_path)
    }

    /// Number of sources.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the set names no sources at all.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Start a single pass over every line of every source.
    ///
    /// All sources are checked for existence before any is read, so a missing
    /// worker file aborts before anything is folded.
    ///
    /// # Errors
    ///
    /// Returns `InputError::SourceNotFound` naming the first missing source.
    pub fn lines(&self) -> Result<LogLines<'_>, InputError> {
        if let Some(missing) = self.paths.iter().find(|p| !p.exists()) {
            return Err(InputError::SourceNotFound {
                path: missing.clone(),
            });
        }
        Ok(LogLines {
            sources: self,
            next_index: 0,
            current: None,
            failed: false,
        })
    }
}

/// Lazy, one-pass iterator over the lines of a `SourceSet`.
///
/// Sources are opened one at a time in order. After the first error the
/// iterator is exhausted.
#[derive(Debug)]
pub struct LogLines<'a> {
    sources: &'a SourceSet,
    next_index: usize,
    current: Option<(usize, FileSource)>,
    failed: bool,
}

impl LogLines<'_> {
    fn fail(&mut self, err: InputError) -> Option<Result<LogLine, InputError>> {
        self.failed = true;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for LogLines<'_> {
    type Item = Result<LogLine, InputError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let sources = self.sources;
        loop {
            if let Some((source_index, source)) = self.current.as_mut() {
                let source_index = *source_index;
                match source.next_line() {
                    Ok(Some((line_number, text))) => {
                        return Some(Ok(LogLine {
                            source_index,
                            line_number,
                            text,
                        }));
                    }
                    Ok(None) => self.current = None,
                    Err(err) => return self.fail(err),
                }
            }

            let path = sources.paths.get(self.next_index)?;
            match FileSource::open(path) {
                Ok(source) => {
                    debug!(path = %path.display(), index = self.next_index, "Opened log source");
                    self.current = Some((self.next_index, source));
                    self.next_index += 1;
                }
                Err(err) => return self.fail(err),
            }
        }
    }
}
