//! Text reports.
//!
//! Rendering is pure: the same aggregates always render to the same bytes,
//! so two profiling sessions can be diffed. Only [`write_step_report`]
//! touches the filesystem, and it never replaces an existing file.

use crate::model::{ErrorRecord, ReportError, RunLatency, StepAggregate};
use chrono::NaiveDateTime;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// File name prefix for step reports.
pub const STEP_REPORT_PREFIX: &str = "timer_";

const STEP_REPORT_EXTENSION: &str = "txt";
const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Render the per-step report.
///
/// Labels appear in the map's (lexicographic) order. Each section lists the
/// raw value of every event, then the average, maximum, and minimum.
pub fn render_step_report(steps: &BTreeMap<String, StepAggregate>) -> String {
    let mut out = String::new();
    for (label, agg) in steps {
        // Writing into a String cannot fail.
        let _ = writeln!(out, "{} -->", label);
        for raw in agg.raw_values() {
            let _ = writeln!(out, "\t{}", raw);
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "ave:\t{}", format_ms(agg.mean()));
        let _ = writeln!(out, "max:\t{}", format_ms(agg.max()));
        let _ = writeln!(out, "min:\t{}", format_ms(agg.min()));
        let _ = writeln!(out);
    }
    out
}

fn format_ms(value: f64) -> String {
    format!("{:.4}ms", value)
}

/// Render the single summary line for a run-latency reduction.
pub fn render_run_latency(latency: &RunLatency) -> String {
    format!(
        "Average Time : {:.4} {}",
        latency.value,
        latency.mode.unit()
    )
}

/// Render captured error lines, one per line, in encounter order.
pub fn render_error_records(errors: &[ErrorRecord]) -> String {
    errors.iter().fold(String::new(), |mut out, record| {
        out.push_str(record.line());
        out.push('\n');
        out
    })
}

/// File stem for a step report created at `now`.
pub fn step_report_stem(now: NaiveDateTime) -> String {
    format!("{}{}", STEP_REPORT_PREFIX, now.format(TIMESTAMP_FORMAT))
}

/// Write `contents` to a newly created, timestamp-named file in `dir`.
///
/// The file is `timer_<YYYYMMDD-HHMMSS>.txt`. If that name is taken (two
/// runs within one second) a `-1`, `-2`, ... suffix is added. Existing files
/// are never opened for writing.
///
/// # Errors
///
/// Returns `ReportError` if the directory or file cannot be created, or no
/// free name is found.
pub fn write_step_report(
    dir: &Path,
    contents: &str,
    now: NaiveDateTime,
) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::DirectoryCreation {
        path: dir.to_path_buf(),
        source,
    })?;

    let stem = step_report_stem(now);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.{}", stem, STEP_REPORT_EXTENSION)
        } else {
            format!("{}-{}.{}", stem, attempt, STEP_REPORT_EXTENSION)
        };
        let path = dir.join(name);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(source) => return Err(ReportError::Write { path, source }),
        };
        return fill_new_file(path, move || {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        });
    }

    Err(ReportError::NameExhausted {
        dir: dir.to_path_buf(),
        stem,
    })
}

/// Run `fill` against the file just created at `path`.
///
/// On failure the file is removed, so a truncated report never survives.
fn fill_new_file(
    path: PathBuf,
    fill: impl FnOnce() -> io::Result<()>,
) -> Result<PathBuf, ReportError> {
    match fill() {
        Ok(()) => Ok(path),
        Err(source) => {
            let _ = fs::remove_file(&path);
            Err(ReportError::Write { path, source })
        }
    }
}
