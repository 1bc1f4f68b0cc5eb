//! End-to-end drivers for the two reductions.
//!
//! Each driver scans its sources to completion before anything is reported,
//! so a fatal error leaves no partial output behind.

use crate::aggregate::StepTimerAggregator;
use crate::config::ResolvedConfig;
use crate::model::{AppError, ReductionMode, RunLatency};
use crate::reduce::RunLatencyReducer;
use crate::report;
use crate::source::{RunLayout, SourceSet};
use chrono::NaiveDateTime;
use std::io::Write;
use std::ops::Range;
use std::path::PathBuf;
use tracing::info;

/// Result of combining worker step timers.
#[derive(Debug)]
pub struct CombineOutcome {
    /// Path of the freshly created report.
    pub report_path: PathBuf,
    /// The final aggregation state.
    pub aggregator: StepTimerAggregator,
}

/// Output layout read by each reduction mode.
pub fn run_layout(mode: ReductionMode) -> RunLayout {
    match mode {
        ReductionMode::GeometricMean => RunLayout::Worker,
        ReductionMode::ArithmeticMean => RunLayout::Plain,
    }
}

/// Combine every worker timer file into one step report.
///
/// # Errors
///
/// Returns the first fatal error; in that case no report file is created.
pub fn combine_step_timers(
    config: &ResolvedConfig,
    now: NaiveDateTime,
) -> Result<CombineOutcome, AppError> {
    let sources = SourceSet::step_timers(&config.timer_dir, config.worker_count);

    let mut aggregator = StepTimerAggregator::new();
    aggregator.consume(&sources)?;

    let contents = report::render_step_report(aggregator.steps());
    let report_path = report::write_step_report(&config.report_dir, &contents, now)?;
    info!(path = %report_path.display(), "Step report written");

    Ok(CombineOutcome {
        report_path,
        aggregator,
    })
}

/// Reduce run outputs `runs` and print the summary line to `out`.
///
/// Arithmetic mode echoes error lines to `diagnostics` while scanning.
/// Geometric mode prints them to `out` after the scan, ahead of the summary.
///
/// # Errors
///
/// Returns the first fatal error, including `ReduceError::NoTimerEvents`
/// when the runs produced no timer tokens.
pub fn reduce_runs<O: Write, D: Write>(
    config: &ResolvedConfig,
    mode: ReductionMode,
    runs: Range<u32>,
    out: &mut O,
    diagnostics: &mut D,
) -> Result<RunLatency, AppError> {
    let sources = SourceSet::run_outputs(&config.run_prefix, runs, run_layout(mode));

    let mut reducer = RunLatencyReducer::new(mode);
    reducer.consume(&sources, diagnostics)?;

    if !mode.reports_errors_live() {
        out.write_all(report::render_error_records(reducer.errors()).as_bytes())?;
    }

    let latency = reducer.finalize()?;
    writeln!(out, "{}", report::render_run_latency(&latency))?;
    Ok(latency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{InputError, ReduceError};
    use chrono::NaiveDate;
    use std::fs;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("valid timestamp")
    }

    fn scratch_config(name: &str) -> ResolvedConfig {
        let root = std::env::temp_dir().join(format!("qprof_pipeline_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&root);
        fs::create_dir_all(root.join("timers")).unwrap();
        fs::create_dir_all(root.join("runs/output")).unwrap();
        ResolvedConfig {
            timer_dir: root.join("timers"),
            worker_count: 2,
            run_prefix: root.join("runs"),
            report_dir: root.join("reports"),
            log_file_path: root.join("qprof.log"),
        }
    }

    fn cleanup(config: &ResolvedConfig) {
        if let Some(root) = config.timer_dir.parent() {
            let _ = fs::remove_dir_all(root);
        }
    }

    #[test]
    fn combine_writes_sorted_report() {
        let config = scratch_config("combine");
        fs::write(config.timer_dir.join("timer0.txt"), "scan 4ms\njoin 1ms\n").unwrap();
        fs::write(config.timer_dir.join("timer1.txt"), "scan 6ms\n").unwrap();

        let outcome = combine_step_timers(&config, now());
        let report = outcome
            .as_ref()
            .ok()
            .and_then(|o| fs::read_to_string(&o.report_path).ok());

        cleanup(&config);

        let outcome = outcome.unwrap();
        assert_eq!(
            outcome.report_path,
            config.report_dir.join("timer_20260102-030405.txt")
        );
        let report = report.expect("report readable");
        assert!(report.starts_with("join -->\n"));
        assert!(report.contains("scan -->\n\t4ms\n\t6ms\n\nave:\t5.0000ms\n"));
    }

    #[test]
    fn combine_with_missing_worker_creates_no_report() {
        let config = scratch_config("combine_missing");
        fs::write(config.timer_dir.join("timer0.txt"), "scan 4ms\n").unwrap();

        let result = combine_step_timers(&config, now());
        let report_dir_exists = config.report_dir.exists();

        cleanup(&config);

        assert!(matches!(
            result,
            Err(AppError::Input(InputError::SourceNotFound { .. }))
        ));
        assert!(!report_dir_exists, "No report artifact on failure");
    }

    #[test]
    fn geometric_reduction_prints_errors_then_summary() {
        let config = scratch_config("geomean");
        let output = config.run_prefix.join("output");
        fs::write(output.join("outputworker0"), "[Timer] 2 ms\nquery 4 [Error] timeout\n").unwrap();
        fs::write(output.join("outputworker1"), "[Timer] 8000 us\n").unwrap();

        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        let result = reduce_runs(
            &config,
            ReductionMode::GeometricMean,
            0..2,
            &mut out,
            &mut diagnostics,
        );

        cleanup(&config);

        let latency = result.unwrap();
        assert!((latency.value - 4.0).abs() < 1e-9);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "query 4 [Error] timeout\nAverage Time : 4.0000 ms\n"
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn arithmetic_reduction_echoes_errors_to_diagnostics() {
        let config = scratch_config("mean");
        let output = config.run_prefix.join("output");
        fs::write(output.join("output5"), "Error: worker lost\n[Timer] 1 ms\n").unwrap();
        fs::write(output.join("output6"), "[Timer] 2000 us\n").unwrap();

        let mut out = Vec::new();
        let mut diagnostics = Vec::new();
        let result = reduce_runs(
            &config,
            ReductionMode::ArithmeticMean,
            5..7,
            &mut out,
            &mut diagnostics,
        );

        cleanup(&config);

        assert_eq!(result.unwrap().value, 1500.0);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "Average Time : 1500.0000 us\n"
        );
        assert_eq!(
            String::from_utf8(diagnostics).unwrap(),
            "Error: worker lost\n"
        );
    }

    #[test]
    fn reduction_without_timers_reports_no_timer_events() {
        let config = scratch_config("no_timers");
        fs::write(
            config.run_prefix.join("output/outputworker0"),
            "startup complete\n",
        )
        .unwrap();

        let mut out = Vec::new();
        let result = reduce_runs(
            &config,
            ReductionMode::GeometricMean,
            0..1,
            &mut out,
            &mut Vec::<u8>::new(),
        );

        cleanup(&config);

        assert!(matches!(
            result,
            Err(AppError::Reduce(ReduceError::NoTimerEvents {
                mode: ReductionMode::GeometricMean
            }))
        ));
        assert!(out.is_empty(), "No summary line without timer events");
    }
}
