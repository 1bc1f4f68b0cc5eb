//! qprof - Entry Point

use chrono::Local;
use clap::{Parser, Subcommand};
use qprof::config::ResolvedConfig;
use qprof::model::ReductionMode;
use qprof::pipeline;
use std::io::{self, Write};
use std::ops::Range;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// qprof - reduce query-profiling timer logs into reports
#[derive(Parser, Debug)]
#[command(name = "qprof")]
#[command(version)]
#[command(about = "Reduce query-profiling timer logs into step reports and run latencies")]
pub struct Args {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Reduction to run
    #[command(subcommand)]
    pub command: Command,
}

/// Reductions offered by the binary.
#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Combine worker step timers into a timestamped report file
    Combine,
    /// Geometric mean latency (ms) over worker run outputs START..END
    Geomean(RunRange),
    /// Arithmetic mean latency (us) over run outputs START..END
    Mean(RunRange),
}

/// Half-open range of run indices.
#[derive(clap::Args, Debug, PartialEq, Eq)]
pub struct RunRange {
    /// First run index (inclusive)
    pub start: u32,
    /// Last run index (exclusive)
    pub end: u32,
}

impl RunRange {
    fn runs(&self) -> Range<u32> {
        self.start..self.end
    }
}

fn main() -> ExitCode {
    // Usage errors exit with code 2 inside `parse`
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "Invocation failed");
            eprintln!("qprof: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Defaults → Config File → Env Vars
    let config = qprof::config::resolve(args.config.clone())?;

    // A log file is diagnostics only; an unwritable one must not block a reduction
    if let Err(err) = qprof::logging::init(&config.log_file_path) {
        eprintln!("qprof: warning: {err}; continuing without a log file");
    }

    info!(config = ?config, command = ?args.command, "Configuration loaded and resolved");

    match &args.command {
        Command::Combine => {
            let outcome = pipeline::combine_step_timers(&config, Local::now().naive_local())?;
            println!("{}", outcome.report_path.display());
        }
        Command::Geomean(range) => reduce(&config, ReductionMode::GeometricMean, range)?,
        Command::Mean(range) => reduce(&config, ReductionMode::ArithmeticMean, range)?,
    }

    Ok(())
}

fn reduce(
    config: &ResolvedConfig,
    mode: ReductionMode,
    range: &RunRange,
) -> Result<(), Box<dyn std::error::Error>> {
    let stdout = io::stdout();
    let stderr = io::stderr();
    let mut out = stdout.lock();
    let mut diagnostics = stderr.lock();

    pipeline::reduce_runs(config, mode, range.runs(), &mut out, &mut diagnostics)?;
    out.flush()?;
    Ok(())
}
