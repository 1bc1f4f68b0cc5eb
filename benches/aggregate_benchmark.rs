//! Fold throughput benchmarks.
//!
//! Measures classification plus aggregation of step-timer lines, and the
//! run-latency scan, over synthetic worker output.
//!
//! Run with: cargo bench

#![allow(missing_docs)] // criterion macros generate undocumented items

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use qprof::aggregate::StepTimerAggregator;
use qprof::model::{LogLine, ReductionMode};
use qprof::parser::{classify_step_line, StepLine};
use qprof::reduce::RunLatencyReducer;

const NUM_LINES: usize = 100_000;
const LABELS: [&str; 6] = ["parse", "plan", "scan", "join", "filter", "emit"];

/// Step-timer lines, with every tenth line carrying a metadata token.
fn generate_step_lines() -> Vec<String> {
    (0..NUM_LINES)
        .map(|i| {
            let label = LABELS[i % LABELS.len()];
            let ms = (i % 997) as f64 * 0.25;
            if i % 10 == 0 {
                format!("{label} worker{} {ms}ms", i % 8)
            } else {
                format!("{label} {ms}ms")
            }
        })
        .collect()
}

/// Run output with a timer every fourth line and occasional error lines.
fn generate_run_lines() -> Vec<LogLine> {
    (0..NUM_LINES)
        .map(|i| {
            let text = match i % 4 {
                0 => format!("query {i} [Timer] {} ms", 1 + i % 500),
                1 if i % 101 == 1 => format!("query {i} [Error] timeout"),
                _ => format!("query {i} rows={}", i % 4096),
            };
            LogLine {
                source_index: i % 8,
                line_number: i / 8 + 1,
                text,
            }
        })
        .collect()
}

fn bench_step_fold(c: &mut Criterion) {
    let lines = generate_step_lines();

    let mut group = c.benchmark_group("step_fold");
    group.throughput(Throughput::Elements(NUM_LINES as u64));
    group.bench_function("classify_and_record", |b| {
        b.iter(|| {
            let mut aggregator = StepTimerAggregator::new();
            for line in &lines {
                if let Ok(StepLine::Timer(event)) = classify_step_line(black_box(line)) {
                    aggregator.record(&event);
                }
            }
            black_box(aggregator.event_count())
        })
    });
    group.finish();
}

fn bench_run_fold(c: &mut Criterion) {
    let lines = generate_run_lines();

    let mut group = c.benchmark_group("run_fold");
    group.throughput(Throughput::Elements(NUM_LINES as u64));
    for mode in [ReductionMode::GeometricMean, ReductionMode::ArithmeticMean] {
        group.bench_function(mode.to_string(), |b| {
            b.iter(|| {
                let mut reducer = RunLatencyReducer::new(mode);
                for line in &lines {
                    let _ = reducer.fold_line(black_box(line));
                }
                black_box(reducer.finalize())
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_step_fold, bench_run_fold);
criterion_main!(benches);
