//! JSON summary output
//!
//! Optional machine-readable rendition of the final report, written when
//! `--json-output FILE` is given. Mirrors the text report's sections so the
//! two never disagree.

use crate::config::RunnerOpts;
use crate::stats::histogram::Histogram;
use crate::stats::{CounterSet, NANOS_PER_MILLI};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

/// Machine-readable final report.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSummary {
    pub threads: usize,
    pub total_time_secs: f64,
    pub sql: SqlStatistics,
    pub latency_ms: LatencySummary,
    pub fairness: FairnessSummary,
}

#[derive(Debug, Clone, Serialize)]
pub struct SqlStatistics {
    pub reads: u64,
    pub writes: u64,
    pub others: u64,
    pub total_queries: u64,
    pub transactions: u64,
    pub ignored_errors: u64,
    pub transactions_per_sec: f64,
    pub queries_per_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LatencySummary {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
    pub percentile: u32,
    pub percentile_value: f64,
    pub sum: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FairnessSummary {
    pub events_avg: f64,
    pub events_stddev: f64,
    pub execution_time_avg_secs: f64,
    pub execution_time_stddev_secs: f64,
}

/// Assemble the summary from the run's shared state.
pub fn build_summary(
    opts: &RunnerOpts,
    counters: &CounterSet,
    histogram: &Histogram,
    total_time: f64,
) -> ReportSummary {
    let transactions = counters.transactions();
    let queries = counters.queries();

    let latency_avg_ms = if transactions > 0 {
        (counters.latency_nano_sum() as f64 / NANOS_PER_MILLI) / transactions as f64
    } else {
        0.0
    };

    let fairness = counters.fairness();

    ReportSummary {
        threads: opts.threads,
        total_time_secs: total_time,
        sql: SqlStatistics {
            reads: counters.reads(),
            writes: counters.writes(),
            others: counters.others(),
            total_queries: queries,
            transactions,
            ignored_errors: counters.ignored_errors(),
            transactions_per_sec: transactions as f64 / total_time,
            queries_per_sec: queries as f64 / total_time,
        },
        latency_ms: LatencySummary {
            min: counters.latency_nano_min() as f64 / NANOS_PER_MILLI,
            avg: latency_avg_ms,
            max: counters.latency_nano_max() as f64 / NANOS_PER_MILLI,
            percentile: opts.percentile,
            percentile_value: histogram.percentile(opts.percentile),
            sum: counters.latency_nano_sum() as f64 / NANOS_PER_MILLI,
        },
        fairness: FairnessSummary {
            events_avg: fairness.events_avg,
            events_stddev: fairness.events_stddev,
            execution_time_avg_secs: fairness.time_avg_secs,
            execution_time_stddev_secs: fairness.time_stddev_secs,
        },
    }
}

/// Write the summary as pretty-printed JSON.
pub fn write_summary(path: &Path, summary: &ReportSummary) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create JSON output file: {}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), summary)
        .context("failed to serialize report summary")?;
    Ok(())
}
