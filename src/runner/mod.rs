//! Benchmark lifecycle orchestration
//!
//! The [`Runner`] owns a run from option validation to the final report:
//! it builds the shared state (counters and histograms), walks the
//! benchmark through `init` and `pre_event`, spawns the workers and the
//! optional interval reporter, and then waits for whichever shutdown cause
//! fires first: the wall-clock deadline, SIGINT/SIGTERM, a cancellation
//! raised by a worker (event cap reached or fatal error), or every worker
//! exiting on its own. After the join it calls `done` exactly once and
//! prints the sysbench-compatible report.

pub mod cancel;

use crate::benchmark::Benchmark;
use crate::config::RunnerOpts;
use crate::output;
use crate::runner::cancel::CancelToken;
use crate::stats::histogram::Histogram;
use crate::stats::CounterSet;
use crate::worker::Worker;
use crate::Result;
use anyhow::Context;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Number of histogram buckets.
pub const HISTOGRAM_SIZE: usize = 1024;
/// Lower bound of the histogram range in milliseconds.
pub const HISTOGRAM_MIN_MS: f64 = 0.001;
/// Upper bound of the histogram range in milliseconds.
pub const HISTOGRAM_MAX_MS: f64 = 100_000.0;

/// Drives a [`Benchmark`] through the `prepare` or `run` lifecycle.
pub struct Runner {
    opts: RunnerOpts,
    bench: Arc<dyn Benchmark>,
}

impl Runner {
    pub fn new(opts: RunnerOpts, bench: Arc<dyn Benchmark>) -> Self {
        Self { opts, bench }
    }

    /// Non-benchmarking mode: `init` → `prepare` → `done`, each fatal on
    /// error.
    pub async fn prepare(&self) -> Result<()> {
        let ctx = CancelToken::new();

        self.bench.init(&ctx).await?;
        self.bench.prepare(&ctx).await?;
        self.bench.done().await?;

        Ok(())
    }

    /// Benchmarking mode: the full measured run.
    pub async fn run(&self) -> Result<()> {
        let opts = &self.opts;

        if opts.percentile < 1 || opts.percentile > 100 {
            anyhow::bail!("--percentile must be between 1 and 100");
        }
        if opts.threads == 0 {
            anyhow::bail!("--threads must be at least 1");
        }

        // Install the signal stream before anything is running, so a failure
        // here cannot leave workers unjoined or `done` uncalled.
        #[cfg(unix)]
        let mut sigterm =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
                .context("failed to install SIGTERM handler")?;

        let counters = Arc::new(CounterSet::new(opts.threads));
        let cumulative = Arc::new(Histogram::new(
            HISTOGRAM_SIZE,
            HISTOGRAM_MIN_MS,
            HISTOGRAM_MAX_MS,
        ));
        let interval = Arc::new(Histogram::new(
            HISTOGRAM_SIZE,
            HISTOGRAM_MIN_MS,
            HISTOGRAM_MAX_MS,
        ));

        println!("Running the test with following options:");
        println!("Number of threads: {}", opts.threads);
        if opts.report_interval > 0 {
            println!(
                "Report intermediate results every {} second(s)\n\n",
                opts.report_interval
            );
        }

        let ctx = CancelToken::new();

        self.bench.init(&ctx).await?;

        if let Err(err) = self.bench.pre_event(&ctx).await {
            // init succeeded, so resources exist and must be released.
            let _ = self.bench.done().await;
            return Err(err);
        }

        let begin = Instant::now();

        if opts.report_interval > 0 {
            let reporter = crate::stats::live::IntervalReporter::new(
                opts.report_interval,
                opts.threads,
                opts.percentile,
                Arc::clone(&counters),
                Arc::clone(&interval),
                ctx.clone(),
            );
            tokio::spawn(reporter.run());
        }

        // Workers hold a clone of done_tx; the channel closing is the
        // "every worker exited on its own" shutdown cause.
        let (done_tx, mut done_rx) = mpsc::channel::<()>(1);
        let mut handles = Vec::with_capacity(opts.threads);
        for id in 0..opts.threads {
            let worker = Worker::new(
                id,
                opts.events,
                Arc::clone(&self.bench),
                Arc::clone(&counters),
                Arc::clone(&cumulative),
                Arc::clone(&interval),
                ctx.clone(),
            );
            let done_tx = done_tx.clone();
            handles.push(tokio::spawn(async move {
                let outcome = worker.run().await;
                drop(done_tx);
                outcome
            }));
        }
        drop(done_tx);

        // Wait for the first shutdown cause: deadline, signal, a worker
        // firing the token, or every worker exiting on its own.
        let deadline = Duration::from_secs(opts.time);
        #[cfg(unix)]
        {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!("\nShutdown signal received. Exiting...");
                }
                _ = sigterm.recv() => {
                    println!("\nShutdown signal received. Exiting...");
                }
                _ = ctx.cancelled() => {}
                _ = done_rx.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = tokio::time::sleep(deadline) => {}
                _ = tokio::signal::ctrl_c() => {
                    println!("\nShutdown signal received. Exiting...");
                }
                _ = ctx.cancelled() => {}
                _ = done_rx.recv() => {}
            }
        }
        ctx.cancel();

        let mut fatal: Option<anyhow::Error> = None;
        for handle in handles {
            match handle.await {
                Ok(Some(err)) => {
                    fatal.get_or_insert(err);
                }
                Ok(None) => {}
                Err(join_err) => {
                    fatal.get_or_insert_with(|| {
                        anyhow::anyhow!("worker task panicked: {join_err}")
                    });
                }
            }
        }

        let total_time = begin.elapsed().as_secs_f64();

        let done_result = self.bench.done().await;

        if opts.histogram {
            println!("Latency histogram (values are in milliseconds)");
            cumulative.print();
            println!();
        }

        output::text::print_report(opts, &counters, &cumulative, total_time);

        if let Some(path) = &opts.json_output {
            let summary = output::json::build_summary(opts, &counters, &cumulative, total_time);
            output::json::write_summary(path, &summary)?;
        }

        if let Some(err) = fatal {
            return Err(err);
        }
        done_result
    }
}
