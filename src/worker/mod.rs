//! Worker task implementation
//!
//! Each worker runs an independent event loop against the shared benchmark
//! plug-in: dispatch one event, classify its outcome, commit the query
//! tallies, and record the latency of successful transactions in both
//! histograms. Workers share the counter set, the histograms and the
//! cancellation token; everything else is task-local.
//!
//! # Outcome classification
//!
//! - `Interrupted`: benign shutdown (deadline, cancel, torn-down
//!   transaction); the worker exits silently and nothing is counted
//! - `Fatal`: printed once, fires the cancellation token, and is handed
//!   back to the runner through the join
//! - `Ok` with `ignored_errors == 1`: the attempt's queries are counted
//!   but it is not a transaction and its latency is discarded
//! - `Ok` with `ignored_errors == 0`: a transaction, counted everywhere
//!   with its latency recorded

use crate::benchmark::{Benchmark, EventError};
use crate::runner::cancel::CancelToken;
use crate::stats::histogram::Histogram;
use crate::stats::{CounterSet, NANOS_PER_MILLI};
use std::sync::Arc;
use std::time::Instant;

/// Worker task driving one stream of benchmark events.
///
/// # Lifecycle
///
/// 1. **Creation**: [`Worker::new`] wires up the shared state
/// 2. **Execution**: [`Worker::run`] loops until shutdown
/// 3. **Completion**: returns the fatal error it observed, if any
pub struct Worker {
    /// Worker ID, also the index of this worker's per-thread slot
    id: usize,

    /// Event cap (`--events`); 0 means unlimited
    events: u64,

    /// Benchmark plug-in shared across all workers
    bench: Arc<dyn Benchmark>,

    /// Shared counters
    counters: Arc<CounterSet>,

    /// Never reset during the run; feeds the final report
    cumulative: Arc<Histogram>,

    /// Reset by the reporter each tick; feeds the progress lines
    interval: Arc<Histogram>,

    /// Shared shutdown token
    cancel: CancelToken,
}

impl Worker {
    pub fn new(
        id: usize,
        events: u64,
        bench: Arc<dyn Benchmark>,
        counters: Arc<CounterSet>,
        cumulative: Arc<Histogram>,
        interval: Arc<Histogram>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            id,
            events,
            bench,
            counters,
            cumulative,
            interval,
            cancel,
        }
    }

    /// Main event loop.
    ///
    /// Returns the fatal benchmark error that stopped this worker, or `None`
    /// on a clean shutdown.
    pub async fn run(self) -> Option<anyhow::Error> {
        loop {
            if self.cancel.is_cancelled() {
                return None;
            }

            // The cap counts dispatch attempts, not successes: stop
            // dispatching once attempts exceed it, even if some attempts
            // were ignored.
            let calls = self.counters.begin_event();
            if self.events > 0 && calls > self.events {
                return None;
            }

            let event_begin = Instant::now();
            let outcome = self.bench.event(&self.cancel).await;

            let counts = match outcome {
                Ok(counts) => counts,
                Err(EventError::Interrupted) => return None,
                Err(EventError::Fatal(err)) => {
                    println!("{err:#}");
                    tracing::debug!(worker = self.id, "fatal benchmark error, cancelling run");
                    self.cancel.cancel();
                    return Some(err);
                }
            };

            let latency_ns = event_begin.elapsed().as_nanos() as u64;

            self.counters.record_queries(
                counts.reads,
                counts.writes,
                counts.others,
                counts.ignored_errors,
            );

            // Only fully successful attempts count as transactions; an
            // ignored attempt contributes no latency sample.
            if counts.ignored_errors == 0 {
                self.counters.record_transaction(self.id, latency_ns);

                let latency_ms = latency_ns as f64 / NANOS_PER_MILLI;
                self.cumulative.add(latency_ms);
                self.interval.add(latency_ms);
            }

            // Completion fires on successful transactions reaching the cap.
            // This may race with the attempt check above; cancel is
            // idempotent, and the attempt cap rules out overshoot.
            if self.events > 0 && self.counters.transactions() == self.events {
                self.cancel.cancel();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::benchmark::mock::MockBench;
    use crate::benchmark::{EventCounts, EventError};
    use crate::runner::{HISTOGRAM_MAX_MS, HISTOGRAM_MIN_MS, HISTOGRAM_SIZE};
    use std::time::Duration;

    fn shared(threads: usize) -> (Arc<CounterSet>, Arc<Histogram>, Arc<Histogram>) {
        (
            Arc::new(CounterSet::new(threads)),
            Arc::new(Histogram::new(HISTOGRAM_SIZE, HISTOGRAM_MIN_MS, HISTOGRAM_MAX_MS)),
            Arc::new(Histogram::new(HISTOGRAM_SIZE, HISTOGRAM_MIN_MS, HISTOGRAM_MAX_MS)),
        )
    }

    async fn run_workers(
        threads: usize,
        events: u64,
        bench: Arc<MockBench>,
    ) -> (Arc<CounterSet>, Arc<Histogram>, Vec<Option<anyhow::Error>>) {
        let (counters, cumulative, interval) = shared(threads);
        let cancel = CancelToken::new();

        let mut handles = Vec::new();
        for id in 0..threads {
            let worker = Worker::new(
                id,
                events,
                bench.clone(),
                counters.clone(),
                cumulative.clone(),
                interval.clone(),
                cancel.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }
        (counters, cumulative, outcomes)
    }

    #[tokio::test]
    async fn test_counting_with_ignored_errors() {
        // Odd-numbered calls (0-based even index) succeed with (3,2,1);
        // even-numbered calls report an ignored error. Eight attempts yield
        // four transactions.
        let bench = Arc::new(MockBench::new(|call| {
            if call % 2 == 0 {
                Ok(EventCounts {
                    reads: 3,
                    writes: 2,
                    others: 1,
                    ignored_errors: 0,
                })
            } else {
                Ok(EventCounts {
                    ignored_errors: 1,
                    ..Default::default()
                })
            }
        }));

        let (counters, cumulative, outcomes) = run_workers(1, 8, bench).await;

        assert!(outcomes.into_iter().all(|o| o.is_none()));
        assert_eq!(counters.transactions(), 4);
        assert_eq!(counters.ignored_errors(), 4);
        assert_eq!(counters.reads(), 12);
        assert_eq!(counters.writes(), 8);
        assert_eq!(counters.others(), 4);
        assert_eq!(counters.queries(), 24);

        // Ignored attempts contribute no latency sample.
        assert_eq!(cumulative.len(), counters.transactions());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_deadline_shutdown() {
        let bench = Arc::new(
            MockBench::new(|_| {
                Ok(EventCounts {
                    reads: 1,
                    others: 1,
                    ..Default::default()
                })
            })
            .with_delay(Duration::from_millis(10)),
        );

        let (counters, cumulative, interval) = shared(4);
        let cancel = CancelToken::new();

        let mut handles = Vec::new();
        for id in 0..4 {
            let worker = Worker::new(
                id,
                0,
                bench.clone(),
                counters.clone(),
                cumulative.clone(),
                interval.clone(),
                cancel.clone(),
            );
            handles.push(tokio::spawn(worker.run()));
        }

        tokio::time::sleep(Duration::from_secs(1)).await;
        cancel.cancel();
        for handle in handles {
            assert!(handle.await.unwrap().is_none());
        }

        // ~100 events/sec/worker for one second, with generous slack for
        // scheduling noise.
        let transactions = counters.transactions();
        assert!(
            (4 * 60..=4 * 130).contains(&(transactions as usize)),
            "transactions = {}",
            transactions
        );

        let min_ms = counters.latency_nano_min() as f64 / NANOS_PER_MILLI;
        let max_ms = counters.latency_nano_max() as f64 / NANOS_PER_MILLI;
        assert!(min_ms >= 8.0 && min_ms <= 30.0, "min = {min_ms}ms");
        assert!(max_ms >= 8.0 && max_ms <= 200.0, "max = {max_ms}ms");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_event_cap_is_exact() {
        let bench = Arc::new(MockBench::new(|_| {
            Ok(EventCounts {
                reads: 1,
                ..Default::default()
            })
        }));

        let (counters, _, outcomes) = run_workers(2, 1000, bench).await;

        assert!(outcomes.into_iter().all(|o| o.is_none()));
        // No overshoot: dispatch stops once attempts exceed the cap, and
        // every dispatched attempt succeeded.
        assert_eq!(counters.transactions(), 1000);
        assert_eq!(counters.reads(), 1000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_fatal_error_stops_the_run() {
        let bench = Arc::new(MockBench::new(|call| {
            if call < 5 {
                Ok(EventCounts {
                    reads: 1,
                    ..Default::default()
                })
            } else {
                Err(EventError::Fatal(anyhow::anyhow!("server has gone away")))
            }
        }));

        let (counters, _, outcomes) = run_workers(2, 0, bench).await;

        let fatal: Vec<_> = outcomes.into_iter().flatten().collect();
        assert!(!fatal.is_empty());
        assert!(fatal[0].to_string().contains("server has gone away"));
        assert_eq!(counters.transactions(), 5);
    }

    #[tokio::test]
    async fn test_interrupted_event_exits_silently_without_counting() {
        let bench = Arc::new(MockBench::new(|call| {
            if call == 0 {
                Ok(EventCounts {
                    reads: 1,
                    ..Default::default()
                })
            } else {
                Err(EventError::Interrupted)
            }
        }));

        let (counters, cumulative, outcomes) = run_workers(1, 0, bench).await;

        assert!(outcomes.into_iter().all(|o| o.is_none()));
        assert_eq!(counters.transactions(), 1);
        assert_eq!(counters.event_calls(), 2);
        assert_eq!(cumulative.len(), 1);
    }
}
