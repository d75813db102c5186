//! Periodic progress reporting
//!
//! When `--report-interval` is set, a dedicated task prints one progress
//! line per tick: throughput deltas since the previous tick and the
//! latency percentile of the interval histogram, which is reset as part of
//! the same read so each line shows the tail of its own window rather than
//! the cumulative one.
//!
//! Cumulative counters are only ever incremented during a run, so the
//! unsigned delta arithmetic cannot underflow.

use crate::runner::cancel::CancelToken;
use crate::stats::histogram::Histogram;
use crate::stats::CounterSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};

/// Snapshot of the cumulative counters at one tick.
#[derive(Debug, Clone, Copy, Default)]
struct Snapshot {
    queries: u64,
    transactions: u64,
    reads: u64,
    writes: u64,
    others: u64,
    ignored_errors: u64,
}

impl Snapshot {
    fn capture(counters: &CounterSet) -> Self {
        Self {
            queries: counters.queries(),
            transactions: counters.transactions(),
            reads: counters.reads(),
            writes: counters.writes(),
            others: counters.others(),
            ignored_errors: counters.ignored_errors(),
        }
    }
}

/// Periodic progress reporter.
///
/// Runs on its own task; exits when the cancellation token fires.
pub struct IntervalReporter {
    interval_secs: u64,
    threads: usize,
    percentile: u32,
    counters: Arc<CounterSet>,
    interval_histogram: Arc<Histogram>,
    cancel: CancelToken,
}

impl IntervalReporter {
    pub fn new(
        interval_secs: u64,
        threads: usize,
        percentile: u32,
        counters: Arc<CounterSet>,
        interval_histogram: Arc<Histogram>,
        cancel: CancelToken,
    ) -> Self {
        Self {
            interval_secs,
            threads,
            percentile,
            counters,
            interval_histogram,
            cancel,
        }
    }

    /// Tick until cancelled, printing one progress line per interval.
    pub async fn run(self) {
        let period = Duration::from_secs(self.interval_secs);
        let begin = Instant::now();

        // First tick after one full interval, not immediately.
        let mut ticker = tokio::time::interval_at(begin + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let intervalf = self.interval_secs as f64;
        let mut last = Snapshot::default();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = ticker.tick() => {
                    let current = Snapshot::capture(&self.counters);

                    println!(
                        "[ {:.0}s ] thds: {} tps: {:.2} qps: {:.2} (r/w/o: {:.2}/{:.2}/{:.2}) lat (ms,{}%): {:.2} err/s {:.2} reconn/s: N/A",
                        begin.elapsed().as_secs_f64(),
                        self.threads,
                        (current.transactions - last.transactions) as f64 / intervalf,
                        (current.queries - last.queries) as f64 / intervalf,
                        (current.reads - last.reads) as f64 / intervalf,
                        (current.writes - last.writes) as f64 / intervalf,
                        (current.others - last.others) as f64 / intervalf,
                        self.percentile,
                        self.interval_histogram.percentile_and_reset(self.percentile),
                        (current.ignored_errors - last.ignored_errors) as f64 / intervalf,
                    );

                    last = current;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::{HISTOGRAM_MAX_MS, HISTOGRAM_MIN_MS, HISTOGRAM_SIZE};

    #[test]
    fn test_snapshot_captures_counters() {
        let counters = CounterSet::new(1);
        counters.record_queries(3, 2, 1, 1);
        counters.record_transaction(0, 1_000_000);

        let snapshot = Snapshot::capture(&counters);
        assert_eq!(snapshot.reads, 3);
        assert_eq!(snapshot.writes, 2);
        assert_eq!(snapshot.others, 1);
        assert_eq!(snapshot.queries, 6);
        assert_eq!(snapshot.ignored_errors, 1);
        assert_eq!(snapshot.transactions, 1);
    }

    #[test]
    fn test_interval_histogram_windows_the_tail() {
        // Steady 2ms samples, then one 500ms outlier, then steady again:
        // each window's percentile reflects only its own samples.
        let hist = Histogram::new(HISTOGRAM_SIZE, HISTOGRAM_MIN_MS, HISTOGRAM_MAX_MS);

        for _ in 0..100 {
            hist.add(2.0);
        }
        let p99 = hist.percentile_and_reset(99);
        assert!(p99 > 1.5 && p99 < 2.5, "window 1 p99 = {p99}");

        for _ in 0..50 {
            hist.add(2.0);
        }
        hist.add(500.0);
        let p99 = hist.percentile_and_reset(99);
        assert!(p99 > 400.0 && p99 < 600.0, "window 2 p99 = {p99}");

        for _ in 0..100 {
            hist.add(2.0);
        }
        let p99 = hist.percentile_and_reset(99);
        assert!(p99 > 1.5 && p99 < 2.5, "window 3 p99 = {p99}");
    }

    #[tokio::test]
    async fn test_reporter_exits_on_cancel() {
        let counters = Arc::new(CounterSet::new(1));
        let hist = Arc::new(Histogram::new(
            HISTOGRAM_SIZE,
            HISTOGRAM_MIN_MS,
            HISTOGRAM_MAX_MS,
        ));
        let cancel = CancelToken::new();

        let reporter = IntervalReporter::new(1, 1, 95, counters, hist, cancel.clone());
        let handle = tokio::spawn(reporter.run());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("reporter should exit promptly on cancel")
            .unwrap();
    }
}
