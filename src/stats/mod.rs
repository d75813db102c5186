//! Statistics collection
//!
//! Lock-free statistics shared by all workers: atomic tallies for the query
//! breakdown, transactions and ignored errors, latency min/max/sum, and one
//! cache-line aligned slot per worker for the fairness report.
//!
//! # Concurrency
//!
//! - **Relaxed atomic adds** for every counter: increments are commutative
//!   and the readers (interval reporter, final aggregation) only need
//!   values that are consistent at a coarse tick or after the workers have
//!   joined
//! - **Compare-exchange retry loops** for the latency minimum and maximum,
//!   so concurrent updates cannot lose a bound
//! - **Single-writer per-thread slots**: worker `t` is the only writer of
//!   slot `t`; the slots are read after the join, which establishes the
//!   necessary happens-before edge

pub mod histogram;
pub mod live;

use std::sync::atomic::{AtomicU64, Ordering};

/// Nanoseconds per millisecond, for latency conversions in reports.
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;

/// Nanoseconds per second, for the fairness execution-time figures.
pub const NANOS_PER_SEC: f64 = 1_000_000_000.0;

/// Cache-line aligned atomic counter to prevent false sharing
///
/// When multiple threads update adjacent memory locations the shared cache
/// line bounces between cores. Padding each counter to 64 bytes gives every
/// counter its own line.
#[repr(align(64))]
#[derive(Debug)]
pub struct AlignedCounter {
    value: AtomicU64,
    _padding: [u8; 56],
}

impl AlignedCounter {
    /// Create a new counter with initial value 0
    pub fn new() -> Self {
        Self {
            value: AtomicU64::new(0),
            _padding: [0; 56],
        }
    }

    /// Increment the counter by the specified amount
    #[inline]
    pub fn add(&self, val: u64) {
        self.value.fetch_add(val, Ordering::Relaxed);
    }

    /// Increment by `val` and return the post-increment value
    #[inline]
    pub fn add_fetch(&self, val: u64) -> u64 {
        self.value.fetch_add(val, Ordering::Relaxed) + val
    }

    /// Get the current value of the counter
    #[inline]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl Default for AlignedCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-worker tallies, one cache line per worker.
///
/// Each slot has exactly one writer (its worker); readers wait for the join.
#[repr(align(64))]
#[derive(Debug, Default)]
pub struct ThreadSlot {
    transactions: AtomicU64,
    latency_nano_sum: AtomicU64,
}

impl ThreadSlot {
    #[inline]
    pub fn transactions(&self) -> u64 {
        self.transactions.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn latency_nano_sum(&self) -> u64 {
        self.latency_nano_sum.load(Ordering::Relaxed)
    }
}

/// Shared counters for one benchmark run.
///
/// Built once by the runner, written by every worker, sampled by the
/// interval reporter, and read for the final report after all workers have
/// joined.
#[derive(Debug)]
pub struct CounterSet {
    total_reads: AlignedCounter,
    total_writes: AlignedCounter,
    total_others: AlignedCounter,
    total_queries: AlignedCounter,
    total_transactions: AlignedCounter,
    total_ignored_errors: AlignedCounter,
    total_event_calls: AlignedCounter,

    latency_nano_min: AtomicU64,
    latency_nano_max: AtomicU64,
    latency_nano_sum: AlignedCounter,

    per_thread: Vec<ThreadSlot>,
}

impl CounterSet {
    /// Create a zeroed counter set sized for `threads` workers.
    pub fn new(threads: usize) -> Self {
        Self {
            total_reads: AlignedCounter::new(),
            total_writes: AlignedCounter::new(),
            total_others: AlignedCounter::new(),
            total_queries: AlignedCounter::new(),
            total_transactions: AlignedCounter::new(),
            total_ignored_errors: AlignedCounter::new(),
            total_event_calls: AlignedCounter::new(),
            latency_nano_min: AtomicU64::new(u64::MAX),
            latency_nano_max: AtomicU64::new(0),
            latency_nano_sum: AlignedCounter::new(),
            per_thread: (0..threads).map(|_| ThreadSlot::default()).collect(),
        }
    }

    /// Count one event dispatch attempt; returns the post-increment total.
    ///
    /// The event cap compares against this value so workers stop dispatching
    /// once the number of attempts exceeds the cap, even when earlier
    /// attempts were ignored.
    #[inline]
    pub fn begin_event(&self) -> u64 {
        self.total_event_calls.add_fetch(1)
    }

    /// Record the query breakdown of one event attempt.
    ///
    /// Applies to every attempt, successful or ignored: queries that ran
    /// before an ignorable failure are still counted.
    pub fn record_queries(&self, reads: u64, writes: u64, others: u64, ignored_errors: u64) {
        self.total_reads.add(reads);
        self.total_writes.add(writes);
        self.total_others.add(others);
        self.total_queries.add(reads + writes + others);
        self.total_ignored_errors.add(ignored_errors);
    }

    /// Record one successful transaction and its latency for worker `thread`.
    pub fn record_transaction(&self, thread: usize, latency_ns: u64) {
        self.total_transactions.add(1);
        self.latency_nano_sum.add(latency_ns);

        let slot = &self.per_thread[thread];
        slot.transactions.fetch_add(1, Ordering::Relaxed);
        slot.latency_nano_sum.fetch_add(latency_ns, Ordering::Relaxed);

        // Lock-free min/max: retry until our bound sticks or a tighter one
        // is already in place.
        let mut current = self.latency_nano_min.load(Ordering::Relaxed);
        while latency_ns < current {
            match self.latency_nano_min.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => current = x,
            }
        }

        let mut current = self.latency_nano_max.load(Ordering::Relaxed);
        while latency_ns > current {
            match self.latency_nano_max.compare_exchange_weak(
                current,
                latency_ns,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(x) => current = x,
            }
        }
    }

    #[inline]
    pub fn reads(&self) -> u64 {
        self.total_reads.get()
    }

    #[inline]
    pub fn writes(&self) -> u64 {
        self.total_writes.get()
    }

    #[inline]
    pub fn others(&self) -> u64 {
        self.total_others.get()
    }

    #[inline]
    pub fn queries(&self) -> u64 {
        self.total_queries.get()
    }

    #[inline]
    pub fn transactions(&self) -> u64 {
        self.total_transactions.get()
    }

    #[inline]
    pub fn ignored_errors(&self) -> u64 {
        self.total_ignored_errors.get()
    }

    #[inline]
    pub fn event_calls(&self) -> u64 {
        self.total_event_calls.get()
    }

    /// Minimum transaction latency in nanoseconds, 0 when nothing completed.
    #[inline]
    pub fn latency_nano_min(&self) -> u64 {
        let val = self.latency_nano_min.load(Ordering::Relaxed);
        if val == u64::MAX {
            0
        } else {
            val
        }
    }

    #[inline]
    pub fn latency_nano_max(&self) -> u64 {
        self.latency_nano_max.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn latency_nano_sum(&self) -> u64 {
        self.latency_nano_sum.get()
    }

    /// Number of per-thread slots (the worker count of this run).
    pub fn threads(&self) -> usize {
        self.per_thread.len()
    }

    /// Per-thread slots, valid to read once all workers have joined.
    pub fn per_thread(&self) -> &[ThreadSlot] {
        &self.per_thread
    }

    /// Compute the thread-fairness figures for the final report.
    pub fn fairness(&self) -> Fairness {
        let threads = self.per_thread.len() as f64;

        let events_avg = self.transactions() as f64 / threads;
        let latency_nano_avg = self.latency_nano_sum() as f64 / threads;

        let mut events_var = 0.0;
        let mut latency_var = 0.0;
        for slot in &self.per_thread {
            let diff_t = events_avg - slot.transactions() as f64;
            events_var += diff_t * diff_t;

            let diff_l = latency_nano_avg - slot.latency_nano_sum() as f64;
            latency_var += diff_l * diff_l;
        }

        Fairness {
            events_avg,
            events_stddev: (events_var / threads).sqrt(),
            time_avg_secs: latency_nano_avg / NANOS_PER_SEC,
            time_stddev_secs: (latency_var / threads).sqrt() / NANOS_PER_SEC,
        }
    }
}

/// Per-thread event distribution, as printed in the final report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fairness {
    pub events_avg: f64,
    pub events_stddev: f64,
    pub time_avg_secs: f64,
    pub time_stddev_secs: f64,
}
