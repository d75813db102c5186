//! Mock benchmark for testing
//!
//! A scriptable implementation of the [`Benchmark`] trait used by the driver
//! tests. The mock simulates transactions without touching a database: each
//! event's outcome is produced by a caller-supplied closure keyed on the
//! global call index, with an optional synthetic latency, and every
//! lifecycle call is counted so tests can assert the init/pre_event/done
//! discipline.
//!
//! # Example
//!
//! ```
//! use sqlpulse::benchmark::mock::MockBench;
//! use sqlpulse::benchmark::EventCounts;
//!
//! // Every event is a successful one-read transaction.
//! let bench = MockBench::new(|_call| {
//!     Ok(EventCounts { reads: 1, ..Default::default() })
//! });
//! assert_eq!(bench.init_calls(), 0);
//! ```

use super::{Benchmark, EventResult};
use crate::runner::cancel::CancelToken;
use crate::Result;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

type EventFn = dyn Fn(u64) -> EventResult + Send + Sync;

/// Scriptable in-process benchmark.
pub struct MockBench {
    on_event: Box<EventFn>,

    /// Synthetic per-event latency; zero means return immediately.
    event_delay: Duration,

    init_calls: AtomicU64,
    pre_event_calls: AtomicU64,
    prepare_calls: AtomicU64,
    done_calls: AtomicU64,
    events_seen: AtomicU64,
}

impl MockBench {
    /// Create a mock whose event outcomes come from `on_event`.
    ///
    /// The closure receives the 0-based global call index, so scripts can
    /// alternate outcomes or fail after a fixed number of successes.
    pub fn new(on_event: impl Fn(u64) -> EventResult + Send + Sync + 'static) -> Self {
        Self {
            on_event: Box::new(on_event),
            event_delay: Duration::ZERO,
            init_calls: AtomicU64::new(0),
            pre_event_calls: AtomicU64::new(0),
            prepare_calls: AtomicU64::new(0),
            done_calls: AtomicU64::new(0),
            events_seen: AtomicU64::new(0),
        }
    }

    /// Add a synthetic latency to every event.
    ///
    /// The sleep races the cancellation token, like a real database call
    /// honouring its context.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.event_delay = delay;
        self
    }

    pub fn init_calls(&self) -> u64 {
        self.init_calls.load(Ordering::Relaxed)
    }

    pub fn pre_event_calls(&self) -> u64 {
        self.pre_event_calls.load(Ordering::Relaxed)
    }

    pub fn prepare_calls(&self) -> u64 {
        self.prepare_calls.load(Ordering::Relaxed)
    }

    pub fn done_calls(&self) -> u64 {
        self.done_calls.load(Ordering::Relaxed)
    }

    pub fn events_seen(&self) -> u64 {
        self.events_seen.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl Benchmark for MockBench {
    async fn init(&self, _ctx: &CancelToken) -> Result<()> {
        self.init_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn pre_event(&self, _ctx: &CancelToken) -> Result<()> {
        self.pre_event_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn prepare(&self, _ctx: &CancelToken) -> Result<()> {
        self.prepare_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    async fn event(&self, ctx: &CancelToken) -> EventResult {
        let call = self.events_seen.fetch_add(1, Ordering::Relaxed);

        if !self.event_delay.is_zero() {
            tokio::select! {
                _ = ctx.cancelled() => return Err(super::EventError::Interrupted),
                _ = tokio::time::sleep(self.event_delay) => {}
            }
        }

        (self.on_event)(call)
    }

    async fn done(&self) -> Result<()> {
        self.done_calls.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
