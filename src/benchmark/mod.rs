//! Benchmark abstraction
//!
//! This module defines the contract between the driver and a benchmark
//! plug-in. A plug-in owns everything database-specific: connection
//! handling, the transaction script, and the classification of driver
//! errors. The driver only sees the five lifecycle operations and the
//! sum-typed outcome of each event.
//!
//! # Lifecycle
//!
//! 1. `init`: open resources once at startup
//! 2. `pre_event`: called exactly once after `init` and before any worker
//!    starts (prepare statements, warm caches)
//! 3. `event`: one transaction attempt, called concurrently from every
//!    worker
//! 4. `done`: release resources, called once after all workers exit
//!
//! `prepare` is the alternative one-shot path used by the `prepare`
//! subcommand (schema creation and seeding); it never runs concurrently
//! with `event`.

pub mod mock;
pub mod oltp;

use crate::runner::cancel::CancelToken;
use crate::Result;
use async_trait::async_trait;
use thiserror::Error;

/// Query breakdown of one event attempt.
///
/// `ignored_errors` is 0 or 1: set when the plug-in classified a failure as
/// ignorable (deadlock, serialization conflict). Queries that completed
/// before the failure are still counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounts {
    pub reads: u64,
    pub writes: u64,
    pub others: u64,
    pub ignored_errors: u64,
}

/// Failure modes of a single event.
#[derive(Debug, Error)]
pub enum EventError {
    /// Benign shutdown: the deadline elapsed, the run was cancelled, or the
    /// transaction was already torn down underneath the script. Stops the
    /// producing worker silently.
    #[error("benchmark event interrupted")]
    Interrupted,

    /// Anything else. Printed once, cancels the run, and becomes the
    /// runner's return value.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

/// Outcome of one call to [`Benchmark::event`].
pub type EventResult = std::result::Result<EventCounts, EventError>;

/// A benchmark plug-in.
///
/// Shared by reference across all workers; `event` must be safe to call
/// from many tasks in parallel (the plug-in's own pool handles fan-out).
/// The token passed to each operation is the run's cancellation token, so
/// long-running database calls can abort promptly at shutdown.
#[async_trait]
pub trait Benchmark: Send + Sync {
    /// Open resources. Called exactly once, before anything else.
    async fn init(&self, ctx: &CancelToken) -> Result<()>;

    /// One-shot hook between `init` and the first `event`.
    async fn pre_event(&self, _ctx: &CancelToken) -> Result<()> {
        Ok(())
    }

    /// Schema creation and seeding for the `prepare` subcommand.
    async fn prepare(&self, _ctx: &CancelToken) -> Result<()> {
        Ok(())
    }

    /// Execute one transaction attempt.
    async fn event(&self, ctx: &CancelToken) -> EventResult;

    /// Release resources. Called exactly once, after all workers exit.
    async fn done(&self) -> Result<()>;
}
