//! SQLPulse - OLTP database load generator
//!
//! SQLPulse drives a relational database with a configurable number of
//! concurrent workers, executing a fixed transaction script per event and
//! reporting sysbench-compatible latency and throughput statistics.
//!
//! # Architecture
//!
//! - **Pluggable benchmarks**: the driver consumes an abstract [`Benchmark`]
//!   trait; the built-in OLTP plug-in speaks MySQL and PostgreSQL
//! - **Lock-free counters**: shared atomic tallies for queries, transactions
//!   and ignored errors, plus single-writer per-thread slots
//! - **Log-bucketed histograms**: cumulative and per-interval latency
//!   distributions with percentile queries
//! - **Coordinated shutdown**: one cancellation token driven by the deadline,
//!   signals, the event cap, or a fatal benchmark error

pub mod benchmark;
pub mod config;
pub mod output;
pub mod runner;
pub mod stats;
pub mod worker;

// Re-export commonly used types
pub use benchmark::Benchmark;
pub use runner::Runner;

/// Result type used throughout SQLPulse
pub type Result<T> = anyhow::Result<T>;
