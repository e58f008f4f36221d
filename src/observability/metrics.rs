//! Metrics registry
//!
//! - Counters only
//! - Monotonic increase
//! - Reset only on process start

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters for queries, datasets and the scheduler
///
/// All counters use Relaxed atomics; readers only need eventual values.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Queries that produced a result
    queries_executed: AtomicU64,
    /// Queries rejected by validation or dataset lookup
    queries_rejected: AtomicU64,
    /// Queries that exceeded the row cap
    queries_too_large: AtomicU64,
    /// Rows returned across all successful queries
    rows_returned: AtomicU64,
    /// Datasets loaded from disk or inserted
    datasets_loaded: AtomicU64,
    /// Sections given a room and slot
    sections_scheduled: AtomicU64,
    /// Sections the scheduler could not place
    sections_unplaced: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    // Query metrics

    pub fn increment_queries_executed(&self) {
        self.queries_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_rejected(&self) {
        self.queries_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_queries_too_large(&self) {
        self.queries_too_large.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_rows_returned(&self, rows: u64) {
        self.rows_returned.fetch_add(rows, Ordering::Relaxed);
    }

    // Dataset metrics

    pub fn add_datasets_loaded(&self, count: u64) {
        self.datasets_loaded.fetch_add(count, Ordering::Relaxed);
    }

    // Scheduler metrics

    pub fn add_sections_scheduled(&self, count: u64) {
        self.sections_scheduled.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_sections_unplaced(&self, count: u64) {
        self.sections_unplaced.fetch_add(count, Ordering::Relaxed);
    }

    /// Snapshot of all counters as a JSON object string
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            queries_executed: self.queries_executed.load(Ordering::Relaxed),
            queries_rejected: self.queries_rejected.load(Ordering::Relaxed),
            queries_too_large: self.queries_too_large.load(Ordering::Relaxed),
            rows_returned: self.rows_returned.load(Ordering::Relaxed),
            datasets_loaded: self.datasets_loaded.load(Ordering::Relaxed),
            sections_scheduled: self.sections_scheduled.load(Ordering::Relaxed),
            sections_unplaced: self.sections_unplaced.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct MetricsSnapshot {
    pub queries_executed: u64,
    pub queries_rejected: u64,
    pub queries_too_large: u64,
    pub rows_returned: u64,
    pub datasets_loaded: u64,
    pub sections_scheduled: u64,
    pub sections_unplaced: u64,
}
