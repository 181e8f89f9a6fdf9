//! Request outcome counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;

/// Atomic counters tracking request outcomes for one client.
#[derive(Debug, Default)]
pub struct RequestTracker {
    requests_made: AtomicU64,
    requests_succeeded: AtomicU64,
    requests_retried: AtomicU64,
    requests_failed: AtomicU64,
    /// Cumulative backoff time in milliseconds.
    total_backoff_ms: AtomicU64,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_succeeded.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self, backoff: Duration) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_retried.fetch_add(1, Ordering::Relaxed);
        self.total_backoff_ms
            .fetch_add(backoff.as_millis() as u64, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.requests_made.fetch_add(1, Ordering::Relaxed);
        self.requests_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot the current counters.
    pub fn summary(&self) -> FetchStats {
        FetchStats {
            requests_made: self.requests_made.load(Ordering::Relaxed),
            requests_succeeded: self.requests_succeeded.load(Ordering::Relaxed),
            requests_retried: self.requests_retried.load(Ordering::Relaxed),
            requests_failed: self.requests_failed.load(Ordering::Relaxed),
            total_backoff_secs: self.total_backoff_ms.load(Ordering::Relaxed) as f64 / 1000.0,
        }
    }
}

/// Immutable snapshot of tracker counters for display.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FetchStats {
    pub requests_made: u64,
    pub requests_succeeded: u64,
    pub requests_retried: u64,
    pub requests_failed: u64,
    pub total_backoff_secs: f64,
}
