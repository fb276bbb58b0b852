//! Shared byte counters for aggregate download progress.
//!
//! One `ProgressCounters` instance is shared (via `Arc`) by every concurrent
//! download worker for the lifetime of a run. Workers add each resource's
//! declared size to the total as it becomes known and bump the transferred
//! count per received chunk; the progress UI polls a consistent snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

/// Aggregate (total, transferred) byte counters for one run.
///
/// Both counters are monotonically non-decreasing. `total_bytes` is the sum of
/// all resources' declared `Content-Length` values, accumulated as each
/// response arrives; resources without a declared length leave the total
/// partial, in which case percentage progress cannot be computed and only
/// absolute bytes are meaningful.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    total_bytes: AtomicU64,
    transferred_bytes: AtomicU64,
}

impl ProgressCounters {
    /// Creates counters starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a resource's declared size to the expected total.
    pub fn add_expected(&self, bytes: u64) {
        self.total_bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Records bytes received by a worker.
    pub fn add_transferred(&self, bytes: u64) {
        self.transferred_bytes.fetch_add(bytes, Ordering::SeqCst);
    }

    /// Returns the expected total in bytes so far.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_bytes.load(Ordering::SeqCst)
    }

    /// Returns the bytes transferred so far, across all workers.
    #[must_use]
    pub fn transferred(&self) -> u64 {
        self.transferred_bytes.load(Ordering::SeqCst)
    }

    /// Returns `(transferred, total)` as one observation.
    #[must_use]
    pub fn snapshot(&self) -> (u64, u64) {
        (self.transferred(), self.total())
    }
}
