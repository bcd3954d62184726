//! A lock-free progress counter shared across stage tasks (spec §4.11,
//! §5 "progress reporter never raises").

use std::sync::atomic::{AtomicU64, Ordering};

/// Number of records between progress updates / abort-flag checks, per
/// spec.md §4.11 and §5.
pub const PROGRESS_REPORT_INTERVAL: u64 = 1000;

#[derive(Default)]
pub struct ProgressReporter {
    emitted: AtomicU64,
}

impl ProgressReporter {
    pub fn new() -> Self {
        ProgressReporter::default()
    }

    /// Adds `delta` records to the running total, returning the new total.
    pub fn add(&self, delta: u64) -> u64 {
        self.emitted.fetch_add(delta, Ordering::Relaxed) + delta
    }

    pub fn total(&self) -> u64 {
        self.emitted.load(Ordering::Relaxed)
    }
}
