//! Packet processing counters.
//!
//! Two increment-only counters shared between the mutation engine and the
//! acquisition loop's periodic report. Plain atomics so they are safe to
//! touch from any context without locking.

use std::sync::atomic::{AtomicU64, Ordering};

/// Increment-only counters for packet processing.
#[derive(Debug, Default)]
pub struct Stats {
    inspected: AtomicU64,
    rewritten: AtomicU64,
}

/// Process-wide statistics instance.
static STATS: Stats = Stats::new();

/// Returns the process-wide statistics instance.
pub fn global() -> &'static Stats {
    &STATS
}

impl Stats {
    pub const fn new() -> Self {
        Self {
            inspected: AtomicU64::new(0),
            rewritten: AtomicU64::new(0),
        }
    }

    /// Records one packet handed to the mutation engine.
    pub fn count_inspected(&self) {
        self.inspected.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one successful User-Agent rewrite.
    pub fn count_rewritten(&self) {
        self.rewritten.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inspected(&self) -> u64 {
        self.inspected.load(Ordering::Relaxed)
    }

    pub fn rewritten(&self) -> u64 {
        self.rewritten.load(Ordering::Relaxed)
    }
}
