//! Usage counters for a pool.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use serde::Serialize;

/// Snapshot of a pool's lifetime counters
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    /// Successful acquisitions
    pub acquired: u64,

    /// Connections handed back (explicitly or by drop)
    pub released: u64,

    /// Bounded acquisitions that gave up
    pub timed_out: u64,

    /// Connections closed by the pool
    pub closed: u64,

    /// Connections detached by callers and no longer tracked
    pub detached: u64,

    /// Highest number of connections held by callers at the same time
    pub peak_held: usize,
}

#[derive(Debug, Default)]
pub(crate) struct PoolCounters {
    acquired: AtomicU64,
    released: AtomicU64,
    timed_out: AtomicU64,
    closed: AtomicU64,
    detached: AtomicU64,
    peak_held: AtomicUsize,
}

impl PoolCounters {
    pub(crate) fn record_acquire(&self, held: usize) {
        self.acquired.fetch_add(1, Ordering::Relaxed);
        self.peak_held.fetch_max(held, Ordering::Relaxed);
    }

    pub(crate) fn record_release(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_timeout(&self) {
        self.timed_out.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_closed(&self, count: usize) {
        self.closed.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_detach(&self) {
        self.detached.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> PoolStats {
        PoolStats {
            acquired: self.acquired.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            timed_out: self.timed_out.load(Ordering::Relaxed),
            closed: self.closed.load(Ordering::Relaxed),
            detached: self.detached.load(Ordering::Relaxed),
            peak_held: self.peak_held.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_only_grows() {
        let counters = PoolCounters::default();
        counters.record_acquire(3);
        counters.record_acquire(1);

        let stats = counters.snapshot();
        assert_eq!(stats.acquired, 2);
        assert_eq!(stats.peak_held, 3);
    }
}
