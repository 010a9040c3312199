//! Per-session sampling counters.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the sampler and decode tasks.
#[derive(Debug, Default)]
pub struct ScanStats {
    ticks: AtomicU64,
    dropped_ticks: AtomicU64,
    frame_errors: AtomicU64,
    decodes: AtomicU64,
    misses: AtomicU64,
    confirmed: AtomicU64,
}

/// Point-in-time copy of [`ScanStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStatsSnapshot {
    /// Timer callbacks fired.
    pub ticks: u64,
    /// Ticks skipped because the previous decode still held the raster.
    pub dropped_ticks: u64,
    /// Ticks where no frame could be grabbed.
    pub frame_errors: u64,
    /// Decode attempts completed.
    pub decodes: u64,
    /// Decode attempts that produced nothing.
    pub misses: u64,
    /// Values handed to the callback.
    pub confirmed: u64,
}

impl ScanStats {
    pub(crate) fn record_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_dropped(&self) {
        self.dropped_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_frame_error(&self) {
        self.frame_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_decode(&self, hit: bool, confirmed: bool) {
        self.decodes.fetch_add(1, Ordering::Relaxed);
        if !hit {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
        if confirmed {
            self.confirmed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> ScanStatsSnapshot {
        ScanStatsSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            dropped_ticks: self.dropped_ticks.load(Ordering::Relaxed),
            frame_errors: self.frame_errors.load(Ordering::Relaxed),
            decodes: self.decodes.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            confirmed: self.confirmed.load(Ordering::Relaxed),
        }
    }
}
