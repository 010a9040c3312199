//! Metrics collection and registry.

use crate::scanner::{ScanStatsSnapshot, ScannerState};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of scanner state for metrics update.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    /// Whether the sampler is currently active.
    pub scanning: bool,
    /// Whether a session is paused.
    pub paused: bool,
    /// Session counters.
    pub stats: ScanStatsSnapshot,
}

impl MetricsSnapshot {
    pub fn new(state: ScannerState, stats: ScanStatsSnapshot) -> Self {
        Self {
            scanning: state == ScannerState::Scanning,
            paused: state == ScannerState::Paused,
            stats,
        }
    }
}

/// Prometheus metrics registry for scanner monitoring.
pub struct MetricsRegistry {
    registry: Registry,

    scanning: IntGauge,
    paused: IntGauge,

    ticks_total: IntCounter,
    dropped_ticks_total: IntCounter,
    frame_errors_total: IntCounter,
    decodes_total: IntCounter,
    misses_total: IntCounter,
    confirmed_total: IntCounter,

    /// Counters are per session; these hold what was already exported.
    exported: ScanStatsSnapshot,
}

impl MetricsRegistry {
    /// Creates a new registry with all scanner metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let scanning = IntGauge::new(
            "barcode_scan_scanning",
            "Whether the sampler is active (1=scanning, 0=idle or paused)",
        )?;
        let paused = IntGauge::new("barcode_scan_paused", "Whether the session is paused")?;
        let ticks_total = IntCounter::new("barcode_scan_ticks_total", "Sampler ticks fired")?;
        let dropped_ticks_total = IntCounter::new(
            "barcode_scan_dropped_ticks_total",
            "Ticks skipped while a decode was still running",
        )?;
        let frame_errors_total = IntCounter::new(
            "barcode_scan_frame_errors_total",
            "Ticks where no frame could be grabbed",
        )?;
        let decodes_total =
            IntCounter::new("barcode_scan_decodes_total", "Decode attempts completed")?;
        let misses_total = IntCounter::new(
            "barcode_scan_decode_misses_total",
            "Decode attempts without a result",
        )?;
        let confirmed_total = IntCounter::new(
            "barcode_scan_confirmed_total",
            "Confirmed values delivered to the callback",
        )?;

        registry.register(Box::new(scanning.clone()))?;
        registry.register(Box::new(paused.clone()))?;
        registry.register(Box::new(ticks_total.clone()))?;
        registry.register(Box::new(dropped_ticks_total.clone()))?;
        registry.register(Box::new(frame_errors_total.clone()))?;
        registry.register(Box::new(decodes_total.clone()))?;
        registry.register(Box::new(misses_total.clone()))?;
        registry.register(Box::new(confirmed_total.clone()))?;

        Ok(Self {
            registry,
            scanning,
            paused,
            ticks_total,
            dropped_ticks_total,
            frame_errors_total,
            decodes_total,
            misses_total,
            confirmed_total,
            exported: ScanStatsSnapshot::default(),
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Session counters restart at zero on every `start`; a snapshot with
    /// smaller counters than the previous one is treated as a new session.
    pub fn update(&mut self, snapshot: &MetricsSnapshot) {
        self.scanning.set(i64::from(snapshot.scanning));
        self.paused.set(i64::from(snapshot.paused));

        let stats = snapshot.stats;
        if stats.ticks < self.exported.ticks {
            self.exported = ScanStatsSnapshot::default();
        }

        let prev = self.exported;
        self.ticks_total.inc_by(stats.ticks.saturating_sub(prev.ticks));
        self.dropped_ticks_total
            .inc_by(stats.dropped_ticks.saturating_sub(prev.dropped_ticks));
        self.frame_errors_total
            .inc_by(stats.frame_errors.saturating_sub(prev.frame_errors));
        self.decodes_total
            .inc_by(stats.decodes.saturating_sub(prev.decodes));
        self.misses_total.inc_by(stats.misses.saturating_sub(prev.misses));
        self.confirmed_total
            .inc_by(stats.confirmed.saturating_sub(prev.confirmed));

        self.exported = stats;
    }

    /// Returns the underlying Prometheus registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}
