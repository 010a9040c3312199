//! Prometheus metrics for scanner monitoring.
//!
//! # Metrics Exposed
//!
//! - `barcode_scan_scanning` - 1 while the sampler is active
//! - `barcode_scan_paused` - 1 while the session is paused
//! - `barcode_scan_ticks_total` - Sampler ticks fired
//! - `barcode_scan_dropped_ticks_total` - Ticks skipped during a running decode
//! - `barcode_scan_frame_errors_total` - Ticks without a grabbed frame
//! - `barcode_scan_decodes_total` - Decode attempts
//! - `barcode_scan_decode_misses_total` - Decode attempts without a result
//! - `barcode_scan_confirmed_total` - Confirmed values delivered
//!
//! With the `metrics` feature, [`MetricsServer`] serves them over HTTP.

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
