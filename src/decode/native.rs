//! Contract for a host-provided barcode recognition capability.

use super::Symbology;
use crate::sampling::RasterSurface;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// One candidate reported by a native detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedBarcode {
    /// Decoded payload.
    pub raw_value: String,
    pub format: Symbology,
}

/// Errors a native detector may report.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("detector failure: {0}")]
    Internal(String),
}

/// Future returned by [`BarcodeDetector::detect`].
pub type DetectFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Vec<DetectedBarcode>, DetectError>> + Send + 'a>>;

/// Platform barcode recognition, queried asynchronously.
///
/// Implementations return every candidate they find, best first. An empty
/// list means no symbol was seen.
pub trait BarcodeDetector: Send + Sync {
    /// Symbologies this detector can recognize.
    fn formats(&self) -> &[Symbology];

    fn detect<'a>(&'a self, raster: &'a RasterSurface) -> DetectFuture<'a>;
}
