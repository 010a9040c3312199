//! Decoder adapter.
//!
//! Wraps whichever decoding capability the host offers behind one
//! operation: raster in, optional decoded string out. Every failure inside
//! a strategy (malformed raster, no symbol, library fault) becomes `None`.
//!
//! # Strategies
//!
//! - **Native**: an injected [`BarcodeDetector`], queried asynchronously.
//!   The first candidate's raw value is used.
//! - **Software**: a [`SoftwareReader`] restricted to one symbology, run
//!   synchronously on the binarized raster.
//!
//! [`DecoderAdapter::select`] picks native when the host provides a detector
//! that supports the requested symbology, and loads the software reader
//! otherwise.

mod native;
mod software;
mod symbology;

pub use native::{BarcodeDetector, DetectError, DetectFuture, DetectedBarcode};
pub use software::{ReadError, SoftwareReader};
pub use symbology::Symbology;

use crate::sampling::RasterSurface;
use std::sync::Arc;

/// The capability backing a [`DecoderAdapter`].
#[derive(Clone)]
pub enum DecodeStrategy {
    Native(Arc<dyn BarcodeDetector>),
    Software(SoftwareReader),
}

/// Uniform `raster -> Option<String>` decoding.
#[derive(Clone)]
pub struct DecoderAdapter {
    strategy: DecodeStrategy,
    symbology: Symbology,
}

impl DecoderAdapter {
    /// Uses a native detector.
    pub fn native(detector: Arc<dyn BarcodeDetector>, symbology: Symbology) -> Self {
        Self {
            strategy: DecodeStrategy::Native(detector),
            symbology,
        }
    }

    /// Uses an already loaded software reader.
    pub fn software(reader: SoftwareReader) -> Self {
        Self {
            symbology: reader.symbology(),
            strategy: DecodeStrategy::Software(reader),
        }
    }

    /// Selects a strategy from what the host offers.
    pub fn select(native: Option<Arc<dyn BarcodeDetector>>, symbology: Symbology) -> Self {
        match native {
            Some(detector) if detector.formats().contains(&symbology) => {
                tracing::info!(symbology = %symbology, "using native barcode detector");
                Self::native(detector, symbology)
            }
            Some(_) => {
                tracing::info!(
                    symbology = %symbology,
                    "native detector lacks symbology, falling back to software reader"
                );
                Self::software(SoftwareReader::load(symbology))
            }
            None => Self::software(SoftwareReader::load(symbology)),
        }
    }

    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    pub fn strategy(&self) -> &DecodeStrategy {
        &self.strategy
    }

    /// True when decoding completes without suspending.
    pub fn is_synchronous(&self) -> bool {
        matches!(self.strategy, DecodeStrategy::Software(_))
    }

    /// Short strategy label for logs and metrics.
    pub fn strategy_name(&self) -> &'static str {
        match self.strategy {
            DecodeStrategy::Native(_) => "native",
            DecodeStrategy::Software(_) => "software",
        }
    }

    /// Attempts to decode one symbol. Never fails; a miss is `None`.
    pub async fn decode(&self, raster: &RasterSurface) -> Option<String> {
        match &self.strategy {
            DecodeStrategy::Native(detector) => match detector.detect(raster).await {
                Ok(candidates) => candidates.into_iter().next().map(|c| c.raw_value),
                Err(e) => {
                    tracing::trace!(error = %e, "native detector failed");
                    None
                }
            },
            DecodeStrategy::Software(reader) => match reader.read(raster) {
                Ok(text) => Some(text),
                Err(e) => {
                    tracing::trace!(error = %e, "software read missed");
                    None
                }
            },
        }
    }
}

impl std::fmt::Debug for DecoderAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecoderAdapter")
            .field("strategy", &self.strategy_name())
            .field("symbology", &self.symbology)
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedDetector;
    use super::*;

    fn raster() -> RasterSurface {
        RasterSurface::new(64, 32)
    }

    #[tokio::test]
    async fn test_native_takes_first_candidate() {
        struct Many;
        impl BarcodeDetector for Many {
            fn formats(&self) -> &[Symbology] {
                &[Symbology::Ean13]
            }
            fn detect<'a>(&'a self, _raster: &'a RasterSurface) -> DetectFuture<'a> {
                Box::pin(async {
                    Ok(vec![
                        DetectedBarcode {
                            raw_value: "first".into(),
                            format: Symbology::Ean13,
                        },
                        DetectedBarcode {
                            raw_value: "second".into(),
                            format: Symbology::Ean13,
                        },
                    ])
                })
            }
        }

        let adapter = DecoderAdapter::native(Arc::new(Many), Symbology::Ean13);
        assert_eq!(adapter.decode(&raster()).await.as_deref(), Some("first"));
    }

    #[tokio::test]
    async fn test_native_failure_maps_to_none() {
        let adapter =
            DecoderAdapter::native(Arc::new(ScriptedDetector::failing()), Symbology::Ean13);
        assert_eq!(adapter.decode(&raster()).await, None);
    }

    #[tokio::test]
    async fn test_native_empty_candidates_is_none() {
        let detector = ScriptedDetector::new([None::<String>]);
        let adapter = DecoderAdapter::native(Arc::new(detector), Symbology::Ean13);
        assert_eq!(adapter.decode(&raster()).await, None);
    }

    #[tokio::test]
    async fn test_software_never_fails_on_malformed_input() {
        let adapter = DecoderAdapter::software(SoftwareReader::load(Symbology::Ean13));

        let inputs = [
            RasterSurface::new(0, 0),
            RasterSurface::from_pixels(vec![1, 2, 3], 100, 100),
            RasterSurface::from_pixels(vec![0u8; 4], 2, 2),
            RasterSurface::from_pixels((0..=255u8).cycle().take(97 * 13).collect(), 97, 13),
            RasterSurface::new(1, 5000),
        ];
        for input in &inputs {
            assert_eq!(adapter.decode(input).await, None, "{input:?}");
        }
    }

    #[test]
    fn test_select_prefers_native_with_matching_format() {
        let native: Arc<dyn BarcodeDetector> = Arc::new(ScriptedDetector::new([Some("x")]));

        let adapter = DecoderAdapter::select(Some(Arc::clone(&native)), Symbology::Ean13);
        assert_eq!(adapter.strategy_name(), "native");
        assert!(!adapter.is_synchronous());

        let fallback = DecoderAdapter::select(Some(native), Symbology::Code39);
        assert_eq!(fallback.strategy_name(), "software");
        assert_eq!(fallback.symbology(), Symbology::Code39);

        let absent = DecoderAdapter::select(None, Symbology::Ean13);
        assert!(absent.is_synchronous());
    }
}
