//! Software symbol reader built on `rxing`.
//!
//! The raster's luminance is binarized with a hybrid (local block)
//! binarizer and handed to the one-dimensional reader for the configured
//! symbology. No other reader runs.

use super::Symbology;
use crate::sampling::RasterSurface;
use rxing::common::HybridBinarizer;
use rxing::oned::{Code128Reader, Code39Reader, EAN13Reader, EAN8Reader, UPCAReader};
use rxing::{BinaryBitmap, Luma8LuminanceSource, Reader};
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;

/// Reasons a software read produced no value.
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("raster buffer of {len} bytes does not match {width}x{height}")]
    MalformedRaster { len: usize, width: u32, height: u32 },
    #[error("reader error: {0}")]
    Reader(String),
    #[error("reader panicked")]
    Panicked,
}

/// Reader restricted to one 1D symbology.
#[derive(Debug, Clone)]
pub struct SoftwareReader {
    symbology: Symbology,
}

impl SoftwareReader {
    /// Prepares the reader. Performed once, before the decoder adapter is
    /// built, and only when no native detector is available.
    pub fn load(symbology: Symbology) -> Self {
        tracing::info!(symbology = %symbology, "software barcode reader loaded");
        Self { symbology }
    }

    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    /// Reads one symbol from the raster.
    pub fn read(&self, raster: &RasterSurface) -> Result<String, ReadError> {
        if !raster.is_well_formed() {
            return Err(ReadError::MalformedRaster {
                len: raster.pixels().len(),
                width: raster.width(),
                height: raster.height(),
            });
        }

        let luma = raster.pixels().to_vec();
        let (width, height) = (raster.width(), raster.height());

        let symbology = self.symbology;

        let outcome = panic::catch_unwind(AssertUnwindSafe(move || {
            let source = Luma8LuminanceSource::new(luma, width, height);
            let mut bitmap = BinaryBitmap::new(HybridBinarizer::new(source));
            match symbology {
                Symbology::Ean13 => EAN13Reader::default().decode(&mut bitmap),
                Symbology::Ean8 => EAN8Reader::default().decode(&mut bitmap),
                Symbology::UpcA => UPCAReader::default().decode(&mut bitmap),
                Symbology::Code128 => Code128Reader::default().decode(&mut bitmap),
                Symbology::Code39 => Code39Reader::default().decode(&mut bitmap),
            }
        }))
        .map_err(|_| ReadError::Panicked)?;

        let result = outcome.map_err(|e| ReadError::Reader(format!("{e:?}")))?;
        Ok(result.getText().to_owned())
    }
}
