//! Camera Barcode Scanning Library
//!
//! Reads 1D barcodes from a live camera stream. A periodic sampler copies
//! the region under an on-screen scan box into an off-screen raster,
//! decodes it, and reports a value only once two consecutive decodes agree.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → geometry → sampling → decode → stability → callback
//!     ↑                                                    │
//!     └──────────────── scanner (lifecycle) ───────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Quiet failures**: decode misses and library faults are never surfaced
//! - **Confirmed results only**: a single reading is never reported
//! - **One decode at a time**: ticks that arrive mid-decode are dropped
//! - **Camera released on stop**: every track is stopped when a session ends
//!
//! # Example
//!
//! ```no_run
//! use barcode_scan::{
//!     capture::{Ean13, FramePattern, MockCamera},
//!     decode::{DecoderAdapter, Symbology},
//!     geometry::{ScanBox, Viewport},
//!     scanner::Scanner,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let camera = MockCamera::new(FramePattern::Barcode(Ean13::parse("4006381333931")?));
//! let decoder = DecoderAdapter::select(None, Symbology::Ean13);
//! let mut scanner = Scanner::new(Viewport::new(320), camera, decoder);
//!
//! scanner.start_default(ScanBox::new(280.0, 140.0), |value| {
//!     println!("scanned {value}");
//! })?;
//!
//! tokio::time::sleep(std::time::Duration::from_secs(1)).await;
//! scanner.stop()?;
//! # Ok(())
//! # }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod config;
pub mod decode;
pub mod geometry;
pub mod metrics;
pub mod sampling;
pub mod scanner;
pub mod stability;

// Re-export commonly used types at crate root
pub use capture::{Camera, CameraConfig, Frame, MockCamera, VideoStream};
pub use config::FileConfig;
pub use decode::{DecoderAdapter, Symbology};
pub use geometry::{compute_crop, CropGeometry, ScanBox, Viewport};
pub use sampling::{sample_into, RasterSurface};
pub use scanner::{Scanner, ScannerError, ScannerState};
pub use stability::StabilityFilter;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
