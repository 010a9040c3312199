//! Viewport geometry.
//!
//! Maps the on-screen scan box to a crop rectangle in raw sensor pixels
//! and describes the overlay framing shown while scanning.

mod crop;
mod viewport;

pub use crop::{compute_crop, CropGeometry, ScanBox};
pub use viewport::{ScanOverlay, Viewport};
