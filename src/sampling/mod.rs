//! Frame sampling.
//!
//! On every timer tick the mapped crop region of the current video frame is
//! copied into a raster surface that is reused for the whole session.

mod raster;
mod sampler;

pub use raster::RasterSurface;
pub use sampler::sample_into;
