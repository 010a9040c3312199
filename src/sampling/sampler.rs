//! Copies the crop region of a frame into the raster surface.

use super::RasterSurface;
use crate::capture::Frame;
use crate::geometry::CropGeometry;

/// Fill value for raster pixels that fall outside the frame.
const OUTSIDE: u8 = 0;

/// Copies `[x_offset, y_offset, width, height]` of `frame` into `raster`
/// 1:1, without resampling.
///
/// The copy covers `raster`'s own dimensions starting at the crop origin.
/// Raster pixels that map outside the frame are filled with black. No
/// allocation happens here, so this is safe to call on every tick.
pub fn sample_into(raster: &mut RasterSurface, frame: &Frame, crop: &CropGeometry) {
    let (x0, y0) = crop.origin();
    let raster_width = raster.width() as usize;
    let raster_height = raster.height() as usize;
    let frame_width = frame.width() as i64;

    // Columns of the raster that land inside the frame.
    let first_col = (-x0).clamp(0, raster_width as i64) as usize;
    let last_col = (frame_width - x0).clamp(0, raster_width as i64) as usize;

    let pixels = raster.pixels_mut();
    if pixels.len() < raster_width * raster_height {
        return;
    }

    for (r, dst) in pixels
        .chunks_exact_mut(raster_width.max(1))
        .take(raster_height)
        .enumerate()
    {
        let src_y = y0 + r as i64;
        let src_row = u32::try_from(src_y).ok().and_then(|y| frame.row(y));

        match src_row {
            Some(src) if first_col < last_col => {
                let src_start = (x0 + first_col as i64) as usize;
                let span = last_col - first_col;
                dst[..first_col].fill(OUTSIDE);
                dst[first_col..last_col].copy_from_slice(&src[src_start..src_start + span]);
                dst[last_col..].fill(OUTSIDE);
            }
            _ => dst.fill(OUTSIDE),
        }
    }

    raster.advance_generation();
}
