//! Mapping from the on-screen scan box to sensor pixels.

/// Desired crop size in display pixels, centered over the video surface.
///
/// Both dimensions must be positive and no larger than the displayed video.
/// This is a caller contract: a box that does not fit is logged when a
/// session starts, never rejected.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanBox {
    pub width: f64,
    pub height: f64,
}

impl ScanBox {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Returns true if the box fits inside a display region of the given size.
    pub fn fits(&self, display_width: f64, display_height: f64) -> bool {
        self.width > 0.0
            && self.height > 0.0
            && self.width <= display_width
            && self.height <= display_height
    }
}

/// Crop rectangle in raw sensor pixels.
///
/// Derived once per scanning session and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropGeometry {
    width: f64,
    height: f64,
    x_offset: f64,
    y_offset: f64,
}

impl CropGeometry {
    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[inline]
    pub fn x_offset(&self) -> f64 {
        self.x_offset
    }

    #[inline]
    pub fn y_offset(&self) -> f64 {
        self.y_offset
    }

    /// Integer raster size for this crop, truncating fractional pixels.
    pub fn raster_size(&self) -> (u32, u32) {
        (self.width.max(0.0) as u32, self.height.max(0.0) as u32)
    }

    /// Top-left sensor pixel of the crop, rounded towards negative infinity.
    ///
    /// Negative when the scan box exceeded the displayed video.
    pub fn origin(&self) -> (i64, i64) {
        (self.x_offset.floor() as i64, self.y_offset.floor() as i64)
    }
}

/// Computes the sensor-space crop for a centered scan box.
///
/// The video surface scales uniformly, so the width ratio between native
/// and displayed video applies to both axes. No clamping is performed: a
/// scan box larger than the displayed video yields negative offsets.
pub fn compute_crop(
    native_width: u32,
    native_height: u32,
    display_width: u32,
    scan_box: ScanBox,
) -> CropGeometry {
    let ratio = native_width as f64 / display_width as f64;
    let width = scan_box.width * ratio;
    let height = scan_box.height * ratio;

    CropGeometry {
        width,
        height,
        x_offset: (native_width as f64 - width) / 2.0,
        y_offset: (native_height as f64 - height) / 2.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_scaled_and_centered() {
        let crop = compute_crop(1280, 1280, 320, ScanBox::new(280.0, 140.0));

        assert_eq!(crop.width(), 1120.0);
        assert_eq!(crop.height(), 560.0);
        assert_eq!(crop.x_offset(), 80.0);
        assert_eq!(crop.y_offset(), 360.0);
        assert_eq!(crop.raster_size(), (1120, 560));
        assert_eq!(crop.origin(), (80, 360));
    }

    #[test]
    fn test_fractional_crop_truncates_raster() {
        let crop = compute_crop(640, 480, 300, ScanBox::new(100.0, 50.0));

        assert_eq!(crop.raster_size(), (213, 106));
        let (x, y) = crop.origin();
        assert_eq!(x, 213);
        assert_eq!(y, 186);
    }

    #[test]
    fn test_oversized_box_is_not_clamped() {
        let crop = compute_crop(640, 640, 320, ScanBox::new(400.0, 100.0));

        assert_eq!(crop.width(), 800.0);
        assert_eq!(crop.x_offset(), -80.0);
        assert_eq!(crop.origin().0, -80);
    }

    #[test]
    fn test_scan_box_fits() {
        let scan_box = ScanBox::new(280.0, 140.0);
        assert!(scan_box.fits(320.0, 320.0));
        assert!(!scan_box.fits(200.0, 320.0));
        assert!(!ScanBox::new(0.0, 10.0).fits(320.0, 320.0));
    }

    proptest! {
        #[test]
        fn prop_crop_preserves_aspect(
            native_w in 16u32..4096,
            native_h in 16u32..4096,
            display_w in 16u32..2048,
            box_w_frac in 0.05f64..1.0,
            box_h in 1.0f64..1000.0,
        ) {
            let box_w = (display_w as f64 * box_w_frac).max(1.0);
            let crop = compute_crop(native_w, native_h, display_w, ScanBox::new(box_w, box_h));

            let expected = box_w / box_h;
            let observed = crop.width() / crop.height();
            prop_assert!((observed - expected).abs() <= 1e-9 * expected.max(1.0));
        }

        #[test]
        fn prop_crop_is_centered(
            native_w in 16u32..4096,
            native_h in 16u32..4096,
            display_w in 16u32..2048,
            box_w_frac in 0.05f64..1.0,
            box_h in 1.0f64..1000.0,
        ) {
            let box_w = (display_w as f64 * box_w_frac).max(1.0);
            let crop = compute_crop(native_w, native_h, display_w, ScanBox::new(box_w, box_h));

            let cx = crop.x_offset() + crop.width() / 2.0;
            let cy = crop.y_offset() + crop.height() / 2.0;
            prop_assert!((cx - native_w as f64 / 2.0).abs() < 1e-6);
            prop_assert!((cy - native_h as f64 / 2.0).abs() < 1e-6);
        }
    }
}
