//! Display region hosting the video surface and the scan overlay.

use super::ScanBox;

/// Width of the scan box not covered by the guide line, in display pixels.
const GUIDE_LINE_INSET: f64 = 50.0;

/// Framing drawn over the video while scanning.
///
/// Only the geometry is modeled here; drawing is left to the host UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanOverlay {
    /// Dotted frame around the scan box.
    pub frame: ScanBox,
    /// Length of the horizontal guide line.
    pub guide_width: f64,
    /// Distance of the guide line from the top of the frame.
    pub guide_offset: f64,
}

impl ScanOverlay {
    pub fn for_box(scan_box: ScanBox) -> Self {
        Self {
            frame: scan_box,
            guide_width: (scan_box.width - GUIDE_LINE_INSET).max(0.0),
            guide_offset: scan_box.height / 2.0,
        }
    }
}

/// The on-screen region the scanner is bound to.
///
/// The video fills the viewport width and keeps its native aspect ratio.
#[derive(Debug, Clone)]
pub struct Viewport {
    display_width: u32,
    overlay: Option<ScanOverlay>,
}

impl Viewport {
    pub fn new(display_width: u32) -> Self {
        Self {
            display_width,
            overlay: None,
        }
    }

    /// Displayed video width in display pixels.
    pub fn display_width(&self) -> u32 {
        self.display_width
    }

    /// Displayed video height for a stream of the given native size.
    pub fn display_height(&self, native_width: u32, native_height: u32) -> f64 {
        if native_width == 0 {
            return 0.0;
        }
        self.display_width as f64 * native_height as f64 / native_width as f64
    }

    pub fn overlay(&self) -> Option<&ScanOverlay> {
        self.overlay.as_ref()
    }

    pub(crate) fn show_overlay(&mut self, scan_box: ScanBox) {
        self.overlay = Some(ScanOverlay::for_box(scan_box));
    }

    /// Removes everything the scanner put on screen.
    pub(crate) fn clear(&mut self) {
        self.overlay = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_guide_line() {
        let overlay = ScanOverlay::for_box(ScanBox::new(280.0, 140.0));
        assert_eq!(overlay.guide_width, 230.0);
        assert_eq!(overlay.guide_offset, 70.0);

        let narrow = ScanOverlay::for_box(ScanBox::new(30.0, 10.0));
        assert_eq!(narrow.guide_width, 0.0);
    }

    #[test]
    fn test_display_height_follows_aspect() {
        let viewport = Viewport::new(320);
        assert_eq!(viewport.display_height(640, 480), 240.0);
        assert_eq!(viewport.display_height(0, 480), 0.0);
    }

    #[test]
    fn test_clear_removes_overlay() {
        let mut viewport = Viewport::new(320);
        viewport.show_overlay(ScanBox::new(100.0, 50.0));
        assert!(viewport.overlay().is_some());
        viewport.clear();
        assert!(viewport.overlay().is_none());
    }
}
