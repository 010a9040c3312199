//! Grabbed video image.

/// Row-major 8-bit luma image of the video surface at one instant.
///
/// `sequence` counts grabs within one stream, so a paused surface hands out
/// repeated frames with an unchanged sequence.
#[derive(Clone)]
pub struct Frame {
    luma: Vec<u8>,
    width: u32,
    height: u32,
    sequence: u64,
}

impl Frame {
    pub fn new(luma: Vec<u8>, width: u32, height: u32, sequence: u64) -> Self {
        Self {
            luma,
            width,
            height,
            sequence,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Pixels of row `y`. `None` past the bottom edge or when the buffer
    /// does not cover `width * height` bytes.
    pub fn row(&self, y: u32) -> Option<&[u8]> {
        let stride = self.width as usize;
        if y >= self.height || self.luma.len() != stride * self.height as usize {
            return None;
        }
        let start = y as usize * stride;
        self.luma.get(start..start + stride)
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frame#{} {}x{} ({} bytes)",
            self.sequence,
            self.width,
            self.height,
            self.luma.len()
        )
    }
}
