//! Off-screen luma buffer used as decode input.

/// Reusable pixel buffer sized to the session's crop.
///
/// Allocated once per session and overwritten in place on every tick.
pub struct RasterSurface {
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    /// Number of samples written so far.
    generation: u64,
}

impl RasterSurface {
    /// Allocates a zeroed surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: vec![0u8; (width as usize) * (height as usize)],
            width,
            height,
            generation: 0,
        }
    }

    /// Wraps an existing buffer. Used to hand arbitrary input to a decoder.
    pub fn from_pixels(pixels: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            pixels,
            width,
            height,
            generation: 0,
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub(crate) fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Increases by one every time a frame is sampled into the surface.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub(crate) fn advance_generation(&mut self) {
        self.generation += 1;
    }

    /// True when the buffer length matches the declared dimensions and is
    /// not empty.
    pub fn is_well_formed(&self) -> bool {
        !self.pixels.is_empty()
            && self.pixels.len() == (self.width as usize) * (self.height as usize)
    }
}

impl std::fmt::Debug for RasterSurface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterSurface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("generation", &self.generation)
            .finish()
    }
}
