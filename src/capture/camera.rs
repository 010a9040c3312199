//! Camera abstraction for live video streams.
//!
//! A [`Camera`] hands out a [`VideoStream`] when access is granted. The
//! stream doubles as the video surface: it is played, paused, sampled for
//! its current frame, and finally has its tracks stopped.

use super::pattern::{EAN13_MODULES, QUIET_ZONE_MODULES};
use super::{CameraConfig, Ean13, Frame};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera access denied: {0}")]
    PermissionDenied(String),
    #[error("camera device not found: {0}")]
    DeviceNotFound(String),
    #[error("failed to open camera stream: {0}")]
    OpenFailed(String),
    #[error("failed to capture frame: {0}")]
    CaptureFailed(String),
    #[error("camera stream stopped")]
    Stopped,
}

/// Source of live video streams.
pub trait Camera: Send {
    /// Stream type handed out on success.
    type Stream: VideoStream + 'static;

    /// Requests access to a video-only stream matching the constraints.
    ///
    /// On failure nothing stays allocated.
    fn request(&mut self, constraints: &CameraConfig) -> Result<Self::Stream, CameraError>;
}

/// A live video stream attached to a playable surface.
pub trait VideoStream: Send {
    /// Starts or resumes playback.
    fn play(&mut self) -> Result<(), CameraError>;

    /// Pauses playback. The stream stays open.
    fn pause(&mut self);

    fn is_playing(&self) -> bool;

    /// Native resolution of the realized stream.
    ///
    /// Only known once playback has started.
    fn native_size(&self) -> Option<(u32, u32)>;

    /// Grabs the frame currently shown on the surface.
    fn current_frame(&mut self) -> Result<Frame, CameraError>;

    /// Stops every track of the stream. The stream cannot be played again.
    fn stop_tracks(&mut self);

    /// Returns true until the tracks are stopped.
    fn is_live(&self) -> bool;
}

/// Content rendered into mock frames.
#[derive(Debug, Clone)]
pub enum FramePattern {
    /// Uniform white frames.
    Blank,
    /// Deterministic noise that changes every frame.
    Noise,
    /// A centered EAN-13 symbol.
    Barcode(Ean13),
}

/// Mock camera that generates synthetic frames.
#[derive(Debug)]
pub struct MockCamera {
    pattern: FramePattern,
    deny: bool,
    live: Arc<AtomicUsize>,
}

impl MockCamera {
    pub fn new(pattern: FramePattern) -> Self {
        Self {
            pattern,
            deny: false,
            live: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A camera whose access request is always rejected.
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::new(FramePattern::Blank)
        }
    }

    /// Number of streams handed out whose tracks are not stopped yet.
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Default for MockCamera {
    fn default() -> Self {
        Self::new(FramePattern::Noise)
    }
}

impl Camera for MockCamera {
    type Stream = MockStream;

    fn request(&mut self, constraints: &CameraConfig) -> Result<MockStream, CameraError> {
        if self.deny {
            tracing::info!("MockCamera denied access");
            return Err(CameraError::PermissionDenied(
                "user dismissed the permission request".into(),
            ));
        }
        constraints
            .validate()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        self.live.fetch_add(1, Ordering::SeqCst);
        tracing::info!(
            width = constraints.width,
            height = constraints.height,
            facing = %constraints.facing,
            "MockCamera stream opened"
        );

        Ok(MockStream {
            width: constraints.width,
            height: constraints.height,
            pattern: self.pattern.clone(),
            sequence: 0,
            playing: false,
            live: Some(Arc::clone(&self.live)),
        })
    }
}

/// Stream produced by [`MockCamera`].
#[derive(Debug)]
pub struct MockStream {
    width: u32,
    height: u32,
    pattern: FramePattern,
    sequence: u64,
    playing: bool,
    /// Present while the tracks are running.
    live: Option<Arc<AtomicUsize>>,
}

impl MockStream {
    fn render(&self) -> Vec<u8> {
        let pixel_count = (self.width as usize) * (self.height as usize);
        match &self.pattern {
            FramePattern::Blank => vec![255u8; pixel_count],
            FramePattern::Noise => (0..pixel_count)
                .map(|i| ((i as u64 ^ self.sequence.wrapping_mul(31)) % 256) as u8)
                .collect(),
            FramePattern::Barcode(code) => {
                let mut pixels = vec![255u8; pixel_count];
                let modules = (EAN13_MODULES + 2 * QUIET_ZONE_MODULES) as u32;
                let module_px = (self.width / modules).max(1);
                let margin = self.height / 8;
                code.paint(
                    &mut pixels,
                    self.width,
                    self.height,
                    module_px,
                    margin..self.height - margin,
                );
                pixels
            }
        }
    }
}

impl VideoStream for MockStream {
    fn play(&mut self) -> Result<(), CameraError> {
        if self.live.is_none() {
            return Err(CameraError::Stopped);
        }
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn native_size(&self) -> Option<(u32, u32)> {
        (self.sequence > 0 || self.playing).then_some((self.width, self.height))
    }

    fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if self.live.is_none() {
            return Err(CameraError::Stopped);
        }
        // A paused surface keeps showing its last frame.
        if self.playing || self.sequence == 0 {
            self.sequence += 1;
        }
        Ok(Frame::new(
            self.render(),
            self.width,
            self.height,
            self.sequence,
        ))
    }

    fn stop_tracks(&mut self) {
        if let Some(live) = self.live.take() {
            live.fetch_sub(1, Ordering::SeqCst);
            self.playing = false;
            tracing::info!("MockCamera stream stopped");
        }
    }

    fn is_live(&self) -> bool {
        self.live.is_some()
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
