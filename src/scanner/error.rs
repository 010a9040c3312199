//! Scanner lifecycle errors.

use super::{ScannerState, Transition};
use crate::capture::CameraError;
use thiserror::Error;

/// Errors returned by [`Scanner`](super::Scanner) operations.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// Camera access was denied or the device could not be used.
    #[error("camera unavailable: {0}")]
    Camera(#[from] CameraError),

    #[error("cannot {transition} while {state}")]
    IllegalTransition {
        state: ScannerState,
        transition: Transition,
    },

    #[error("no async runtime available to drive the sampler")]
    NoRuntime,

    #[error("video stream has no native resolution after playback started")]
    UnknownResolution,
}

impl ScannerError {
    /// True for failures of the camera request itself.
    pub fn is_camera_access(&self) -> bool {
        matches!(self, ScannerError::Camera(_))
    }
}
