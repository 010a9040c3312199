//! Camera input and frame handling.
//!
//! This module provides the camera and video stream abstractions the
//! scanner drives, a mock camera with synthetic barcode frames, and the
//! stream constraints used when requesting access.

mod camera;
mod config;
#[cfg(feature = "camera")]
mod device;
mod frame;
mod pattern;

pub use camera::{Camera, CameraError, FramePattern, MockCamera, MockStream, VideoStream};
pub use config::{CameraConfig, ConfigError, FacingMode};
#[cfg(feature = "camera")]
pub use device::{NokhwaCamera, NokhwaStream};
pub use frame::Frame;
pub use pattern::{Ean13, PatternError};
