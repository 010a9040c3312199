//! Physical camera backend built on `nokhwa`.
//!
//! The device is owned by a dedicated capture thread which keeps the most
//! recent luma frame. The [`NokhwaStream`] handle only exchanges flags and
//! frames with that thread, so it stays `Send` whatever the platform
//! backend is.

use super::{Camera, CameraConfig, CameraError, FacingMode, Frame, VideoStream};
use nokhwa::pixel_format::LumaFormat;
use nokhwa::utils::{CameraIndex, RequestedFormat, RequestedFormatType, Resolution};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::JoinHandle;
use std::time::Duration;

/// Delay between grabs while the surface is paused.
const PAUSED_POLL: Duration = Duration::from_millis(20);

/// Camera backed by a local capture device.
#[derive(Debug, Default)]
pub struct NokhwaCamera;

impl NokhwaCamera {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Default)]
struct Shared {
    playing: AtomicBool,
    stopped: AtomicBool,
    latest: Mutex<Option<Frame>>,
    resolution: Mutex<Option<(u32, u32)>>,
}

impl Camera for NokhwaCamera {
    type Stream = NokhwaStream;

    fn request(&mut self, constraints: &CameraConfig) -> Result<NokhwaStream, CameraError> {
        constraints
            .validate()
            .map_err(|e| CameraError::OpenFailed(e.to_string()))?;

        if constraints.facing != FacingMode::Environment {
            tracing::debug!(facing = %constraints.facing, "facing mode is advisory on this backend");
        }

        let shared = Arc::new(Shared::default());
        let (ready_tx, ready_rx) = mpsc::channel();
        let worker = {
            let shared = Arc::clone(&shared);
            let constraints = constraints.clone();
            std::thread::Builder::new()
                .name("camera-capture".into())
                .spawn(move || capture_loop(constraints, shared, ready_tx))
                .map_err(|e| CameraError::OpenFailed(e.to_string()))?
        };

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(NokhwaStream {
                shared,
                worker: Some(worker),
            }),
            Ok(Err(e)) => {
                let _ = worker.join();
                Err(e)
            }
            Err(_) => {
                let _ = worker.join();
                Err(CameraError::OpenFailed("capture thread exited".into()))
            }
        }
    }
}

fn capture_loop(
    constraints: CameraConfig,
    shared: Arc<Shared>,
    ready: mpsc::Sender<Result<(), CameraError>>,
) {
    let format = RequestedFormat::new::<LumaFormat>(RequestedFormatType::HighestResolution(
        Resolution::new(constraints.width, constraints.height),
    ));
    let index = CameraIndex::Index(constraints.device_id);

    let mut device = match nokhwa::Camera::new(index, format) {
        Ok(device) => device,
        Err(e) => {
            let _ = ready.send(Err(classify_open_error(constraints.device_id, e.to_string())));
            return;
        }
    };
    if let Err(e) = device.open_stream() {
        let _ = ready.send(Err(classify_open_error(constraints.device_id, e.to_string())));
        return;
    }
    // The negotiated format is fixed once the stream is open.
    let resolution = device.resolution();
    *shared
        .resolution
        .lock()
        .unwrap_or_else(PoisonError::into_inner) = Some((resolution.width(), resolution.height()));
    let _ = ready.send(Ok(()));

    let mut sequence = 0u64;
    while !shared.stopped.load(Ordering::Acquire) {
        if !shared.playing.load(Ordering::Acquire) {
            std::thread::sleep(PAUSED_POLL);
            continue;
        }

        let image = device
            .frame()
            .and_then(|buffer| buffer.decode_image::<LumaFormat>());
        match image {
            Ok(image) => {
                sequence += 1;
                let (width, height) = (image.width(), image.height());
                *shared.latest.lock().unwrap_or_else(PoisonError::into_inner) =
                    Some(Frame::new(image.into_raw(), width, height, sequence));
            }
            Err(e) => tracing::debug!(error = %e, "frame grab failed"),
        }
    }

    if let Err(e) = device.stop_stream() {
        tracing::warn!(error = %e, "failed to stop camera stream");
    }
    tracing::info!("camera capture thread exited");
}

fn classify_open_error(device_id: u32, message: String) -> CameraError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") {
        CameraError::PermissionDenied(message)
    } else if lower.contains("not found") || lower.contains("no device") {
        CameraError::DeviceNotFound(format!("index {device_id}: {message}"))
    } else {
        CameraError::OpenFailed(message)
    }
}

/// Handle to a running capture thread.
pub struct NokhwaStream {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl VideoStream for NokhwaStream {
    fn play(&mut self) -> Result<(), CameraError> {
        if !self.is_live() {
            return Err(CameraError::Stopped);
        }
        self.shared.playing.store(true, Ordering::Release);
        Ok(())
    }

    fn pause(&mut self) {
        self.shared.playing.store(false, Ordering::Release);
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    fn native_size(&self) -> Option<(u32, u32)> {
        *self
            .shared
            .resolution
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn current_frame(&mut self) -> Result<Frame, CameraError> {
        if !self.is_live() {
            return Err(CameraError::Stopped);
        }
        self.shared
            .latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or_else(|| CameraError::CaptureFailed("no frame available yet".into()))
    }

    fn stop_tracks(&mut self) {
        self.shared.playing.store(false, Ordering::Release);
        self.shared.stopped.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }

    fn is_live(&self) -> bool {
        !self.shared.stopped.load(Ordering::Acquire)
    }
}

impl Drop for NokhwaStream {
    fn drop(&mut self) {
        self.stop_tracks();
    }
}
