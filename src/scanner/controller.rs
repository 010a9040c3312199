//! The scanner lifecycle controller.

use super::session::Session;
use super::{ScanStats, ScanStatsSnapshot, ScannerError, ScannerState, Transition};
use crate::capture::{Camera, CameraConfig, VideoStream};
use crate::decode::DecoderAdapter;
use crate::geometry::{compute_crop, CropGeometry, ScanBox, Viewport};
use crate::sampling::RasterSurface;
use crate::stability::ResultReporter;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Sampling interval used when the caller has no preference.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Shortest interval the sampler will run at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Camera-driven barcode scanner.
///
/// Owns the camera stream, the raster surface and the sampling timer of
/// the current session, and is the only component that acquires or
/// releases them. See [`ScannerState`] for the legal transitions.
///
/// `start` must be called from within a Tokio runtime; the sampler task
/// is spawned on it.
pub struct Scanner<C: Camera> {
    viewport: Viewport,
    camera: C,
    decoder: DecoderAdapter,
    constraints: CameraConfig,
    state: ScannerState,
    session: Option<Session<C::Stream>>,
    stats: Arc<ScanStats>,
}

impl<C: Camera> Scanner<C> {
    /// Binds a scanner to a display region.
    pub fn new(viewport: Viewport, camera: C, decoder: DecoderAdapter) -> Self {
        Self {
            viewport,
            camera,
            decoder,
            constraints: CameraConfig::default(),
            state: ScannerState::Idle,
            session: None,
            stats: Arc::new(ScanStats::default()),
        }
    }

    /// Overrides the camera stream constraints used by `start`.
    pub fn with_constraints(mut self, constraints: CameraConfig) -> Self {
        self.constraints = constraints;
        self
    }

    /// Starts a new session.
    ///
    /// Requests the camera, plays the stream, derives the crop from the
    /// realized resolution and starts sampling every `interval`. If the
    /// camera cannot be used, the scanner stays `Idle` and holds nothing.
    pub fn start<F>(
        &mut self,
        scan_box: ScanBox,
        callback: F,
        interval: Duration,
    ) -> Result<(), ScannerError>
    where
        F: FnMut(&str) + Send + 'static,
    {
        let next = self.state.apply(Transition::Start)?;
        let runtime = Handle::try_current().map_err(|_| ScannerError::NoRuntime)?;
        self.viewport.clear();

        let mut stream = self.camera.request(&self.constraints).map_err(|e| {
            tracing::warn!(error = %e, "camera access failed");
            ScannerError::from(e)
        })?;
        if let Err(e) = stream.play() {
            tracing::warn!(error = %e, "playback failed to start");
            stream.stop_tracks();
            return Err(e.into());
        }
        let Some((native_width, native_height)) = stream.native_size() else {
            stream.stop_tracks();
            return Err(ScannerError::UnknownResolution);
        };

        let display_width = self.viewport.display_width();
        let display_height = self.viewport.display_height(native_width, native_height);
        if !scan_box.fits(f64::from(display_width), display_height) {
            tracing::warn!(
                box_width = scan_box.width,
                box_height = scan_box.height,
                display_width,
                display_height,
                "scan box exceeds the displayed video; crop reaches outside the frame"
            );
        }

        let crop = compute_crop(native_width, native_height, display_width, scan_box);
        let (raster_width, raster_height) = crop.raster_size();
        self.viewport.show_overlay(scan_box);
        self.stats = Arc::new(ScanStats::default());

        let interval = interval.max(MIN_INTERVAL);
        let mut session = Session::new(
            stream,
            crop,
            RasterSurface::new(raster_width, raster_height),
            self.decoder.clone(),
            ResultReporter::new(Box::new(callback)),
            Arc::clone(&self.stats),
            interval,
            runtime,
        );
        session.start_sampler();
        self.session = Some(session);
        self.state = next;

        tracing::info!(
            native_width,
            native_height,
            crop_width = raster_width,
            crop_height = raster_height,
            interval_ms = interval.as_millis() as u64,
            decoder = self.decoder.strategy_name(),
            "scanning started"
        );
        Ok(())
    }

    /// Starts a session sampling at [`DEFAULT_INTERVAL`].
    pub fn start_default<F>(&mut self, scan_box: ScanBox, callback: F) -> Result<(), ScannerError>
    where
        F: FnMut(&str) + Send + 'static,
    {
        self.start(scan_box, callback, DEFAULT_INTERVAL)
    }

    /// Suspends sampling and playback. Nothing is released.
    pub fn pause(&mut self) -> Result<(), ScannerError> {
        let next = self.state.apply(Transition::Pause)?;
        if let Some(session) = self.session.as_mut() {
            session.stop_sampler();
            session.pause_playback();
        }
        self.state = next;
        tracing::info!("scanning paused");
        Ok(())
    }

    /// Resumes playback and restarts the sampler at the session interval.
    pub fn resume(&mut self) -> Result<(), ScannerError> {
        let next = self.state.apply(Transition::Resume)?;
        if let Some(session) = self.session.as_mut() {
            session.resume_playback()?;
            session.start_sampler();
        }
        self.state = next;
        tracing::info!("scanning resumed");
        Ok(())
    }

    /// Ends the session: stops the stream tracks and the sampler, releases
    /// the raster and clears the overlay.
    pub fn stop(&mut self) -> Result<(), ScannerError> {
        let next = self.state.apply(Transition::Stop)?;
        drop(self.session.take());
        self.viewport.clear();
        self.state = next;
        tracing::info!("scanning stopped");
        Ok(())
    }

    /// True while the sampler timer is active.
    pub fn is_scanning(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.sampler_active())
    }

    pub fn state(&self) -> ScannerState {
        self.state
    }

    /// True while the session's video stream is playing.
    pub fn is_playing(&self) -> bool {
        self.session.as_ref().is_some_and(|s| s.is_playing())
    }

    /// True while session resources (stream, raster) are held.
    pub fn has_session(&self) -> bool {
        self.session.is_some()
    }

    /// Crop of the current session.
    pub fn crop(&self) -> Option<CropGeometry> {
        self.session.as_ref().map(|s| s.crop())
    }

    /// Sampling interval of the current session.
    pub fn interval(&self) -> Option<Duration> {
        self.session.as_ref().map(|s| s.interval())
    }

    /// Last decoded value of the current session, confirmed or not.
    pub fn last_result(&self) -> Option<String> {
        self.session.as_ref().and_then(|s| s.last_result())
    }

    /// Counters of the current or most recent session.
    pub fn stats(&self) -> ScanStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn decoder(&self) -> &DecoderAdapter {
        &self.decoder
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }
}

impl<C: Camera> std::fmt::Debug for Scanner<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("state", &self.state)
            .field("decoder", &self.decoder)
            .field("crop", &self.crop())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{Ean13, FramePattern, MockCamera};
    use crate::decode::testing::ScriptedDetector;
    use crate::decode::{SoftwareReader, Symbology};
    use std::sync::Mutex;
    use tokio::time::sleep;

    const BOX: ScanBox = ScanBox {
        width: 280.0,
        height: 140.0,
    };

    fn native(detector: ScriptedDetector) -> (DecoderAdapter, Arc<ScriptedDetector>) {
        let detector = Arc::new(detector);
        let adapter = DecoderAdapter::native(detector.clone(), Symbology::Ean13);
        (adapter, detector)
    }

    fn collector() -> (Arc<Mutex<Vec<String>>>, impl FnMut(&str) + Send + 'static) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (seen, move |v: &str| sink.lock().unwrap().push(v.to_owned()))
    }

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_lifecycle_transitions() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert!(!scanner.is_scanning());

        scanner.start(BOX, |_| {}, ms(50)).unwrap();
        assert_eq!(scanner.state(), ScannerState::Scanning);
        assert!(scanner.is_scanning());
        assert!(scanner.is_playing());
        assert_eq!(scanner.camera().live_streams(), 1);
        assert!(scanner.viewport().overlay().is_some());
        assert_eq!(scanner.crop(), Some(compute_crop(640, 640, 320, BOX)));

        scanner.pause().unwrap();
        assert_eq!(scanner.state(), ScannerState::Paused);
        assert!(!scanner.is_scanning());
        assert_eq!(scanner.camera().live_streams(), 1);
        assert!(scanner.has_session());

        scanner.resume().unwrap();
        assert_eq!(scanner.state(), ScannerState::Scanning);
        assert!(scanner.is_scanning());
        assert_eq!(scanner.interval(), Some(ms(50)));

        scanner.stop().unwrap();
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert!(!scanner.is_scanning());
        assert!(!scanner.has_session());
        assert_eq!(scanner.camera().live_streams(), 0);
        assert!(scanner.viewport().overlay().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_from_paused() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        scanner.start_default(BOX, |_| {}).unwrap();
        assert_eq!(scanner.interval(), Some(DEFAULT_INTERVAL));
        scanner.pause().unwrap();
        scanner.stop().unwrap();

        assert_eq!(scanner.state(), ScannerState::Idle);
        assert_eq!(scanner.camera().live_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denial_leaves_nothing_allocated() {
        let (decoder, detector) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::denying(), decoder);

        let err = scanner.start(BOX, |_| {}, ms(100)).unwrap_err();
        assert!(err.is_camera_access());
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert!(!scanner.is_scanning());
        assert!(!scanner.has_session());
        assert!(scanner.crop().is_none());
        assert!(scanner.viewport().overlay().is_none());
        assert_eq!(scanner.camera().live_streams(), 0);

        sleep(ms(500)).await;
        assert_eq!(scanner.stats().ticks, 0);
        assert_eq!(detector.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reentrant_start_is_rejected() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        scanner.start(BOX, |_| {}, ms(100)).unwrap();

        let err = scanner.start(BOX, |_| {}, ms(100)).unwrap_err();
        assert!(matches!(
            err,
            ScannerError::IllegalTransition {
                state: ScannerState::Scanning,
                transition: Transition::Start,
            }
        ));
        assert!(scanner.is_scanning());
        assert_eq!(scanner.camera().live_streams(), 1);

        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_out_of_state_calls_are_rejected() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        assert!(scanner.pause().is_err());
        assert!(scanner.resume().is_err());
        assert!(scanner.stop().is_err());
        assert_eq!(scanner.state(), ScannerState::Idle);

        scanner.start(BOX, |_| {}, ms(100)).unwrap();
        assert!(scanner.resume().is_err());
        assert_eq!(scanner.state(), ScannerState::Scanning);
        scanner.stop().unwrap();
    }

    #[test]
    fn test_start_requires_runtime() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        assert!(matches!(
            scanner.start(BOX, |_| {}, ms(100)),
            Err(ScannerError::NoRuntime)
        ));
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert_eq!(scanner.camera().live_streams(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_value_reported_on_second_reading() {
        let (decoder, detector) = native(ScriptedDetector::constant("5901234123457"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        let (seen, callback) = collector();

        scanner.start(BOX, callback, ms(100)).unwrap();

        sleep(ms(150)).await;
        assert_eq!(detector.calls(), 1);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(scanner.last_result().as_deref(), Some("5901234123457"));

        sleep(ms(100)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["5901234123457".to_owned()]);
        assert_eq!(scanner.stats().confirmed, 1);

        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_misses_between_readings_still_confirm() {
        let (decoder, _) = native(ScriptedDetector::new([Some("A"), None, None, Some("A")]));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        let (seen, callback) = collector();

        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(450)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["A".to_owned()]);
        let stats = scanner.stats();
        assert_eq!(stats.decodes, 4);
        assert_eq!(stats.misses, 2);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_decoder_failures_are_silent() {
        let (decoder, _) = native(ScriptedDetector::failing());
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        let (seen, callback) = collector();

        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(550)).await;

        assert!(seen.lock().unwrap().is_empty());
        assert!(scanner.is_scanning());
        assert_eq!(scanner.stats().misses, 5);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_session_resets_last_result() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        scanner.start(BOX, |_| {}, ms(100)).unwrap();
        sleep(ms(150)).await;
        scanner.stop().unwrap();
        assert_eq!(scanner.last_result(), None);

        let (seen, callback) = collector();
        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(150)).await;
        assert!(seen.lock().unwrap().is_empty());

        sleep(ms(100)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_decode_reports_after_pause() {
        let (decoder, detector) =
            native(ScriptedDetector::constant("X").with_delay(ms(150)));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        let (seen, callback) = collector();

        // t=100 decode runs until 250, t=200 is dropped, t=300 runs until 450.
        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(320)).await;
        assert!(seen.lock().unwrap().is_empty());

        scanner.pause().unwrap();
        assert!(!scanner.is_scanning());
        sleep(ms(300)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["X".to_owned()]);
        assert_eq!(detector.calls(), 2);
        assert_eq!(scanner.stats().dropped_ticks, 1);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_and_resume_drive_playback() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        assert!(!scanner.is_playing());

        scanner.start(BOX, |_| {}, ms(100)).unwrap();
        assert!(scanner.is_playing());

        scanner.pause().unwrap();
        assert!(!scanner.is_playing());
        assert!(scanner.has_session());

        scanner.resume().unwrap();
        assert!(scanner.is_playing());

        scanner.stop().unwrap();
        assert!(!scanner.is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn test_in_flight_decode_reports_after_stop() {
        let (decoder, detector) =
            native(ScriptedDetector::constant("X").with_delay(ms(150)));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);
        let (seen, callback) = collector();

        // First decode settles at t=250; the second starts at t=300.
        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(320)).await;
        assert_eq!(detector.calls(), 2);

        scanner.stop().unwrap();
        assert_eq!(scanner.state(), ScannerState::Idle);
        assert!(!scanner.has_session());
        assert_eq!(scanner.camera().live_streams(), 0);

        sleep(ms(300)).await;
        assert_eq!(*seen.lock().unwrap(), vec!["X".to_owned()]);
        assert_eq!(detector.calls(), 2);
        assert_eq!(scanner.stats().confirmed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_oversized_box_still_starts() {
        let (decoder, _) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        scanner
            .start(ScanBox::new(400.0, 140.0), |_| {}, ms(100))
            .unwrap();
        let crop = scanner.crop().unwrap();
        assert_eq!(crop.width(), 800.0);
        assert_eq!(crop.x_offset(), -80.0);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_decodes_never_see_raster_overwritten() {
        let (decoder, detector) =
            native(ScriptedDetector::constant("X").with_delay(ms(120)));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        scanner.start(BOX, |_| {}, ms(50)).unwrap();
        sleep(ms(1000)).await;
        scanner.stop().unwrap();

        let stats = scanner.stats();
        assert!(stats.dropped_ticks > 0);
        assert!((detector.calls() as u64) < stats.ticks);

        let generations = detector.generations.lock().unwrap();
        assert!(!generations.is_empty());
        assert!(generations.iter().all(|(start, end)| start == end));
    }

    #[tokio::test(start_paused = true)]
    async fn test_paused_scanner_does_not_sample() {
        let (decoder, detector) = native(ScriptedDetector::constant("X"));
        let mut scanner = Scanner::new(Viewport::new(320), MockCamera::default(), decoder);

        scanner.start(BOX, |_| {}, ms(100)).unwrap();
        sleep(ms(250)).await;
        scanner.pause().unwrap();
        let calls = detector.calls();

        sleep(ms(1000)).await;
        assert_eq!(detector.calls(), calls);

        scanner.resume().unwrap();
        sleep(ms(150)).await;
        assert_eq!(detector.calls(), calls + 1);
        scanner.stop().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_software_reader_end_to_end() {
        let code = Ean13::parse("4006381333931").unwrap();
        let camera = MockCamera::new(FramePattern::Barcode(code));
        let decoder = DecoderAdapter::software(SoftwareReader::load(Symbology::Ean13));
        let mut scanner = Scanner::new(Viewport::new(320), camera, decoder);
        let (seen, callback) = collector();

        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(250)).await;
        scanner.stop().unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["4006381333931".to_owned()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_frames_never_report() {
        let camera = MockCamera::new(FramePattern::Blank);
        let decoder = DecoderAdapter::software(SoftwareReader::load(Symbology::Ean13));
        let mut scanner = Scanner::new(Viewport::new(320), camera, decoder);
        let (seen, callback) = collector();

        scanner.start(BOX, callback, ms(100)).unwrap();
        sleep(ms(350)).await;
        scanner.stop().unwrap();

        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(scanner.stats().misses, 3);
    }
}
