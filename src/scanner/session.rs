//! One scanning session: the resources held between `start` and `stop`,
//! and the periodic sampler task.
//!
//! The sampler runs on a fixed delay: it sleeps for the interval, samples,
//! and starts a decode. Software decodes finish before the next sleep.
//! Native decodes run in their own task so the timer keeps its cadence.
//!
//! The raster sits behind an async mutex that the decode holds until it
//! resolves. A tick that finds the raster still locked is dropped, so at
//! most one decode runs per session and a raster is never overwritten
//! while being read. Stopping the sampler does not cancel a decode that is
//! already in flight; its result may still reach the callback afterwards.

use super::ScanStats;
use crate::capture::{CameraError, VideoStream};
use crate::decode::DecoderAdapter;
use crate::geometry::CropGeometry;
use crate::sampling::{sample_into, RasterSurface};
use crate::stability::ResultReporter;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// State shared between the controller, the sampler and decode tasks.
struct TickContext<S> {
    stream: Mutex<S>,
    raster: Arc<tokio::sync::Mutex<RasterSurface>>,
    crop: CropGeometry,
    decoder: DecoderAdapter,
    reporter: Mutex<ResultReporter>,
    stats: Arc<ScanStats>,
}

impl<S: VideoStream + 'static> TickContext<S> {
    /// Samples the current frame into the raster and returns the decode
    /// job for it, or `None` if this tick was skipped.
    fn tick(self: &Arc<Self>) -> Option<impl Future<Output = ()> + Send + 'static> {
        self.stats.record_tick();

        let Ok(mut raster) = Arc::clone(&self.raster).try_lock_owned() else {
            self.stats.record_dropped();
            tracing::trace!("previous decode still running, dropping tick");
            return None;
        };

        let frame = {
            let mut stream = self.stream.lock().unwrap_or_else(PoisonError::into_inner);
            match stream.current_frame() {
                Ok(frame) => frame,
                Err(e) => {
                    self.stats.record_frame_error();
                    tracing::debug!(error = %e, "frame grab failed");
                    return None;
                }
            }
        };
        sample_into(&mut raster, &frame, &self.crop);
        tracing::trace!(frame = frame.sequence(), "frame sampled");

        let ctx = Arc::clone(self);
        Some(async move {
            let decoded = ctx.decoder.decode(&raster).await;
            drop(raster);
            ctx.report(decoded);
        })
    }

    fn report(&self, decoded: Option<String>) {
        let hit = decoded.is_some();
        let confirmed = self
            .reporter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .report(decoded);
        self.stats.record_decode(hit, confirmed);
        if confirmed {
            tracing::debug!("confirmed value delivered");
        }
    }
}

async fn run_sampler<S: VideoStream + 'static>(ctx: Arc<TickContext<S>>, interval: Duration) {
    loop {
        tokio::time::sleep(interval).await;

        let Some(job) = ctx.tick() else {
            continue;
        };
        if ctx.decoder.is_synchronous() {
            job.await;
        } else {
            tokio::spawn(job);
        }
    }
}

/// Resources of one `start`..`stop` interval.
///
/// Dropping a session stops the sampler and the stream's tracks.
pub(crate) struct Session<S: VideoStream + 'static> {
    ctx: Arc<TickContext<S>>,
    interval: Duration,
    runtime: Handle,
    sampler: Option<JoinHandle<()>>,
}

impl<S: VideoStream + 'static> Session<S> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        stream: S,
        crop: CropGeometry,
        raster: RasterSurface,
        decoder: DecoderAdapter,
        reporter: ResultReporter,
        stats: Arc<ScanStats>,
        interval: Duration,
        runtime: Handle,
    ) -> Self {
        Self {
            ctx: Arc::new(TickContext {
                stream: Mutex::new(stream),
                raster: Arc::new(tokio::sync::Mutex::new(raster)),
                crop,
                decoder,
                reporter: Mutex::new(reporter),
                stats,
            }),
            interval,
            runtime,
            sampler: None,
        }
    }

    /// Starts the periodic sampler. No-op if it is already running.
    pub(crate) fn start_sampler(&mut self) {
        if self.sampler.is_some() {
            return;
        }
        let ctx = Arc::clone(&self.ctx);
        self.sampler = Some(self.runtime.spawn(run_sampler(ctx, self.interval)));
    }

    /// Cancels the sampler timer. In-flight decodes are left alone.
    pub(crate) fn stop_sampler(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.abort();
        }
    }

    pub(crate) fn sampler_active(&self) -> bool {
        self.sampler.is_some()
    }

    pub(crate) fn pause_playback(&self) {
        self.lock_stream().pause();
    }

    pub(crate) fn resume_playback(&self) -> Result<(), CameraError> {
        self.lock_stream().play()
    }

    pub(crate) fn is_playing(&self) -> bool {
        self.lock_stream().is_playing()
    }

    pub(crate) fn crop(&self) -> CropGeometry {
        self.ctx.crop
    }

    pub(crate) fn interval(&self) -> Duration {
        self.interval
    }

    pub(crate) fn last_result(&self) -> Option<String> {
        self.ctx
            .reporter
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .filter()
            .last_result()
            .map(str::to_owned)
    }

    fn lock_stream(&self) -> std::sync::MutexGuard<'_, S> {
        self.ctx.stream.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<S: VideoStream + 'static> Drop for Session<S> {
    fn drop(&mut self) {
        self.stop_sampler();
        self.lock_stream().stop_tracks();
    }
}
