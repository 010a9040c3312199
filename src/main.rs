//! Barcode Scanner CLI
//!
//! Scans barcodes from a camera and prints each confirmed value with a
//! timestamp. Without the `camera` feature, frames come from a mock camera
//! rendering a fixed EAN-13 code.

use barcode_scan::{
    capture::{Camera, Ean13, FramePattern, MockCamera},
    config::FileConfig,
    decode::{DecoderAdapter, Symbology},
    geometry::Viewport,
    scanner::Scanner,
};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

/// How often the main loop checks for shutdown.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "barcode-scan", version, about = "Scan 1D barcodes from a camera")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Camera device index
    #[arg(short, long)]
    device: Option<u32>,

    /// Milliseconds between sampler ticks
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Scan box size in display pixels, e.g. 280x140
    #[arg(long = "box", value_parser = parse_box)]
    scan_box: Option<(u32, u32)>,

    /// Symbology to read (ean_13, ean_8, upc_a, code_128, code_39)
    #[arg(long)]
    symbology: Option<Symbology>,

    /// Exit after the first confirmed value
    #[arg(long)]
    once: bool,

    /// Exit after this many seconds
    #[arg(long)]
    duration_secs: Option<u64>,

    /// Render this EAN-13 code from a mock camera instead of using a device
    #[arg(long)]
    demo_code: Option<String>,

    /// Serve Prometheus metrics on this port (requires the `metrics` feature)
    #[arg(long)]
    metrics_port: Option<u16>,
}

fn parse_box(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {s:?}"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    Ok((width, height))
}

impl Args {
    /// Applies command-line overrides on top of the file configuration.
    fn merge_into(&self, config: &mut FileConfig) {
        if let Some(device) = self.device {
            config.camera.device_id = device;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.scan.interval_ms = interval_ms;
        }
        if let Some((width, height)) = self.scan_box {
            config.scan.box_width = width;
            config.scan.box_height = height;
        }
        if let Some(symbology) = self.symbology {
            config.scan.symbology = symbology;
        }
        if self.once {
            config.output.once = true;
        }
        if self.duration_secs.is_some() {
            config.output.duration_secs = self.duration_secs;
        }
        if let Some(port) = self.metrics_port {
            config.output.metrics_port = port;
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Barcode Scanner v{}", barcode_scan::VERSION);

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                return ExitCode::FAILURE;
            }
        },
        None => FileConfig::default(),
    };
    args.merge_into(&mut config);
    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return ExitCode::FAILURE;
    }

    #[cfg(feature = "camera")]
    if args.demo_code.is_none() {
        return run(barcode_scan::capture::NokhwaCamera::new(), config).await;
    }

    let code = args.demo_code.as_deref().unwrap_or("4006381333931");
    let pattern = match Ean13::parse(code) {
        Ok(ean) => FramePattern::Barcode(ean),
        Err(e) => {
            error!("Invalid demo code {:?}: {}", code, e);
            return ExitCode::FAILURE;
        }
    };
    info!("Using mock camera rendering {}", code);
    run(MockCamera::new(pattern), config).await
}

async fn run<C: Camera>(camera: C, config: FileConfig) -> ExitCode {
    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || running.store(false, Ordering::SeqCst)) {
            warn!("Failed to install Ctrl-C handler: {}", e);
        }
    }

    let exporter = Exporter::start(config.output.metrics_port);

    let decoder = DecoderAdapter::select(None, config.scan.symbology);
    let mut scanner = Scanner::new(Viewport::new(config.display.width), camera, decoder)
        .with_constraints(config.camera.clone());

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    let started = scanner.start(
        config.scan.scan_box(),
        move |value: &str| {
            let _ = tx.send(value.to_owned());
        },
        config.scan.interval(),
    );
    if let Err(e) = started {
        if e.is_camera_access() {
            error!("Camera unavailable: {}", e);
        } else {
            error!("Failed to start scanner: {}", e);
        }
        return ExitCode::FAILURE;
    }

    let deadline = config
        .output
        .duration_secs
        .map(|secs| tokio::time::Instant::now() + Duration::from_secs(secs));
    let mut poll = tokio::time::interval(POLL_INTERVAL);

    while running.load(Ordering::SeqCst) {
        if deadline.is_some_and(|d| tokio::time::Instant::now() >= d) {
            info!("Scan duration elapsed");
            break;
        }

        tokio::select! {
            value = rx.recv() => {
                let Some(value) = value else { break };
                println!("{} {}", chrono::Utc::now().to_rfc3339(), value);
                if config.output.once {
                    break;
                }
            }
            _ = poll.tick() => {
                if let Some(exporter) = &exporter {
                    exporter.publish(&scanner).await;
                }
            }
        }
    }

    let stats = scanner.stats();
    if let Err(e) = scanner.stop() {
        warn!("Stop failed: {}", e);
    }
    if let Some(exporter) = exporter {
        exporter.publish(&scanner).await;
        exporter.finish().await;
    }

    info!(
        "Scanned {} ticks: {} decodes, {} misses, {} dropped, {} confirmed",
        stats.ticks, stats.decodes, stats.misses, stats.dropped_ticks, stats.confirmed
    );
    ExitCode::SUCCESS
}

/// Prometheus exporter fed from the main loop.
#[cfg(feature = "metrics")]
struct Exporter {
    state: Arc<tokio::sync::RwLock<barcode_scan::metrics::MetricsState>>,
    shutdown: tokio::sync::oneshot::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

#[cfg(feature = "metrics")]
impl Exporter {
    fn start(port: u16) -> Option<Self> {
        use barcode_scan::metrics::{MetricsRegistry, MetricsServer, MetricsServerConfig};

        if port == 0 {
            return None;
        }
        let registry = match MetricsRegistry::new() {
            Ok(registry) => registry,
            Err(e) => {
                warn!("Metrics disabled: {}", e);
                return None;
            }
        };
        let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
        let state = server.state();
        let (shutdown, stopped) = tokio::sync::oneshot::channel();
        let task = tokio::spawn(async move {
            let shutdown = async {
                let _ = stopped.await;
            };
            if let Err(e) = server.run_until(shutdown).await {
                warn!("Metrics server stopped: {}", e);
            }
        });
        Some(Self {
            state,
            shutdown,
            task,
        })
    }

    async fn publish<C: Camera>(&self, scanner: &Scanner<C>) {
        let snapshot =
            barcode_scan::metrics::MetricsSnapshot::new(scanner.state(), scanner.stats());
        self.state.write().await.update(snapshot);
    }

    async fn finish(self) {
        let _ = self.shutdown.send(());
        let _ = self.task.await;
    }
}

/// Stand-in when built without the `metrics` feature.
#[cfg(not(feature = "metrics"))]
#[allow(dead_code)]
struct Exporter;

#[cfg(not(feature = "metrics"))]
impl Exporter {
    fn start(port: u16) -> Option<Self> {
        if port != 0 {
            warn!("Metrics port ignored: built without the `metrics` feature");
        }
        None
    }

    async fn publish<C: Camera>(&self, _scanner: &Scanner<C>) {}

    async fn finish(self) {}
}
