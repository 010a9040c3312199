//! HTTP exporter for scanner metrics.
//!
//! Routes:
//! - `GET /metrics` Prometheus text format
//! - `GET /health` scanner state; `503` while no session is running
//! - `GET /stats` current session counters as `key value` lines

use crate::metrics::{MetricsRegistry, MetricsSnapshot};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Router};
use std::fmt::Write as _;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind metrics listener: {0}")]
    Bind(#[from] std::io::Error),

    #[error("metrics server failed: {0}")]
    Serve(String),
}

/// Where the exporter listens.
#[derive(Debug, Clone)]
pub struct MetricsServerConfig {
    pub bind_addr: SocketAddr,
}

impl Default for MetricsServerConfig {
    fn default() -> Self {
        Self::with_port(9184)
    }
}

impl MetricsServerConfig {
    /// Listens on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], port)),
        }
    }
}

/// Registry plus the most recent snapshot, shared with the handlers.
pub struct MetricsState {
    registry: MetricsRegistry,
    latest: MetricsSnapshot,
}

impl MetricsState {
    /// Pushes a new snapshot into the registry.
    pub fn update(&mut self, snapshot: MetricsSnapshot) {
        self.registry.update(&snapshot);
        self.latest = snapshot;
    }

    pub fn latest(&self) -> MetricsSnapshot {
        self.latest
    }

    fn health(&self) -> (StatusCode, &'static str) {
        if self.latest.scanning {
            (StatusCode::OK, "scanning")
        } else if self.latest.paused {
            (StatusCode::OK, "paused")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "idle")
        }
    }

    fn stats_text(&self) -> String {
        let stats = self.latest.stats;
        let mut out = String::new();
        for (key, value) in [
            ("ticks", stats.ticks),
            ("dropped_ticks", stats.dropped_ticks),
            ("frame_errors", stats.frame_errors),
            ("decodes", stats.decodes),
            ("misses", stats.misses),
            ("confirmed", stats.confirmed),
        ] {
            let _ = writeln!(out, "{key} {value}");
        }
        out
    }
}

type SharedState = Arc<RwLock<MetricsState>>;

/// Serves the scanner's metrics over HTTP.
pub struct MetricsServer {
    config: MetricsServerConfig,
    state: SharedState,
}

impl MetricsServer {
    pub fn new(config: MetricsServerConfig, registry: MetricsRegistry) -> Self {
        Self {
            config,
            state: Arc::new(RwLock::new(MetricsState {
                registry,
                latest: MetricsSnapshot::default(),
            })),
        }
    }

    /// Handle for pushing snapshots while the server runs.
    pub fn state(&self) -> SharedState {
        Arc::clone(&self.state)
    }

    fn router(state: SharedState) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .route("/health", get(health_handler))
            .route("/stats", get(stats_handler))
            .layer(CorsLayer::permissive())
            .with_state(state)
    }

    /// Serves until `shutdown` resolves.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.config.bind_addr).await?;
        tracing::info!(addr = %self.config.bind_addr, "metrics exporter listening");

        axum::serve(listener, Self::router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ServerError::Serve(e.to_string()))
    }
}

async fn metrics_handler(State(state): State<SharedState>) -> impl IntoResponse {
    match state.read().await.registry.encode() {
        Ok(body) => (StatusCode::OK, [("content-type", PROMETHEUS_CONTENT_TYPE)], body),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("metrics encoding failed: {e}"),
        ),
    }
}

async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.read().await.health()
}

async fn stats_handler(State(state): State<SharedState>) -> impl IntoResponse {
    state.read().await.stats_text()
}
