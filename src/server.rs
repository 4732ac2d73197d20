//! Axum server setup, shared application state, and graceful shutdown.
//!
//! Contains [`AppState`] (the `Arc`-shared state holding the immutable
//! gateway config, compiled route table, HTTP client, counters, and
//! optional alerting), [`build_router`] for constructing the Axum
//! router with middleware layers, [`build_http_client`] for the
//! connection-pooled hyper client, and [`shutdown_signal`] for
//! SIGTERM / Ctrl+C handling.

use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::alert::SlackNotifier;
use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::health::health_handler;
use crate::proxy::{self, RouteTable};

#[derive(Debug)]
pub struct Stats {
    /// Upstream replies relayed to the caller, whatever their status.
    pub relayed: AtomicU64,
    /// Relay requests answered with a gateway error.
    pub gateway_errors: AtomicU64,
    pub telemetry_accepted: AtomicU64,
    pub telemetry_dropped: AtomicU64,
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

impl Stats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            relayed: AtomicU64::new(0),
            gateway_errors: AtomicU64::new(0),
            telemetry_accepted: AtomicU64::new(0),
            telemetry_dropped: AtomicU64::new(0),
        }
    }
}

pub type HttpsConnector =
    hyper_rustls::HttpsConnector<hyper_util::client::legacy::connect::HttpConnector>;
pub type HttpClient = Client<HttpsConnector, http_body_util::Full<bytes::Bytes>>;

pub struct AppState {
    pub config: GatewayConfig,
    pub routes: RouteTable,
    pub http_client: HttpClient,
    pub start_time: Instant,
    pub stats: Stats,
    pub alerts: Option<SlackNotifier>,
}

impl AppState {
    /// Compile the route table from `config`.
    pub fn new(config: GatewayConfig, http_client: HttpClient) -> Result<Self, GatewayError> {
        let routes = RouteTable::compile(&config.routes, config.upstream.timeout)?;
        Ok(Self {
            config,
            routes,
            http_client,
            start_time: Instant::now(),
            stats: Stats::new(),
            alerts: None,
        })
    }

    #[must_use]
    pub fn with_alerts(mut self, alerts: SlackNotifier) -> Self {
        self.alerts = Some(alerts);
        self
    }
}

#[must_use]
pub fn build_http_client() -> HttpClient {
    // With more than one rustls crypto provider compiled in, rustls cannot
    // pick one on its own. Install `ring` explicitly.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let https = hyper_rustls::HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();
    Client::builder(TokioExecutor::new())
        .pool_idle_timeout(Duration::from_secs(30))
        .build(https)
}

pub fn build_router(state: Arc<AppState>, max_body: usize) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(proxy::forward_handler)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::max(max_body)),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("received Ctrl+C"),
        () = terminate => tracing::info!("received SIGTERM"),
    }
}
