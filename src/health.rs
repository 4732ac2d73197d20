//! `GET /health` endpoint handler.
//!
//! Returns a [`HealthResponse`] JSON payload with the build version,
//! uptime, upstream settings, route table metadata, and cumulative
//! request counters.

use std::sync::atomic::Ordering;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::server::AppState;

#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub commit: String,
    pub uptime_seconds: u64,
    pub upstream: UpstreamHealth,
    pub routes: RoutesHealth,
    pub stats: StatsResponse,
}

#[derive(Serialize, Deserialize)]
pub struct UpstreamHealth {
    pub base_url: String,
    pub timeout_ms: u64,
}

#[derive(Serialize, Deserialize)]
pub struct RoutesHealth {
    pub source: String,
    pub digest: String,
    pub count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct StatsResponse {
    pub relayed: u64,
    pub gateway_errors: u64,
    pub telemetry_accepted: u64,
    pub telemetry_dropped: u64,
}

pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let config = &state.config;
    let stats = &state.stats;

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        commit: env!("GATEWAY_GIT_SHORT").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        upstream: UpstreamHealth {
            base_url: config.upstream.base_url.to_string(),
            timeout_ms: u64::try_from(config.upstream.timeout.as_millis()).unwrap_or(u64::MAX),
        },
        routes: RoutesHealth {
            source: config.source.clone(),
            digest: config.digest.short().to_string(),
            count: state.routes.len(),
        },
        stats: StatsResponse {
            relayed: stats.relayed.load(Ordering::Relaxed),
            gateway_errors: stats.gateway_errors.load(Ordering::Relaxed),
            telemetry_accepted: stats.telemetry_accepted.load(Ordering::Relaxed),
            telemetry_dropped: stats.telemetry_dropped.load(Ordering::Relaxed),
        },
    })
}
