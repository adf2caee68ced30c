//! Health check endpoints for liveness and readiness probes.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::errors::ApiResponse;
use crate::services::health::{self, ProbeReport};
use crate::AppState;

/// Readiness probe detail.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub hr_api: String,
    pub system_health: u8,
    pub probe: ProbeReport,
}

/// Liveness probe. Always OK while the process is running.
pub async fn live() -> &'static str {
    "OK"
}

/// Readiness probe. Re-reads a few HR API lists without the cache.
pub async fn ready(State(state): State<AppState>) -> Json<ApiResponse<HealthStatus>> {
    let probe = state.dashboard.probe().await;

    let hr_api = match probe.errors {
        0 => "connected".to_string(),
        n if probe.is_reachable() => format!("degraded: {n} of {} reads failed", probe.checked),
        _ => "unreachable".to_string(),
    };
    if probe.errors > 0 {
        tracing::warn!(errors = probe.errors, "HR API health check failed");
    }

    ApiResponse::success(HealthStatus {
        status: if probe.is_reachable() { "ok" } else { "error" }.to_string(),
        hr_api,
        system_health: health::system_health(&probe),
        probe,
    })
}
