//! Dashboard routes: the aggregated overview and its cache controls.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;

use crate::backend::Resource;
use crate::errors::{ApiResponse, AppError};
use crate::services::dashboard::DashboardState;
use crate::AppState;

/// Result of a cache invalidation request.
#[derive(Debug, Serialize)]
pub struct InvalidationResult {
    pub resource: Resource,
    pub removed: usize,
}

/// GET /api/v1/dashboard: load (cache permitting) and return the published
/// state. A failed load still answers 200 with `status: "failed"` and the
/// previous snapshot.
pub async fn get(State(state): State<AppState>) -> Json<ApiResponse<DashboardState>> {
    if let Err(e) = state.dashboard.load(false).await {
        tracing::debug!(error = %e, upstream = e.is_upstream(), "Serving last good dashboard snapshot");
    }
    ApiResponse::success(state.dashboard.state())
}

/// POST /api/v1/dashboard/refresh: reload everything, bypassing the cache.
pub async fn refresh(State(state): State<AppState>) -> Json<ApiResponse<DashboardState>> {
    if let Err(e) = state.dashboard.refetch().await {
        tracing::debug!(error = %e, upstream = e.is_upstream(), "Refresh failed, serving last good snapshot");
    }
    ApiResponse::success(state.dashboard.state())
}

/// DELETE /api/v1/dashboard/cache/{resource}: drop cached reads of one
/// resource after it was mutated elsewhere.
pub async fn invalidate(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> Result<Json<ApiResponse<InvalidationResult>>, AppError> {
    let resource: Resource = resource.parse()?;
    let removed = state.dashboard.invalidate_cache(&resource.cache_prefix());
    Ok(ApiResponse::success(InvalidationResult { resource, removed }))
}
