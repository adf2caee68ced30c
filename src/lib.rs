pub mod backend;
pub mod config;
pub mod errors;
pub mod models;
pub mod routes;
pub mod services;

use std::sync::Arc;

use services::dashboard::DashboardService;

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub dashboard: Arc<DashboardService>,
    pub config: config::AppConfig,
}
