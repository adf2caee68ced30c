use std::env;

use crate::services::dashboard::DashboardVariant;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub hr_api_url: String,
    pub hr_api_token: Option<String>,
    pub hr_api_timeout_secs: u64,
    pub host: String,
    pub port: u16,
    pub frontend_url: String,
    pub dashboard_variant: DashboardVariant,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, env::VarError> {
        Ok(Self {
            hr_api_url: env::var("HR_API_URL")?,
            hr_api_token: env::var("HR_API_TOKEN").ok().filter(|t| !t.is_empty()),
            hr_api_timeout_secs: env::var("HR_API_TIMEOUT_SECS")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),
            host: env::var("BACKEND_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("BACKEND_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "https://localhost:5173".to_string()),
            dashboard_variant: env::var("DASHBOARD_VARIANT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
        })
    }
}
