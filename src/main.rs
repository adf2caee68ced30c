use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use staffdesk::backend::HttpBackend;
use staffdesk::config::AppConfig;
use staffdesk::services::dashboard::DashboardService;
use staffdesk::AppState;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// M-MIMALLOC-APP: Use mimalloc as global allocator for improved performance.
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "staffdesk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("HR_API_URL must be set")?;
    let backend = HttpBackend::from_config(&config)?;
    let dashboard = Arc::new(DashboardService::new(
        Arc::new(backend),
        config.dashboard_variant,
    ));

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid BACKEND_HOST/BACKEND_PORT")?;
    tracing::info!(
        host = %addr,
        hr_api = %config.hr_api_url,
        variant = ?config.dashboard_variant,
        "Starting Staffdesk dashboard server"
    );

    let app = staffdesk::routes::router(AppState { dashboard, config });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
