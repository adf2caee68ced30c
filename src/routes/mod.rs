//! Route definitions for the Staffdesk API.

pub mod dashboard;
pub mod health;

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::AppState;

/// Build the full application router.
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.frontend_url);

    let dashboard_routes = Router::new()
        .route("/dashboard", get(dashboard::get))
        .route("/dashboard/refresh", post(dashboard::refresh))
        .route("/dashboard/cache/{resource}", delete(dashboard::invalidate));

    Router::new()
        .route("/health/live", get(health::live))
        .route("/health/ready", get(health::ready))
        .nest("/api/v1", dashboard_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(frontend_url: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match frontend_url.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(e) => {
            tracing::warn!(frontend_url, error = %e, "Invalid FRONTEND_URL, allowing any origin");
            layer.allow_origin(Any)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::backend::{HrBackend, Resource, ResourceQuery};
    use crate::config::AppConfig;
    use crate::errors::AppError;
    use crate::services::dashboard::{DashboardService, DashboardVariant};

    /// Serves a fixed organisation, or fails every projects read.
    struct FixedBackend {
        projects_down: bool,
    }

    #[async_trait]
    impl HrBackend for FixedBackend {
        async fn fetch(&self, query: &ResourceQuery) -> Result<Value, AppError> {
            match query.resource {
                Resource::Projects if self.projects_down => Err(AppError::Upstream {
                    resource: Resource::Projects,
                    status: 503,
                }),
                Resource::Users => Ok(json!([
                    {"_id": "u1", "name": "Ada", "role": "employee"},
                    {"_id": "u2", "name": "Linus", "role": "admin"}
                ])),
                Resource::Leaves => Ok(json!({"leaves": []})),
                _ => Ok(json!([])),
            }
        }
    }

    fn app(projects_down: bool) -> (Arc<DashboardService>, Router) {
        let dashboard = Arc::new(DashboardService::new(
            Arc::new(FixedBackend { projects_down }),
            DashboardVariant::Admin,
        ));
        let config = AppConfig {
            hr_api_url: "http://hr.test/api".to_string(),
            hr_api_token: None,
            hr_api_timeout_secs: 5,
            host: "127.0.0.1".to_string(),
            port: 0,
            frontend_url: "http://localhost:5173".to_string(),
            dashboard_variant: DashboardVariant::Admin,
        };
        let router = router(AppState {
            dashboard: Arc::clone(&dashboard),
            config,
        });
        (dashboard, router)
    }

    async fn send(router: Router, method: Method, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn live_is_ok() {
        let (_, router) = app(false);
        let (status, _) = send(router, Method::GET, "/health/live").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn ready_reports_probe() {
        let (_, router) = app(false);
        let (status, body) = send(router, Method::GET, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["hr_api"], "connected");
        assert_eq!(body["data"]["probe"]["checked"], 3);
    }

    #[tokio::test]
    async fn ready_reports_partial_outage() {
        let (_, router) = app(true);
        let (_, body) = send(router, Method::GET, "/health/ready").await;
        assert_eq!(body["data"]["status"], "ok");
        assert_eq!(body["data"]["probe"]["errors"], 1);
        assert_eq!(body["data"]["system_health"], 85);
    }

    #[tokio::test]
    async fn dashboard_returns_ready_state() {
        let (_, router) = app(false);
        let (status, body) = send(router, Method::GET, "/api/v1/dashboard").await;

        assert_eq!(status, StatusCode::OK);
        let data = &body["data"];
        assert_eq!(data["status"], "ready");
        assert!(data["error"].is_null());
        assert_eq!(data["snapshot"]["stats"]["total_users"], 2);
        assert_eq!(data["snapshot"]["stats"]["total_employees"], 1);
        assert_eq!(data["snapshot"]["variant"], "admin");
        assert_eq!(data["snapshot"]["recent_activities"][0]["type"], "user");
    }

    #[tokio::test]
    async fn failed_dashboard_load_is_reported_in_state() {
        let (_, router) = app(true);
        let (status, body) = send(router, Method::POST, "/api/v1/dashboard/refresh").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["status"], "failed");
        assert_eq!(body["data"]["error"], "HR API returned 503 for projects");
        assert_eq!(body["data"]["snapshot"]["stats"]["total_users"], 0);
        assert!(body["data"]["snapshot"]["generated_at"].is_null());
    }

    #[tokio::test]
    async fn invalidate_known_resource() {
        let (dashboard, router) = app(false);
        dashboard.load(false).await.unwrap();

        let (status, body) = send(router, Method::DELETE, "/api/v1/dashboard/cache/Leaves").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["resource"], "leaves");
        assert_eq!(body["data"]["removed"], 2);
    }

    #[tokio::test]
    async fn invalidate_unknown_resource_is_rejected() {
        let (_, router) = app(false);
        let (status, body) = send(router, Method::DELETE, "/api/v1/dashboard/cache/payroll").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
