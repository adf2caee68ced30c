//! Unified error handling with consistent API response envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::backend::Resource;

/// Error detail in the API response envelope.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

/// Consistent JSON envelope for all API responses.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a successful result in the envelope.
    pub fn success(data: T) -> Json<Self> {
        Json(Self {
            data: Some(data),
            error: None,
        })
    }

    /// Wrap an error in the envelope.
    pub fn error(code: &str, message: &str) -> Json<Self> {
        Json(Self {
            data: None,
            error: Some(ApiError {
                code: code.to_string(),
                message: message.to_string(),
            }),
        })
    }
}

/// Application error type mapping to HTTP status codes.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("HR API returned {status} for {resource}")]
    Upstream { resource: Resource, status: u16 },

    #[error("HR API transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed {resource} payload: {source}")]
    Decode {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Check if this error originated from the HR backend rather than from us.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Upstream { .. } | Self::Transport(_) | Self::Decode { .. }
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Upstream { .. } | AppError::Transport(_) | AppError::Decode { .. } => {
                tracing::error!(error = %self, "HR API error");
                (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR", self.to_string())
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        (status, ApiResponse::<()>::error(code, &message)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_success() {
        let response = ApiResponse::success("hello");
        let json = serde_json::to_value(&response.0).unwrap();
        assert_eq!(json["data"], "hello");
        assert!(json["error"].is_null());
    }

    #[test]
    fn api_response_error() {
        let response = ApiResponse::<()>::error("VALIDATION_ERROR", "Unknown resource: payroll");
        let json = serde_json::to_value(&response.0).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["message"], "Unknown resource: payroll");
    }

    #[test]
    fn upstream_error_display() {
        let err = AppError::Upstream {
            resource: Resource::Projects,
            status: 503,
        };
        assert_eq!(err.to_string(), "HR API returned 503 for projects");
        assert!(err.is_upstream());
    }

    #[test]
    fn decode_error_is_upstream() {
        let source = serde_json::from_str::<Vec<u8>>("{").unwrap_err();
        let err = AppError::Decode {
            resource: Resource::Users,
            source,
        };
        assert!(err.is_upstream());
        assert!(err.to_string().starts_with("Malformed users payload"));
    }

    #[test]
    fn upstream_maps_to_bad_gateway() {
        let response = AppError::Upstream {
            resource: Resource::Clients,
            status: 500,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn validation_maps_to_bad_request() {
        let response = AppError::Validation("unknown resource".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn error_response_uses_envelope() {
        let response = AppError::Upstream {
            resource: Resource::Leaves,
            status: 404,
        }
        .into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert!(json["data"].is_null());
        assert_eq!(json["error"]["code"], "UPSTREAM_ERROR");
        assert_eq!(json["error"]["message"], "HR API returned 404 for leaves");
    }
}
