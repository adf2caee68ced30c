//! reqwest-backed HR API client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use serde_json::Value;
use tracing::debug;

use super::{HrBackend, ResourceQuery};
use crate::config::AppConfig;
use crate::errors::AppError;

/// HR API client with connection pooling and optional bearer auth.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    token: Option<String>,
}

impl HttpBackend {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> Result<Self, AppError> {
        // Url::join drops the last path segment unless the base ends with '/'.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)
            .map_err(|e| AppError::Validation(format!("Invalid HR_API_URL {base_url}: {e}")))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("staffdesk/", env!("CARGO_PKG_VERSION")))
            .pool_max_idle_per_host(8)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        Self::new(
            &config.hr_api_url,
            config.hr_api_token.clone(),
            Duration::from_secs(config.hr_api_timeout_secs),
        )
    }

    fn url_for(&self, query: &ResourceQuery) -> Result<Url, AppError> {
        let mut url = self
            .base_url
            .join(query.resource.as_str())
            .map_err(|e| AppError::Internal(format!("Cannot build URL for {}: {e}", query.resource)))?;
        if !query.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &query.params {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl HrBackend for HttpBackend {
    async fn fetch(&self, query: &ResourceQuery) -> Result<Value, AppError> {
        let url = self.url_for(query)?;
        debug!(url = %url, "Fetching HR resource");

        let mut request = self.client.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let resp = request.send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream {
                resource: query.resource,
                status: status.as_u16(),
            });
        }

        let bytes = resp.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| AppError::Decode {
            resource: query.resource,
            source,
        })
    }
}
