//! HR REST backend abstraction.
//!
//! The dashboard only ever issues list reads. Each read is described by a
//! [`ResourceQuery`], which also yields the cache key under which the raw
//! response is stored.

pub mod http;

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::errors::AppError;

pub use http::HttpBackend;

/// Prefix shared by every cache key the dashboard writes.
pub const CACHE_KEY_PREFIX: &str = "dashboard";

/// A named category of backend data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Users,
    Projects,
    Clients,
    Departments,
    Leads,
    Announcements,
    Documents,
    Policies,
    Meetings,
    Attendance,
    Leaves,
}

impl Resource {
    pub const ALL: [Resource; 11] = [
        Resource::Users,
        Resource::Projects,
        Resource::Clients,
        Resource::Departments,
        Resource::Leads,
        Resource::Announcements,
        Resource::Documents,
        Resource::Policies,
        Resource::Meetings,
        Resource::Attendance,
        Resource::Leaves,
    ];

    /// Path segment and envelope key used by the HR API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Projects => "projects",
            Self::Clients => "clients",
            Self::Departments => "departments",
            Self::Leads => "leads",
            Self::Announcements => "announcements",
            Self::Documents => "documents",
            Self::Policies => "policies",
            Self::Meetings => "meetings",
            Self::Attendance => "attendance",
            Self::Leaves => "leaves",
        }
    }

    /// Cache key prefix covering every parameterized read of this resource.
    pub fn cache_prefix(&self) -> String {
        format!("{CACHE_KEY_PREFIX}_{}", self.as_str())
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AppError::Validation(format!("Unknown resource: {s}")))
    }
}

/// A single list read against the HR API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceQuery {
    pub resource: Resource,
    pub params: Vec<(&'static str, String)>,
}

impl ResourceQuery {
    pub fn new(resource: Resource) -> Self {
        Self {
            resource,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.params.push((name, value.into()));
        self
    }

    /// `dashboard_<resource>` followed by each parameter value, e.g.
    /// `dashboard_attendance_2024-05-01`.
    pub fn cache_key(&self) -> String {
        let mut key = self.resource.cache_prefix();
        for (_, value) in &self.params {
            key.push('_');
            key.push_str(value);
        }
        key
    }
}

impl From<Resource> for ResourceQuery {
    fn from(resource: Resource) -> Self {
        Self::new(resource)
    }
}

/// Read access to the HR REST backend.
///
/// Implementations return the raw JSON body; decoding into typed records
/// happens in [`crate::models::envelope`].
#[async_trait]
pub trait HrBackend: Send + Sync {
    async fn fetch(&self, query: &ResourceQuery) -> Result<Value, AppError>;
}
