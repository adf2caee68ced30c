//! Project records and lifecycle status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::user::Reference;
use super::Timestamped;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum ProjectStatus {
    Planning,
    Active,
    Completed,
    OnHold,
    Cancelled,
    #[default]
    Other,
}

impl From<Option<String>> for ProjectStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(lenient::normalize).as_deref() {
            Some("planning" | "planned" | "not_started") => Self::Planning,
            Some("active" | "in_progress" | "ongoing") => Self::Active,
            Some("completed" | "complete" | "done") => Self::Completed,
            Some("on_hold" | "onhold" | "paused") => Self::OnHold,
            Some("cancelled" | "canceled") => Self::Cancelled,
            _ => Self::Other,
        }
    }
}

impl ProjectStatus {
    /// Past-tense phrase used in activity messages.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Planning => "was created",
            Self::Active => "is now in progress",
            Self::Completed => "was completed",
            Self::OnHold => "was put on hold",
            Self::Cancelled => "was cancelled",
            Self::Other => "was updated",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Project {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, alias = "title")]
    pub name: Option<String>,
    #[serde(default)]
    pub status: ProjectStatus,
    #[serde(default)]
    pub department: Option<Reference>,
    #[serde(default)]
    pub client: Option<Reference>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Project {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Untitled project")
    }
}

impl Timestamped for Project {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Status changes bump `updatedAt`, which is what the feed reports.
    fn recency(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}
