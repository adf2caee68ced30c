//! Users and people references.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::Timestamped;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum UserRole {
    Admin,
    Hr,
    Manager,
    Employee,
    #[default]
    Other,
}

impl From<Option<String>> for UserRole {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(lenient::normalize).as_deref() {
            Some("admin" | "administrator" | "super_admin") => Self::Admin,
            Some("hr" | "hr_manager" | "human_resources") => Self::Hr,
            Some("manager" | "team_lead") => Self::Manager,
            Some("employee" | "staff") => Self::Employee,
            _ => Self::Other,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Hr => write!(f, "HR"),
            Self::Manager => write!(f, "manager"),
            Self::Employee => write!(f, "employee"),
            Self::Other => write!(f, "member"),
        }
    }
}

/// A person or department as the HR API embeds it: either a bare id or a
/// populated sub-document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    Id(String),
    Record(NamedRecord),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct NamedRecord {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl Reference {
    /// Identifier used to match against other records.
    pub fn key(&self) -> &str {
        match self {
            Self::Id(id) => id,
            Self::Record(r) if !r.id.is_empty() => &r.id,
            Self::Record(r) => r.name.as_deref().unwrap_or_default(),
        }
    }

    /// Human-readable label, falling back to the id.
    pub fn label(&self) -> String {
        match self {
            Self::Id(id) => id.clone(),
            Self::Record(r) => full_name(r.name.as_deref(), r.first_name.as_deref(), r.last_name.as_deref())
                .unwrap_or_else(|| r.id.clone()),
        }
    }

    /// True when this reference points at `id` or is named `name`.
    pub fn matches(&self, id: &str, name: &str) -> bool {
        let candidates = match self {
            Self::Id(value) => [Some(value.as_str()), None],
            Self::Record(r) => [Some(r.id.as_str()), r.name.as_deref()],
        };
        candidates
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .any(|c| c == id || c.eq_ignore_ascii_case(name))
    }
}

/// User record as returned by `GET /users`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct User {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default)]
    pub department: Option<Reference>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    pub fn display_name(&self) -> String {
        full_name(self.name.as_deref(), self.first_name.as_deref(), self.last_name.as_deref())
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| "Unknown user".to_string())
    }

    pub fn is_employee(&self) -> bool {
        self.role == UserRole::Employee
    }
}

impl Timestamped for User {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }
}

fn full_name(name: Option<&str>, first: Option<&str>, last: Option<&str>) -> Option<String> {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        return Some(name.to_string());
    }
    let joined = [first, last]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    (!joined.is_empty()).then_some(joined)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn role_parsing_is_lenient() {
        assert_eq!(UserRole::from(Some("HR".to_string())), UserRole::Hr);
        assert_eq!(UserRole::from(Some("Admin".to_string())), UserRole::Admin);
        assert_eq!(UserRole::from(Some("intern".to_string())), UserRole::Other);
        assert_eq!(UserRole::from(None), UserRole::Other);
    }

    #[test]
    fn user_from_mongo_style_json() {
        let user: User = serde_json::from_value(json!({
            "_id": "64f1",
            "firstName": "Ada",
            "lastName": "Lovelace",
            "role": "employee",
            "department": {"_id": "d1", "name": "Engineering"},
            "createdAt": "2024-05-01T10:00:00.000Z"
        }))
        .unwrap();
        assert_eq!(user.id, "64f1");
        assert_eq!(user.display_name(), "Ada Lovelace");
        assert!(user.is_employee());
        assert!(user.department.as_ref().unwrap().matches("d1", "Engineering"));
        assert!(user.created_at.is_some());
    }

    #[test]
    fn missing_fields_use_defaults() {
        let user: User = serde_json::from_value(json!({"email": "x@corp.test"})).unwrap();
        assert_eq!(user.role, UserRole::Other);
        assert_eq!(user.display_name(), "x@corp.test");
        assert!(user.created_at.is_none());
    }

    #[test]
    fn reference_accepts_bare_id() {
        let r: Reference = serde_json::from_value(json!("d7")).unwrap();
        assert_eq!(r.key(), "d7");
        assert!(r.matches("d7", "Sales"));
        assert!(!r.matches("d8", "Sales"));
    }

    #[test]
    fn reference_matches_department_by_name() {
        let r: Reference = serde_json::from_value(json!({"name": "sales"})).unwrap();
        assert!(r.matches("d1", "Sales"));
        assert_eq!(r.key(), "sales");
    }
}
