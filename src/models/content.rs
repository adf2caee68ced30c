//! Announcements, documents, policies and meetings shown in the side widgets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::Timestamped;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Announcement {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "message")]
    pub content: Option<String>,
    #[serde(default)]
    pub priority: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Document {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Policy {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, alias = "name")]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub effective_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct Meeting {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "date", alias = "start", deserialize_with = "lenient::timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default, alias = "end", deserialize_with = "lenient::timestamp")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

macro_rules! timestamped {
    ($($ty:ty),+) => {
        $(
            impl Timestamped for $ty {
                fn created_at(&self) -> Option<DateTime<Utc>> {
                    self.created_at
                }

                fn updated_at(&self) -> Option<DateTime<Utc>> {
                    self.updated_at
                }
            }
        )+
    };
}

timestamped!(Announcement, Document, Policy);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn meeting_accepts_date_alias() {
        let m: Meeting = serde_json::from_value(json!({
            "_id": "m1",
            "title": "Quarterly review",
            "date": "2024-05-03T14:00:00Z"
        }))
        .unwrap();
        assert_eq!(m.id, "m1");
        assert!(m.start_time.is_some());
    }

    #[test]
    fn announcement_message_alias() {
        let a: Announcement =
            serde_json::from_value(json!({"title": "Office closed", "message": "Friday"})).unwrap();
        assert_eq!(a.content.as_deref(), Some("Friday"));
    }
}
