//! Decoding of list responses.
//!
//! HR API list endpoints are inconsistent about their envelope. Accepted
//! shapes, tried in order:
//! - a bare array
//! - `{ "<resource>": [...] }`
//! - `{ "data" | "items" | "results": [...] }`
//! - any of the above nested once under `"data"`

use serde::de::{DeserializeOwned, Error as _};
use serde_json::{Map, Value};

use crate::backend::Resource;
use crate::errors::AppError;

const WRAPPER_KEYS: [&str; 3] = ["data", "items", "results"];

/// Decode a raw list response into typed records.
///
/// Individually malformed records are skipped with a warning; a body with no
/// recognizable list is an error.
pub fn decode_list<T: DeserializeOwned>(resource: Resource, body: Value) -> Result<Vec<T>, AppError> {
    let items = extract_items(resource, body, 0).ok_or_else(|| AppError::Decode {
        resource,
        source: serde_json::Error::custom("response contains no list of records"),
    })?;

    let total = items.len();
    let records: Vec<T> = items
        .into_iter()
        .filter_map(|item| match serde_json::from_value(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(resource = %resource, error = %e, "Skipping malformed record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            resource = %resource,
            decoded = records.len(),
            total,
            "Partially decoded list response"
        );
    }
    Ok(records)
}

fn extract_items(resource: Resource, body: Value, depth: u8) -> Option<Vec<Value>> {
    match body {
        Value::Array(items) => Some(items),
        Value::Object(map) if depth < 2 => extract_from_object(resource, map, depth),
        _ => None,
    }
}

fn extract_from_object(resource: Resource, mut map: Map<String, Value>, depth: u8) -> Option<Vec<Value>> {
    if let Some(Value::Array(items)) = map.remove(resource.as_str()) {
        return Some(items);
    }
    for key in WRAPPER_KEYS {
        match map.remove(key) {
            Some(Value::Array(items)) => return Some(items),
            Some(nested @ Value::Object(_)) => {
                if let Some(items) = extract_items(resource, nested, depth + 1) {
                    return Some(items);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Named {
        name: String,
    }

    fn names(records: Vec<Named>) -> Vec<String> {
        records.into_iter().map(|r| r.name).collect()
    }

    #[test]
    fn bare_array() {
        let out = decode_list::<Named>(Resource::Users, json!([{"name": "a"}, {"name": "b"}])).unwrap();
        assert_eq!(names(out), ["a", "b"]);
    }

    #[test]
    fn keyed_by_resource() {
        let body = json!({"policies": [{"name": "Remote work"}], "total": 1});
        let out = decode_list::<Named>(Resource::Policies, body).unwrap();
        assert_eq!(names(out), ["Remote work"]);
    }

    #[test]
    fn wrapped_in_data() {
        let body = json!({"success": true, "data": [{"name": "x"}]});
        let out = decode_list::<Named>(Resource::Leads, body).unwrap();
        assert_eq!(names(out), ["x"]);
    }

    #[test]
    fn nested_under_data() {
        let body = json!({"data": {"meetings": [{"name": "standup"}]}});
        let out = decode_list::<Named>(Resource::Meetings, body).unwrap();
        assert_eq!(names(out), ["standup"]);
    }

    #[test]
    fn malformed_records_are_skipped() {
        let body = json!([{"name": "ok"}, {"title": "no name"}, 7]);
        let out = decode_list::<Named>(Resource::Documents, body).unwrap();
        assert_eq!(names(out), ["ok"]);
    }

    #[test]
    fn object_without_list_is_an_error() {
        let err = decode_list::<Named>(Resource::Users, json!({"message": "ok"})).unwrap_err();
        assert!(matches!(err, AppError::Decode { resource: Resource::Users, .. }));

        let err = decode_list::<Named>(Resource::Users, json!("nope")).unwrap_err();
        assert!(err.is_upstream());
    }
}
