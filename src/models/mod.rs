//! Typed records decoded from the HR REST API.

pub mod attendance;
pub mod content;
pub mod envelope;
pub mod lenient;
pub mod organization;
pub mod project;
pub mod user;

use std::cmp::Reverse;

use chrono::{DateTime, Utc};

/// Records carrying creation/update timestamps.
pub trait Timestamped {
    fn created_at(&self) -> Option<DateTime<Utc>>;

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        None
    }

    /// Best available "when did this happen" for activity ordering.
    fn recency(&self) -> Option<DateTime<Utc>> {
        self.created_at().or_else(|| self.updated_at())
    }
}

/// The `limit` most recent records, newest first.
///
/// Records without any timestamp sort after all timed records. Lists arrive
/// oldest first, so ties (including untimed records) go to the later entry.
pub fn newest_first<T: Timestamped>(items: &[T], limit: usize) -> Vec<&T> {
    let mut sorted: Vec<(usize, &T)> = items.iter().enumerate().collect();
    // Option<T> orders None first, so Reverse puts it last.
    sorted.sort_by_key(|(idx, item)| Reverse((item.recency(), *idx)));
    sorted.truncate(limit);
    sorted.into_iter().map(|(_, item)| item).collect()
}
