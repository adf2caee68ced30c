//! Recent-activity feed built from the tails of raw entity lists.

use std::cmp::Reverse;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::attendance::LeaveRequest;
use crate::models::newest_first;
use crate::models::organization::Client;
use crate::models::project::Project;
use crate::models::user::User;
use crate::models::Timestamped;

/// Admin feed length.
pub const ADMIN_FEED_LIMIT: usize = 15;
/// HR feed length.
pub const HR_FEED_LIMIT: usize = 10;
/// How far back a user still counts as a new hire in the HR feed.
pub const NEW_HIRE_WINDOW_DAYS: i64 = 7;

const RECENT_USERS: usize = 5;
const RECENT_PROJECTS: usize = 5;
const RECENT_CLIENTS: usize = 3;
const RECENT_APPROVALS: usize = 3;
const RECENT_HR_ITEMS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    User,
    Project,
    Client,
    Employee,
    Approval,
    Leave,
}

/// One line of the activity feed.
///
/// `time` is `None` when the source record carried no timestamp; such items
/// sort after all timed ones.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActivityItem {
    pub id: u32,
    #[serde(rename = "type")]
    pub kind: ActivityKind,
    pub message: String,
    pub time: Option<DateTime<Utc>>,
}

/// Raw lists a feed is built from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActivitySources<'a> {
    pub users: &'a [User],
    pub projects: &'a [Project],
    pub clients: &'a [Client],
    pub approved_leaves: &'a [LeaveRequest],
    pub pending_leaves: &'a [LeaveRequest],
}

/// Organisation-wide feed: sign-ups, project changes, new clients and
/// leave approvals.
pub fn admin_feed(sources: &ActivitySources<'_>) -> Vec<ActivityItem> {
    let mut entries = Vec::new();

    entries.extend(newest_first(sources.users, RECENT_USERS).into_iter().map(|u| {
        (
            ActivityKind::User,
            format!("New user {} registered as {}", u.display_name(), u.role),
            u.recency(),
        )
    }));
    entries.extend(newest_first(sources.projects, RECENT_PROJECTS).into_iter().map(|p| {
        (
            ActivityKind::Project,
            format!("Project \"{}\" {}", p.display_name(), p.status.verb()),
            p.recency(),
        )
    }));
    entries.extend(newest_first(sources.clients, RECENT_CLIENTS).into_iter().map(|c| {
        (
            ActivityKind::Client,
            format!("New client {} added", c.display_name()),
            c.recency(),
        )
    }));
    entries.extend(approvals(sources.approved_leaves, RECENT_APPROVALS));

    finish(entries, ADMIN_FEED_LIMIT)
}

/// People-focused feed: pending leave requests, new hires from the last
/// week, and approvals.
pub fn hr_feed(sources: &ActivitySources<'_>, now: DateTime<Utc>) -> Vec<ActivityItem> {
    let mut entries = Vec::new();

    entries.extend(
        newest_first(sources.pending_leaves, RECENT_HR_ITEMS)
            .into_iter()
            .map(|l| {
                (
                    ActivityKind::Leave,
                    format!("{} requested {}", l.employee_label(), leave_label(l)),
                    l.recency(),
                )
            }),
    );

    let hired_since = now - Duration::days(NEW_HIRE_WINDOW_DAYS);
    let new_hires: Vec<User> = sources
        .users
        .iter()
        .filter(|u| u.is_employee())
        .filter(|u| u.created_at.is_some_and(|t| t >= hired_since && t <= now))
        .cloned()
        .collect();
    entries.extend(newest_first(&new_hires, RECENT_HR_ITEMS).into_iter().map(|u| {
        let team = u
            .department
            .as_ref()
            .map(|d| d.label())
            .unwrap_or_else(|| "the team".to_string());
        (
            ActivityKind::Employee,
            format!("{} joined {}", u.display_name(), team),
            u.created_at,
        )
    }));

    entries.extend(approvals(sources.approved_leaves, RECENT_HR_ITEMS));

    finish(entries, HR_FEED_LIMIT)
}

type Entry = (ActivityKind, String, Option<DateTime<Utc>>);

fn approvals(leaves: &[LeaveRequest], limit: usize) -> impl Iterator<Item = Entry> + '_ {
    newest_first(leaves, limit).into_iter().map(|l| {
        (
            ActivityKind::Approval,
            format!("{}'s {} was approved", l.employee_label(), leave_label(l)),
            l.recency(),
        )
    })
}

fn leave_label(leave: &LeaveRequest) -> String {
    match leave.leave_type.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        Some(kind) if kind.to_ascii_lowercase().contains("leave") => kind.to_string(),
        Some(kind) => format!("{kind} leave"),
        None => "leave".to_string(),
    }
}

/// Merge, order newest first, truncate, and number the batch from 1.
fn finish(mut entries: Vec<Entry>, limit: usize) -> Vec<ActivityItem> {
    entries.sort_by_key(|(_, _, time)| Reverse(*time));
    entries.truncate(limit);
    entries
        .into_iter()
        .zip(1..)
        .map(|((kind, message, time), id)| ActivityItem {
            id,
            kind,
            message,
            time,
        })
        .collect()
}
