//! Composite 0-100 health scores.
//!
//! Both scores start at 100 and subtract independent threshold penalties,
//! then clamp to 0..=100.
//!
//! Office health:
//! - attendance rate below 70% (-15) or below 85% (-5)
//! - more than 10 (-10) or more than 5 (-5) pending leave requests
//! - more than 5 (-10) or more than 2 (-5) late arrivals today
//! - organisation-wide project completion below 30% (-10)
//!
//! System health:
//! - 3+ probe errors (-30) or any probe error (-15)
//! - probe latency above 3000ms (-20) or above 1500ms (-10)

use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::backend::{HrBackend, Resource, ResourceQuery};

const FULL_HEALTH: i32 = 100;

/// Resources re-read by the liveness probe.
pub const PROBE_RESOURCES: [Resource; 3] = [Resource::Users, Resource::Projects, Resource::Clients];

/// Inputs to the office health score.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfficeHealthInput {
    pub employees: usize,
    pub present_today: usize,
    pub late_today: usize,
    pub pending_leaves: usize,
    pub total_projects: usize,
    pub completed_projects: usize,
}

/// Outcome of one uncached liveness probe against the HR API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeReport {
    pub checked: usize,
    pub errors: usize,
    #[serde(rename = "latency_ms", serialize_with = "as_millis")]
    pub latency: Duration,
}

impl ProbeReport {
    pub fn is_reachable(&self) -> bool {
        self.errors < self.checked
    }
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis().try_into().unwrap_or(u64::MAX))
}

/// Percentage of `part` in `whole`, unrounded. `None` when `whole` is zero.
///
/// Thresholds compare against this value; use [`round_rate`] for display.
pub fn rate(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(part as f64 * 100.0 / whole as f64)
}

/// Round a percentage to one decimal.
pub fn round_rate(pct: f64) -> f64 {
    (pct * 10.0).round() / 10.0
}

pub fn attendance_penalty(rate: f64) -> i32 {
    if rate < 70.0 {
        -15
    } else if rate < 85.0 {
        -5
    } else {
        0
    }
}

pub fn pending_leave_penalty(pending: usize) -> i32 {
    if pending > 10 {
        -10
    } else if pending > 5 {
        -5
    } else {
        0
    }
}

pub fn late_arrival_penalty(late: usize) -> i32 {
    if late > 5 {
        -10
    } else if late > 2 {
        -5
    } else {
        0
    }
}

pub fn completion_penalty(rate: f64) -> i32 {
    if rate < 30.0 {
        -10
    } else {
        0
    }
}

pub fn probe_error_penalty(errors: usize) -> i32 {
    match errors {
        0 => 0,
        1 | 2 => -15,
        _ => -30,
    }
}

pub fn latency_penalty(latency: Duration) -> i32 {
    match latency.as_millis() {
        ms if ms > 3000 => -20,
        ms if ms > 1500 => -10,
        _ => 0,
    }
}

pub fn office_health(input: &OfficeHealthInput) -> u8 {
    // No employees or no projects are neutral, not failing.
    let attendance_rate = rate(input.present_today, input.employees).unwrap_or(100.0);
    let completion_rate = rate(input.completed_projects, input.total_projects).unwrap_or(100.0);

    clamp_score(
        FULL_HEALTH
            + attendance_penalty(attendance_rate)
            + pending_leave_penalty(input.pending_leaves)
            + late_arrival_penalty(input.late_today)
            + completion_penalty(completion_rate),
    )
}

pub fn system_health(report: &ProbeReport) -> u8 {
    clamp_score(FULL_HEALTH + probe_error_penalty(report.errors) + latency_penalty(report.latency))
}

fn clamp_score(score: i32) -> u8 {
    score.clamp(0, FULL_HEALTH) as u8
}

/// Re-read the probe resources, bypassing the cache, and measure how the
/// HR API is doing right now. Response bodies are discarded.
pub async fn probe(backend: &dyn HrBackend) -> ProbeReport {
    let [users, projects, clients] = PROBE_RESOURCES.map(ResourceQuery::new);
    let started = Instant::now();
    let results = tokio::join!(
        backend.fetch(&users),
        backend.fetch(&projects),
        backend.fetch(&clients),
    );
    let latency = started.elapsed();

    let errors = [results.0.err(), results.1.err(), results.2.err()]
        .into_iter()
        .flatten()
        .inspect(|e| tracing::debug!(error = %e, "Health probe read failed"))
        .count();

    ProbeReport {
        checked: PROBE_RESOURCES.len(),
        errors,
        latency,
    }
}
