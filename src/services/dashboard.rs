//! Dashboard aggregation over the HR REST API.
//!
//! One load fans out every list read concurrently through the request
//! cache, derives statistics, the activity feed and alerts from that single
//! batch, and publishes the result as one snapshot. Users, projects and
//! clients are required; every other resource degrades to an empty list.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::watch;

use super::activity::{self, ActivityItem, ActivitySources};
use super::alerts::{self, SystemAlert};
use super::cache::{CallOptions, RequestCache};
use super::health::{self, ProbeReport};
use super::stats::{self, DashboardStats, StatsInput, TodayCounts};
use crate::backend::{HrBackend, Resource, ResourceQuery};
use crate::errors::AppError;
use crate::models::attendance::{AttendanceRecord, LeaveRequest, LeaveStatus};
use crate::models::content::{Announcement, Document, Meeting, Policy};
use crate::models::envelope::decode_list;
use crate::models::{newest_first, Timestamped};
use crate::models::organization::{Client, Department, Lead};
use crate::models::project::Project;
use crate::models::user::User;

/// Volatile data: announcements, today's attendance, pending leaves.
pub const TTL_SHORT: Duration = Duration::from_secs(2 * 60);
/// Core entity lists and approved leaves.
pub const TTL_STANDARD: Duration = Duration::from_secs(5 * 60);
/// Slow-moving content: documents and policies.
pub const TTL_LONG: Duration = Duration::from_secs(10 * 60);

/// Length of each supplementary widget list.
const WIDGET_LIMIT: usize = 5;

/// Which audience the dashboard is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DashboardVariant {
    #[default]
    Admin,
    Hr,
}

impl FromStr for DashboardVariant {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "hr" => Ok(Self::Hr),
            other => Err(AppError::Validation(format!(
                "Unknown dashboard variant: {other}"
            ))),
        }
    }
}

/// One consistent, UI-ready view of the organisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardSnapshot {
    pub variant: DashboardVariant,
    pub stats: DashboardStats,
    pub recent_activities: Vec<ActivityItem>,
    pub system_alerts: Vec<SystemAlert>,
    pub announcements: Vec<Announcement>,
    pub documents: Vec<Document>,
    pub policies: Vec<Policy>,
    pub upcoming_events: Vec<Meeting>,
    pub probe: Option<ProbeReport>,
    /// `None` until the first successful load.
    pub generated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What subscribers observe. `snapshot` is always the last good result (or
/// the all-zero initial snapshot); a failed load only changes `status` and
/// `error`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DashboardState {
    pub status: LoadStatus,
    pub error: Option<String>,
    pub snapshot: Arc<DashboardSnapshot>,
}

/// Stateful dashboard session: owns the request cache and the published
/// state.
pub struct DashboardService {
    backend: Arc<dyn HrBackend>,
    cache: RequestCache,
    variant: DashboardVariant,
    state: watch::Sender<DashboardState>,
}

impl std::fmt::Debug for DashboardService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardService")
            .field("variant", &self.variant)
            .field("cached_entries", &self.cache.len())
            .finish_non_exhaustive()
    }
}

impl DashboardService {
    pub fn new(backend: Arc<dyn HrBackend>, variant: DashboardVariant) -> Self {
        let (state, _) = watch::channel(DashboardState::default());
        Self {
            backend,
            cache: RequestCache::new(),
            variant,
            state,
        }
    }

    /// Current published state.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.subscribe()
    }

    pub fn cache(&self) -> &RequestCache {
        &self.cache
    }

    /// Load using cached data where still fresh.
    pub async fn load(&self, force_refresh: bool) -> Result<Arc<DashboardSnapshot>, AppError> {
        self.load_at(Utc::now(), force_refresh).await
    }

    /// Reload every resource, ignoring cache freshness for this load only.
    pub async fn refetch(&self) -> Result<Arc<DashboardSnapshot>, AppError> {
        self.load(true).await
    }

    /// Drop cached reads of a resource after a known mutation. Accepts a
    /// resource name (`leaves`) or a full cache key prefix
    /// (`dashboard_leaves`).
    pub fn invalidate_cache(&self, resource_key: &str) -> usize {
        let prefix = match resource_key.parse::<Resource>() {
            Ok(resource) => resource.cache_prefix(),
            Err(_) => resource_key.to_string(),
        };
        let removed = self.cache.invalidate_resource(&prefix);
        tracing::info!(prefix = %prefix, removed, "Dashboard cache invalidated");
        removed
    }

    /// Uncached liveness probe against the HR API.
    pub async fn probe(&self) -> ProbeReport {
        health::probe(self.backend.as_ref()).await
    }

    /// Run one load cycle as of `now` and publish the outcome.
    pub async fn load_at(
        &self,
        now: DateTime<Utc>,
        force_refresh: bool,
    ) -> Result<Arc<DashboardSnapshot>, AppError> {
        self.state.send_modify(|s| s.status = LoadStatus::Loading);

        match self.aggregate(now, force_refresh).await {
            Ok(snapshot) => {
                let snapshot = Arc::new(snapshot);
                self.state.send_replace(DashboardState {
                    status: LoadStatus::Ready,
                    error: None,
                    snapshot: Arc::clone(&snapshot),
                });
                tracing::info!(
                    variant = ?self.variant,
                    force_refresh,
                    office_health = snapshot.stats.office_health,
                    system_health = snapshot.stats.system_health,
                    "Dashboard loaded"
                );
                Ok(snapshot)
            }
            Err(e) => {
                tracing::error!(error = %e, "Dashboard load failed");
                self.state.send_modify(|s| {
                    s.status = LoadStatus::Failed;
                    s.error = Some(e.to_string());
                });
                Err(e)
            }
        }
    }

    async fn aggregate(
        &self,
        now: DateTime<Utc>,
        force: bool,
    ) -> Result<DashboardSnapshot, AppError> {
        let today = now.date_naive();

        let (
            users,
            projects,
            clients,
            departments,
            leads,
            announcements,
            documents,
            policies,
            meetings,
        ) = tokio::join!(
            self.fetch_list::<User>(Resource::Users.into(), TTL_STANDARD, force),
            self.fetch_list::<Project>(Resource::Projects.into(), TTL_STANDARD, force),
            self.fetch_list::<Client>(Resource::Clients.into(), TTL_STANDARD, force),
            self.fetch_list::<Department>(Resource::Departments.into(), TTL_STANDARD, force),
            self.fetch_list::<Lead>(Resource::Leads.into(), TTL_STANDARD, force),
            self.fetch_list::<Announcement>(Resource::Announcements.into(), TTL_SHORT, force),
            self.fetch_list::<Document>(Resource::Documents.into(), TTL_LONG, force),
            self.fetch_list::<Policy>(Resource::Policies.into(), TTL_LONG, force),
            self.fetch_list::<Meeting>(Resource::Meetings.into(), TTL_STANDARD, force),
        );

        let users = users?;
        let projects = projects?;
        let clients = clients?;
        let departments = optional(Resource::Departments, departments);
        let leads = optional(Resource::Leads, leads);
        let announcements = optional(Resource::Announcements, announcements);
        let documents = optional(Resource::Documents, documents);
        let policies = optional(Resource::Policies, policies);
        let meetings = optional(Resource::Meetings, meetings);

        let (today_data, pending, probe) = tokio::join!(
            self.fetch_today(today, force),
            self.fetch_list::<LeaveRequest>(leaves_query(LeaveStatus::Pending), TTL_SHORT, force),
            health::probe(self.backend.as_ref()),
        );

        let (today_counts, approved_leaves) = match today_data {
            Ok((attendance, approved)) => {
                (stats::today_counts(&attendance, &approved, today), approved)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Attendance for today unavailable, reporting zeros");
                (TodayCounts::default(), Vec::new())
            }
        };
        let pending_leaves = optional(Resource::Leaves, pending);

        let stats = stats::compute(StatsInput {
            users: &users,
            projects: &projects,
            clients: &clients,
            departments: &departments,
            leads: &leads,
            today: today_counts,
            pending_leaves: pending_leaves.len(),
            system_health: health::system_health(&probe),
        });

        let sources = ActivitySources {
            users: &users,
            projects: &projects,
            clients: &clients,
            approved_leaves: &approved_leaves,
            pending_leaves: &pending_leaves,
        };
        let recent_activities = match self.variant {
            DashboardVariant::Admin => activity::admin_feed(&sources),
            DashboardVariant::Hr => activity::hr_feed(&sources, now),
        };
        let system_alerts = alerts::evaluate(&stats);

        Ok(DashboardSnapshot {
            variant: self.variant,
            stats,
            recent_activities,
            system_alerts,
            announcements: latest(&announcements),
            documents: latest(&documents),
            policies: latest(&policies),
            upcoming_events: upcoming(meetings, now),
            probe: Some(probe),
            generated_at: Some(now),
        })
    }

    /// Today's attendance and the approved leaves overlapping it. Either
    /// failing fails the pair.
    async fn fetch_today(
        &self,
        today: NaiveDate,
        force: bool,
    ) -> Result<(Vec<AttendanceRecord>, Vec<LeaveRequest>), AppError> {
        let attendance = ResourceQuery::new(Resource::Attendance).param("date", today.to_string());
        tokio::try_join!(
            self.fetch_list::<AttendanceRecord>(attendance, TTL_SHORT, force),
            self.fetch_list::<LeaveRequest>(leaves_query(LeaveStatus::Approved), TTL_STANDARD, force),
        )
    }

    /// Read a list through the cache and decode it.
    ///
    /// A body that does not decode is evicted so the next load retries.
    async fn fetch_list<T: DeserializeOwned>(
        &self,
        query: ResourceQuery,
        ttl: Duration,
        force: bool,
    ) -> Result<Vec<T>, AppError> {
        let key = query.cache_key();
        let options = CallOptions::ttl(ttl).force_refresh(force);
        let body = self
            .cache
            .cached_call(&key, options, || self.backend.fetch(&query))
            .await?;

        decode_list(query.resource, body).map_err(|e| {
            self.cache.invalidate(&key);
            e
        })
    }
}

fn leaves_query(status: LeaveStatus) -> ResourceQuery {
    ResourceQuery::new(Resource::Leaves).param("status", status.as_query())
}

/// Absorb a failed optional read as an empty list.
fn optional<T>(resource: Resource, result: Result<Vec<T>, AppError>) -> Vec<T> {
    result.unwrap_or_else(|e| {
        tracing::warn!(resource = %resource, error = %e, "Optional dashboard resource unavailable");
        Vec::new()
    })
}

fn latest<T: Timestamped + Clone>(items: &[T]) -> Vec<T> {
    newest_first(items, WIDGET_LIMIT).into_iter().cloned().collect()
}

/// Meetings starting at or after `now`, soonest first.
fn upcoming(mut meetings: Vec<Meeting>, now: DateTime<Utc>) -> Vec<Meeting> {
    meetings.retain(|m| m.start_time.is_some_and(|t| t >= now));
    meetings.sort_by_key(|m| m.start_time);
    meetings.truncate(WIDGET_LIMIT);
    meetings
}
