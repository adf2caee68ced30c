//! Derivation of the flat dashboard statistics record.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::health::{self, OfficeHealthInput};
use crate::models::attendance::{AttendanceRecord, AttendanceStatus, LeaveRequest, LeaveStatus};
use crate::models::organization::{Client, Department, Lead};
use crate::models::project::{Project, ProjectStatus};
use crate::models::user::{User, UserRole};

/// Aggregated dashboard statistics. Recomputed wholesale every load.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_users: usize,
    pub total_employees: usize,
    pub total_projects: usize,
    pub total_clients: usize,
    pub total_departments: usize,
    pub total_leads: usize,
    pub role_counts: RoleCounts,
    pub project_status: ProjectStatusCounts,
    pub present_today: usize,
    pub late_today: usize,
    pub on_leave_today: usize,
    pub absent_today: usize,
    pub pending_leaves: usize,
    /// Unrounded; serialized to one decimal.
    #[serde(serialize_with = "one_decimal")]
    pub attendance_rate: f64,
    #[serde(serialize_with = "one_decimal")]
    pub project_completion_rate: f64,
    pub office_health: u8,
    pub system_health: u8,
    pub department_names: Vec<String>,
    pub department_employee_counts: Vec<usize>,
    pub department_project_counts: Vec<usize>,
}

fn one_decimal<S: serde::Serializer>(pct: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(health::round_rate(*pct))
}

/// User counts grouped by role.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RoleCounts {
    pub admin: usize,
    pub hr: usize,
    pub employee: usize,
    pub manager: usize,
}

/// Project counts grouped by status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectStatusCounts {
    pub active: usize,
    pub completed: usize,
    pub on_hold: usize,
    pub cancelled: usize,
}

/// Attendance-derived counts for a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TodayCounts {
    pub present: usize,
    pub late: usize,
    pub on_leave: usize,
}

/// Everything one aggregation pass feeds into [`compute`].
#[derive(Debug, Clone, Copy)]
pub struct StatsInput<'a> {
    pub users: &'a [User],
    pub projects: &'a [Project],
    pub clients: &'a [Client],
    pub departments: &'a [Department],
    pub leads: &'a [Lead],
    pub today: TodayCounts,
    pub pending_leaves: usize,
    pub system_health: u8,
}

pub fn role_counts(users: &[User]) -> RoleCounts {
    users.iter().fold(RoleCounts::default(), |mut acc, u| {
        match u.role {
            UserRole::Admin => acc.admin += 1,
            UserRole::Hr => acc.hr += 1,
            UserRole::Employee => acc.employee += 1,
            UserRole::Manager => acc.manager += 1,
            UserRole::Other => {}
        }
        acc
    })
}

pub fn project_status_counts(projects: &[Project]) -> ProjectStatusCounts {
    projects
        .iter()
        .fold(ProjectStatusCounts::default(), |mut acc, p| {
            match p.status {
                ProjectStatus::Active => acc.active += 1,
                ProjectStatus::Completed => acc.completed += 1,
                ProjectStatus::OnHold => acc.on_hold += 1,
                ProjectStatus::Cancelled => acc.cancelled += 1,
                ProjectStatus::Planning | ProjectStatus::Other => {}
            }
            acc
        })
}

/// Count who is present, late and on approved leave on `today`.
///
/// Each employee is counted at most once per bucket. Attendance records
/// dated another day are ignored; undated ones are trusted to belong to the
/// requested day.
pub fn today_counts(
    attendance: &[AttendanceRecord],
    approved_leaves: &[LeaveRequest],
    today: NaiveDate,
) -> TodayCounts {
    let todays = attendance
        .iter()
        .filter(|r| r.date.map_or(true, |d| d == today));

    let mut present = HashSet::new();
    let mut late = HashSet::new();
    for (idx, record) in todays.enumerate() {
        let who = person_key(record.employee.as_ref().map(|e| e.key()), &record.id, idx);
        if record.status.is_present() {
            present.insert(who.clone());
        }
        if record.status == AttendanceStatus::Late {
            late.insert(who);
        }
    }

    let on_leave: HashSet<String> = approved_leaves
        .iter()
        .enumerate()
        .filter(|(_, l)| l.status == LeaveStatus::Approved && l.covers(today))
        .map(|(idx, l)| person_key(l.employee.as_ref().map(|e| e.key()), &l.id, idx))
        .collect();

    TodayCounts {
        present: present.len(),
        late: late.len(),
        on_leave: on_leave.len(),
    }
}

fn person_key(employee: Option<&str>, record_id: &str, idx: usize) -> String {
    match employee.filter(|k| !k.is_empty()) {
        Some(key) => key.to_string(),
        None if !record_id.is_empty() => format!("record:{record_id}"),
        None => format!("index:{idx}"),
    }
}

pub fn compute(input: StatsInput<'_>) -> DashboardStats {
    let role_counts = role_counts(input.users);
    let project_status = project_status_counts(input.projects);
    let employees = role_counts.employee;

    let office_health = health::office_health(&OfficeHealthInput {
        employees,
        present_today: input.today.present,
        late_today: input.today.late,
        pending_leaves: input.pending_leaves,
        total_projects: input.projects.len(),
        completed_projects: project_status.completed,
    });

    let (department_names, department_employee_counts, department_project_counts) =
        department_breakdown(input.departments, input.users, input.projects);

    DashboardStats {
        total_users: input.users.len(),
        total_employees: employees,
        total_projects: input.projects.len(),
        total_clients: input.clients.len(),
        total_departments: input.departments.len(),
        total_leads: input.leads.len(),
        present_today: input.today.present,
        late_today: input.today.late,
        on_leave_today: input.today.on_leave,
        absent_today: employees.saturating_sub(input.today.present + input.today.on_leave),
        pending_leaves: input.pending_leaves,
        attendance_rate: health::rate(input.today.present, employees).unwrap_or(100.0),
        project_completion_rate: health::rate(project_status.completed, input.projects.len())
            .unwrap_or(0.0),
        office_health,
        system_health: input.system_health,
        department_names,
        department_employee_counts,
        department_project_counts,
        role_counts,
        project_status,
    }
}

/// Parallel per-department arrays for charting.
fn department_breakdown(
    departments: &[Department],
    users: &[User],
    projects: &[Project],
) -> (Vec<String>, Vec<usize>, Vec<usize>) {
    let names = departments.iter().map(|d| d.name.clone()).collect();
    let employees = departments
        .iter()
        .map(|d| {
            users
                .iter()
                .filter(|u| u.is_employee())
                .filter(|u| u.department.as_ref().is_some_and(|r| r.matches(&d.id, &d.name)))
                .count()
        })
        .collect();
    let project_counts = departments
        .iter()
        .map(|d| {
            projects
                .iter()
                .filter(|p| p.department.as_ref().is_some_and(|r| r.matches(&d.id, &d.name)))
                .count()
        })
        .collect();
    (names, employees, project_counts)
}
