//! Attendance check-ins and leave requests.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::lenient;
use super::user::Reference;
use super::Timestamped;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum AttendanceStatus {
    Present,
    Late,
    HalfDay,
    Absent,
    OnLeave,
    #[default]
    Other,
}

impl From<Option<String>> for AttendanceStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(lenient::normalize).as_deref() {
            Some("present" | "checked_in") => Self::Present,
            Some("late") => Self::Late,
            Some("half_day" | "halfday") => Self::HalfDay,
            Some("absent") => Self::Absent,
            Some("on_leave" | "leave") => Self::OnLeave,
            _ => Self::Other,
        }
    }
}

impl AttendanceStatus {
    /// Whether the employee showed up at all (late arrivals count as present).
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present | Self::Late | Self::HalfDay)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct AttendanceRecord {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, alias = "user")]
    pub employee: Option<Reference>,
    #[serde(default, deserialize_with = "lenient::date")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub check_in: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "Option<String>")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
    #[default]
    Other,
}

impl From<Option<String>> for LeaveStatus {
    fn from(raw: Option<String>) -> Self {
        match raw.as_deref().map(lenient::normalize).as_deref() {
            Some("pending" | "requested" | "submitted") => Self::Pending,
            Some("approved") => Self::Approved,
            Some("rejected" | "declined" | "denied") => Self::Rejected,
            Some("cancelled" | "canceled") => Self::Cancelled,
            _ => Self::Other,
        }
    }
}

impl LeaveStatus {
    /// Value of the `status` query parameter understood by `GET /leaves`.
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(deserialize = "camelCase"))]
pub struct LeaveRequest {
    #[serde(default, alias = "_id", deserialize_with = "lenient::id")]
    pub id: String,
    #[serde(default, alias = "user")]
    pub employee: Option<Reference>,
    #[serde(default, alias = "type")]
    pub leave_type: Option<String>,
    #[serde(default)]
    pub status: LeaveStatus,
    #[serde(default, alias = "fromDate", deserialize_with = "lenient::date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, alias = "toDate", deserialize_with = "lenient::date")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient::timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl LeaveRequest {
    /// Whether `day` falls within `[start_date, end_date]`, inclusive.
    ///
    /// A missing end date means a single-day leave. No start date never
    /// matches.
    pub fn covers(&self, day: NaiveDate) -> bool {
        match self.start_date {
            Some(start) => {
                let end = self.end_date.unwrap_or(start);
                start <= day && day <= end
            }
            None => false,
        }
    }

    pub fn employee_label(&self) -> String {
        self.employee
            .as_ref()
            .map(Reference::label)
            .unwrap_or_else(|| "An employee".to_string())
    }
}

impl Timestamped for LeaveRequest {
    fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Approval and rejection bump `updatedAt`.
    fn recency(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn leave(start: &str, end: Option<&str>) -> LeaveRequest {
        serde_json::from_value(json!({
            "status": "approved",
            "startDate": start,
            "endDate": end,
        }))
        .unwrap()
    }

    #[test]
    fn covers_is_inclusive() {
        let l = leave("2024-05-01", Some("2024-05-03"));
        assert!(l.covers(day(1)));
        assert!(l.covers(day(2)));
        assert!(l.covers(day(3)));
        assert!(!l.covers(day(4)));
        assert!(!l.covers(NaiveDate::from_ymd_opt(2024, 4, 30).unwrap()));
    }

    #[test]
    fn single_day_leave_without_end_date() {
        let l = leave("2024-05-02T00:00:00.000Z", None);
        assert!(l.covers(day(2)));
        assert!(!l.covers(day(3)));
    }

    #[test]
    fn no_start_date_never_covers() {
        let l = LeaveRequest::default();
        assert!(!l.covers(day(1)));
    }

    #[test]
    fn attendance_presence() {
        assert!(AttendanceStatus::Late.is_present());
        assert!(AttendanceStatus::HalfDay.is_present());
        assert!(!AttendanceStatus::Absent.is_present());
        assert_eq!(
            AttendanceStatus::from(Some("Half-Day".to_string())),
            AttendanceStatus::HalfDay
        );
    }

    #[test]
    fn leave_type_alias_and_populated_employee() {
        let l: LeaveRequest = serde_json::from_value(json!({
            "type": "sick",
            "status": "Pending",
            "employee": {"_id": "u1", "name": "Grace Hopper"}
        }))
        .unwrap();
        assert_eq!(l.leave_type.as_deref(), Some("sick"));
        assert_eq!(l.status, LeaveStatus::Pending);
        assert_eq!(l.employee_label(), "Grace Hopper");
    }
}
