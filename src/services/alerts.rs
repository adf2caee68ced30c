//! Threshold alerts derived from the latest statistics.

use serde::Serialize;

use super::stats::DashboardStats;

const PENDING_LEAVE_LIMIT: usize = 5;
const LOW_ATTENDANCE_RATE: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Warning,
    Danger,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SystemAlert {
    #[serde(rename = "type")]
    pub level: AlertLevel,
    pub message: String,
}

/// Evaluate every rule independently; any number may fire.
pub fn evaluate(stats: &DashboardStats) -> Vec<SystemAlert> {
    let mut alerts = Vec::new();

    if stats.pending_leaves > PENDING_LEAVE_LIMIT {
        alerts.push(SystemAlert {
            level: AlertLevel::Warning,
            message: format!("{} leave requests are awaiting approval", stats.pending_leaves),
        });
    }
    if stats.late_today > 0 {
        alerts.push(SystemAlert {
            level: AlertLevel::Danger,
            message: format!("{} employee(s) arrived late today", stats.late_today),
        });
    }
    // Unrounded rate, so 69.96% still fires.
    if stats.attendance_rate < LOW_ATTENDANCE_RATE {
        alerts.push(SystemAlert {
            level: AlertLevel::Info,
            message: format!("Attendance is at {:.1}% today", stats.attendance_rate),
        });
    }

    alerts
}
