//! Derived dashboard views.
//!
//! Everything here is recomputed from the current records on each call.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserProfile;
use crate::policy::is_own_record;
use crate::report::{DEFAULT_TEAM, Report};

/// Headline numbers for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub reports_this_month: usize,
    pub average_accomplishments: usize,
    pub total_blockers: usize,
}

/// One bar in a chart series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub label: String,
    pub value: usize,
}

impl DashboardStats {
    /// Computes the stats as of `now`.
    pub fn compute(reports: &[Report], now: DateTime<Utc>) -> Self {
        Self {
            reports_this_month: reports_in_month(reports, now),
            average_accomplishments: average_accomplishments(reports),
            total_blockers: reports.iter().map(|r| r.blockers.len()).sum(),
        }
    }
}

/// Reports whose `week_of` falls in the calendar month of `now`.
pub fn reports_in_month(reports: &[Report], now: DateTime<Utc>) -> usize {
    let today = now.date_naive();
    reports
        .iter()
        .filter(|r| r.week_of.year() == today.year() && r.week_of.month() == today.month())
        .count()
}

/// Rounded mean accomplishment count; 0 for no reports.
pub fn average_accomplishments(reports: &[Report]) -> usize {
    if reports.is_empty() {
        return 0;
    }
    let total: usize = reports.iter().map(|r| r.accomplishments.len()).sum();
    (total as f64 / reports.len() as f64).round() as usize
}

/// Accomplishment totals per team, in order of first appearance.
pub fn accomplishments_by_team(reports: &[Report]) -> Vec<SeriesPoint> {
    let mut series: Vec<SeriesPoint> = Vec::new();
    for report in reports {
        let label = if report.team.is_empty() {
            DEFAULT_TEAM
        } else {
            report.team.as_str()
        };
        match series.iter_mut().find(|p| p.label == label) {
            Some(point) => point.value += report.accomplishments.len(),
            None => series.push(SeriesPoint {
                label: label.to_string(),
                value: report.accomplishments.len(),
            }),
        }
    }
    series
}

/// Reports ordered by last update, most recent first.
pub fn history(reports: &[Report]) -> Vec<Report> {
    let mut sorted = reports.to_vec();
    sorted.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
    sorted
}

pub fn own_records(reports: &[Report], user: &UserProfile) -> Vec<Report> {
    reports
        .iter()
        .filter(|r| is_own_record(r, user))
        .cloned()
        .collect()
}
