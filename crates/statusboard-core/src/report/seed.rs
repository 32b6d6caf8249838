//! Demo records for a fresh install.

use chrono::NaiveDate;

use super::model::Report;
use crate::clock::Clock;
use crate::identity::UserProfile;

/// Builds the two demo reports with fresh ids and timestamps.
pub fn demo_reports(clock: &dyn Clock) -> Vec<Report> {
    let now = clock.now();
    let report = |title: &str,
                  week_of: NaiveDate,
                  accomplishments: &[&str],
                  blockers: &[&str],
                  plans: &[&str],
                  author: UserProfile,
                  team: &str| Report {
        id: uuid::Uuid::new_v4().simple().to_string(),
        title: title.to_string(),
        team: team.to_string(),
        week_of,
        accomplishments: accomplishments.iter().map(|s| s.to_string()).collect(),
        blockers: blockers.iter().map(|s| s.to_string()).collect(),
        plans: plans.iter().map(|s| s.to_string()).collect(),
        author,
        created_at: now,
        updated_at: now,
        ai_summary: String::new(),
    };

    vec![
        report(
            "Week of Acme Project Kickoff",
            NaiveDate::from_ymd_opt(2025, 1, 6).unwrap_or_default(),
            &[
                "Completed project kickoff",
                "Aligned on milestones",
                "Drafted first sprint backlog",
            ],
            &["Environment access pending"],
            &["Set up CI/CD", "Begin sprint 1"],
            UserProfile::new("Alex Johnson", "alex@example.com"),
            "Platform",
        ),
        report(
            "Week 2 Progress - Data Pipeline",
            NaiveDate::from_ymd_opt(2025, 1, 13).unwrap_or_default(),
            &["Implemented ingestion job", "Wrote unit tests"],
            &[],
            &["Add monitoring", "Document runbooks"],
            UserProfile::new("Taylor Smith", "taylor@example.com"),
            "Data",
        ),
    ]
}
