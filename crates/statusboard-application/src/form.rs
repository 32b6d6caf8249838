//! Report form input.
//!
//! List fields arrive as multi-line text, one entry per line.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use statusboard_core::identity::UserProfile;
use statusboard_core::report::{
    DEFAULT_TEAM, DEFAULT_TITLE, Report, ReportDraft, ReportPatch, lines_from_text,
};

/// Raw form values. `None` means the field was left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportForm {
    pub title: Option<String>,
    pub team: Option<String>,
    pub week_of: Option<NaiveDate>,
    pub accomplishments: Option<String>,
    pub blockers: Option<String>,
    pub plans: Option<String>,
}

impl ReportForm {
    /// Prefills the form from an existing report.
    pub fn from_report(report: &Report) -> Self {
        Self {
            title: Some(report.title.clone()),
            team: Some(report.team.clone()),
            week_of: Some(report.week_of),
            accomplishments: Some(report.accomplishments.join("\n")),
            blockers: Some(report.blockers.join("\n")),
            plans: Some(report.plans.join("\n")),
        }
    }

    pub fn into_draft(self, author: UserProfile) -> ReportDraft {
        ReportDraft {
            title: self.title,
            team: self.team,
            week_of: self.week_of,
            accomplishments: lines(self.accomplishments),
            blockers: lines(self.blockers),
            plans: lines(self.plans),
            author,
        }
    }

    /// A cleared title or team falls back to its default rather than
    /// storing an empty string.
    pub fn into_patch(self) -> ReportPatch {
        ReportPatch {
            title: self.title.map(|title| or_default(title, DEFAULT_TITLE)),
            team: self.team.map(|team| or_default(team, DEFAULT_TEAM)),
            week_of: self.week_of,
            accomplishments: self.accomplishments.as_deref().map(lines_from_text),
            blockers: self.blockers.as_deref().map(lines_from_text),
            plans: self.plans.as_deref().map(lines_from_text),
            ai_summary: None,
        }
    }
}

fn or_default(value: String, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value
    }
}

fn lines(text: Option<String>) -> Vec<String> {
    text.as_deref().map(lines_from_text).unwrap_or_default()
}
