//! Report domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserProfile;

/// Title given to reports created without one.
pub const DEFAULT_TITLE: &str = "Untitled report";
/// Team given to reports created without one.
pub const DEFAULT_TEAM: &str = "General";

fn default_team() -> String {
    DEFAULT_TEAM.to_string()
}

/// One weekly status entry.
///
/// Serialized in camelCase so persisted collections stay readable by other
/// clients of the same storage namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Opaque identifier, immutable once assigned.
    pub id: String,
    pub title: String,
    #[serde(default = "default_team")]
    pub team: String,
    /// Calendar date (`YYYY-MM-DD`) of the reported week.
    pub week_of: NaiveDate,
    /// Display order is meaningful; duplicates are allowed.
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub plans: Vec<String>,
    /// Snapshot of the author at creation time.
    pub author: UserProfile,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Empty until a summary is generated.
    #[serde(default)]
    pub ai_summary: String,
}

impl Report {
    pub fn has_summary(&self) -> bool {
        !self.ai_summary.is_empty()
    }

    /// Deterministic templated summary of the report's current content.
    pub fn mock_summary(&self) -> String {
        format!(
            "AI Summary (mock): Strong progress with {} accomplishment(s); {} blocker(s) noted; {} plan item(s) set for next week. Focus remains on {}.",
            self.accomplishments.len(),
            self.blockers.len(),
            self.plans.len(),
            self.title
        )
    }

    /// Merges the fields present in `patch`.
    ///
    /// Timestamps are the store's concern and are left alone here.
    pub fn apply(&mut self, patch: ReportPatch) {
        let ReportPatch {
            title,
            team,
            week_of,
            accomplishments,
            blockers,
            plans,
            ai_summary,
        } = patch;

        if let Some(title) = title {
            self.title = title;
        }
        if let Some(team) = team {
            self.team = team;
        }
        if let Some(week_of) = week_of {
            self.week_of = week_of;
        }
        if let Some(accomplishments) = accomplishments {
            self.accomplishments = accomplishments;
        }
        if let Some(blockers) = blockers {
            self.blockers = blockers;
        }
        if let Some(plans) = plans {
            self.plans = plans;
        }
        if let Some(ai_summary) = ai_summary {
            self.ai_summary = ai_summary;
        }
    }
}

/// Input for creating a report.
///
/// `None` and empty strings fall back to the documented defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    pub title: Option<String>,
    pub team: Option<String>,
    pub week_of: Option<NaiveDate>,
    #[serde(default)]
    pub accomplishments: Vec<String>,
    #[serde(default)]
    pub blockers: Vec<String>,
    #[serde(default)]
    pub plans: Vec<String>,
    #[serde(default)]
    pub author: UserProfile,
}

impl ReportDraft {
    pub fn new(author: UserProfile) -> Self {
        Self {
            author,
            ..Self::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_week_of(mut self, week_of: NaiveDate) -> Self {
        self.week_of = Some(week_of);
        self
    }

    pub fn with_accomplishments<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accomplishments = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_blockers<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blockers = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_plans<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.plans = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Title after defaulting.
    pub fn resolved_title(&self) -> String {
        non_empty(self.title.as_deref()).unwrap_or(DEFAULT_TITLE).to_string()
    }

    /// Team after defaulting.
    pub fn resolved_team(&self) -> String {
        non_empty(self.team.as_deref()).unwrap_or(DEFAULT_TEAM).to_string()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Partial update. Absent fields are left untouched.
///
/// `id`, `author` and the timestamps are not patchable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPatch {
    pub title: Option<String>,
    pub team: Option<String>,
    pub week_of: Option<NaiveDate>,
    pub accomplishments: Option<Vec<String>>,
    pub blockers: Option<Vec<String>>,
    pub plans: Option<Vec<String>>,
    pub ai_summary: Option<String>,
}

impl ReportPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            ai_summary: Some(text.into()),
            ..Self::default()
        }
    }
}

/// Splits multi-line input into entries, dropping empty lines.
pub fn lines_from_text(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
