//! Report use cases.
//!
//! Every mutation requires a signed-in actor and checks the access policy
//! first, then goes through the single report store, then notifies. The
//! store itself never checks policy.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use statusboard_core::dashboard::{self, DashboardStats, SeriesPoint};
use statusboard_core::identity::{Identity, IdentityResolver, UserProfile};
use statusboard_core::notification::Notifier;
use statusboard_core::policy::Permissions;
use statusboard_core::report::{Report, ReportStore};
use statusboard_core::{Result, StatusboardError};

use crate::form::ReportForm;

/// Dashboard view as of a given instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub accomplishments_by_team: Vec<SeriesPoint>,
}

pub struct ReportUseCase {
    store: Arc<RwLock<ReportStore>>,
    identity: Arc<IdentityResolver>,
    notifier: Arc<dyn Notifier>,
}

impl ReportUseCase {
    pub fn new(
        store: Arc<RwLock<ReportStore>>,
        identity: Arc<IdentityResolver>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            identity,
            notifier,
        }
    }

    /// Policy for the current actor.
    pub fn permissions(&self) -> Permissions {
        Permissions::evaluate(&self.identity.resolve(), self.identity.derived_capabilities())
    }

    /// All reports, most recent first.
    pub async fn list(&self) -> Vec<Report> {
        self.store.read().await.list().to_vec()
    }

    /// Reports authored by the signed-in user. Empty when signed out.
    pub async fn list_mine(&self) -> Vec<Report> {
        let Some(user) = self.identity.resolve().user else {
            return Vec::new();
        };
        dashboard::own_records(self.store.read().await.list(), &user)
    }

    pub async fn get(&self, id: &str) -> Option<Report> {
        self.store.read().await.get(id).cloned()
    }

    pub async fn history(&self) -> Vec<Report> {
        dashboard::history(self.store.read().await.list())
    }

    pub async fn dashboard(&self, now: DateTime<Utc>) -> Dashboard {
        let store = self.store.read().await;
        Dashboard {
            stats: DashboardStats::compute(store.list(), now),
            accomplishments_by_team: dashboard::accomplishments_by_team(store.list()),
        }
    }

    /// Creates a report authored by the signed-in user.
    pub async fn create_report(&self, form: ReportForm) -> Result<Report> {
        let author = self
            .signed_in("create report")?
            .user
            .unwrap_or_else(UserProfile::unknown);

        let report = self.store.write().await.create(form.into_draft(author));
        tracing::info!(id = %report.id, "Report created");
        self.notifier.success("Report created");
        Ok(report)
    }

    /// Applies the form to report `id`.
    ///
    /// Returns `Ok(None)` when no such report exists.
    pub async fn save_report(&self, id: &str, form: ReportForm) -> Result<Option<Report>> {
        self.signed_in("edit report")?;
        self.require(self.permissions().can_edit, "edit report", "an editor role")?;

        let updated = self.store.write().await.update(id, form.into_patch());
        if updated.is_some() {
            tracing::info!(id, "Report updated");
            self.notifier.success("Report updated");
        }
        Ok(updated)
    }

    /// Deletes report `id`. Returns whether a report was removed.
    pub async fn delete_report(&self, id: &str) -> Result<bool> {
        self.signed_in("delete report")?;
        self.require(
            self.permissions().can_delete,
            "delete report",
            "the manager or admin role",
        )?;

        let removed = self.store.write().await.delete(id);
        if removed {
            tracing::info!(id, "Report deleted");
            self.notifier.success("Report deleted");
        }
        Ok(removed)
    }

    /// Generates and stores the templated summary for report `id`.
    pub async fn generate_summary(&self, id: &str) -> Result<Option<String>> {
        self.signed_in("generate summary")?;
        self.require(
            self.permissions().can_generate_summary,
            "generate summary",
            "a privileged role in mock mode",
        )?;

        let summary = self.store.write().await.generate_summary(id);
        if summary.is_some() {
            self.notifier.success("AI summary generated (mock)");
        }
        Ok(summary)
    }

    /// Placeholder export. Nothing is rendered yet.
    pub async fn export_report(&self, id: &str) -> bool {
        let found = self.store.read().await.get(id).is_some();
        if found {
            self.notifier.info("Export to PDF triggered (mock)");
        }
        found
    }

    /// Placeholder share. Nothing is sent yet.
    pub async fn share_report(&self, id: &str) -> bool {
        let found = self.store.read().await.get(id).is_some();
        if found {
            self.notifier.info("Share via email/Slack (mock)");
        }
        found
    }

    pub async fn set_persistence(&self, enabled: bool) {
        self.store.write().await.set_persistence(enabled);
        tracing::info!(enabled, "Report persistence toggled");
        self.notifier.info(if enabled {
            "Local persistence enabled"
        } else {
            "Local persistence disabled"
        });
    }

    pub async fn is_persistent(&self) -> bool {
        self.store.read().await.is_persistent()
    }

    /// The store's most recent write-through failure, if any.
    pub async fn last_persist_error(&self) -> Option<StatusboardError> {
        self.store.read().await.last_persist_error().cloned()
    }

    /// The current identity, or a denial while nobody is signed in. An
    /// external session still being looked up counts as signed out.
    fn signed_in(&self, action: &'static str) -> Result<Identity> {
        let identity = self.identity.resolve();
        self.require(identity.is_authenticated(), action, "a signed-in user")?;
        Ok(identity)
    }

    fn require(
        &self,
        allowed: bool,
        action: &'static str,
        requirement: &'static str,
    ) -> Result<()> {
        if allowed {
            return Ok(());
        }
        let err = StatusboardError::permission_denied(action, requirement);
        self.notifier.error(&err.user_message());
        Err(err)
    }
}
