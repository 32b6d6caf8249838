//! Report store.
//!
//! All record mutation goes through [`reduce`]. [`ReportStore`] wraps the
//! reducer with id allocation, timestamps and write-through persistence.
//!
//! The store does not check permissions. Callers are expected to consult the
//! access policy before asking it to delete or edit anything.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use super::model::{Report, ReportDraft, ReportPatch};
use super::seed::demo_reports;
use crate::clock::Clock;
use crate::error::StatusboardError;
use crate::storage::{KeyValueStore, REPORTS_KEY};

/// Actions accepted by the reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportAction {
    /// Replace the whole record set.
    Init(Vec<Report>),
    /// Prepend a fully built record.
    Create(Report),
    /// Merge `patch` into record `id`, stamping it no earlier than `at`.
    Update {
        id: String,
        patch: ReportPatch,
        at: DateTime<Utc>,
    },
    /// Remove record `id`.
    Delete(String),
    /// Toggle write-through persistence.
    SetPersistence(bool),
}

/// Store state: records most-recent-first and the persistence flag.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportState {
    pub reports: Vec<Report>,
    pub persist: bool,
}

impl Default for ReportState {
    fn default() -> Self {
        Self {
            reports: Vec::new(),
            persist: true,
        }
    }
}

/// Applies `action` to `state`.
///
/// Returns `true` when the state changed. Actions targeting an absent id
/// leave the state untouched and return `false`.
pub fn reduce(state: &mut ReportState, action: ReportAction) -> bool {
    match action {
        ReportAction::Init(reports) => {
            state.reports = reports;
            true
        }
        ReportAction::Create(report) => {
            state.reports.insert(0, report);
            true
        }
        ReportAction::Update { id, patch, at } => {
            let Some(report) = state.reports.iter_mut().find(|r| r.id == id) else {
                return false;
            };
            report.apply(patch);
            report.updated_at = next_timestamp(report.updated_at, at);
            true
        }
        ReportAction::Delete(id) => {
            let before = state.reports.len();
            state.reports.retain(|r| r.id != id);
            state.reports.len() != before
        }
        ReportAction::SetPersistence(enabled) => {
            let changed = state.persist != enabled;
            state.persist = enabled;
            changed
        }
    }
}

/// `at`, or just past `previous` when the clock has not moved forward.
fn next_timestamp(previous: DateTime<Utc>, at: DateTime<Utc>) -> DateTime<Utc> {
    if at > previous {
        at
    } else {
        previous + Duration::milliseconds(1)
    }
}

/// Holds the report collection and mirrors it to a [`KeyValueStore`].
///
/// One instance per running process, constructed at startup and shared by
/// handle with every consumer.
pub struct ReportStore {
    state: ReportState,
    /// Every id this store has ever held or issued, deleted ones included.
    issued_ids: HashSet<String>,
    storage: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    last_persist_error: Option<StatusboardError>,
}

impl ReportStore {
    /// Creates an empty store with persistence enabled.
    pub fn new(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: ReportState::default(),
            issued_ids: HashSet::new(),
            storage,
            clock,
            last_persist_error: None,
        }
    }

    /// Startup sequence: restore the persisted collection, or seed demo data
    /// when nothing usable is stored.
    pub fn load(storage: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, persist: bool) -> Self {
        let mut store = Self::new(storage, clock);
        store.state.persist = persist;

        let seed = match store.read_persisted() {
            Some(reports) => {
                tracing::debug!(count = reports.len(), "Restored persisted reports");
                reports
            }
            None => demo_reports(store.clock.as_ref()),
        };
        store.initialize(seed);
        store
    }

    fn read_persisted(&self) -> Option<Vec<Report>> {
        let raw = match self.storage.get(REPORTS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!("Failed to read persisted reports, using demo data: {}", e);
                return None;
            }
        };

        match serde_json::from_str::<Vec<Report>>(&raw) {
            Ok(reports) => Some(reports),
            Err(e) => {
                tracing::warn!("Ignoring malformed persisted reports: {}", e);
                None
            }
        }
    }

    /// Replaces the entire record set.
    pub fn initialize(&mut self, seed: Vec<Report>) {
        self.issued_ids.extend(seed.iter().map(|r| r.id.clone()));
        self.dispatch(ReportAction::Init(seed));
    }

    /// Creates a report from `draft` and returns the stored record.
    pub fn create(&mut self, draft: ReportDraft) -> Report {
        let now = self.clock.now();
        let title = draft.resolved_title();
        let team = draft.resolved_team();
        let report = Report {
            id: self.allocate_id(),
            title,
            team,
            week_of: draft.week_of.unwrap_or_else(|| self.clock.today()),
            accomplishments: draft.accomplishments,
            blockers: draft.blockers,
            plans: draft.plans,
            author: draft.author,
            created_at: now,
            updated_at: now,
            ai_summary: String::new(),
        };

        self.dispatch(ReportAction::Create(report.clone()));
        report
    }

    fn allocate_id(&mut self) -> String {
        loop {
            let id = uuid::Uuid::new_v4().simple().to_string();
            if self.issued_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// Merges `patch` into record `id` and refreshes `updated_at`.
    ///
    /// Returns the updated record, or `None` (store unchanged) when `id` is
    /// absent.
    pub fn update(&mut self, id: &str, patch: ReportPatch) -> Option<Report> {
        let at = self.clock.now();
        let changed = self.dispatch(ReportAction::Update {
            id: id.to_string(),
            patch,
            at,
        });
        if changed { self.get(id).cloned() } else { None }
    }

    /// Removes record `id`. Returns whether anything was removed.
    pub fn delete(&mut self, id: &str) -> bool {
        self.dispatch(ReportAction::Delete(id.to_string()))
    }

    pub fn get(&self, id: &str) -> Option<&Report> {
        self.state.reports.iter().find(|r| r.id == id)
    }

    /// Records, most recent first.
    pub fn list(&self) -> &[Report] {
        &self.state.reports
    }

    pub fn len(&self) -> usize {
        self.state.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.reports.is_empty()
    }

    /// Toggles write-through. Turning it off leaves stored data alone;
    /// turning it back on mirrors the current records immediately.
    pub fn set_persistence(&mut self, enabled: bool) {
        self.dispatch(ReportAction::SetPersistence(enabled));
    }

    pub fn is_persistent(&self) -> bool {
        self.state.persist
    }

    /// Generates the templated summary for record `id` and stores it.
    pub fn generate_summary(&mut self, id: &str) -> Option<String> {
        let text = self.get(id)?.mock_summary();
        self.update(id, ReportPatch::summary(text.clone()))?;
        Some(text)
    }

    /// The most recent write-through failure, cleared by the next success.
    pub fn last_persist_error(&self) -> Option<&StatusboardError> {
        self.last_persist_error.as_ref()
    }

    pub fn state(&self) -> &ReportState {
        &self.state
    }

    fn dispatch(&mut self, action: ReportAction) -> bool {
        tracing::debug!(action = action_name(&action), "Dispatching report action");
        let changed = reduce(&mut self.state, action);
        if changed && self.state.persist {
            self.write_through();
        }
        changed
    }

    /// Writes the whole collection. Failures never roll back memory.
    fn write_through(&mut self) {
        let result = serde_json::to_string(&self.state.reports)
            .map_err(StatusboardError::from)
            .and_then(|json| self.storage.set(REPORTS_KEY, &json));

        match result {
            Ok(()) => self.last_persist_error = None,
            Err(e) => {
                tracing::warn!("Failed to persist reports: {}", e);
                self.last_persist_error = Some(e);
            }
        }
    }
}

fn action_name(action: &ReportAction) -> &'static str {
    match action {
        ReportAction::Init(_) => "init",
        ReportAction::Create(_) => "create",
        ReportAction::Update { .. } => "update",
        ReportAction::Delete(_) => "delete",
        ReportAction::SetPersistence(_) => "set_persistence",
    }
}
