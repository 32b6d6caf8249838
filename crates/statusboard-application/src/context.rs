//! Application bootstrap.
//!
//! Builds the one report store and the one identity resolver for the process
//! and hands them to the use cases.

use std::sync::Arc;

use tokio::sync::RwLock;

use statusboard_core::Result;
use statusboard_core::clock::{Clock, SystemClock};
use statusboard_core::config::AppConfig;
use statusboard_core::identity::{IdentityMode, IdentityResolver, SessionProvider};
use statusboard_core::notification::Notifier;
use statusboard_core::report::ReportStore;
use statusboard_core::storage::KeyValueStore;
use statusboard_infrastructure::{FileSessionProvider, JsonFileStore, StatusboardPaths};

use crate::identity_usecase::IdentityUseCase;
use crate::report_usecase::ReportUseCase;

pub struct AppContext {
    config: AppConfig,
    identity: Arc<IdentityResolver>,
    reports: ReportUseCase,
    accounts: IdentityUseCase,
}

impl AppContext {
    /// Wires the application from explicit parts.
    ///
    /// Must be called inside a tokio runtime when `config` selects the
    /// external identity mode.
    pub fn new(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        provider: Option<Arc<dyn SessionProvider>>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        let store = ReportStore::load(storage.clone(), clock, config.persist_reports);
        let identity = Arc::new(IdentityResolver::from_config(&config, storage, provider)?);
        tracing::info!(mode = %identity.mode(), "Identity resolver ready");

        Ok(Self {
            reports: ReportUseCase::new(
                Arc::new(RwLock::new(store)),
                identity.clone(),
                notifier.clone(),
            ),
            accounts: IdentityUseCase::new(identity.clone(), notifier),
            identity,
            config,
        })
    }

    /// Wires the application against the files under `paths` and waits for
    /// the initial identity lookup.
    pub async fn open(
        paths: &StatusboardPaths,
        config: AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::new(paths.storage_file()));
        let provider: Option<Arc<dyn SessionProvider>> = match config.select_mode() {
            IdentityMode::External => {
                Some(Arc::new(FileSessionProvider::new(paths.session_file())))
            }
            IdentityMode::Mock => None,
        };

        let context = Self::new(config, storage, provider, notifier, Arc::new(SystemClock))?;
        context.identity.ready().await;
        Ok(context)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn reports(&self) -> &ReportUseCase {
        &self.reports
    }

    pub fn accounts(&self) -> &IdentityUseCase {
        &self.accounts
    }

    /// Releases the identity subscription. Safe to call more than once.
    pub fn shutdown(&self) {
        self.identity.shutdown();
    }
}
