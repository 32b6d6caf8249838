//! Session provider adapters.
//!
//! Neither adapter talks to a network service. `FileSessionProvider` reads a
//! session cached on disk by some other client. `InMemorySessionProvider`
//! keeps accounts in process and is only built for tests.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::broadcast;

use statusboard_core::identity::{AuthEvent, Role, Session, SessionChange, SessionProvider};
use statusboard_core::{Result, StatusboardError};

#[cfg(any(test, feature = "test-util"))]
mod in_memory;

#[cfg(any(test, feature = "test-util"))]
pub use in_memory::InMemorySessionProvider;

const CHANNEL_CAPACITY: usize = 16;

/// Reads the current session from a JSON file.
///
/// A missing file or an expired session means signed out. Sign-out removes
/// the file. Interactive sign-in flows need a live identity service and are
/// rejected.
pub struct FileSessionProvider {
    path: PathBuf,
    changes: broadcast::Sender<SessionChange>,
}

impl FileSessionProvider {
    pub fn new(path: PathBuf) -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { path, changes }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connection_required(flow: &str) -> StatusboardError {
        StatusboardError::identity(format!(
            "{flow} requires a connection to the identity service"
        ))
    }
}

#[async_trait]
impl SessionProvider for FileSessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StatusboardError::identity(e.to_string())),
        };

        let session: Session = serde_json::from_str(&content).map_err(|e| {
            StatusboardError::identity(format!("Cached session is unreadable: {e}"))
        })?;

        if session.expires_at.is_some_and(|at| at <= Utc::now()) {
            tracing::info!(path = %self.path.display(), "Cached session has expired");
            return Ok(None);
        }
        Ok(Some(session))
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(StatusboardError::identity(e.to_string())),
        }
        // No receivers is fine
        let _ = self.changes.send(SessionChange {
            event: AuthEvent::SignedOut,
            session: None,
        });
        Ok(())
    }

    async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<Option<Session>> {
        Err(Self::connection_required("Password sign-in"))
    }

    async fn sign_up_with_password(
        &self,
        _email: &str,
        _password: &str,
        _default_roles: &[Role],
    ) -> Result<Option<Session>> {
        Err(Self::connection_required("Sign-up"))
    }

    async fn sign_in_with_provider(&self, provider: &str, _redirect_url: &str) -> Result<()> {
        Err(Self::connection_required(&format!("Sign-in with {provider}")))
    }
}
