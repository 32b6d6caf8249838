//! External session provider port.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use super::model::{Role, Session};
use crate::error::Result;

/// Kind of session change announced by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEvent {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A session change notification. `session` replaces the cached one.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

/// An external authentication service, treated as an opaque session source.
///
/// Failures come back as `StatusboardError::Identity` carrying the provider's
/// message.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    /// One-shot lookup of the current session.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Subscribes to session changes. Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<SessionChange>;

    async fn sign_out(&self) -> Result<()>;

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Option<Session>>;

    /// Registers a new account whose metadata carries `default_roles`.
    ///
    /// Returns `None` when the account needs confirmation before a session
    /// exists.
    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        default_roles: &[Role],
    ) -> Result<Option<Session>>;

    /// Starts a redirect-based sign-in. Success shows up later as a
    /// [`SessionChange`], never as a return value.
    async fn sign_in_with_provider(&self, provider: &str, redirect_url: &str) -> Result<()>;
}
