//! In-process session provider.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde_json::json;
use tokio::sync::broadcast;

use statusboard_core::identity::{
    AuthEvent, ExternalUser, Role, Session, SessionChange, SessionProvider,
};
use statusboard_core::{Result, StatusboardError};

use super::CHANNEL_CAPACITY;

struct Account {
    password: String,
    user: ExternalUser,
}

#[derive(Default)]
struct InMemoryState {
    accounts: HashMap<String, Account>,
    session: Option<Session>,
    last_redirect: Option<(String, String)>,
}

/// In-process session provider.
pub struct InMemorySessionProvider {
    state: Mutex<InMemoryState>,
    changes: broadcast::Sender<SessionChange>,
    require_confirmation: bool,
}

impl Default for InMemorySessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySessionProvider {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(InMemoryState::default()),
            changes,
            require_confirmation: false,
        }
    }

    /// Sign-ups return no session until confirmed out of band.
    pub fn with_confirmation_required(mut self) -> Self {
        self.require_confirmation = true;
        self
    }

    /// Registers an account up front.
    pub fn with_account(self, email: &str, password: &str, metadata: serde_json::Value) -> Self {
        self.insert_account(email, password, metadata);
        self
    }

    /// Starts out signed in as an existing account.
    pub fn signed_in_as(self, email: &str) -> Self {
        {
            let mut state = self.lock();
            let session = state
                .accounts
                .get(&email.to_ascii_lowercase())
                .map(|account| issue_session(&account.user));
            state.session = session;
        }
        self
    }

    /// Announces a change to subscribers, as the remote service would.
    pub fn push(&self, event: AuthEvent, session: Option<Session>) {
        self.lock().session = session.clone();
        let _ = self.changes.send(SessionChange { event, session });
    }

    /// The provider name and redirect URL of the last redirect sign-in.
    pub fn last_redirect(&self) -> Option<(String, String)> {
        self.lock().last_redirect.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert_account(&self, email: &str, password: &str, metadata: serde_json::Value) -> ExternalUser {
        let key = email.to_ascii_lowercase();
        let user = ExternalUser {
            id: format!("user-{}", key),
            email: email.to_string(),
            user_metadata: metadata,
        };
        self.lock().accounts.insert(
            key,
            Account {
                password: password.to_string(),
                user: user.clone(),
            },
        );
        user
    }
}

fn issue_session(user: &ExternalUser) -> Session {
    let now = Utc::now();
    Session {
        access_token: format!("local-{}", now.timestamp_millis()),
        expires_at: Some(now + Duration::hours(1)),
        user: user.clone(),
    }
}

#[async_trait]
impl SessionProvider for InMemorySessionProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(self.lock().session.clone())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
        self.changes.subscribe()
    }

    async fn sign_out(&self) -> Result<()> {
        self.push(AuthEvent::SignedOut, None);
        Ok(())
    }

    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Option<Session>> {
        let session = {
            let state = self.lock();
            match state.accounts.get(&email.to_ascii_lowercase()) {
                Some(account) if account.password == password => issue_session(&account.user),
                _ => return Err(StatusboardError::identity("Invalid login credentials")),
            }
        };
        self.push(AuthEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_up_with_password(
        &self,
        email: &str,
        password: &str,
        default_roles: &[Role],
    ) -> Result<Option<Session>> {
        if self.lock().accounts.contains_key(&email.to_ascii_lowercase()) {
            return Err(StatusboardError::identity("User already registered"));
        }

        let roles: Vec<String> = default_roles.iter().map(|r| r.to_string()).collect();
        let user = self.insert_account(email, password, json!({ "roles": roles }));
        if self.require_confirmation {
            return Ok(None);
        }

        let session = issue_session(&user);
        self.push(AuthEvent::SignedIn, Some(session.clone()));
        Ok(Some(session))
    }

    async fn sign_in_with_provider(&self, provider: &str, redirect_url: &str) -> Result<()> {
        self.lock().last_redirect = Some((provider.to_string(), redirect_url.to_string()));
        Ok(())
    }
}
