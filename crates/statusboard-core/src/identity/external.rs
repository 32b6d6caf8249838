//! External identity backed by a [`SessionProvider`].
//!
//! On start the resolver subscribes to session changes and looks up the
//! current session once, both on a background task. Until the lookup settles
//! the actor is signed out. Every change replaces the cached session in one
//! step; readers never see a half-applied update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::model::{Capabilities, Identity, IdentityMode, Role, Session};
use super::provider::{SessionChange, SessionProvider};
use super::role::recognized_roles;
use crate::error::Result;

/// Cached session state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExternalState {
    pub session: Option<Session>,
    /// Whether the initial lookup (or any change) has settled.
    pub resolved: bool,
    /// Number of changes applied after start.
    pub revision: u64,
}

pub struct ExternalIdentity {
    provider: Arc<dyn SessionProvider>,
    state: Arc<watch::Sender<ExternalState>>,
    cancel: CancellationToken,
    listener: Mutex<Option<JoinHandle<()>>>,
    released: AtomicBool,
    callback_url: String,
}

impl ExternalIdentity {
    /// Starts listening to `provider`. Must be called inside a tokio runtime.
    ///
    /// Returns immediately; use [`ExternalIdentity::ready`] to wait for the
    /// initial lookup.
    pub fn start(provider: Arc<dyn SessionProvider>, callback_url: impl Into<String>) -> Self {
        // Subscribe before the lookup so no change between the two is lost
        let changes = provider.subscribe();
        let (state, _) = watch::channel(ExternalState::default());
        let state = Arc::new(state);
        let cancel = CancellationToken::new();

        let listener = tokio::spawn(listen(
            provider.clone(),
            changes,
            state.clone(),
            cancel.clone(),
        ));

        Self {
            provider,
            state,
            cancel,
            listener: Mutex::new(Some(listener)),
            released: AtomicBool::new(false),
            callback_url: callback_url.into(),
        }
    }

    pub fn snapshot(&self) -> ExternalState {
        self.state.borrow().clone()
    }

    /// Waits until the initial session lookup has settled, or until shutdown.
    pub async fn ready(&self) {
        let mut receiver = self.state.subscribe();
        tokio::select! {
            _ = receiver.wait_for(|s| s.resolved) => {}
            _ = self.cancel.cancelled() => {}
        }
    }

    pub fn resolve(&self) -> Identity {
        let state = self.state.borrow();
        let session = state.session.clone();
        drop(state);

        let mut roles = session
            .as_ref()
            .map(|s| recognized_roles(Some(&s.user.user_metadata)))
            .unwrap_or_default();
        if roles.is_empty() {
            roles.push(Role::Employee);
        }

        Identity {
            mode: IdentityMode::External,
            user: session.as_ref().map(|s| s.user.profile()),
            session,
            primary_role: roles[0],
            roles,
        }
    }

    /// AI summary generation stays off until a real integration exists.
    pub fn derived_capabilities(&self) -> Capabilities {
        Capabilities {
            can_see_ai_summary_placeholder: false,
        }
    }

    /// Signs out through the provider and clears the cache once it completes.
    pub async fn sign_out(&self) -> Result<()> {
        self.provider.sign_out().await?;
        self.replace(None);
        tracing::info!("Signed out of external session");
        Ok(())
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        if session.is_some() {
            self.replace(session);
        }
        Ok(())
    }

    /// Registers with the default `employee` role.
    ///
    /// When the provider requires confirmation no session is cached yet.
    pub async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<()> {
        let session = self
            .provider
            .sign_up_with_password(email, password, &[Role::Employee])
            .await?;
        if session.is_some() {
            self.replace(session);
        }
        Ok(())
    }

    pub async fn sign_in_with_provider(&self, provider: &str) -> Result<()> {
        self.provider
            .sign_in_with_provider(provider, &self.callback_url)
            .await
    }

    pub fn callback_url(&self) -> &str {
        &self.callback_url
    }

    /// Whether the subscription is still live.
    pub fn is_active(&self) -> bool {
        !self.released.load(Ordering::SeqCst)
    }

    /// Releases the subscription. Only the first call has any effect.
    pub fn shutdown(&self) {
        if self.released.swap(true, Ordering::SeqCst) {
            return;
        }
        self.cancel.cancel();
        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.abort();
        }
        tracing::debug!("External session subscription released");
    }

    fn replace(&self, session: Option<Session>) {
        if !self.is_active() {
            return;
        }
        self.state.send_modify(|state| {
            state.session = session;
            state.resolved = true;
            state.revision += 1;
        });
    }
}

impl Drop for ExternalIdentity {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn listen(
    provider: Arc<dyn SessionProvider>,
    mut changes: broadcast::Receiver<SessionChange>,
    state: Arc<watch::Sender<ExternalState>>,
    cancel: CancellationToken,
) {
    let mut lookup = provider.current_session();
    let mut lookup_pending = true;
    let mut subscribed = true;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            result = &mut lookup, if lookup_pending => {
                lookup_pending = false;
                let session = match result {
                    Ok(session) => session,
                    Err(e) => {
                        tracing::warn!("Session lookup failed, treating as signed out: {}", e);
                        None
                    }
                };
                state.send_modify(|s| {
                    // A change that arrived while the lookup was in flight is newer
                    if s.revision == 0 {
                        s.session = session;
                    }
                    s.resolved = true;
                });
            }
            change = changes.recv(), if subscribed => match change {
                Ok(change) => {
                    if cancel.is_cancelled() {
                        break;
                    }
                    tracing::info!(event = ?change.event, "Session changed");
                    state.send_modify(|s| {
                        s.session = change.session;
                        s.resolved = true;
                        s.revision += 1;
                    });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Missed session changes; waiting for the next one");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("Session provider closed its change stream");
                    subscribed = false;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StatusboardError;
    use crate::identity::model::ExternalUser;
    use crate::identity::provider::AuthEvent;
    use async_trait::async_trait;
    use serde_json::json;
    use std::time::Duration;
    use tokio::sync::Notify;

    // Provider whose lookup can be held open and whose changes are pushed by hand
    struct MockProvider {
        current: Mutex<Option<Session>>,
        fail_lookup: bool,
        gate: Option<Arc<Notify>>,
        changes: broadcast::Sender<SessionChange>,
        sign_out_calls: Mutex<usize>,
    }

    impl MockProvider {
        fn new(current: Option<Session>) -> Self {
            let (changes, _) = broadcast::channel(16);
            Self {
                current: Mutex::new(current),
                fail_lookup: false,
                gate: None,
                changes,
                sign_out_calls: Mutex::new(0),
            }
        }

        fn push(&self, event: AuthEvent, session: Option<Session>) {
            let _ = self.changes.send(SessionChange { event, session });
        }
    }

    #[async_trait]
    impl SessionProvider for MockProvider {
        async fn current_session(&self) -> Result<Option<Session>> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            if self.fail_lookup {
                return Err(StatusboardError::identity("network unreachable"));
            }
            Ok(self.current.lock().unwrap().clone())
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
            self.changes.subscribe()
        }

        async fn sign_out(&self) -> Result<()> {
            *self.sign_out_calls.lock().unwrap() += 1;
            *self.current.lock().unwrap() = None;
            Ok(())
        }

        async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Option<Session>> {
            if password != "correct-horse" {
                return Err(StatusboardError::identity("Invalid login credentials"));
            }
            Ok(Some(session(email, json!({ "roles": ["employee"] }))))
        }

        async fn sign_up_with_password(
            &self,
            _email: &str,
            _password: &str,
            _default_roles: &[Role],
        ) -> Result<Option<Session>> {
            Ok(None)
        }

        async fn sign_in_with_provider(&self, provider: &str, redirect_url: &str) -> Result<()> {
            if provider == "google" && redirect_url.ends_with("/auth/callback") {
                Ok(())
            } else {
                Err(StatusboardError::identity("Unsupported provider"))
            }
        }
    }

    fn session(email: &str, metadata: serde_json::Value) -> Session {
        Session {
            access_token: "token".to_string(),
            expires_at: None,
            user: ExternalUser {
                id: format!("id-{}", email),
                email: email.to_string(),
                user_metadata: metadata,
            },
        }
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    const CALLBACK: &str = "http://localhost:3000/auth/callback";

    #[tokio::test]
    async fn test_initial_session_is_resolved() {
        let provider = Arc::new(MockProvider::new(Some(session(
            "boss@example.com",
            json!({ "roles": ["employee", "admin"] }),
        ))));
        let identity = ExternalIdentity::start(provider, CALLBACK);
        identity.ready().await;

        let resolved = identity.resolve();
        assert!(resolved.is_authenticated());
        assert_eq!(resolved.primary_role, Role::Admin);
        assert_eq!(resolved.roles, vec![Role::Admin, Role::Employee]);
        assert_eq!(resolved.email(), Some("boss@example.com"));
    }

    #[tokio::test]
    async fn test_signed_out_until_lookup_completes() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(MockProvider {
            gate: Some(gate.clone()),
            ..MockProvider::new(Some(session("a@example.com", json!({}))))
        });
        let identity = ExternalIdentity::start(provider, CALLBACK);
        settle().await;

        assert!(!identity.snapshot().resolved);
        assert!(!identity.resolve().is_authenticated());
        assert_eq!(identity.resolve().primary_role, Role::Employee);

        gate.notify_one();
        identity.ready().await;
        assert!(identity.resolve().is_authenticated());
    }

    #[tokio::test]
    async fn test_lookup_failure_is_signed_out() {
        let provider = Arc::new(MockProvider {
            fail_lookup: true,
            ..MockProvider::new(None)
        });
        let identity = ExternalIdentity::start(provider, CALLBACK);
        identity.ready().await;

        assert!(identity.snapshot().resolved);
        assert!(!identity.resolve().is_authenticated());
    }

    #[tokio::test]
    async fn test_change_during_lookup_wins() {
        let gate = Arc::new(Notify::new());
        let provider = Arc::new(MockProvider {
            gate: Some(gate.clone()),
            ..MockProvider::new(None)
        });
        let identity = ExternalIdentity::start(provider.clone(), CALLBACK);
        settle().await;

        provider.push(
            AuthEvent::SignedIn,
            Some(session("m@example.com", json!({ "role": "manager" }))),
        );
        settle().await;
        gate.notify_one();
        identity.ready().await;
        settle().await;

        assert_eq!(identity.resolve().primary_role, Role::Manager);
    }

    #[tokio::test]
    async fn test_changes_replace_session() {
        let provider = Arc::new(MockProvider::new(None));
        let identity = ExternalIdentity::start(provider.clone(), CALLBACK);
        identity.ready().await;

        provider.push(
            AuthEvent::SignedIn,
            Some(session("m@example.com", json!({ "roles": ["manager"] }))),
        );
        settle().await;
        assert_eq!(identity.resolve().primary_role, Role::Manager);

        provider.push(AuthEvent::SignedOut, None);
        settle().await;
        assert!(!identity.resolve().is_authenticated());
        assert_eq!(identity.snapshot().revision, 2);
    }

    #[tokio::test]
    async fn test_shutdown_stops_applying_changes() {
        let provider = Arc::new(MockProvider::new(None));
        let identity = ExternalIdentity::start(provider.clone(), CALLBACK);
        identity.ready().await;

        identity.shutdown();
        identity.shutdown();
        assert!(!identity.is_active());

        provider.push(AuthEvent::SignedIn, Some(session("late@example.com", json!({}))));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!identity.resolve().is_authenticated());
        // The listener dropped its receiver
        assert_eq!(provider.changes.receiver_count(), 0);
    }

    #[tokio::test]
    async fn test_sign_out_clears_cache() {
        let provider = Arc::new(MockProvider::new(Some(session("a@example.com", json!({})))));
        let identity = ExternalIdentity::start(provider.clone(), CALLBACK);
        identity.ready().await;
        assert!(identity.resolve().is_authenticated());

        identity.sign_out().await.unwrap();
        assert!(!identity.resolve().is_authenticated());
        assert_eq!(*provider.sign_out_calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_password_sign_in_result() {
        let provider = Arc::new(MockProvider::new(None));
        let identity = ExternalIdentity::start(provider, CALLBACK);
        identity.ready().await;

        let err = identity
            .sign_in_with_password("a@example.com", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid login credentials");
        assert!(!identity.resolve().is_authenticated());

        identity
            .sign_in_with_password("a@example.com", "correct-horse")
            .await
            .unwrap();
        assert!(identity.resolve().is_authenticated());
    }

    #[tokio::test]
    async fn test_sign_up_pending_confirmation_keeps_signed_out() {
        let provider = Arc::new(MockProvider::new(None));
        let identity = ExternalIdentity::start(provider, CALLBACK);
        identity.ready().await;

        identity
            .sign_up_with_password("new@example.com", "secret1")
            .await
            .unwrap();
        assert!(!identity.resolve().is_authenticated());
    }

    #[tokio::test]
    async fn test_provider_sign_in_uses_callback_url() {
        let provider = Arc::new(MockProvider::new(None));
        let identity = ExternalIdentity::start(provider, CALLBACK);
        assert!(identity.sign_in_with_provider("google").await.is_ok());
        assert!(identity.sign_in_with_provider("microsoft").await.is_err());
    }

    #[tokio::test]
    async fn test_capabilities_always_off() {
        let provider = Arc::new(MockProvider::new(Some(session(
            "boss@example.com",
            json!({ "roles": ["admin"] }),
        ))));
        let identity = ExternalIdentity::start(provider, CALLBACK);
        identity.ready().await;
        assert_eq!(identity.resolve().primary_role, Role::Admin);
        assert!(!identity.derived_capabilities().can_see_ai_summary_placeholder);
    }
}
