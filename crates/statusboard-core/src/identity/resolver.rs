//! Identity resolver.
//!
//! Mock and external identities share one capability interface. The variant
//! is chosen once from configuration and never switched at runtime.

use std::sync::Arc;

use async_trait::async_trait;

use super::external::ExternalIdentity;
use super::mock::MockIdentity;
use super::model::{Capabilities, ChangeOutcome, Identity, IdentityMode, Role, UserProfile};
use super::provider::SessionProvider;
use crate::config::AppConfig;
use crate::error::{Result, StatusboardError};
use crate::storage::KeyValueStore;

/// Operations every identity mode answers.
#[async_trait]
pub trait IdentitySource: Send + Sync {
    fn mode(&self) -> IdentityMode;

    fn resolve(&self) -> Identity;

    async fn sign_out(&self) -> Result<()>;

    fn derived_capabilities(&self) -> Capabilities;
}

#[async_trait]
impl IdentitySource for MockIdentity {
    fn mode(&self) -> IdentityMode {
        IdentityMode::Mock
    }

    fn resolve(&self) -> Identity {
        MockIdentity::resolve(self)
    }

    async fn sign_out(&self) -> Result<()> {
        MockIdentity::sign_out(self);
        Ok(())
    }

    fn derived_capabilities(&self) -> Capabilities {
        MockIdentity::derived_capabilities(self)
    }
}

#[async_trait]
impl IdentitySource for ExternalIdentity {
    fn mode(&self) -> IdentityMode {
        IdentityMode::External
    }

    fn resolve(&self) -> Identity {
        ExternalIdentity::resolve(self)
    }

    async fn sign_out(&self) -> Result<()> {
        ExternalIdentity::sign_out(self).await
    }

    fn derived_capabilities(&self) -> Capabilities {
        ExternalIdentity::derived_capabilities(self)
    }
}

/// The process-wide identity resolver.
pub enum IdentityResolver {
    Mock(MockIdentity),
    External(ExternalIdentity),
}

impl IdentityResolver {
    /// Builds the resolver for the mode selected by `config`.
    ///
    /// External mode needs a `provider`; asking for it without one is a
    /// configuration error. Must be called inside a tokio runtime when the
    /// external mode is selected.
    pub fn from_config(
        config: &AppConfig,
        storage: Arc<dyn KeyValueStore>,
        provider: Option<Arc<dyn SessionProvider>>,
    ) -> Result<Self> {
        match config.select_mode() {
            IdentityMode::Mock => Ok(Self::Mock(MockIdentity::load(storage))),
            IdentityMode::External => {
                let provider = provider.ok_or_else(|| {
                    StatusboardError::config(
                        "external identity mode selected but no session provider is available",
                    )
                })?;
                Ok(Self::External(ExternalIdentity::start(
                    provider,
                    config.auth_callback_url(),
                )))
            }
        }
    }

    fn source(&self) -> &dyn IdentitySource {
        match self {
            Self::Mock(mock) => mock as &dyn IdentitySource,
            Self::External(external) => external,
        }
    }

    pub fn mode(&self) -> IdentityMode {
        self.source().mode()
    }

    pub fn resolve(&self) -> Identity {
        self.source().resolve()
    }

    pub fn derived_capabilities(&self) -> Capabilities {
        self.source().derived_capabilities()
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.source().sign_out().await
    }

    /// Waits for the initial identity determination. Immediate in mock mode.
    pub async fn ready(&self) {
        if let Self::External(external) = self {
            external.ready().await;
        }
    }

    /// Mock sign-in. External mode signs in through credentials or a provider.
    pub fn sign_in(&self, name: Option<&str>, email: Option<&str>) -> Result<UserProfile> {
        match self {
            Self::Mock(mock) => Ok(mock.sign_in(name, email)),
            Self::External(_) => Err(StatusboardError::unsupported(
                "Use password or provider sign-in with an external identity service",
            )),
        }
    }

    /// Sets the role. Only the mock role is a local toggle.
    pub fn set_role(&self, role: Role) -> ChangeOutcome {
        match self {
            Self::Mock(mock) => {
                mock.set_role(role);
                ChangeOutcome::Applied
            }
            Self::External(_) => {
                tracing::info!(%role, "Role changes are not supported yet with an external identity");
                ChangeOutcome::NotSupported
            }
        }
    }

    pub fn update_profile(&self, profile: UserProfile) -> ChangeOutcome {
        match self {
            Self::Mock(mock) => {
                mock.update_profile(profile);
                ChangeOutcome::Applied
            }
            Self::External(_) => {
                tracing::info!("Profile changes are not supported yet with an external identity");
                ChangeOutcome::NotSupported
            }
        }
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        match self {
            Self::Mock(_) => Err(StatusboardError::unsupported(
                "MOCK mode: Sign In with a password is disabled",
            )),
            Self::External(external) => external.sign_in_with_password(email, password).await,
        }
    }

    pub async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<()> {
        match self {
            Self::Mock(_) => Err(StatusboardError::unsupported(
                "MOCK mode: Sign Up is disabled",
            )),
            Self::External(external) => external.sign_up_with_password(email, password).await,
        }
    }

    pub async fn sign_in_with_provider(&self, provider: &str) -> Result<()> {
        match self {
            Self::Mock(_) => Err(StatusboardError::unsupported(
                "MOCK mode: external sign-in is disabled",
            )),
            Self::External(external) => external.sign_in_with_provider(provider).await,
        }
    }

    /// Releases the external subscription, if any. Safe to call repeatedly.
    pub fn shutdown(&self) {
        if let Self::External(external) = self {
            external.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::identity::model::{ExternalUser, Session};
    use crate::identity::provider::SessionChange;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::broadcast;

    #[derive(Default)]
    struct MockStorage {
        values: Mutex<HashMap<String, String>>,
    }

    impl KeyValueStore for MockStorage {
        fn get(&self, key: &str) -> Result<Option<String>> {
            Ok(self.values.lock().unwrap().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<()> {
            self.values
                .lock()
                .unwrap()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.values.lock().unwrap().remove(key);
            Ok(())
        }
    }

    struct StaticProvider {
        session: Option<Session>,
        changes: broadcast::Sender<SessionChange>,
    }

    impl StaticProvider {
        fn signed_in(metadata: serde_json::Value) -> Self {
            let (changes, _) = broadcast::channel(4);
            Self {
                session: Some(Session {
                    access_token: "token".to_string(),
                    expires_at: None,
                    user: ExternalUser {
                        id: "u1".to_string(),
                        email: "sam@example.com".to_string(),
                        user_metadata: metadata,
                    },
                }),
                changes,
            }
        }
    }

    #[async_trait]
    impl SessionProvider for StaticProvider {
        async fn current_session(&self) -> Result<Option<Session>> {
            Ok(self.session.clone())
        }

        fn subscribe(&self) -> broadcast::Receiver<SessionChange> {
            self.changes.subscribe()
        }

        async fn sign_out(&self) -> Result<()> {
            Ok(())
        }

        async fn sign_in_with_password(&self, _email: &str, _password: &str) -> Result<Option<Session>> {
            Ok(None)
        }

        async fn sign_up_with_password(
            &self,
            _email: &str,
            _password: &str,
            _default_roles: &[Role],
        ) -> Result<Option<Session>> {
            Ok(None)
        }

        async fn sign_in_with_provider(&self, _provider: &str, _redirect_url: &str) -> Result<()> {
            Ok(())
        }
    }

    fn external_config() -> AppConfig {
        AppConfig {
            service_endpoint: Some("https://auth.example.com".to_string()),
            service_credential: Some("anon".to_string()),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_mock_mode_from_default_config() {
        let resolver =
            IdentityResolver::from_config(&AppConfig::default(), Arc::new(MockStorage::default()), None)
                .unwrap();
        assert_eq!(resolver.mode(), IdentityMode::Mock);
        resolver.ready().await;

        assert_eq!(resolver.set_role(Role::Manager), ChangeOutcome::Applied);
        assert_eq!(resolver.resolve().primary_role, Role::Manager);
        assert!(resolver.derived_capabilities().can_see_ai_summary_placeholder);

        resolver.sign_out().await.unwrap();
        assert!(!resolver.resolve().is_authenticated());
    }

    #[tokio::test]
    async fn test_mock_mode_rejects_credential_flows() {
        let resolver =
            IdentityResolver::from_config(&AppConfig::default(), Arc::new(MockStorage::default()), None)
                .unwrap();
        let err = resolver
            .sign_up_with_password("a@example.com", "secret1")
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "MOCK mode: Sign Up is disabled");
        assert!(resolver.sign_in_with_provider("google").await.is_err());
    }

    #[tokio::test]
    async fn test_external_mode_without_provider_is_config_error() {
        let result =
            IdentityResolver::from_config(&external_config(), Arc::new(MockStorage::default()), None);
        assert!(result.err().unwrap().is_config());
    }

    #[tokio::test]
    async fn test_external_mode_local_changes_are_noops() {
        let provider = Arc::new(StaticProvider::signed_in(serde_json::json!({ "roles": ["employee"] })));
        let resolver = IdentityResolver::from_config(
            &external_config(),
            Arc::new(MockStorage::default()),
            Some(provider),
        )
        .unwrap();
        resolver.ready().await;

        assert_eq!(resolver.mode(), IdentityMode::External);
        assert_eq!(resolver.set_role(Role::Admin), ChangeOutcome::NotSupported);
        assert_eq!(
            resolver.update_profile(UserProfile::new("X", "x@example.com")),
            ChangeOutcome::NotSupported
        );
        assert_eq!(resolver.resolve().primary_role, Role::Employee);
        assert_eq!(resolver.resolve().email(), Some("sam@example.com"));
        assert!(resolver.sign_in(None, None).is_err());

        resolver.shutdown();
        resolver.shutdown();
    }

    #[tokio::test]
    async fn test_override_flag_keeps_mock_even_with_provider() {
        let provider = Arc::new(StaticProvider::signed_in(serde_json::json!({ "roles": ["admin"] })));
        let config = AppConfig {
            mock_mode_override: true,
            ..external_config()
        };
        let resolver =
            IdentityResolver::from_config(&config, Arc::new(MockStorage::default()), Some(provider))
                .unwrap();
        assert_eq!(resolver.mode(), IdentityMode::Mock);
        assert_eq!(resolver.resolve().primary_role, Role::Employee);
    }
}
