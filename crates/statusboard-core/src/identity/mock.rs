//! Mock identity: a local user and a freely toggled role.
//!
//! State is mirrored to the key-value store on every change under
//! `mock_role` and `mock_user`.

use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use super::model::{Capabilities, Identity, IdentityMode, Role, UserProfile};
use crate::storage::{KeyValueStore, MOCK_ROLE_KEY, MOCK_USER_KEY};

#[derive(Debug, Clone)]
struct MockState {
    role: Role,
    user: Option<UserProfile>,
}

pub struct MockIdentity {
    state: RwLock<MockState>,
    storage: Arc<dyn KeyValueStore>,
}

impl MockIdentity {
    /// Restores the mock role and user from storage.
    ///
    /// Missing or malformed values fall back to `employee` and the demo user.
    /// A stored JSON `null` user means signed out.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let role = read(storage.as_ref(), MOCK_ROLE_KEY)
            .and_then(|raw| Role::from_str(raw.trim()).ok())
            .unwrap_or_default();

        let user = match read(storage.as_ref(), MOCK_USER_KEY) {
            Some(raw) => match serde_json::from_str::<Option<UserProfile>>(&raw) {
                Ok(user) => user,
                Err(e) => {
                    tracing::warn!("Ignoring malformed mock user: {}", e);
                    Some(UserProfile::demo())
                }
            },
            None => Some(UserProfile::demo()),
        };

        let identity = Self {
            state: RwLock::new(MockState { role, user }),
            storage,
        };
        identity.persist_role();
        identity.persist_user();
        identity
    }

    pub fn role(&self) -> Role {
        self.read_state().role
    }

    pub fn user(&self) -> Option<UserProfile> {
        self.read_state().user.clone()
    }

    /// Signs in as the given person; missing parts default to the demo user.
    pub fn sign_in(&self, name: Option<&str>, email: Option<&str>) -> UserProfile {
        let demo = UserProfile::demo();
        let profile = UserProfile::new(
            name.unwrap_or(&demo.name),
            email.unwrap_or(&demo.email),
        );
        self.write_state().user = Some(profile.clone());
        self.persist_user();
        tracing::info!(email = %profile.email, "Mock sign-in");
        profile
    }

    pub fn sign_out(&self) {
        self.write_state().user = None;
        self.persist_user();
        tracing::info!("Mock sign-out");
    }

    /// Sets the role. No check against the signed-in user.
    pub fn set_role(&self, role: Role) {
        self.write_state().role = role;
        self.persist_role();
        tracing::info!(%role, "Mock role changed");
    }

    pub fn update_profile(&self, profile: UserProfile) {
        self.write_state().user = Some(profile);
        self.persist_user();
    }

    pub fn resolve(&self) -> Identity {
        let state = self.read_state();
        Identity {
            mode: IdentityMode::Mock,
            user: state.user.clone(),
            session: None,
            primary_role: state.role,
            roles: vec![state.role],
        }
    }

    pub fn derived_capabilities(&self) -> Capabilities {
        Capabilities {
            can_see_ai_summary_placeholder: self.role().is_privileged(),
        }
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, MockState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, MockState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_role(&self) {
        let role = self.role().to_string();
        write(self.storage.as_ref(), MOCK_ROLE_KEY, &role);
    }

    fn persist_user(&self) {
        let user = self.user();
        match serde_json::to_string(&user) {
            Ok(json) => write(self.storage.as_ref(), MOCK_USER_KEY, &json),
            Err(e) => tracing::warn!("Failed to serialize mock user: {}", e),
        }
    }
}

fn read(storage: &dyn KeyValueStore, key: &str) -> Option<String> {
    match storage.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, "Failed to read mock identity: {}", e);
            None
        }
    }
}

fn write(storage: &dyn KeyValueStore, key: &str, value: &str) {
    if let Err(e) = storage.set(key, value) {
        tracing::warn!(key, "Failed to persist mock identity: {}", e);
    }
}
