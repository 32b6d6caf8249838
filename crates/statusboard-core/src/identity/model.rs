//! Identity domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Access role. Declaration order is ascending priority.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[default]
    Employee,
    Manager,
    Admin,
}

impl Role {
    /// Manager and admin unlock the privileged affordances.
    pub fn is_privileged(self) -> bool {
        matches!(self, Role::Manager | Role::Admin)
    }
}

/// Display name and email of a person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: String,
    pub email: String,
}

impl UserProfile {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }

    /// Identity used by mock mode until someone signs in as someone else.
    pub fn demo() -> Self {
        Self::new("Alex Johnson", "alex@example.com")
    }

    /// Author recorded when nobody is signed in.
    pub fn unknown() -> Self {
        Self::new("Unknown", "unknown@example.com")
    }
}

impl Default for UserProfile {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Operating mode of the identity resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum IdentityMode {
    Mock,
    External,
}

/// A user as reported by the external session provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalUser {
    pub id: String,
    pub email: String,
    /// Free-form metadata; may carry `roles`, `role`, `full_name`, `name`.
    #[serde(default)]
    pub user_metadata: serde_json::Value,
}

impl ExternalUser {
    /// Display profile: `full_name`, then `name`, then the email itself.
    pub fn profile(&self) -> UserProfile {
        let name = ["full_name", "name"]
            .iter()
            .find_map(|key| {
                self.user_metadata
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .filter(|v| !v.trim().is_empty())
            })
            .unwrap_or(&self.email);
        UserProfile::new(name, self.email.clone())
    }
}

/// Opaque external session handle.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub user: ExternalUser,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .field("user", &self.user)
            .finish()
    }
}

/// Capabilities derived from the resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Capabilities {
    pub can_see_ai_summary_placeholder: bool,
}

/// Result of a local identity change request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    Applied,
    /// Accepted as a no-op: the current mode does not allow local changes.
    NotSupported,
}

/// The resolved actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub mode: IdentityMode,
    pub user: Option<UserProfile>,
    /// Present only in external mode.
    pub session: Option<Session>,
    pub primary_role: Role,
    /// Roles backing `primary_role`, highest priority first.
    pub roles: Vec<Role>,
}

impl Identity {
    /// Mock mode counts a present user; external mode needs a session.
    pub fn is_authenticated(&self) -> bool {
        match self.mode {
            IdentityMode::Mock => self.user.is_some(),
            IdentityMode::External => self.session.is_some(),
        }
    }

    pub fn email(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.email.as_str())
    }
}
