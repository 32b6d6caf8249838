//! Access policy.
//!
//! Pure predicates over role, mode and emails. Callers check these before
//! mutating the report store; the store itself does not enforce them.
//! Role-based grants only count once the identity is authenticated.

use serde::{Deserialize, Serialize};

use crate::identity::{Capabilities, Identity, IdentityMode, Role, UserProfile};
use crate::report::Report;

/// Any recognized role may edit any report. Authorship is not checked.
pub fn can_edit_record(role: Role) -> bool {
    matches!(role, Role::Employee | Role::Manager | Role::Admin)
}

pub fn can_delete_record(role: Role) -> bool {
    role.is_privileged()
}

/// Generation is only available in mock mode, whatever the role.
pub fn can_generate_summary(capabilities: Capabilities, mode: IdentityMode) -> bool {
    capabilities.can_see_ai_summary_placeholder && mode == IdentityMode::Mock
}

/// Whether `user` authored `report`. Used for list filtering only.
pub fn is_own_record(report: &Report, user: &UserProfile) -> bool {
    report.author.email.eq_ignore_ascii_case(&user.email)
}

/// The policy evaluated once for an identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permissions {
    pub can_edit: bool,
    pub can_delete: bool,
    pub can_generate_summary: bool,
}

impl Permissions {
    /// Everything is denied while `identity` is signed out, whatever its role.
    pub fn evaluate(identity: &Identity, capabilities: Capabilities) -> Self {
        if !identity.is_authenticated() {
            return Self::default();
        }
        Self {
            can_edit: can_edit_record(identity.primary_role),
            can_delete: can_delete_record(identity.primary_role),
            can_generate_summary: can_generate_summary(capabilities, identity.mode),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::{ExternalUser, Session};
    use chrono::{NaiveDate, TimeZone, Utc};
    use strum::IntoEnumIterator;

    fn report_by(email: &str) -> Report {
        let at = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        Report {
            id: "r1".to_string(),
            title: "Weekly".to_string(),
            team: "Platform".to_string(),
            week_of: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            accomplishments: vec![],
            blockers: vec![],
            plans: vec![],
            author: UserProfile::new("Someone", email),
            created_at: at,
            updated_at: at,
            ai_summary: String::new(),
        }
    }

    fn caps(enabled: bool) -> Capabilities {
        Capabilities {
            can_see_ai_summary_placeholder: enabled,
        }
    }

    /// Editing is open to every role while deleting is not. This asymmetry is
    /// intended and asserted here so it is not "fixed" by accident.
    #[test]
    fn test_edit_open_to_all_roles_but_delete_restricted() {
        for role in Role::iter() {
            assert!(can_edit_record(role), "{role} should be able to edit");
        }
        assert!(!can_delete_record(Role::Employee));
        assert!(can_delete_record(Role::Manager));
        assert!(can_delete_record(Role::Admin));
    }

    #[test]
    fn test_generate_summary_requires_capability_and_mock_mode() {
        assert!(can_generate_summary(caps(true), IdentityMode::Mock));
        assert!(!can_generate_summary(caps(false), IdentityMode::Mock));
        assert!(!can_generate_summary(caps(true), IdentityMode::External));
        assert!(!can_generate_summary(caps(false), IdentityMode::External));
    }

    #[test]
    fn test_is_own_record_ignores_case() {
        let report = report_by("Alex@Example.com");
        assert!(is_own_record(&report, &UserProfile::new("Alex", "alex@example.com")));
        assert!(!is_own_record(&report, &UserProfile::new("Sam", "sam@example.com")));
    }

    fn external_admin(session: Option<Session>) -> Identity {
        Identity {
            mode: IdentityMode::External,
            user: Some(UserProfile::new("Root", "root@example.com")),
            session,
            primary_role: Role::Admin,
            roles: vec![Role::Admin],
        }
    }

    #[test]
    fn test_permissions_for_external_admin() {
        let session = Session {
            access_token: "token".to_string(),
            expires_at: None,
            user: ExternalUser {
                id: "u1".to_string(),
                email: "root@example.com".to_string(),
                user_metadata: serde_json::json!({ "roles": ["admin"] }),
            },
        };
        let permissions = Permissions::evaluate(&external_admin(Some(session)), caps(false));
        assert_eq!(
            permissions,
            Permissions {
                can_edit: true,
                can_delete: true,
                can_generate_summary: false,
            }
        );
    }

    #[test]
    fn test_permissions_denied_while_signed_out() {
        // External admin whose session has not resolved yet
        let pending = external_admin(None);
        assert_eq!(Permissions::evaluate(&pending, caps(true)), Permissions::default());

        // Mock admin role persisted, but nobody signed in
        let mock = Identity {
            mode: IdentityMode::Mock,
            user: None,
            session: None,
            primary_role: Role::Admin,
            roles: vec![Role::Admin],
        };
        assert!(!mock.is_authenticated());
        assert_eq!(Permissions::evaluate(&mock, caps(true)), Permissions::default());

        let signed_in = Identity {
            user: Some(UserProfile::new("Alex", "alex@example.com")),
            ..mock
        };
        assert_eq!(
            Permissions::evaluate(&signed_in, caps(true)),
            Permissions {
                can_edit: true,
                can_delete: true,
                can_generate_summary: true,
            }
        );
    }
}
