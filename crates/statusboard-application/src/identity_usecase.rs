//! Identity use cases.
//!
//! Thin wrappers over [`IdentityResolver`] that surface outcomes through the
//! notification sink.

use std::sync::Arc;

use statusboard_core::identity::{
    ChangeOutcome, Identity, IdentityMode, IdentityResolver, Role, UserProfile,
};
use statusboard_core::notification::{DEFAULT_NOTIFICATION_MS, Notifier, Severity};
use statusboard_core::policy::Permissions;
use statusboard_core::{Result, StatusboardError};

pub struct IdentityUseCase {
    identity: Arc<IdentityResolver>,
    notifier: Arc<dyn Notifier>,
}

impl IdentityUseCase {
    pub fn new(identity: Arc<IdentityResolver>, notifier: Arc<dyn Notifier>) -> Self {
        Self { identity, notifier }
    }

    pub fn mode(&self) -> IdentityMode {
        self.identity.mode()
    }

    pub fn current(&self) -> Identity {
        self.identity.resolve()
    }

    pub fn permissions(&self) -> Permissions {
        Permissions::evaluate(&self.identity.resolve(), self.identity.derived_capabilities())
    }

    pub fn sign_in(&self, name: Option<&str>, email: Option<&str>) -> Result<UserProfile> {
        let result = self.identity.sign_in(name, email);
        self.report(result, "Signed in")
    }

    pub async fn sign_out(&self) -> Result<()> {
        let result = self.identity.sign_out().await;
        self.report(result, "Signed out")
    }

    pub fn set_role(&self, role: Role) -> ChangeOutcome {
        let outcome = self.identity.set_role(role);
        if outcome == ChangeOutcome::NotSupported {
            self.notifier.info("Role changes are not supported yet");
        }
        outcome
    }

    pub fn update_profile(&self, profile: UserProfile) -> ChangeOutcome {
        let outcome = self.identity.update_profile(profile);
        match outcome {
            ChangeOutcome::Applied => self.notifier.success("Profile updated"),
            ChangeOutcome::NotSupported => self.notifier.info("Profile changes are not supported yet"),
        }
        outcome
    }

    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<()> {
        let result = self.identity.sign_in_with_password(email, password).await;
        self.report(result, "Signed in")
    }

    pub async fn sign_up_with_password(&self, email: &str, password: &str) -> Result<()> {
        let result = self.identity.sign_up_with_password(email, password).await;
        self.report(
            result,
            "Sign up successful. Check your email (if confirmation is enabled).",
        )
    }

    pub async fn sign_in_with_provider(&self, provider: &str) -> Result<()> {
        let result = self.identity.sign_in_with_provider(provider).await;
        self.report(result, "Redirecting to sign-in")
    }

    /// Notifies the outcome and hands the result back unchanged.
    ///
    /// Disabled flows are informational. Any other failure is an error.
    fn report<T>(&self, result: Result<T>, success: &str) -> Result<T> {
        match &result {
            Ok(_) => self.notifier.success(success),
            Err(e @ StatusboardError::Unsupported(_)) => {
                self.notifier
                    .notify(&e.user_message(), Severity::Info, DEFAULT_NOTIFICATION_MS)
            }
            Err(e) => {
                tracing::warn!("Identity flow failed: {}", e);
                self.notifier.error(&e.user_message())
            }
        }
        result
    }
}
