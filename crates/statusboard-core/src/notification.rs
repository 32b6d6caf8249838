//! Notification sink (toasts).

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// How long a notification stays visible unless the caller says otherwise.
pub const DEFAULT_NOTIFICATION_MS: u64 = 2600;

/// Visual severity of a notification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Success,
    Error,
}

/// Fire-and-forget notification sink.
///
/// Nothing in the core depends on what a sink does with a message.
pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, severity: Severity, duration_ms: u64);

    fn info(&self, message: &str) {
        self.notify(message, Severity::Info, DEFAULT_NOTIFICATION_MS);
    }

    fn success(&self, message: &str) {
        self.notify(message, Severity::Success, DEFAULT_NOTIFICATION_MS);
    }

    fn error(&self, message: &str) {
        self.notify(message, Severity::Error, DEFAULT_NOTIFICATION_MS);
    }
}

/// A sink that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _message: &str, _severity: Severity, _duration_ms: u64) {}
}
