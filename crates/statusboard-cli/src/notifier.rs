use colored::Colorize;

use statusboard_core::notification::{Notifier, Severity};

/// Prints notifications to stderr so that stdout stays parseable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, severity: Severity, _duration_ms: u64) {
        let line = match severity {
            Severity::Success => format!("✓ {message}").green(),
            Severity::Error => format!("✗ {message}").red(),
            Severity::Info => format!("• {message}").cyan(),
        };
        eprintln!("{line}");
    }
}
