use statusboard_core::notification::{Notifier, Severity};

/// Routes notifications into the tracing pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration_ms: u64) {
        match severity {
            Severity::Error => tracing::error!(duration_ms, "{message}"),
            Severity::Success | Severity::Info => {
                tracing::info!(%severity, duration_ms, "{message}")
            }
        }
    }
}
