//! Helpers shared by the use case tests.

use std::sync::Mutex;

use statusboard_core::notification::{Notifier, Severity};

/// Keeps every notification in arrival order.
#[derive(Default)]
pub(crate) struct RecordingNotifier {
    pub(crate) messages: Mutex<Vec<(String, Severity, u64)>>,
}

impl RecordingNotifier {
    pub(crate) fn last(&self) -> Option<(String, Severity, u64)> {
        self.messages.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity, duration_ms: u64) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), severity, duration_ms));
    }
}
