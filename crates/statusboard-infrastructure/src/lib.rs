pub mod config_service;
pub mod notifier;
pub mod paths;
pub mod session_provider;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::notifier::TracingNotifier;
pub use crate::paths::StatusboardPaths;
pub use crate::session_provider::FileSessionProvider;
#[cfg(any(test, feature = "test-util"))]
pub use crate::session_provider::InMemorySessionProvider;
pub use crate::storage::{JsonFileStore, MemoryStore};
