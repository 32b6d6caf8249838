//! Local persistence port.
//!
//! A string key-value namespace. This is the only I/O boundary the report
//! store and the mock identity touch directly.

use crate::error::Result;

/// Key holding the JSON-encoded report collection.
pub const REPORTS_KEY: &str = "mock_reports";
/// Key holding the mock role as a bare string.
pub const MOCK_ROLE_KEY: &str = "mock_role";
/// Key holding the mock user profile as JSON (`null` when signed out).
pub const MOCK_USER_KEY: &str = "mock_user";

/// Key-value persistence adapter.
///
/// Writes are synchronous and best effort. Callers decide whether a failed
/// write matters; the report store and mock identity log and move on.
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removes `key`. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}
