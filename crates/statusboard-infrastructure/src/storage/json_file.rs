//! File-backed key-value store.
//!
//! The whole namespace is one JSON object of string values. Every write
//! replaces the file via a temporary file and an atomic rename.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use statusboard_core::storage::KeyValueStore;
use statusboard_core::{Result, StatusboardError};

type Namespace = BTreeMap<String, String>;

/// A key-value namespace stored in a single JSON file.
///
/// The file is read on every access so that separate processes sharing it
/// see each other's writes.
pub struct JsonFileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the namespace. A missing or empty file is an empty namespace.
    fn load(&self) -> Result<Namespace> {
        if !self.path.exists() {
            return Ok(Namespace::new());
        }

        let content = fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Namespace::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, data: &Namespace) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let json = serde_json::to_string_pretty(data)?;

        let tmp_path = self.temp_path()?;
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(json.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Read-modify-write under the process-local lock.
    fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut Namespace),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut data = match self.load() {
            Ok(data) => data,
            // Malformed content counts as absent; the write replaces it
            Err(e) if e.is_serialization() => {
                tracing::warn!(path = %self.path.display(), "Discarding unreadable storage file: {}", e);
                Namespace::new()
            }
            Err(e) => return Err(e),
        };
        f(&mut data);
        self.save(&data)
    }

    fn temp_path(&self) -> Result<PathBuf> {
        let parent = self
            .path
            .parent()
            .ok_or_else(|| StatusboardError::io("Path has no parent directory"))?;
        let file_name = self
            .path
            .file_name()
            .ok_or_else(|| StatusboardError::io("Path has no file name"))?;

        Ok(parent.join(format!(".{}.tmp", file_name.to_string_lossy())))
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.update(|data| {
            data.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|data| {
            data.remove(key);
        })
    }
}
