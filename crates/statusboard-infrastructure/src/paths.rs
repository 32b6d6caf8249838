//! Unified path management for statusboard files.
//!
//! Every file the application reads or writes lives under one directory,
//! resolved per platform via `dirs` unless a base is given explicitly.

use std::path::{Path, PathBuf};

use statusboard_core::{Result, StatusboardError};

const APP_DIR: &str = "statusboard";

/// Path resolver for statusboard files.
///
/// # Directory Structure
///
/// ```text
/// ~/.config/statusboard/
/// ├── config.toml       # Application configuration
/// ├── storage.json      # Local key-value namespace (reports, mock identity)
/// └── session.json      # Cached external session, if any
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusboardPaths {
    root: PathBuf,
}

impl StatusboardPaths {
    /// Resolves the root directory.
    ///
    /// `base` replaces the platform config directory; the `statusboard`
    /// component is appended in both cases.
    pub fn new(base: Option<&Path>) -> Result<Self> {
        let base = match base {
            Some(base) => base.to_path_buf(),
            None => dirs::config_dir()
                .ok_or_else(|| StatusboardError::config("Cannot find config directory"))?,
        };
        Ok(Self {
            root: base.join(APP_DIR),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    pub fn storage_file(&self) -> PathBuf {
        self.root.join("storage.json")
    }

    pub fn session_file(&self) -> PathBuf {
        self.root.join("session.json")
    }
}
