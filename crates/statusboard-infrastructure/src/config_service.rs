//! Configuration service implementation.
//!
//! Loads [`AppConfig`] from `config.toml` and applies environment overrides.

use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};

use statusboard_core::{Result, StatusboardError};
use statusboard_core::config::AppConfig;

pub const ENV_SERVICE_ENDPOINT: &str = "STATUSBOARD_SERVICE_ENDPOINT";
pub const ENV_SERVICE_CREDENTIAL: &str = "STATUSBOARD_SERVICE_CREDENTIAL";
pub const ENV_MOCK_MODE: &str = "STATUSBOARD_MOCK_MODE";
pub const ENV_REDIRECT_BASE_URL: &str = "STATUSBOARD_REDIRECT_BASE_URL";

/// Loads the application configuration once at startup.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the file and the process environment.
    pub fn load(&self) -> Result<AppConfig> {
        self.load_with(|key| std::env::var(key).ok())
    }

    /// Reads the file, then applies overrides from `env`.
    ///
    /// A missing file yields defaults. A malformed file is a `Config` error.
    pub fn load_with<F>(&self, env: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.read_file()?;
        apply_env_overrides(&mut config, env);
        tracing::debug!(path = %self.path.display(), mode = %config.select_mode(), "Configuration loaded");
        Ok(config)
    }

    /// Applies `f` to the file contents (without environment overrides) and
    /// writes the result back atomically.
    pub fn update<F>(&self, f: F) -> Result<AppConfig>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.read_file()?;
        f(&mut config);
        self.save(&config)?;
        Ok(config)
    }

    fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(config)
            .map_err(|e| StatusboardError::config(format!("Failed to serialize config: {}", e)))?;

        let tmp_path = self.path.with_extension("toml.tmp");
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(content.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn read_file(&self) -> Result<AppConfig> {
        if !self.path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        toml::from_str(&content).map_err(|e| {
            StatusboardError::config(format!(
                "Failed to parse {}: {}",
                self.path.display(),
                e
            ))
        })
    }
}

fn apply_env_overrides<F>(config: &mut AppConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(endpoint) = env(ENV_SERVICE_ENDPOINT) {
        config.service_endpoint = Some(endpoint);
    }
    if let Some(credential) = env(ENV_SERVICE_CREDENTIAL) {
        config.service_credential = Some(credential);
    }
    if let Some(flag) = env(ENV_MOCK_MODE) {
        config.mock_mode_override = is_truthy(&flag);
    }
    if let Some(base) = env(ENV_REDIRECT_BASE_URL) {
        config.redirect_base_url = Some(base);
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use statusboard_core::identity::IdentityMode;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("config.toml"));

        let config = service.load_with(no_env).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.select_mode(), IdentityMode::Mock);
    }

    #[test]
    fn test_file_values_are_read() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
service-endpoint = "https://auth.example.com"
service-credential = "anon-key"
log-level = "debug"
persist-reports = false
"#,
        )
        .unwrap();

        let config = ConfigService::new(path).load_with(no_env).unwrap();
        assert_eq!(config.select_mode(), IdentityMode::External);
        assert_eq!(config.log_level, "debug");
        assert!(!config.persist_reports);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "service-endpoint = [").unwrap();

        let err = ConfigService::new(path).load_with(no_env).unwrap_err();
        assert!(err.is_config());
    }

    #[test]
    fn test_env_overrides_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "service-endpoint = \"https://file.example.com\"\n").unwrap();

        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_SERVICE_CREDENTIAL, "from-env"),
            (ENV_MOCK_MODE, "Yes"),
            (ENV_REDIRECT_BASE_URL, "https://app.example.com/"),
        ]);
        let config = ConfigService::new(path)
            .load_with(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.service_endpoint.as_deref(), Some("https://file.example.com"));
        assert_eq!(config.service_credential.as_deref(), Some("from-env"));
        assert!(config.mock_mode_override);
        assert_eq!(config.select_mode(), IdentityMode::Mock);
        assert_eq!(
            config.auth_callback_url(),
            "https://app.example.com/auth/callback"
        );
    }

    #[test]
    fn test_update_writes_file_without_env_values() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::new(temp_dir.path().join("statusboard").join("config.toml"));

        let saved = service.update(|c| c.persist_reports = false).unwrap();
        assert!(!saved.persist_reports);

        let env = |key: &str| (key == ENV_SERVICE_ENDPOINT).then(|| "https://env.example.com".to_string());
        let reloaded = service.load_with(env).unwrap();
        assert!(!reloaded.persist_reports);
        assert_eq!(reloaded.service_endpoint.as_deref(), Some("https://env.example.com"));

        let on_disk = service.load_with(no_env).unwrap();
        assert_eq!(on_disk.service_endpoint, None);
        assert!(!temp_dir.path().join("statusboard").join("config.toml.tmp").exists());
    }

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "TRUE", " on ", "yes"] {
            assert!(is_truthy(value), "{value}");
        }
        for value in ["0", "false", "off", ""] {
            assert!(!is_truthy(value), "{value}");
        }
    }
}
