//! Application configuration model.
//!
//! Read once at startup. The identity mode derived from it is fixed for the
//! lifetime of the process.

use serde::{Deserialize, Serialize};

use crate::identity::IdentityMode;

/// Redirect base used when none is configured.
pub const DEFAULT_REDIRECT_BASE_URL: &str = "http://localhost:3000";

/// Path appended to the redirect base for external sign-in callbacks.
pub const AUTH_CALLBACK_PATH: &str = "/auth/callback";

/// Root configuration.
///
/// # File Location
///
/// - Linux: `~/.config/statusboard/config.toml`
/// - macOS: `~/Library/Application Support/statusboard/config.toml`
/// - Windows: `%APPDATA%\statusboard\config.toml`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AppConfig {
    /// External auth endpoint URL.
    pub service_endpoint: Option<String>,
    /// Public API key for the external auth endpoint.
    pub service_credential: Option<String>,
    /// Forces mock mode even when endpoint and credential are set.
    pub mock_mode_override: bool,
    /// Base URL used to build sign-in callback URLs.
    pub redirect_base_url: Option<String>,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
    /// Whether report mutations are written through at startup.
    pub persist_reports: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            service_endpoint: None,
            service_credential: None,
            mock_mode_override: false,
            redirect_base_url: None,
            log_level: "info".to_string(),
            persist_reports: true,
        }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl AppConfig {
    /// Selects the identity mode.
    ///
    /// External mode needs both an endpoint and a credential, and no override.
    pub fn select_mode(&self) -> IdentityMode {
        if is_set(&self.service_endpoint)
            && is_set(&self.service_credential)
            && !self.mock_mode_override
        {
            IdentityMode::External
        } else {
            IdentityMode::Mock
        }
    }

    /// Callback URL handed to external sign-in flows.
    pub fn auth_callback_url(&self) -> String {
        let base = self
            .redirect_base_url
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or(DEFAULT_REDIRECT_BASE_URL);
        format!("{}{}", base.trim().trim_end_matches('/'), AUTH_CALLBACK_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn external_config() -> AppConfig {
        AppConfig {
            service_endpoint: Some("https://auth.example.com".to_string()),
            service_credential: Some("public-anon-key".to_string()),
            ..AppConfig::default()
        }
    }

    #[test]
    fn test_default_is_mock() {
        assert_eq!(AppConfig::default().select_mode(), IdentityMode::Mock);
    }

    #[test]
    fn test_endpoint_and_credential_select_external() {
        assert_eq!(external_config().select_mode(), IdentityMode::External);
    }

    #[test]
    fn test_override_forces_mock() {
        let config = AppConfig {
            mock_mode_override: true,
            ..external_config()
        };
        assert_eq!(config.select_mode(), IdentityMode::Mock);
    }

    #[test]
    fn test_missing_credential_is_mock() {
        let config = AppConfig {
            service_credential: Some("   ".to_string()),
            ..external_config()
        };
        assert_eq!(config.select_mode(), IdentityMode::Mock);
    }

    #[test]
    fn test_callback_url() {
        assert_eq!(
            AppConfig::default().auth_callback_url(),
            "http://localhost:3000/auth/callback"
        );

        let config = AppConfig {
            redirect_base_url: Some("https://reports.example.com/".to_string()),
            ..AppConfig::default()
        };
        assert_eq!(
            config.auth_callback_url(),
            "https://reports.example.com/auth/callback"
        );
    }

    #[test]
    fn test_parse_toml() {
        let config: AppConfig = toml::from_str(
            r#"
service-endpoint = "https://auth.example.com"
service-credential = "key"
mock-mode-override = true
"#,
        )
        .unwrap();
        assert!(config.mock_mode_override);
        assert!(config.persist_reports);
        assert_eq!(config.log_level, "info");
    }
}
