//! Error types for the Statusboard application.

use thiserror::Error;

/// A shared error type for the entire Statusboard application.
///
/// Missing records are not errors: store operations that target an absent id
/// are silent no-ops and lookups return `Option`. This type covers the failures
/// that callers are expected to see and report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StatusboardError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON"
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// External identity provider failure (session lookup, credential flows)
    #[error("Identity error: {message}")]
    Identity { message: String },

    /// The actor lacks the capability required for the action.
    #[error("Permission denied: {action} requires {requirement}")]
    PermissionDenied {
        action: &'static str,
        requirement: &'static str,
    },

    /// The operation is not available in the current mode.
    #[error("Not supported: {0}")]
    Unsupported(String),
}

impl StatusboardError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Identity error
    pub fn identity(message: impl Into<String>) -> Self {
        Self::Identity {
            message: message.into(),
        }
    }

    /// Creates a PermissionDenied error
    pub fn permission_denied(action: &'static str, requirement: &'static str) -> Self {
        Self::PermissionDenied {
            action,
            requirement,
        }
    }

    /// Creates an Unsupported error
    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is an IO error
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Check if this is a permission error
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Self::PermissionDenied { .. })
    }

    /// Returns the message a notification sink should show for this error.
    ///
    /// Identity failures carry the provider's own message verbatim.
    pub fn user_message(&self) -> String {
        match self {
            Self::Identity { message } => message.clone(),
            Self::Unsupported(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for StatusboardError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for StatusboardError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for StatusboardError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, StatusboardError>`.
pub type Result<T> = std::result::Result<T, StatusboardError>;
