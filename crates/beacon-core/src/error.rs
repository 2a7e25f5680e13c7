//! Error types for Beacon

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using BeaconError
pub type Result<T> = std::result::Result<T, BeaconError>;

/// Main error type for Beacon operations
#[derive(Debug, Error)]
pub enum BeaconError {
    /// Configuration-related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Hosting platform errors
    #[error(transparent)]
    Forge(#[from] ForgeError),

    /// Changelog-related errors
    #[error(transparent)]
    Changelog(#[from] ChangelogError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl BeaconError {
    /// Create a new "other" error with a message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }

    /// Whether the pipeline must stop on this error regardless of `fail_on_error`
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Config(_) | Self::Json(_) => true,
            Self::Forge(e) => e.is_fatal(),
            Self::Changelog(ChangelogError::InvalidPattern { .. }) => true,
            _ => false,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found at {0}")]
    NotFound(PathBuf),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value
    #[error("Invalid configuration: {field} - {message}")]
    InvalidValue { field: String, message: String },

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// IO error
    #[error("IO error reading config: {0}")]
    Io(#[from] std::io::Error),
}

/// Hosting platform (GitHub, Gitea) errors
#[derive(Debug, Error)]
pub enum ForgeError {
    /// Platform name not known to the client registry
    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    /// A single resource (pull request, release, tag) does not exist
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Token missing, expired or lacking scope
    #[error("Authentication failed for {resource}: {message}")]
    Unauthorized { resource: String, message: String },

    /// Rate limit exhausted
    #[error("Rate limited while fetching {resource}")]
    RateLimited { resource: String },

    /// Non-success status from the API
    #[error("API error for {resource}: {status} - {message}")]
    Api {
        resource: String,
        status: u16,
        message: String,
    },

    /// Response body could not be interpreted
    #[error("Invalid response for {resource}: {message}")]
    InvalidResponse { resource: String, message: String },

    /// Invalid client options (base URL, repository)
    #[error("Invalid client configuration: {0}")]
    InvalidOptions(String),

    /// Transport-level failure (DNS, TLS, timeout)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ForgeError {
    /// Whether this error is the soft "missing single resource" case
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Errors that abort the run even when degraded output is allowed
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedPlatform(_) | Self::Unauthorized { .. } | Self::InvalidOptions(_)
        )
    }
}

/// Changelog-related errors
#[derive(Debug, Error)]
pub enum ChangelogError {
    /// Requested tag does not exist on the remote
    #[error("Tag not found: {0}")]
    TagNotFound(String),

    /// Not enough tags to derive a release range
    #[error("No tags found to build a release range: {0}")]
    NoTags(String),

    /// A configured regular expression does not compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Failed to write changelog
    #[error("Failed to write changelog: {0}")]
    WriteFailed(String),
}
