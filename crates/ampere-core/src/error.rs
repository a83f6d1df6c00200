//! Unified error types for the Ampere cache layer.

use thiserror::Error;

/// Unified error type for Ampere infrastructure code.
///
/// Cache data operations never surface errors to callers (they degrade to
/// cache-absent results); this type covers the paths that do fail loudly:
/// configuration loading, validation, and the operations CLI.
#[derive(Error, Debug)]
pub enum AmpereError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Redis/Cache infrastructure error
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AmpereError {
    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Other(_) => "UNKNOWN_ERROR",
        }
    }

    /// Creates a configuration error from any displayable value.
    pub fn configuration(message: impl std::fmt::Display) -> Self {
        Self::Configuration(message.to_string())
    }

    /// Creates a cache error from any displayable value.
    pub fn cache(message: impl std::fmt::Display) -> Self {
        Self::Cache(message.to_string())
    }
}
