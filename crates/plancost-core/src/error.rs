//! Error types for plancost bootstrap operations.
//!
//! This module defines [`PlancostError`], which covers configuration loading,
//! filesystem access and logging setup. Estimation errors live next to the
//! code that raises them (`plancost-resource`, `plancost-pricing`).

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`PlancostError`].
pub type Result<T> = std::result::Result<T, PlancostError>;

/// Error type for configuration, I/O and logging bootstrap.
#[derive(Debug, Error)]
pub enum PlancostError {
    // =========================================================================
    // Configuration Errors
    // =========================================================================
    /// Configuration file not found
    #[error("Configuration not found at {path}")]
    ConfigNotFound {
        path: PathBuf,
        #[source]
        source: Option<std::io::Error>,
    },

    /// Configuration file is invalid YAML
    #[error("Invalid configuration at {path}: {message}")]
    ConfigInvalid { path: PathBuf, message: String },

    /// Configuration validation failed
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String },

    // =========================================================================
    // I/O Errors
    // =========================================================================
    /// Generic I/O error with context
    #[error("I/O error {operation}: {path}")]
    Io {
        operation: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory creation failed
    #[error("Failed to create directory: {path}")]
    DirectoryCreation {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // =========================================================================
    // Internal Errors
    // =========================================================================
    /// Internal error (bug in plancost)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl PlancostError {
    /// Create a ConfigNotFound error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Create a ConfigNotFound error with source
    pub fn config_not_found_with_source(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigNotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a configuration error
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigNotFound { .. } | Self::ConfigInvalid { .. } | Self::ConfigValidation { .. }
        )
    }

    /// Returns actionable guidance for the user
    pub fn guidance(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound { .. } => {
                Some("Pass --config with an existing file or omit it to use defaults")
            }
            Self::ConfigInvalid { .. } => Some("Check YAML syntax in the configuration file"),
            Self::ConfigValidation { .. } => {
                Some("Check values in ~/.plancost/config.yaml and PLANCOST_* variables")
            }
            Self::DirectoryCreation { .. } => Some("Check permissions on the log directory"),
            _ => None,
        }
    }
}
