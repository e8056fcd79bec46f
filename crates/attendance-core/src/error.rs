//! Core error types for attendance-core.
//!
//! This module defines the error hierarchy using thiserror. Not-found
//! messages are user-facing and surface unchanged through the CLI.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for attendance-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A sheet, the template or a member row does not exist
    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    /// Calendar source or mail transport failures
    #[error("Integration error for '{service}': {message}")]
    Integration {
        service: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Wrap a collaborator failure with the service it came from.
    pub fn integration(
        service: &str,
        message: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        CoreError::Integration {
            service: service.to_string(),
            message: message.into(),
            source,
        }
    }
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Lookups that fail because the stored state does not contain the target.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum NotFoundError {
    /// No sheet with the requested `YYYYMM` label.
    #[error("該当月の稽古日程は未登録です。 (sheet {0})")]
    Sheet(String),

    /// The template sheet is needed to create a month but is missing.
    #[error("templateシートが存在しません。管理者に連絡してください。")]
    Template,

    /// No member row whose first cell equals the given name.
    #[error("指定された名前が存在しません。 ({0})")]
    Member(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Month outside 1..=12 or a malformed sheet label
    #[error("Invalid sheet label '{0}': expected YYYYMM")]
    InvalidSheetLabel(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Database(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
