//! Core error types for vigil-core.
//!
//! This module defines the error hierarchy using thiserror. Remote-platform
//! failures carry the taxonomy the hosted store actually produces; nothing
//! in this crate retries automatically.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for vigil-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Remote document store / function errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Local database errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Session/credential errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the hosted document store and remote functions.
///
/// One variant per failure class observed at the platform boundary.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No session token present
    #[error("Not authenticated with the platform")]
    NotAuthenticated,

    /// Document does not exist
    #[error("Document not found: {path}")]
    NotFound { path: String },

    /// Caller lacks access to the document
    #[error("Permission denied for {path}")]
    PermissionDenied { path: String },

    /// Connectivity failure
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Request exceeded the platform's deadline
    #[error("Request timed out: {path}")]
    Timeout { path: String },

    /// Response body did not match the expected shape
    #[error("Malformed response from {path}: {message}")]
    MalformedResponse { path: String, message: String },

    /// The platform rejected a previously valid session
    #[error("Session invalidated by the platform")]
    SessionInvalidated,
}

/// Local SQLite database errors.
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// OS keyring session-token errors.
#[derive(Error, Debug)]
pub enum SessionError {
    /// No token stored for the platform
    #[error("No session token stored; run `vigil-cli auth login` first")]
    NoToken,

    /// Keyring access failed
    #[error("Keyring error: {0}")]
    Keyring(String),
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Check-in interval must be a positive duration
    #[error("Invalid check-in interval: {seconds}s (must be positive)")]
    NonPositiveInterval { seconds: i64 },

    /// `lastCheckedIn` only moves forward
    #[error("Check-in at {attempted} precedes recorded check-in at {recorded}")]
    CheckInMovedBackward {
        recorded: chrono::DateTime<chrono::Utc>,
        attempted: chrono::DateTime<chrono::Utc>,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

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

impl From<keyring::Error> for SessionError {
    fn from(err: keyring::Error) -> Self {
        SessionError::Keyring(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
