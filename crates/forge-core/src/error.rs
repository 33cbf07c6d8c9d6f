//! Core error types for forge-core.
//!
//! This module defines the error hierarchy using thiserror. Scoring and
//! time computation never produce errors (missing answers are valid input);
//! errors only arise at the storage, configuration, and network boundaries.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for forge-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote endpoint errors (time authority, day-timer check)
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

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

    /// A check-in already exists for this (user, date) pair.
    /// Submissions are immutable; the caller must switch to read-only display.
    #[error("Check-in already submitted for {date_key}")]
    AlreadySubmitted { date_key: String },

    /// The punishment has already been resolved and cannot be edited.
    #[error("Punishment {id} is resolved and immutable")]
    PunishmentResolved { id: String },

    /// Referenced record does not exist
    #[error("Record not found: {0}")]
    NotFound(String),

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

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Errors from the remote time-authority and day-timer-check endpoints.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// Transport-level failure (endpoint unreachable, timeout).
    /// Callers retain the last known time state and retry on the next trigger.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Bearer token missing or rejected (HTTP 401)
    #[error("Not authenticated")]
    NotAuthenticated,

    /// Server has no epoch configured or persistence failed (HTTP 500).
    /// The client must not fabricate a day number from its local clock.
    #[error("Server configuration error: {0}")]
    ServerConfiguration(String),

    /// Response had an unexpected HTTP status
    #[error("Unexpected status {status} from {endpoint}")]
    UnexpectedStatus { endpoint: String, status: u16 },

    /// Response body did not match the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Endpoint URL is malformed
    #[error("Invalid endpoint URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Validation errors, caught before any network call or write.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A check-in needs at least one pillar
    #[error("No pillars selected: a check-in requires at least one pillar")]
    NoPillarsSelected,

    /// At most two pillars per day
    #[error("Too many pillars selected: {count} (maximum is 2)")]
    TooManyPillars { count: usize },

    /// Proof submission requires both fields to be non-empty
    #[error("Missing proof field: {field}")]
    MissingProofField { field: &'static str },

    /// Punishment state machine transition not allowed from current stage
    #[error("Invalid punishment transition from '{from}' via '{via}'")]
    InvalidTransition { from: &'static str, via: &'static str },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg) => {
                if e.code == rusqlite::ErrorCode::DatabaseLocked {
                    DatabaseError::Locked
                } else if e.code == rusqlite::ErrorCode::ConstraintViolation {
                    DatabaseError::QueryFailed(
                        msg.clone().unwrap_or_else(|| "constraint violation".into()),
                    )
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for CoreError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        CoreError::Custom(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
