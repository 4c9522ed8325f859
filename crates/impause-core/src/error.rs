//! Core error types for impause-core.
//!
//! Each area of the library has its own `thiserror` enum; [`CoreError`]
//! wraps them for callers that do not care which area failed.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

use crate::reflection::TimerState;

/// Core error type for impause-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Purchase intake rejected one or more fields
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timer operation not allowed in the current state
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Prompt generation failed
    #[error("Prompt error: {0}")]
    Prompt(#[from] PromptError),

    /// Auth service errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Statement analysis errors
    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The reflection session task is gone
    #[error("reflection session has shut down")]
    SessionClosed,
}

/// One rejected intake field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Purchase intake failed; every offending field is listed so the caller
    /// can show them inline.
    #[error("invalid purchase ({})", join_fields(.0))]
    Purchase(Vec<FieldError>),

    /// Unknown spending category label
    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl ValidationError {
    /// Field-level errors, empty for non-intake variants.
    pub fn fields(&self) -> &[FieldError] {
        match self {
            ValidationError::Purchase(fields) => fields,
            _ => &[],
        }
    }
}

fn join_fields(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Rejected timer operations. The timer state is never changed when one of
/// these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    #[error("'{operation}' is not allowed while the timer is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: TimerState,
    },

    #[error("submit a purchase before starting the reflection timer")]
    NoActivePurchase,

    #[error("duration must be greater than zero minutes")]
    InvalidDuration,

    #[error("no time remaining; start the timer again or make a decision")]
    NothingRemaining,
}

/// Prompt generator failures. Never surfaced to the decision flow; the
/// timer substitutes the fallback prompts instead.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("prompt request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("prompt generator returned HTTP {status}")]
    Status { status: u16 },

    #[error("prompt generator returned no prompts")]
    Empty,
}

/// Auth service errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("{operation} failed (HTTP {status})")]
    Rejected { operation: &'static str, status: u16 },

    #[error("auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("not signed in")]
    NotAuthenticated,

    #[error("token store error: {0}")]
    TokenStore(String),

    #[error("malformed token: {0}")]
    MalformedToken(String),
}

/// Bank-statement analysis errors.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("analysis request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{message}")]
    Service { status: u16, message: String },

    #[error("no statement files given")]
    NoFiles,

    #[error("failed to read statement {path}: {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed analysis payload: {0}")]
    Malformed(String),
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

    /// Stored row could not be decoded
    #[error("Corrupt row in '{table}': {message}")]
    CorruptRow { table: &'static str, message: String },

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

    /// Unknown dot-path key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Home/config directory could not be prepared
    #[error("Failed to prepare data directory: {0}")]
    DataDir(#[source] std::io::Error),
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

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
