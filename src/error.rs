//! Error types for prowork
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, bad config)
//! - 3: Blocked by policy (notes on a task type that does not take notes)
//! - 4: Operation failed (I/O, serialization, worker gone)

use std::path::PathBuf;
use thiserror::Error;

/// Exit codes for the prowork CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const POLICY_BLOCKED: i32 = 3;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for prowork operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid {kind}: '{value}' (expected one of {expected})")]
    InvalidVariant {
        kind: &'static str,
        value: String,
        expected: String,
    },

    #[error("Invalid date '{0}' (expected YYYY-MM-DD)")]
    InvalidDate(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    // Policy blocks (exit code 3)
    #[error("Task {id} is of type {task_type} which does not take notes")]
    NotesNotAllowed { id: String, task_type: String },

    // Operation failures (exit code 4)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Repository worker has stopped")]
    WorkerStopped,

    #[error("Operation failed: {0}")]
    OperationFailed(String),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::InvalidArgument(_)
            | Error::InvalidVariant { .. }
            | Error::InvalidDate(_)
            | Error::InvalidConfig(_)
            | Error::TaskNotFound(_) => exit_codes::USER_ERROR,

            // Policy blocks
            Error::NotesNotAllowed { .. } => exit_codes::POLICY_BLOCKED,

            // Operation failures
            Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_)
            | Error::TomlSerialize(_)
            | Error::WriteFailed { .. }
            | Error::WorkerStopped
            | Error::OperationFailed(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured details for the JSON error envelope, when there are any
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::InvalidVariant { kind, value, .. } => Some(serde_json::json!({
                "kind": kind,
                "value": value,
            })),
            Error::TaskNotFound(id) => Some(serde_json::json!({ "id": id })),
            Error::NotesNotAllowed { id, task_type } => Some(serde_json::json!({
                "id": id,
                "type": task_type,
            })),
            Error::WriteFailed { path, .. } => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for prowork operations
pub type Result<T> = std::result::Result<T, Error>;

/// Wrapper for displaying errors in JSON format
#[derive(serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub code: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&Error> for JsonError {
    fn from(err: &Error) -> Self {
        JsonError {
            error: err.to_string(),
            code: err.exit_code(),
            details: err.details(),
        }
    }
}
