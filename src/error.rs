//! Error types for ted
//!
//! Exit codes:
//! - 0: Success
//! - 2: User error (bad args, unknown task, rejected storage root)
//! - 4: Operation failed (I/O, corrupt index or counter, editor failure)

use std::path::PathBuf;
use thiserror::Error;

use crate::storage::Root;

/// Exit codes for the ted CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const USER_ERROR: i32 = 2;
    pub const OPERATION_FAILED: i32 = 4;
}

/// Main error type for ted operations
#[derive(Error, Debug)]
pub enum Error {
    // User errors (exit code 2)
    #[error("No such task: {id} ({root})")]
    NotFound { id: u64, root: Root },

    #[error("Not a task directory: {0} (must be an existing task directory or an empty directory)")]
    InvalidRoot(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Operation failures (exit code 4)
    #[error("Corrupt index {path}: {source}")]
    CorruptIndex {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Corrupt counter {path}: {value:?} is not a number")]
    CorruptCounter { path: PathBuf, value: String },

    #[error("Editor failed: {0}")]
    Editor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl Error {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // User errors
            Error::NotFound { .. }
            | Error::InvalidRoot(_)
            | Error::InvalidArgument(_)
            | Error::InvalidConfig(_) => exit_codes::USER_ERROR,

            // Operation failures
            Error::CorruptIndex { .. }
            | Error::CorruptCounter { .. }
            | Error::Editor(_)
            | Error::Io(_)
            | Error::Json(_)
            | Error::TomlParse(_) => exit_codes::OPERATION_FAILED,
        }
    }

    /// Structured context for JSON error output
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Error::NotFound { id, root } => Some(serde_json::json!({
                "id": id,
                "root": root.to_string(),
            })),
            Error::InvalidRoot(path)
            | Error::CorruptIndex { path, .. }
            | Error::CorruptCounter { path, .. } => Some(serde_json::json!({
                "path": path.display().to_string(),
            })),
            _ => None,
        }
    }
}

/// Result type alias for ted operations
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
