//! Error types for the healthmate_core library.

use std::io;
use std::path::PathBuf;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for healthmate_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user-supplied value
    #[error("Invalid input: {0}")]
    Input(String),

    /// Storage directory could not be created or is not a directory
    #[error("Storage directory {path:?} is unusable: {reason}")]
    StorageDir { path: PathBuf, reason: String },

    /// Profile file ended before all five fields were read
    #[error("Profile file is missing the {field} line")]
    MissingProfileField { field: &'static str },

    /// A profile field could not be parsed
    #[error("Error parsing profile {field} on line {line}: {reason}")]
    MalformedProfile {
        line: usize,
        field: &'static str,
        reason: String,
    },
}

/// Why a single catalog or entry line was skipped during a load
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LineError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: usize, found: usize },

    #[error("invalid calories {value:?}: {reason}")]
    Calories { value: String, reason: String },

    #[error("invalid timestamp {value:?}: {reason}")]
    Timestamp { value: String, reason: String },

    #[error("unreadable line: {0}")]
    Unreadable(String),
}
