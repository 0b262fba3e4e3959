//! Core error types for breathroom-core.
//!
//! This module defines the error hierarchy using thiserror. Component-level
//! enums convert into [`CoreError`] so callers can use `?` across layers.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for breathroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session log errors
    #[error("Session log error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Timer errors
    #[error("Timer error: {0}")]
    Timer(#[from] TimerError),

    /// Session state machine errors
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Session log store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The log file could not be read or written
    #[error("Session log I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The CSV writer rejected a row
    #[error("Session log write failed at {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A stored row could not be parsed
    #[error("Malformed session log row at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    /// Backend is unavailable. Not produced by the bundled stores; for
    /// embedder-defined `SessionStore` implementations.
    #[error("Session log unavailable: {0}")]
    Unavailable(String),
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable at {path}: {source}")]
    DataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Duration outside the accepted range
    #[error("{field} must be between {min} and {max} seconds, got {value}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },

    /// Pattern string not of the form `i-h1-e-h2`
    #[error("Invalid pattern '{input}': {message}")]
    InvalidPattern { input: String, message: String },
}

/// Cycle timer errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimerError {
    /// Every phase has zero duration, so no cycle can ever take time
    #[error("Pattern {0} has no phase with a non-zero duration")]
    DegeneratePattern(String),
}

/// Session controller errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// A session is already running
    #[error("A practice session is already running")]
    AlreadyRunning,

    /// Refused to start a session whose pattern has no duration at all
    #[error("Pattern {0} has no phase with a non-zero duration")]
    DegeneratePattern(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
