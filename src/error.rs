//! Error types for the Attendance Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during attendance consolidation.

use thiserror::Error;

/// The main error type for the Attendance Engine.
///
/// Only a handful of these are fatal to a run. Per-event and per-day anomalies
/// are recovered locally and surface as warnings on the run result instead.
///
/// # Example
///
/// ```
/// use attendance_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/rules.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/rules.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rule value was present but unusable.
    #[error("Invalid rule '{field}': {message}")]
    InvalidRules {
        /// The rule field that was rejected.
        field: String,
        /// Why the value was rejected.
        message: String,
    },

    /// A swipe's status text names neither a check-in nor a check-out.
    #[error("Unrecognised status label '{label}': expected a check-in or check-out")]
    ClassificationError {
        /// The original status text.
        label: String,
    },

    /// The run was given no events at all.
    #[error("No attendance events supplied")]
    EmptyInput,
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
