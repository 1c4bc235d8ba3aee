//! Error types for fixture loading and execution.

use layered_spans::SelectError;
use thiserror::Error;

/// Errors that stop a fixture before its queries can be checked.
#[derive(Debug, Error)]
pub enum FixtureError {
    /// Error reading a fixture file.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// Error parsing fixture TOML.
    #[error("failed to parse fixture: {message}")]
    Parse { message: String },

    /// The fixture refers to something it never declares.
    #[error("invalid fixture: {0}")]
    Invalid(String),

    /// Building the store failed.
    #[error(transparent)]
    Select(#[from] SelectError),
}

/// Result type for fixture operations.
pub type FixtureResult<T> = Result<T, FixtureError>;
