//! Error types for the query crate.
//!
//! Query execution itself is total. Errors only come from decoding inputs:
//! sort key names, filter expressions, profiles and record sets.

use thiserror::Error;

/// Errors that can occur when decoding query inputs.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Sort key name not recognized.
    #[error("unknown sort key '{0}'")]
    UnknownSortKey(String),

    /// Filter expression is not of the form `key=value`.
    #[error("invalid filter expression '{0}': expected key=value")]
    FilterExpression(String),

    /// Domain name does not match a built-in profile.
    #[error("unknown domain '{0}' (expected 'listings' or 'education')")]
    UnknownDomain(String),

    /// Profile document could not be decoded.
    #[error("invalid profile: {0}")]
    Profile(#[from] serde_yaml::Error),

    /// JSON input could not be decoded.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
