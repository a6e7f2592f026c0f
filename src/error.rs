//! Error types for Checkpointer
//!
//! All errors in the application are converted to `AppError`.

use thiserror::Error;

use crate::engine::MergeSide;

/// Application-wide error type
///
/// This enum represents all possible errors that can occur
/// in the application. Null metric inputs are never errors;
/// they surface as absent values instead.
#[derive(Debug, Error)]
pub enum AppError {
    /// Caller-correctable input
    #[error("Validation error: {0}")]
    Validation(String),

    /// One side of a tag merge does not exist
    #[error("Tag not found ({side}): {name}")]
    TagNotFound { side: MergeSide, name: String },

    /// Resource not found
    #[error("Resource not found")]
    NotFound,

    /// Duplicate capture or a write raced by a concurrent change
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Stable label used for the `error_type` metric dimension
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::TagNotFound { .. } => "tag_not_found",
            AppError::NotFound => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database",
            AppError::Config(_) => "config",
            AppError::Internal(_) => "internal",
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias using AppError
pub type Result<T> = std::result::Result<T, AppError>;
