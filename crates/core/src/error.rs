//! Error types for DocQA.
//!
//! A single error enum covers every failure category of the service. The
//! variants double as the error taxonomy the HTTP layer maps onto status
//! codes: validation, conflict, not-found and too-large are caller errors,
//! `Llm` and `Embedding` are upstream failures, everything else is internal.

use thiserror::Error;

/// Unified error type for DocQA.
///
/// All fallible functions return `Result<T, AppError>`.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Answer model errors
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding model errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Vector index and metadata store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Invalid input (empty content, malformed upload, bad parameters)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource already exists
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Resource does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input exceeds a configured size limit
    #[error("Too large: {0}")]
    TooLarge(String),

    /// Text extraction failures (PDF)
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl AppError {
    /// Whether the error was caused by the caller's input rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Validation(_)
                | AppError::Conflict(_)
                | AppError::NotFound(_)
                | AppError::TooLarge(_)
        )
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
