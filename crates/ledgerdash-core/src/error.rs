//! Error types for ledgerdash-core
//!
//! Store and reporting operations distinguish rejected input, rows that do
//! not exist for the calling user, and failures of the database itself.

use thiserror::Error;

/// Main error type for ledgerdash-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Store error: {message}")]
    StoreError { message: String },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>) -> Self {
        CoreError::NotFound {
            resource: resource.into(),
        }
    }

    /// Whether the caller can recover by changing its input
    pub fn is_user_error(&self) -> bool {
        !matches!(self, CoreError::StoreError { .. })
    }
}

impl From<sqlx::Error> for CoreError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::RowNotFound => CoreError::NotFound {
                resource: "row".to_string(),
            },
            other => CoreError::StoreError {
                message: other.to_string(),
            },
        }
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;
