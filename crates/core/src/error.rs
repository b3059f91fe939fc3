// Application errors shared by services and adapters

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    /// Rule violation raised by a domain type
    #[error("Domain error: {0}")]
    Domain(#[from] crate::domain::DomainError),

    /// Bad input from a caller
    #[error("Validation error: {0}")]
    Validation(String),

    /// Lead, list or session does not exist (or belongs to another user)
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage failure; sqlx errors are mapped in infra-sqlite
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// Errors the caller can fix by changing the request
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::Domain(_) | AppError::Validation(_) | AppError::NotFound(_)
        )
    }
}
