// Domain Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Invalid phone number: {0}")]
    InvalidPhone(String),

    #[error("Invalid call delay: {0}s (max {max}s)", max = crate::domain::session::MAX_CALL_DELAY_SECS)]
    InvalidCallDelay(u32),

    #[error("Lead {lead_id} has no email address")]
    MissingEmail { lead_id: String },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

pub type Result<T> = std::result::Result<T, DomainError>;
