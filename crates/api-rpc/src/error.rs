//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use coldline_core::error::AppError;
use jsonrpsee::types::ErrorObjectOwned;
use tracing::error;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const CONFLICT: i32 = 4002;
    pub const THROTTLED: i32 = 4003;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const DB_ERROR: i32 = 5001;
}

/// Convert AppError to JSON-RPC ErrorObject
///
/// Server-side failures are logged here; client errors are only returned.
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    if !err.is_client_error() {
        error!(error = %err, "Request failed");
    }

    match err {
        AppError::Validation(msg) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::NotFound(msg) => ErrorObjectOwned::owned(code::NOT_FOUND, msg, None::<()>),
        AppError::Conflict(msg) => ErrorObjectOwned::owned(code::CONFLICT, msg, None::<()>),
        AppError::Database(msg) => ErrorObjectOwned::owned(code::DB_ERROR, msg, None::<()>),
        AppError::Domain(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, e.to_string(), None::<()>)
        }
    }
}

/// Request rejected by the rate limiter
pub fn throttled() -> ErrorObjectOwned {
    ErrorObjectOwned::owned(
        code::THROTTLED,
        "Rate limit exceeded. Please slow down.",
        None::<()>,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coldline_core::domain::DomainError;

    #[test]
    fn test_error_codes() {
        let cases = vec![
            (AppError::Validation("bad".into()), code::VALIDATION_ERROR),
            (AppError::NotFound("gone".into()), code::NOT_FOUND),
            (AppError::Conflict("race".into()), code::CONFLICT),
            (AppError::Database("locked".into()), code::DB_ERROR),
            (
                AppError::from(serde_json::from_str::<i64>("oops").unwrap_err()),
                code::INTERNAL_ERROR,
            ),
            (
                AppError::Domain(DomainError::InvalidCallDelay(900)),
                code::VALIDATION_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(to_rpc_error(err).code(), expected);
        }
    }

    #[test]
    fn test_message_is_preserved() {
        let err = to_rpc_error(AppError::NotFound("Lead abc not found".into()));
        assert_eq!(err.message(), "Lead abc not found");
        assert_eq!(throttled().code(), code::THROTTLED);
    }
}
