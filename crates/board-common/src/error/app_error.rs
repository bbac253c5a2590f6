//! Application error types
//!
//! Unified error handling shared by the service and API layers.

use board_core::DomainError;
use serde::Serialize;
use std::fmt;

/// Application-wide error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Missing authentication")]
    MissingAuth,

    #[error("Insufficient authority")]
    InsufficientAuthority,

    #[error("Account disabled")]
    AccountDisabled,

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Resource errors
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // Infrastructure errors
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error")]
    Internal(#[source] anyhow::Error),

    // Domain errors
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// Get HTTP status code for this error
    #[must_use]
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) | Self::InvalidInput(_) => 400,

            Self::InvalidCredentials | Self::InvalidToken | Self::TokenExpired | Self::MissingAuth => 401,

            Self::InsufficientAuthority | Self::AccountDisabled => 403,

            Self::NotFound(_) => 404,

            Self::Conflict(_) => 409,

            Self::Database(_)
            | Self::Storage(_)
            | Self::ExternalService(_)
            | Self::Internal(_)
            | Self::Config(_) => 500,

            Self::Domain(e) => domain_status(e),
        }
    }

    /// Get error code for API responses
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MissingAuth => "MISSING_AUTH",
            Self::InsufficientAuthority => "INSUFFICIENT_AUTHORITY",
            Self::AccountDisabled => "ACCOUNT_DISABLED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Domain(e) => e.code(),
        }
    }

    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    #[must_use]
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status_code())
    }

    #[must_use]
    pub fn not_found(resource: impl fmt::Display) -> Self {
        Self::NotFound(resource.to_string())
    }

    #[must_use]
    pub fn validation(msg: impl fmt::Display) -> Self {
        Self::Validation(msg.to_string())
    }

    pub fn internal(err: impl Into<anyhow::Error>) -> Self {
        Self::Internal(err.into())
    }
}

/// HTTP status for a domain error, by category
#[must_use]
pub fn domain_status(err: &DomainError) -> u16 {
    if err.is_not_found() {
        404
    } else if err.is_authorization() {
        403
    } else if err.is_validation() {
        400
    } else if err.is_conflict() {
        409
    } else {
        500
    }
}

/// Error response structure for API responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&AppError> for ErrorResponse {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.error_code().to_string(),
            message: err.to_string(),
            details: None,
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidCredentials.status_code(), 401);
        assert_eq!(AppError::InsufficientAuthority.status_code(), 403);
        assert_eq!(AppError::NotFound("board".to_string()).status_code(), 404);
        assert_eq!(AppError::Validation("test".to_string()).status_code(), 400);
        assert_eq!(AppError::Storage("disk".to_string()).status_code(), 500);
    }

    #[test]
    fn test_domain_status_mapping() {
        let err = AppError::from(DomainError::BoardNotFound("fit".to_string()));
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.error_code(), "UNKNOWN_BOARD");

        let err = AppError::from(DomainError::CaptchaRejected);
        assert_eq!(err.status_code(), 400);

        let err = AppError::from(DomainError::MissingAuthority("MANAGE_BOARDS".to_string()));
        assert_eq!(err.status_code(), 403);

        let err = AppError::from(DomainError::StorageFailure("disk full".to_string()));
        assert!(err.is_server_error());
    }

    #[test]
    fn test_error_response() {
        let err = AppError::NotFound("user".to_string());
        let response = ErrorResponse::from(&err);

        assert_eq!(response.code, "NOT_FOUND");
        assert_eq!(response.message, "Resource not found: user");
        assert!(response.details.is_none());
    }

    #[test]
    fn test_helper_methods() {
        let err = AppError::not_found("user 123");
        assert_eq!(err.to_string(), "Resource not found: user 123");
        assert!(err.is_client_error());

        let err = AppError::validation("email is required");
        assert_eq!(err.to_string(), "Validation error: email is required");
    }
}
