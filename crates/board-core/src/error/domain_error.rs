//! Domain errors - error types for the domain layer

use thiserror::Error;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Board not found: {0}")]
    BoardNotFound(String),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Post not found: {0}")]
    PostNotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Token not found")]
    TokenNotFound,

    #[error("Ban not found: {0}")]
    BanNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    #[error("Captcha verification failed")]
    CaptchaRejected,

    #[error("Invalid deletion code")]
    InvalidDeletionCode,

    #[error("Token has expired")]
    TokenExpired,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing authority: {0}")]
    MissingAuthority(String),

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Board label already in use: {0}")]
    BoardLabelExists(String),

    #[error("Username already in use")]
    UsernameExists,

    #[error("Email already in use")]
    EmailExists,

    #[error("IP already has an active ban: {0}")]
    BanAlreadyActive(String),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Thread is locked")]
    ThreadLocked,

    #[error("Ban is not active")]
    BanNotActive,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Storage failure: {0}")]
    StorageFailure(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::BoardNotFound(_) => "UNKNOWN_BOARD",
            Self::ThreadNotFound(_) => "UNKNOWN_THREAD",
            Self::PostNotFound(_) => "UNKNOWN_POST",
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::TokenNotFound => "UNKNOWN_TOKEN",
            Self::BanNotFound(_) => "UNKNOWN_BAN",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::UnsupportedMediaType(_) => "UNSUPPORTED_MEDIA_TYPE",
            Self::CorruptFile(_) => "CORRUPT_FILE",
            Self::CaptchaRejected => "CAPTCHA_REJECTED",
            Self::InvalidDeletionCode => "INVALID_DELETION_CODE",
            Self::TokenExpired => "TOKEN_EXPIRED",

            // Authorization
            Self::MissingAuthority(_) => "MISSING_AUTHORITY",

            // Conflict
            Self::BoardLabelExists(_) => "BOARD_LABEL_EXISTS",
            Self::UsernameExists => "USERNAME_EXISTS",
            Self::EmailExists => "EMAIL_EXISTS",
            Self::BanAlreadyActive(_) => "BAN_ALREADY_ACTIVE",

            // Business Rules
            Self::ThreadLocked => "THREAD_LOCKED",
            Self::BanNotActive => "BAN_NOT_ACTIVE",

            // Infrastructure
            Self::StorageFailure(_) => "STORAGE_FAILURE",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::BoardNotFound(_)
                | Self::ThreadNotFound(_)
                | Self::PostNotFound(_)
                | Self::UserNotFound(_)
                | Self::TokenNotFound
                | Self::BanNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::UnsupportedMediaType(_)
                | Self::CorruptFile(_)
                | Self::CaptchaRejected
                | Self::InvalidDeletionCode
                | Self::TokenExpired
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingAuthority(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::BoardLabelExists(_)
                | Self::UsernameExists
                | Self::EmailExists
                | Self::BanAlreadyActive(_)
                | Self::ThreadLocked
                | Self::BanNotActive
        )
    }

    /// Check if this error comes from file storage
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageFailure(_))
    }
}
