//! Service layer error types
//!
//! Provides a unified error type for all service operations.

use std::borrow::Cow;
use std::fmt;

use board_common::AppError;
use board_core::DomainError;
use board_media::MediaError;
use validator::{ValidationError, ValidationErrors};

/// Service layer error type
#[derive(Debug)]
pub enum ServiceError {
    /// Domain rule violation
    Domain(DomainError),

    /// Application error (auth, tokens, etc.)
    App(AppError),

    /// Field-keyed validation failures, always the complete set for one request
    InvalidFields(ValidationErrors),

    /// Resource not found
    NotFound { resource: &'static str, id: String },

    /// Caller lacks an authority
    PermissionDenied { permission: String },

    /// Validation error without a field
    Validation(String),

    /// Conflict (e.g., duplicate resource)
    Conflict(String),

    /// Internal error
    Internal(String),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Domain(e) => write!(f, "{e}"),
            Self::App(e) => write!(f, "{e}"),
            Self::InvalidFields(errors) => {
                let mut fields: Vec<String> =
                    errors.field_errors().keys().map(ToString::to_string).collect();
                fields.sort();
                write!(f, "Validation failed: {}", fields.join(", "))
            }
            Self::NotFound { resource, id } => write!(f, "{resource} not found: {id}"),
            Self::PermissionDenied { permission } => {
                write!(f, "Missing required authority: {permission}")
            }
            Self::Validation(msg) => write!(f, "Validation error: {msg}"),
            Self::Conflict(msg) => write!(f, "Conflict: {msg}"),
            Self::Internal(msg) => write!(f, "Internal error: {msg}"),
        }
    }
}

impl std::error::Error for ServiceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Domain(e) => Some(e),
            Self::App(e) => Some(e),
            Self::InvalidFields(e) => Some(e),
            _ => None,
        }
    }
}

impl ServiceError {
    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource,
            id: id.into(),
        }
    }

    pub fn permission_denied(permission: impl Into<String>) -> Self {
        Self::PermissionDenied {
            permission: permission.into(),
        }
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// A single field-keyed validation failure
    pub fn invalid_field(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, field_error(code, message));
        Self::InvalidFields(errors)
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Domain(e) => board_common::error::domain_status(e),
            Self::App(e) => e.status_code(),
            Self::InvalidFields(_) | Self::Validation(_) => 400,
            Self::NotFound { .. } => 404,
            Self::PermissionDenied { .. } => 403,
            Self::Conflict(_) => 409,
            Self::Internal(_) => 500,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &str {
        match self {
            Self::Domain(e) => e.code(),
            Self::App(e) => e.error_code(),
            Self::InvalidFields(_) | Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::PermissionDenied { .. } => "MISSING_AUTHORITY",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Field errors, if this is a field-keyed validation failure
    pub fn field_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::InvalidFields(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Build a validation error with a human-readable message
pub fn field_error(code: &'static str, message: impl Into<String>) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Owned(message.into()));
    error
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::CaptchaRejected => {
                Self::invalid_field("captcha", "captcha_rejected", "Captcha verification failed")
            }
            other => Self::Domain(other),
        }
    }
}

impl From<AppError> for ServiceError {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Domain(e) => e.into(),
            other => Self::App(other),
        }
    }
}

/// Rejected attachments become an error on the `attachment` field; storage failures stay fatal.
impl From<MediaError> for ServiceError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedMediaType(msg) => {
                Self::invalid_field("attachment", "unsupported_media_type", msg)
            }
            MediaError::CorruptFile(msg) => Self::invalid_field("attachment", "corrupt_file", msg),
            MediaError::StorageFailure(msg) => Self::Domain(DomainError::StorageFailure(msg)),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::InvalidFields(errors)
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Domain(e) => AppError::Domain(e),
            ServiceError::App(e) => e,
            e @ ServiceError::InvalidFields(_) => AppError::Validation(e.to_string()),
            ServiceError::NotFound { resource, id } => AppError::NotFound(format!("{resource} {id}")),
            ServiceError::PermissionDenied { .. } => AppError::InsufficientAuthority,
            ServiceError::Validation(msg) => AppError::Validation(msg),
            ServiceError::Conflict(msg) => AppError::Conflict(msg),
            ServiceError::Internal(msg) => AppError::Internal(anyhow::anyhow!(msg)),
        }
    }
}

/// Result type for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;
