//! Error handling utilities for repositories

use board_core::error::DomainError;
use board_core::value_objects::Snowflake;
use sqlx::Error as SqlxError;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce(Option<&str>) -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique(db_err.constraint());
        }
    }
    map_db_error(e)
}

pub fn board_not_found(label: &str) -> DomainError {
    DomainError::BoardNotFound(label.to_string())
}

pub fn board_id_not_found(id: Snowflake) -> DomainError {
    DomainError::BoardNotFound(id.to_string())
}

pub fn thread_not_found(id: Snowflake) -> DomainError {
    DomainError::ThreadNotFound(id.to_string())
}

pub fn post_not_found(id: Snowflake) -> DomainError {
    DomainError::PostNotFound(id.to_string())
}

pub fn user_not_found(id: Snowflake) -> DomainError {
    DomainError::UserNotFound(id.to_string())
}
