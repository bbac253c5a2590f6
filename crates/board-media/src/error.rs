//! Attachment processing errors

use board_core::DomainError;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The category is not allowed on the board, the type is unrecognized, or the file is too big
    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    /// The content cannot be parsed as the type it claims to be
    #[error("Corrupt file: {0}")]
    CorruptFile(String),

    #[error("Storage failure: {0}")]
    StorageFailure(String),
}

impl MediaError {
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedMediaType(msg.into())
    }

    pub fn corrupt(msg: impl Into<String>) -> Self {
        Self::CorruptFile(msg.into())
    }

    /// Errors the poster can fix by sending a different file
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::StorageFailure(_))
    }
}

impl From<DomainError> for MediaError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::UnsupportedMediaType(msg) => Self::UnsupportedMediaType(msg),
            DomainError::CorruptFile(msg) => Self::CorruptFile(msg),
            other => Self::StorageFailure(other.to_string()),
        }
    }
}

impl From<MediaError> for DomainError {
    fn from(err: MediaError) -> Self {
        match err {
            MediaError::UnsupportedMediaType(msg) => Self::UnsupportedMediaType(msg),
            MediaError::CorruptFile(msg) => Self::CorruptFile(msg),
            MediaError::StorageFailure(msg) => Self::StorageFailure(msg),
        }
    }
}

pub type MediaResult<T> = Result<T, MediaError>;
