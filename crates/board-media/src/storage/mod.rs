//! [`FileStorage`](board_core::FileStorage) implementations

mod local;
mod memory;

pub use local::LocalFileStorage;
pub use memory::MemoryFileStorage;

use board_core::DomainError;

/// Relative, `/`-separated, no `..` or empty segments
pub(crate) fn validate_path(path: &str) -> Result<(), DomainError> {
    let valid = !path.is_empty()
        && !path.starts_with('/')
        && path
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if valid {
        Ok(())
    } else {
        Err(DomainError::StorageFailure(format!("invalid storage path: {path}")))
    }
}

pub(crate) fn content_type_of(path: &str) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}
