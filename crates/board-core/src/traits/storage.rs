//! File storage port

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::DomainError;

pub type StorageResult<T> = Result<T, DomainError>;

/// Byte storage for attachments and thumbnails. Paths are relative, `/`-separated,
/// and rooted at a per-board folder (`<label>/<file>`, `<label>/thumbs/<file>`).
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Write bytes, replacing any existing file at `path`
    async fn write(&self, path: &str, data: &[u8]) -> StorageResult<()>;

    async fn read(&self, path: &str) -> StorageResult<Bytes>;

    /// Remove a file. Missing files are not an error.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Content type of a stored file, or `None` when nothing is stored at `path`
    async fn probe_content_type(&self, path: &str) -> StorageResult<Option<String>>;

    async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.probe_content_type(path).await?.is_some())
    }
}
