//! Local filesystem storage rooted at the upload directory

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use board_core::{DomainError, FileStorage, StorageResult};
use bytes::Bytes;
use tokio::fs;
use tracing::{debug, instrument};

use super::{content_type_of, validate_path};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &std::path::Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        validate_path(path)?;
        Ok(self.root.join(path))
    }
}

fn storage_error(action: &str, path: &str, e: &std::io::Error) -> DomainError {
    DomainError::StorageFailure(format!("failed to {action} {path}: {e}"))
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    /// Writes to a sibling temp file and renames, so readers never see a partial file
    #[instrument(skip(self, data), fields(len = data.len()))]
    async fn write(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        let target = self.resolve(path)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| storage_error("create directory for", path, &e))?;
        }

        let temp = target.with_extension(format!(
            "part-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        fs::write(&temp, data)
            .await
            .map_err(|e| storage_error("write", path, &e))?;

        if let Err(e) = fs::rename(&temp, &target).await {
            let _ = fs::remove_file(&temp).await;
            return Err(storage_error("move into place", path, &e));
        }

        debug!("File stored");
        Ok(())
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        let target = self.resolve(path)?;
        fs::read(&target)
            .await
            .map(Bytes::from)
            .map_err(|e| storage_error("read", path, &e))
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> StorageResult<()> {
        let target = self.resolve(path)?;
        match fs::remove_file(&target).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete", path, &e)),
        }
    }

    async fn probe_content_type(&self, path: &str) -> StorageResult<Option<String>> {
        let target = self.resolve(path)?;
        match fs::metadata(&target).await {
            Ok(meta) if meta.is_file() => Ok(Some(content_type_of(path))),
            Ok(_) => Ok(None),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(storage_error("inspect", path, &e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root() -> PathBuf {
        std::env::temp_dir().join(format!(
            "board-media-test-{}-{}",
            std::process::id(),
            TEMP_COUNTER.fetch_add(1, Ordering::Relaxed)
        ))
    }

    #[tokio::test]
    async fn test_write_read_delete() {
        let root = temp_root();
        let storage = LocalFileStorage::new(&root);

        storage.write("fit/abc.png", b"bytes").await.unwrap();
        assert_eq!(storage.read("fit/abc.png").await.unwrap(), Bytes::from_static(b"bytes"));
        assert_eq!(
            storage.probe_content_type("fit/abc.png").await.unwrap().as_deref(),
            Some("image/png")
        );

        storage.delete("fit/abc.png").await.unwrap();
        assert!(!storage.exists("fit/abc.png").await.unwrap());
        // Deleting twice is fine
        storage.delete("fit/abc.png").await.unwrap();

        let _ = fs::remove_dir_all(root).await;
    }

    #[tokio::test]
    async fn test_rejects_escaping_paths() {
        let storage = LocalFileStorage::new(temp_root());
        assert!(storage.write("../outside.txt", b"x").await.is_err());
    }
}
