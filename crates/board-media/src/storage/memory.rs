//! In-memory storage for tests

use async_trait::async_trait;
use board_core::{DomainError, FileStorage, StorageResult};
use bytes::Bytes;
use dashmap::DashMap;

use super::{content_type_of, validate_path};

#[derive(Debug, Default)]
pub struct MemoryFileStorage {
    files: DashMap<String, Bytes>,
}

impl MemoryFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Stored paths, sorted
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.files.iter().map(|e| e.key().clone()).collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl FileStorage for MemoryFileStorage {
    async fn write(&self, path: &str, data: &[u8]) -> StorageResult<()> {
        validate_path(path)?;
        self.files
            .insert(path.to_string(), Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn read(&self, path: &str) -> StorageResult<Bytes> {
        self.files
            .get(path)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| DomainError::StorageFailure(format!("no such file: {path}")))
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        self.files.remove(path);
        Ok(())
    }

    async fn probe_content_type(&self, path: &str) -> StorageResult<Option<String>> {
        Ok(self
            .files
            .contains_key(path)
            .then(|| content_type_of(path)))
    }
}
