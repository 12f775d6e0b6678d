//! Blob storage for uploaded files (profile images).

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Blob store error types.
#[derive(Debug, Error)]
pub enum BlobError {
    /// Upload failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// Delete failed
    #[error("Delete failed: {0}")]
    Delete(String),
}

/// Result type for blob operations.
pub type BlobResult<T> = Result<T, BlobError>;

/// Object storage for user uploads.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `folder` and return the public URL.
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> BlobResult<String>;

    /// Delete the object at `url`.
    async fn delete(&self, url: &str) -> BlobResult<()>;
}

/// In-memory blob store. URLs have the form `memory://{folder}/{id}`.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<HashMap<String, Vec<u8>>>>,
}

impl MemoryBlobStore {
    /// Create an empty blob store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check whether an object exists.
    pub async fn contains(&self, url: &str) -> bool {
        self.objects.read().await.contains_key(url)
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Check whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, folder: &str) -> BlobResult<String> {
        if bytes.is_empty() {
            return Err(BlobError::Upload("empty file".to_string()));
        }
        let url = format!("memory://{}/{}", folder.trim_matches('/'), Uuid::now_v7());
        self.objects.write().await.insert(url.clone(), bytes);
        Ok(url)
    }

    async fn delete(&self, url: &str) -> BlobResult<()> {
        match self.objects.write().await.remove(url) {
            Some(_) => Ok(()),
            None => Err(BlobError::Delete(format!("no object at {url}"))),
        }
    }
}
