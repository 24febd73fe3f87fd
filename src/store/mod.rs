//! Blob store abstraction
//!
//! The bucket holding originals and variants is reached through the
//! [`BlobStore`] trait. [`crate::s3::S3BlobStore`] talks to S3;
//! [`MemoryBlobStore`] keeps everything in-process for tests and local runs.

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Blob store errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// Object does not exist
    #[error("Object not found: {key}")]
    NotFound { key: String },

    /// Request to the backend failed
    #[error("Store request failed for {key}: {message}")]
    Backend { key: String, message: String },

    /// Object body could not be read
    #[error("Failed to read body of {key}: {message}")]
    Body { key: String, message: String },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// A variant ready to be written back to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredVariant {
    pub key: String,
    pub data: Bytes,
    pub content_type: String,
    pub cache_control: String,
}

impl StoredVariant {
    pub fn new(
        key: impl Into<String>,
        data: Bytes,
        content_type: impl Into<String>,
        max_age_secs: u64,
    ) -> Self {
        Self {
            key: key.into(),
            data,
            content_type: content_type.into(),
            cache_control: format!("max-age={}", max_age_secs),
        }
    }
}

/// Object storage holding originals and generated variants
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Read an object's full body
    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    /// Write an object, overwriting any existing one
    async fn put(&self, variant: StoredVariant) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    objects: Mutex<HashMap<String, StoredVariant>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an original, bypassing the write counter
    pub fn insert(&self, key: impl Into<String>, data: impl Into<Bytes>) {
        let key = key.into();
        let variant = StoredVariant {
            key: key.clone(),
            data: data.into(),
            content_type: String::new(),
            cache_control: String::new(),
        };
        self.objects.lock().insert(key, variant);
    }

    /// Stored object with its metadata
    pub fn object(&self, key: &str) -> Option<StoredVariant> {
        self.objects.lock().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::Relaxed)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get(&self, key: &str) -> Result<Bytes, StoreError> {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.objects
            .lock()
            .get(key)
            .map(|v| v.data.clone())
            .ok_or_else(|| StoreError::NotFound {
                key: key.to_string(),
            })
    }

    async fn put(&self, variant: StoredVariant) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.objects.lock().insert(variant.key.clone(), variant);
        Ok(())
    }
}
