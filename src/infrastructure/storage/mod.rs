pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object not found")]
    NotFound,
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Metadata returned by an existence check.
#[derive(Debug, Clone, Copy)]
pub struct ObjectMeta {
    pub size: u64,
}

/// Content-addressable object store, one bucket per handle.
///
/// `get` reports a missing key as `StoreError::NotFound`; `head` reports it
/// as `Ok(None)` because absence is the answer there, not a failure.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, body: Bytes) -> Result<(), StoreError>;

    async fn get(&self, key: &str) -> Result<Bytes, StoreError>;

    async fn head(&self, key: &str) -> Result<Option<ObjectMeta>, StoreError>;

    async fn delete(&self, key: &str) -> Result<(), StoreError>;
}
