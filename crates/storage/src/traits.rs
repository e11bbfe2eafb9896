//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;

/// A boxed stream of bytes for streaming reads.
pub type ByteStream = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send>>;

/// Object store abstraction shared by the builder and the proxy.
///
/// Keys are `/`-separated, case-sensitive, with no leading slash. Writes
/// are atomic per key; there is deliberately no cross-key transaction, so
/// a publish pass that overwrites a live deployment may be observed
/// mid-flight. That gap is part of the platform contract.
#[async_trait]
pub trait ObjectStore: Send + Sync + 'static {
    /// Check if an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Get an object's metadata without fetching content.
    async fn head(&self, key: &str) -> StorageResult<ObjectMeta>;

    /// Get an object's content.
    async fn get(&self, key: &str) -> StorageResult<Bytes>;

    /// Get an object's metadata and content as a byte stream.
    ///
    /// Both come from one backend read, so the metadata always describes
    /// the object version the stream will deliver. Callers that frame a
    /// response around the size must use this, not a separate `head`.
    async fn get_stream(&self, key: &str) -> StorageResult<(ObjectMeta, ByteStream)>;

    /// Put an object atomically, recording its content type where the
    /// backend supports one.
    async fn put(&self, key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;

    /// Delete an object.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// List object keys under a prefix.
    async fn list(&self, prefix: &str) -> StorageResult<Vec<String>>;

    /// Get the name of this storage backend ("s3", "filesystem").
    /// Used for logging.
    fn backend_name(&self) -> &'static str;

    /// Verify storage backend connectivity.
    ///
    /// Called during startup so misconfiguration surfaces before any
    /// build or request is accepted. Backends without a meaningful
    /// connectivity check may use the default.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}

/// Metadata about a stored object.
#[derive(Clone, Debug)]
pub struct ObjectMeta {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time (if available).
    pub last_modified: Option<time::OffsetDateTime>,
    /// Content type (if the backend records one).
    pub content_type: Option<String>,
}
