//! Blob Store port (§2 "BS"): holds uploaded archives and fetched
//! source trees.

use async_trait::async_trait;

use crate::error::Result;

/// Storage for repository archives and staged source trees.
///
/// The local-filesystem workspace adapter is the default; an
/// S3-compatible backend implements the same trait (§2).
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `bytes` at `key`, overwriting any existing object.
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()>;

    /// Read the object at `key`.
    async fn get(&self, key: &str) -> Result<Vec<u8>>;

    /// Whether an object exists at `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Delete the object at `key`.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List keys under `prefix`, used by the clone stage's directory
    /// walk (§4.2) once a source tree is staged.
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;
}
