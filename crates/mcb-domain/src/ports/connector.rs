//! Connector port (§2, §7 "Input"): fetches a Source's content into the
//! Blob Store workspace.

use async_trait::async_trait;

use crate::entities::{Source, SourceType};
use crate::error::Result;

/// Outcome of a successful fetch.
#[derive(Debug, Clone)]
pub struct FetchOutcome {
    /// Blob-store key prefix the fetched tree was staged under.
    pub workspace_prefix: String,
    /// Commit SHA, when the source is git-backed.
    pub commit_sha: Option<String>,
}

/// Fetches a [`Source`]'s content into the workspace blob store.
///
/// Implementations are selected by [`SourceType`] at the providers
/// layer (§7): `git` via `git2`, `s3` via an S3-compatible client,
/// `upload` by unpacking an archive already staged in the blob store.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// The [`SourceType`] this connector handles.
    fn source_type(&self) -> SourceType;

    /// Fetch `source`'s content, staging it into the blob store under a
    /// workspace prefix scoped to the source.
    async fn fetch(&self, source: &Source) -> Result<FetchOutcome>;
}
