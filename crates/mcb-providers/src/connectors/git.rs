//! Git connector (§4.1 "Input", `SourceType::Git`): shallow-clones (or
//! fetches, on a re-sync) the remote into a scratch directory via
//! `git2`, then stages every tracked file into the Blob Store.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use mcb_domain::entities::{Source, SourceType};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{BlobStore, Connector, FetchOutcome};

pub struct GitConnector {
    blobs: Arc<dyn BlobStore>,
    scratch_root: PathBuf,
}

impl GitConnector {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>, scratch_root: impl Into<PathBuf>) -> Self {
        Self { blobs, scratch_root: scratch_root.into() }
    }

    fn scratch_dir(&self, source: &Source) -> PathBuf {
        self.scratch_root.join(source.id.to_string())
    }
}

#[async_trait]
impl Connector for GitConnector {
    fn source_type(&self) -> SourceType {
        SourceType::Git
    }

    async fn fetch(&self, source: &Source) -> Result<FetchOutcome> {
        let scratch = self.scratch_dir(source);
        let uri = source.connection_uri.clone();
        let prior_sha = source.last_commit_sha.clone();
        let scratch_for_fetch = scratch.clone();

        tracing::info!(source_id = %source.id, uri = %source.connection_uri, "syncing git source");
        let result = tokio::task::spawn_blocking(move || fetch_repo(&uri, &scratch_for_fetch, prior_sha.as_deref()))
            .await
            .map_err(|e| Error::connector_with_source("git fetch task panicked", e))??;

        let prefix = format!("sources/{}", source.id);
        match result.changes {
            Some(changes) => stage_changes(&self.blobs, &scratch, &prefix, &changes).await?,
            None => stage_tree(&self.blobs, &scratch, &prefix).await?,
        }
        tracing::info!(source_id = %source.id, commit_sha = %result.commit_sha, "staged git source into blob store");
        Ok(FetchOutcome { workspace_prefix: prefix, commit_sha: Some(result.commit_sha) })
    }
}

/// A file touched between the prior synced commit and the freshly
/// fetched one, relative to the scratch directory root.
enum ChangeKind {
    Upserted(PathBuf),
    Deleted(PathBuf),
}

struct FetchResult {
    commit_sha: String,
    /// `None` means a fresh clone happened and every tracked file must
    /// be (re-)staged; `Some` lists exactly the paths that changed.
    changes: Option<Vec<ChangeKind>>,
}

fn fetch_repo(uri: &str, dest: &Path, prior_sha: Option<&str>) -> Result<FetchResult> {
    if dest.exists() {
        if let Some(prior_sha) = prior_sha {
            match fetch_incremental(dest, prior_sha) {
                Ok((commit_sha, changes)) => return Ok(FetchResult { commit_sha, changes: Some(changes) }),
                Err(err) => {
                    tracing::warn!(error = %err, "incremental git fetch failed, falling back to full clone");
                }
            }
        }
        std::fs::remove_dir_all(dest).map_err(|e| Error::connector_with_source("clearing stale clone", e))?;
    }
    let commit_sha = clone_shallow(uri, dest)?;
    Ok(FetchResult { commit_sha, changes: None })
}

/// Fetch the remote's default branch into an existing shallow clone at
/// `dest` and diff the result against `prior_sha`, returning the new
/// HEAD sha and the set of paths that changed (§4.1 "re-sync").
fn fetch_incremental(dest: &Path, prior_sha: &str) -> Result<(String, Vec<ChangeKind>)> {
    let repo = git2::Repository::open(dest).map_err(|e| Error::connector_with_source("opening existing clone", e))?;

    let old_oid =
        git2::Oid::from_str(prior_sha).map_err(|e| Error::connector_with_source("parsing prior commit sha", e))?;
    let old_tree = repo
        .find_commit(old_oid)
        .and_then(|commit| commit.tree())
        .map_err(|e| Error::connector_with_source("reading prior commit tree", e))?;

    let mut remote = repo.find_remote("origin").map_err(|e| Error::connector_with_source("finding origin remote", e))?;
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.depth(1);
    remote
        .fetch(&["HEAD"], Some(&mut fetch_options), None)
        .map_err(|e| Error::connector_with_source("fetching origin", e))?;

    let fetch_head = repo.find_reference("FETCH_HEAD").map_err(|e| Error::connector_with_source("reading FETCH_HEAD", e))?;
    let new_commit = fetch_head.peel_to_commit().map_err(|e| Error::connector_with_source("resolving FETCH_HEAD commit", e))?;
    let new_tree = new_commit.tree().map_err(|e| Error::connector_with_source("reading fetched tree", e))?;

    let diff = repo
        .diff_tree_to_tree(Some(&old_tree), Some(&new_tree), None)
        .map_err(|e| Error::connector_with_source("diffing against prior commit", e))?;

    let mut changes = Vec::new();
    diff.foreach(
        &mut |delta, _progress| {
            if delta.status() == git2::Delta::Deleted {
                if let Some(path) = delta.old_file().path() {
                    changes.push(ChangeKind::Deleted(path.to_path_buf()));
                }
            } else if let Some(path) = delta.new_file().path() {
                changes.push(ChangeKind::Upserted(path.to_path_buf()));
            }
            true
        },
        None,
        None,
        None,
    )
    .map_err(|e| Error::connector_with_source("walking diff against prior commit", e))?;

    let mut checkout = git2::build::CheckoutBuilder::new();
    checkout.force();
    repo.checkout_tree(new_commit.as_object(), Some(&mut checkout))
        .map_err(|e| Error::connector_with_source("checking out fetched tree", e))?;
    repo.set_head_detached(new_commit.id())
        .map_err(|e| Error::connector_with_source("updating HEAD to fetched commit", e))?;

    Ok((new_commit.id().to_string(), changes))
}

fn clone_shallow(uri: &str, dest: &Path) -> Result<String> {
    if dest.exists() {
        std::fs::remove_dir_all(dest).map_err(|e| Error::connector_with_source("clearing stale clone", e))?;
    }
    let mut fetch_options = git2::FetchOptions::new();
    fetch_options.depth(1);
    let repo = git2::build::RepoBuilder::new()
        .fetch_options(fetch_options)
        .clone(uri, dest)
        .map_err(|e| Error::connector_with_source(format!("cloning {uri}"), e))?;
    let head = repo.head().map_err(|e| Error::connector_with_source("reading HEAD", e))?;
    let commit = head.peel_to_commit().map_err(|e| Error::connector_with_source("resolving HEAD commit", e))?;
    Ok(commit.id().to_string())
}

async fn stage_changes(blobs: &Arc<dyn BlobStore>, root: &Path, prefix: &str, changes: &[ChangeKind]) -> Result<()> {
    for change in changes {
        match change {
            ChangeKind::Upserted(relative) => {
                let path = root.join(relative);
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| Error::connector_with_source(format!("reading file {}", path.display()), e))?;
                let key = format!("{prefix}/{}", relative.to_string_lossy());
                blobs.put(&key, &bytes).await?;
            }
            ChangeKind::Deleted(relative) => {
                let key = format!("{prefix}/{}", relative.to_string_lossy());
                blobs.delete(&key).await?;
            }
        }
    }
    Ok(())
}

async fn stage_tree(blobs: &Arc<dyn BlobStore>, root: &Path, prefix: &str) -> Result<()> {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let mut entries = tokio::fs::read_dir(&dir)
            .await
            .map_err(|e| Error::connector_with_source(format!("reading directory {}", dir.display()), e))?;
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::connector_with_source(format!("reading entry in {}", dir.display()), e))?
        {
            let path = entry.path();
            if path.file_name().is_some_and(|n| n == ".git") {
                continue;
            }
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let relative = path
                .strip_prefix(root)
                .map_err(|e| Error::connector_with_source("computing relative path", e))?;
            let bytes = tokio::fs::read(&path)
                .await
                .map_err(|e| Error::connector_with_source(format!("reading file {}", path.display()), e))?;
            let key = format!("{prefix}/{}", relative.to_string_lossy());
            blobs.put(&key, &bytes).await?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeBlobStore {
        puts: std::sync::Mutex<Vec<String>>,
    }

    #[async_trait]
    impl BlobStore for FakeBlobStore {
        async fn put(&self, key: &str, _bytes: &[u8]) -> Result<()> {
            self.puts.lock().unwrap().push(key.to_owned());
            Ok(())
        }
        async fn get(&self, _key: &str) -> Result<Vec<u8>> {
            Ok(Vec::new())
        }
        async fn exists(&self, _key: &str) -> Result<bool> {
            Ok(false)
        }
        async fn delete(&self, _key: &str) -> Result<()> {
            Ok(())
        }
        async fn list(&self, _prefix: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn stage_tree_skips_dot_git_and_keeps_relative_keys() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir(dir.path().join(".git")).await.unwrap();
        tokio::fs::write(dir.path().join(".git/HEAD"), b"ref: refs/heads/main").await.unwrap();
        tokio::fs::write(dir.path().join("a.sql"), b"select 1").await.unwrap();

        let blobs = Arc::new(FakeBlobStore { puts: std::sync::Mutex::new(Vec::new()) });
        let dyn_blobs: Arc<dyn BlobStore> = blobs.clone();
        stage_tree(&dyn_blobs, dir.path(), "sources/abc").await.unwrap();

        let puts = blobs.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0], "sources/abc/a.sql");
    }
}
