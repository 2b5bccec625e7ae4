//! Filesystem connector (§4.1 "Input", `SourceType::Filesystem`): the
//! source tree is already readable on disk; this connector just walks
//! it into the Blob Store workspace under the source's prefix.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mcb_domain::entities::{Source, SourceType};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{BlobStore, Connector, FetchOutcome};

pub struct FilesystemConnector {
    blobs: Arc<dyn BlobStore>,
}

impl FilesystemConnector {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl Connector for FilesystemConnector {
    fn source_type(&self) -> SourceType {
        SourceType::Filesystem
    }

    async fn fetch(&self, source: &Source) -> Result<FetchOutcome> {
        let root = Path::new(&source.connection_uri);
        let prefix = format!("sources/{}", source.id);
        tracing::info!(source_id = %source.id, root = %root.display(), "staging filesystem source");
        walk(&self.blobs, root, root, &prefix).await?;
        Ok(FetchOutcome { workspace_prefix: prefix, commit_sha: None })
    }
}

async fn walk(blobs: &Arc<dyn BlobStore>, root: &Path, dir: &Path, prefix: &str) -> Result<()> {
    let mut entries = tokio::fs::read_dir(dir)
        .await
        .map_err(|e| Error::connector_with_source(format!("reading directory {}", dir.display()), e))?;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| Error::connector_with_source(format!("reading entry in {}", dir.display()), e))?
    {
        let path = entry.path();
        if path.is_dir() {
            Box::pin(walk(blobs, root, &path, prefix)).await?;
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
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcb_domain::value_objects::ProjectId;

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
    async fn stages_every_file_under_workspace_prefix() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::write(dir.path().join("a.sql"), b"select 1").await.unwrap();
        tokio::fs::create_dir(dir.path().join("nested")).await.unwrap();
        tokio::fs::write(dir.path().join("nested/b.cs"), b"class B {}").await.unwrap();

        let blobs: Arc<dyn BlobStore> = Arc::new(FakeBlobStore { puts: std::sync::Mutex::new(Vec::new()) });
        let connector = FilesystemConnector::new(blobs.clone());
        let project_id = ProjectId::from_name("acme-widgets");
        let source = Source::new(project_id, SourceType::Filesystem, dir.path().to_string_lossy().into_owned());

        let outcome = connector.fetch(&source).await.unwrap();
        assert!(outcome.commit_sha.is_none());
        assert!(outcome.workspace_prefix.starts_with("sources/"));
    }
}
