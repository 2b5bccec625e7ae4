//! Blob Store (BS, §2): a local-filesystem adapter holding fetched
//! source trees and uploaded archives under a workspace root. §1 scopes
//! S3 out — an S3-compatible adapter would implement the same trait.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use mcb_domain::error::Result;
use mcb_domain::ports::BlobStore;
use tokio::fs;

use crate::error::io_err;

/// Filesystem-backed [`BlobStore`], rooted at `root`. Keys are relative
/// paths joined onto `root`; callers must not pass `..` segments.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.resolve(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| io_err(&format!("creating parent dirs for {key}"), e))?;
        }
        fs::write(&path, bytes)
            .await
            .map_err(|e| io_err(&format!("writing blob {key}"), e))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        fs::read(self.resolve(key))
            .await
            .map_err(|e| io_err(&format!("reading blob {key}"), e))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(fs::metadata(self.resolve(key)).await.is_ok())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.resolve(key);
        match fs::metadata(&path).await {
            Ok(meta) if meta.is_dir() => fs::remove_dir_all(&path).await,
            Ok(_) => fs::remove_file(&path).await,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(io_err(&format!("checking blob {key} before delete"), e)),
        }
        .map_err(|e| io_err(&format!("deleting blob {key}"), e))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.resolve(prefix);
        if fs::metadata(&root).await.is_err() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        let mut stack = vec![root.clone()];
        while let Some(dir) = stack.pop() {
            let mut entries = fs::read_dir(&dir)
                .await
                .map_err(|e| io_err(&format!("listing blobs under {prefix}"), e))?;
            while let Some(entry) = entries
                .next_entry()
                .await
                .map_err(|e| io_err(&format!("reading blob entry under {prefix}"), e))?
            {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Ok(relative) = path.strip_prefix(&self.root) {
                    keys.push(relative_to_key(relative));
                }
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn relative_to_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("proj/a.txt", b"hello").await.unwrap();
        assert_eq!(store.get("proj/a.txt").await.unwrap(), b"hello");
        assert!(store.exists("proj/a.txt").await.unwrap());
    }

    #[tokio::test]
    async fn missing_key_reports_false_and_delete_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        assert!(!store.exists("missing").await.unwrap());
        assert!(store.delete("missing").await.is_ok());
    }

    #[tokio::test]
    async fn list_returns_keys_under_prefix() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsBlobStore::new(dir.path());
        store.put("proj/src/a.sql", b"1").await.unwrap();
        store.put("proj/src/nested/b.sql", b"2").await.unwrap();
        store.put("other/c.sql", b"3").await.unwrap();

        let mut keys = store.list("proj").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["proj/src/a.sql", "proj/src/nested/b.sql"]);
    }
}
