//! Upload connector (§4.1 "Input", `SourceType::Upload`): the archive
//! is already staged in the Blob Store at `connection_uri`; this
//! connector unpacks it in place under the source's workspace prefix.

use std::io::Read;
use std::sync::Arc;

use async_trait::async_trait;
use mcb_domain::entities::{Source, SourceType};
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{BlobStore, Connector, FetchOutcome};

pub struct UploadConnector {
    blobs: Arc<dyn BlobStore>,
}

impl UploadConnector {
    #[must_use]
    pub fn new(blobs: Arc<dyn BlobStore>) -> Self {
        Self { blobs }
    }
}

#[async_trait]
impl Connector for UploadConnector {
    fn source_type(&self) -> SourceType {
        SourceType::Upload
    }

    async fn fetch(&self, source: &Source) -> Result<FetchOutcome> {
        let archive = self.blobs.get(&source.connection_uri).await?;
        let prefix = format!("sources/{}", source.id);
        let entries = tokio::task::spawn_blocking(move || extract_tar_gz(&archive))
            .await
            .map_err(|e| Error::connector_with_source("archive extraction task panicked", e))??;

        let file_count = entries.len();
        for (name, bytes) in entries {
            let key = format!("{prefix}/{name}");
            self.blobs.put(&key, &bytes).await?;
        }
        tracing::info!(source_id = %source.id, file_count, "extracted upload archive into blob store");
        Ok(FetchOutcome { workspace_prefix: prefix, commit_sha: None })
    }
}

fn extract_tar_gz(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>> {
    let decoder = flate2::read::GzDecoder::new(archive);
    let mut tar = tar::Archive::new(decoder);
    let mut entries = Vec::new();

    for entry in tar.entries().map_err(|e| Error::connector_with_source("reading tar entries", e))? {
        let mut entry = entry.map_err(|e| Error::connector_with_source("reading tar entry", e))?;
        if !entry.header().entry_type().is_file() {
            continue;
        }
        let path = entry.path().map_err(|e| Error::connector_with_source("reading tar entry path", e))?;
        let name = path.to_string_lossy().into_owned();
        let mut bytes = Vec::new();
        entry.read_to_end(&mut bytes).map_err(|e| Error::connector_with_source(format!("reading tar entry {name}"), e))?;
        entries.push((name, bytes));
    }
    Ok(entries)
}
