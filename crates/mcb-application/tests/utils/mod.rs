//! Shared in-memory fakes for application-layer integration tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{
    BlobStore, ColumnReferenceRepository, Connector, Embedder, EmbeddingInput, EmbeddingOutput,
    FetchOutcome, FileRepository, GraphStore, GraphSyncBatch, IndexRunRepository, MessageHandle,
    ParseErrorRepository, ProjectAnalyticsRepository, ProjectRepository, Queue,
    RawReferenceRecord, RawReferenceRepository, SourceRepository, Stream, SymbolEdgeRepository,
    SymbolRepository,
};
use mcb_domain::value_objects::RawReferenceId;
use mcb_domain::{
    ColumnReference, File, FileId, IndexRun, IndexRunId, ParseErrorRecord, Project,
    ProjectAnalytics, ProjectId, Source, SourceId, SourceType, Symbol, SymbolEdge, SymbolEdgeId,
    SymbolId,
};

#[derive(Default)]
pub struct InMemoryProjects(Mutex<HashMap<ProjectId, Project>>);

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn upsert(&self, project: &Project) -> Result<()> {
        self.0.lock().unwrap().insert(project.id, project.clone());
        Ok(())
    }
    async fn get(&self, id: ProjectId) -> Result<Project> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("project {id}") })
    }
    async fn get_by_slug(&self, slug: &str) -> Result<Project> {
        self.0
            .lock()
            .unwrap()
            .values()
            .find(|p| p.slug == slug)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("project slug {slug}") })
    }
    async fn list(&self) -> Result<Vec<Project>> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }
    async fn delete(&self, id: ProjectId) -> Result<()> {
        self.0.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySources(Mutex<HashMap<SourceId, Source>>);

#[async_trait]
impl SourceRepository for InMemorySources {
    async fn upsert(&self, source: &Source) -> Result<()> {
        self.0.lock().unwrap().insert(source.id, source.clone());
        Ok(())
    }
    async fn get(&self, id: SourceId) -> Result<Source> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("source {id}") })
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Source>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }
    async fn delete(&self, id: SourceId) -> Result<()> {
        self.0.lock().unwrap().remove(&id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryFiles(Mutex<HashMap<FileId, File>>);

#[async_trait]
impl FileRepository for InMemoryFiles {
    async fn upsert(&self, file: &File) -> Result<()> {
        self.0.lock().unwrap().insert(file.id, file.clone());
        Ok(())
    }
    async fn get(&self, id: FileId) -> Result<File> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("file {id}") })
    }
    async fn list_for_source(&self, source_id: SourceId) -> Result<Vec<File>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.source_id == source_id)
            .cloned()
            .collect())
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<File>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|f| f.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemorySymbols(Mutex<HashMap<SymbolId, Symbol>>);

#[async_trait]
impl SymbolRepository for InMemorySymbols {
    async fn upsert(&self, symbol: &Symbol) -> Result<()> {
        self.0.lock().unwrap().insert(symbol.id, symbol.clone());
        Ok(())
    }
    async fn upsert_batch(&self, symbols: &[Symbol]) -> Result<()> {
        let mut guard = self.0.lock().unwrap();
        for symbol in symbols {
            guard.insert(symbol.id, symbol.clone());
        }
        Ok(())
    }
    async fn get(&self, id: SymbolId) -> Result<Symbol> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("symbol {id}") })
    }
    async fn find_by_qualified_names(
        &self,
        project_id: ProjectId,
        qualified_names: &[String],
    ) -> Result<Vec<Symbol>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.project_id == project_id && qualified_names.contains(&s.qualified_name))
            .cloned()
            .collect())
    }
    async fn find_by_short_names(
        &self,
        project_id: ProjectId,
        short_names: &[String],
    ) -> Result<Vec<Symbol>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.project_id == project_id && short_names.contains(&s.name))
            .cloned()
            .collect())
    }
    async fn list_for_file(&self, file_id: FileId) -> Result<Vec<Symbol>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.file_id == file_id)
            .cloned()
            .collect())
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Symbol>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.project_id == project_id)
            .cloned()
            .collect())
    }
    async fn patch_metadata_batch(
        &self,
        patches: &[(SymbolId, serde_json::Value)],
    ) -> Result<()> {
        let mut guard = self.0.lock().unwrap();
        for (id, patch) in patches {
            if let Some(symbol) = guard.get_mut(id) {
                if let serde_json::Value::Object(map) = patch {
                    for (key, value) in map {
                        symbol.metadata.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryEdges(Mutex<HashMap<SymbolEdgeId, SymbolEdge>>);

#[async_trait]
impl SymbolEdgeRepository for InMemoryEdges {
    async fn upsert(&self, edge: &SymbolEdge) -> Result<()> {
        self.0.lock().unwrap().insert(edge.id, edge.clone());
        Ok(())
    }
    async fn upsert_batch(&self, edges: &[SymbolEdge]) -> Result<()> {
        let mut guard = self.0.lock().unwrap();
        for edge in edges {
            guard.insert(edge.id, edge.clone());
        }
        Ok(())
    }
    async fn get(&self, id: SymbolEdgeId) -> Result<SymbolEdge> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("edge {id}") })
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<SymbolEdge>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect())
    }
    async fn list_for_project_batched(
        &self,
        project_id: ProjectId,
        batch_size: usize,
        offset: usize,
    ) -> Result<Vec<SymbolEdge>> {
        let mut all: Vec<SymbolEdge> = self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.project_id == project_id)
            .cloned()
            .collect();
        all.sort_by_key(|e| e.id);
        Ok(all.into_iter().skip(offset).take(batch_size).collect())
    }
}

#[derive(Default)]
pub struct InMemoryColumnReferences(Mutex<Vec<ColumnReference>>);

#[async_trait]
impl ColumnReferenceRepository for InMemoryColumnReferences {
    async fn insert_batch(&self, references: &[ColumnReference]) -> Result<()> {
        self.0.lock().unwrap().extend_from_slice(references);
        Ok(())
    }
    async fn list_for_run(&self, index_run_id: IndexRunId) -> Result<Vec<ColumnReference>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.index_run_id == index_run_id)
            .cloned()
            .collect())
    }
    async fn delete_for_run(&self, index_run_id: IndexRunId) -> Result<()> {
        self.0.lock().unwrap().retain(|r| r.index_run_id != index_run_id);
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRawReferences(Mutex<Vec<RawReferenceRecord>>);

#[async_trait]
impl RawReferenceRepository for InMemoryRawReferences {
    async fn insert_batch(&self, references: &[RawReferenceRecord]) -> Result<()> {
        self.0.lock().unwrap().extend_from_slice(references);
        Ok(())
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<RawReferenceRecord>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }
    async fn delete_batch(&self, ids: &[RawReferenceId]) -> Result<()> {
        self.0.lock().unwrap().retain(|r| !ids.contains(&r.id));
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryRuns(Mutex<HashMap<IndexRunId, IndexRun>>);

#[async_trait]
impl IndexRunRepository for InMemoryRuns {
    async fn insert(&self, run: &IndexRun) -> Result<()> {
        self.0.lock().unwrap().insert(run.id, run.clone());
        Ok(())
    }
    async fn get(&self, id: IndexRunId) -> Result<IndexRun> {
        self.0
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("index run {id}") })
    }
    async fn save(&self, run: &IndexRun) -> Result<()> {
        self.0.lock().unwrap().insert(run.id, run.clone());
        Ok(())
    }
    async fn decrement_chunks_remaining(&self, id: IndexRunId) -> Result<u32> {
        let mut guard = self.0.lock().unwrap();
        let run = guard
            .get_mut(&id)
            .ok_or_else(|| Error::NotFound { resource: format!("index run {id}") })?;
        run.decrement_chunks_remaining()
    }
}

#[derive(Default)]
pub struct InMemoryParseErrors(Mutex<Vec<ParseErrorRecord>>);

#[async_trait]
impl ParseErrorRepository for InMemoryParseErrors {
    async fn insert(&self, record: &ParseErrorRecord) -> Result<()> {
        self.0.lock().unwrap().push(record.clone());
        Ok(())
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ParseErrorRecord>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryAnalytics(Mutex<Vec<ProjectAnalytics>>);

#[async_trait]
impl ProjectAnalyticsRepository for InMemoryAnalytics {
    async fn upsert(&self, analytics: &ProjectAnalytics) -> Result<()> {
        let mut guard = self.0.lock().unwrap();
        guard.retain(|a| a.id != analytics.id);
        guard.push(analytics.clone());
        Ok(())
    }
    async fn upsert_batch(&self, analytics: &[ProjectAnalytics]) -> Result<()> {
        for row in analytics {
            self.upsert(row).await?;
        }
        Ok(())
    }
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ProjectAnalytics>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.project_id == project_id)
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryBlobs(Mutex<HashMap<String, Vec<u8>>>);

#[async_trait]
impl BlobStore for InMemoryBlobs {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.0.lock().unwrap().insert(key.to_owned(), bytes.to_vec());
        Ok(())
    }
    async fn get(&self, key: &str) -> Result<Vec<u8>> {
        self.0
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| Error::NotFound { resource: format!("blob {key}") })
    }
    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.0.lock().unwrap().contains_key(key))
    }
    async fn delete(&self, key: &str) -> Result<()> {
        self.0.lock().unwrap().remove(key);
        Ok(())
    }
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryQueue {
    ingest: Mutex<Vec<Vec<u8>>>,
    parse_tasks: Mutex<Vec<Vec<u8>>>,
}

impl InMemoryQueue {
    pub fn drain_ingest(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.ingest.lock().unwrap())
    }
    pub fn drain_parse_tasks(&self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.parse_tasks.lock().unwrap())
    }
}

#[async_trait]
impl Queue for InMemoryQueue {
    async fn publish(&self, stream: Stream, payload: &[u8]) -> Result<()> {
        match stream {
            Stream::Ingest => self.ingest.lock().unwrap().push(payload.to_vec()),
            Stream::ParseTasks => self.parse_tasks.lock().unwrap().push(payload.to_vec()),
        }
        Ok(())
    }
    async fn receive(&self, stream: Stream) -> Result<Option<(MessageHandle, Vec<u8>)>> {
        let queue = match stream {
            Stream::Ingest => &self.ingest,
            Stream::ParseTasks => &self.parse_tasks,
        };
        Ok(queue
            .lock()
            .unwrap()
            .pop()
            .map(|payload| (MessageHandle("test".to_owned()), payload)))
    }
    async fn ack(&self, _stream: Stream, _handle: MessageHandle) -> Result<()> {
        Ok(())
    }
}

/// A connector that stages fixed `(path, content)` pairs into a shared
/// blob store on `fetch`, used to drive the clone stage without
/// touching git.
pub struct FixtureConnector {
    pub source_type: SourceType,
    pub files: Vec<(String, Vec<u8>)>,
    pub blobs: std::sync::Arc<InMemoryBlobs>,
}

#[async_trait]
impl Connector for FixtureConnector {
    fn source_type(&self) -> SourceType {
        self.source_type
    }
    async fn fetch(&self, source: &Source) -> Result<FetchOutcome> {
        let prefix = format!("workspace/{}", source.id);
        for (path, content) in &self.files {
            self.blobs.put(&format!("{prefix}/{path}"), content).await?;
        }
        Ok(FetchOutcome {
            workspace_prefix: prefix,
            commit_sha: Some("deadbeef".to_owned()),
        })
    }
}

#[derive(Default)]
pub struct EchoEmbedder;

#[async_trait]
impl Embedder for EchoEmbedder {
    fn name(&self) -> &'static str {
        "echo"
    }
    fn max_batch_size(&self) -> usize {
        100
    }
    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<EmbeddingOutput>> {
        Ok(inputs
            .iter()
            .map(|input| EmbeddingOutput {
                symbol_id: input.symbol_id,
                vector: vec![input.text.len() as f32],
            })
            .collect())
    }
}

#[derive(Default)]
pub struct InMemoryGraphStore {
    pub constraints_ensured: Mutex<bool>,
    pub synced_nodes: Mutex<usize>,
    pub synced_edges: Mutex<usize>,
}

#[async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn ensure_constraints(&self) -> Result<()> {
        *self.constraints_ensured.lock().unwrap() = true;
        Ok(())
    }
    async fn sync_batch(&self, _project_id: ProjectId, batch: &GraphSyncBatch) -> Result<()> {
        *self.synced_nodes.lock().unwrap() += batch.symbol_nodes.len() + batch.file_nodes.len();
        *self.synced_edges.lock().unwrap() += batch.edges.len();
        Ok(())
    }
    async fn delete_project(&self, _project_id: ProjectId) -> Result<()> {
        Ok(())
    }
}
