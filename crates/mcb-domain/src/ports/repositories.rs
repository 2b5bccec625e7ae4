//! Repository ports for the Relational Store (§2 "RS").
//!
//! All repository traits use `#[async_trait]` and require `Send + Sync`
//! so any `tokio`-backed adapter (§10.5) can implement them.

use async_trait::async_trait;

use crate::entities::{
    ColumnReference, File, IndexRun, ParseErrorRecord, Project, ProjectAnalytics, Source, Symbol,
    SymbolEdge,
};
use crate::error::Result;
use crate::ports::parser::RawReferenceRecord;
use crate::value_objects::{FileId, IndexRunId, ProjectId, SourceId, SymbolEdgeId, SymbolId};

/// Persistence for Projects.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn upsert(&self, project: &Project) -> Result<()>;
    async fn get(&self, id: ProjectId) -> Result<Project>;
    async fn get_by_slug(&self, slug: &str) -> Result<Project>;
    async fn list(&self) -> Result<Vec<Project>>;
    async fn delete(&self, id: ProjectId) -> Result<()>;
}

/// Persistence for Sources.
#[async_trait]
pub trait SourceRepository: Send + Sync {
    async fn upsert(&self, source: &Source) -> Result<()>;
    async fn get(&self, id: SourceId) -> Result<Source>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Source>>;
    async fn delete(&self, id: SourceId) -> Result<()>;
}

/// Persistence for Files, keyed uniquely by `(project, source, path)`.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Idempotent upsert keyed by `(project, source, path)`.
    async fn upsert(&self, file: &File) -> Result<()>;
    async fn get(&self, id: FileId) -> Result<File>;
    async fn list_for_source(&self, source_id: SourceId) -> Result<Vec<File>>;
    /// All files for a project discovered by the clone stage, in the
    /// order the Parse Stage (§4.2) should chunk them.
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<File>>;
}

/// Persistence for Symbols, keyed uniquely by `(project, qualified_name,
/// kind)`.
#[async_trait]
pub trait SymbolRepository: Send + Sync {
    /// Idempotent upsert, refreshing the row in place on conflict (§3).
    async fn upsert(&self, symbol: &Symbol) -> Result<()>;
    /// Batch upsert for one file's worth of symbols, within a single
    /// transaction (§4.3 step 4).
    async fn upsert_batch(&self, symbols: &[Symbol]) -> Result<()>;
    async fn get(&self, id: SymbolId) -> Result<Symbol>;
    /// Batched exact-FQN lookup, scoped to the project — used by the
    /// resolver's strategy 1/2 lookups (§4.5 "Performance discipline").
    async fn find_by_qualified_names(
        &self,
        project_id: ProjectId,
        qualified_names: &[String],
    ) -> Result<Vec<Symbol>>;
    /// Batched short-name lookup, scoped to the project — used by the
    /// resolver's strategy 3/4 lookups.
    async fn find_by_short_names(
        &self,
        project_id: ProjectId,
        short_names: &[String],
    ) -> Result<Vec<Symbol>>;
    async fn list_for_file(&self, file_id: FileId) -> Result<Vec<Symbol>>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<Symbol>>;
    /// Batched metadata patch for the Analytics stage (§4.8): merges
    /// `patch` into each symbol's existing `metadata` map.
    async fn patch_metadata_batch(
        &self,
        patches: &[(SymbolId, serde_json::Value)],
    ) -> Result<()>;
}

/// Persistence for SymbolEdges, keyed uniquely by `(project, source,
/// target, edge_type)`.
#[async_trait]
pub trait SymbolEdgeRepository: Send + Sync {
    /// Idempotent upsert of metadata on conflict (§3).
    async fn upsert(&self, edge: &SymbolEdge) -> Result<()>;
    async fn upsert_batch(&self, edges: &[SymbolEdge]) -> Result<()>;
    async fn get(&self, id: SymbolEdgeId) -> Result<SymbolEdge>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<SymbolEdge>>;
    /// For the Analytics stage's in-memory graph build (§4.8).
    async fn list_for_project_batched(
        &self,
        project_id: ProjectId,
        batch_size: usize,
        offset: usize,
    ) -> Result<Vec<SymbolEdge>>;
}

/// Persistence for ephemeral ColumnReferences, scoped to an IndexRun.
#[async_trait]
pub trait ColumnReferenceRepository: Send + Sync {
    async fn insert_batch(&self, references: &[ColumnReference]) -> Result<()>;
    async fn list_for_run(&self, index_run_id: IndexRunId) -> Result<Vec<ColumnReference>>;
    /// Delete all rows for a run once the Lineage stage (§4.6) has
    /// consumed them.
    async fn delete_for_run(&self, index_run_id: IndexRunId) -> Result<()>;
}

/// Persistence for IndexRuns, the only entity mutated by both the
/// Pipeline Orchestrator and the Parse Worker.
#[async_trait]
pub trait IndexRunRepository: Send + Sync {
    async fn insert(&self, run: &IndexRun) -> Result<()>;
    async fn get(&self, id: IndexRunId) -> Result<IndexRun>;
    async fn save(&self, run: &IndexRun) -> Result<()>;
    /// Atomic conditional decrement of `chunks_remaining`, returning the
    /// post-decrement value (§4.3). Implementations MUST perform this
    /// as a single `UPDATE ... RETURNING` so concurrent parse workers
    /// racing on the same run cannot double-decrement.
    async fn decrement_chunks_remaining(&self, id: IndexRunId) -> Result<u32>;
}

/// Persistence for ParseErrorRecords (§3.1).
#[async_trait]
pub trait ParseErrorRepository: Send + Sync {
    async fn insert(&self, record: &ParseErrorRecord) -> Result<()>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ParseErrorRecord>>;
}

/// Persistence for ProjectAnalytics snapshots (§3.1, §4.8).
#[async_trait]
pub trait ProjectAnalyticsRepository: Send + Sync {
    /// Upsert keyed by `(project_id, scope, scope_id)`.
    async fn upsert(&self, analytics: &ProjectAnalytics) -> Result<()>;
    async fn upsert_batch(&self, analytics: &[ProjectAnalytics]) -> Result<()>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<ProjectAnalytics>>;
}

/// Persistence for the resolver's working queue of staged references
/// (§4.3 step 5, §4.5).
#[async_trait]
pub trait RawReferenceRepository: Send + Sync {
    async fn insert_batch(&self, references: &[RawReferenceRecord]) -> Result<()>;
    async fn list_for_project(&self, project_id: ProjectId) -> Result<Vec<RawReferenceRecord>>;
    /// Delete the given rows once the resolver has emitted their
    /// corresponding edges (or permanently failed to resolve them).
    async fn delete_batch(&self, ids: &[crate::value_objects::RawReferenceId]) -> Result<()>;
}
