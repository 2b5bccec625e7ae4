//! Graph Store port (§2 "GS", §4.7): a denormalized, eventually
//! consistent mirror of RS for traversal queries.

use async_trait::async_trait;

use crate::entities::{File, Symbol, SymbolEdge};
use crate::error::Result;
use crate::value_objects::ProjectId;

/// A batch of node/edge upserts applied by one Graph Sync pass (§4.7).
#[derive(Debug, Clone, Default)]
pub struct GraphSyncBatch {
    pub symbol_nodes: Vec<Symbol>,
    pub file_nodes: Vec<File>,
    pub edges: Vec<SymbolEdge>,
}

/// Denormalized graph mirror consumed by traversal queries.
///
/// Implementations MUST ensure a uniqueness constraint on node id
/// before first use (§4.7): without it, sync time is O(n²) on large
/// projects.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Ensure the uniqueness constraints this store relies on exist.
    async fn ensure_constraints(&self) -> Result<()>;

    /// Upsert one batch of nodes and edges, keyed by UUID.
    async fn sync_batch(&self, project_id: ProjectId, batch: &GraphSyncBatch) -> Result<()>;

    /// Remove all rows derived from `project_id` (§3 "Ownership": a
    /// project-scoped delete removes derived views).
    async fn delete_project(&self, project_id: ProjectId) -> Result<()>;
}
