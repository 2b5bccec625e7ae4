//! Graph Sync stage (§4.7): mirrors the Relational Store into the
//! denormalized Graph Store in deterministic, bounded batches.

use std::sync::Arc;

use mcb_domain::error::Result;
use mcb_domain::ports::{FileRepository, GraphStore, GraphSyncBatch, SymbolEdgeRepository, SymbolRepository};
use tracing::info;

use crate::use_cases::orchestrator::RunContext;

/// Node/edge batch size for each `sync_batch` call (§4.7).
const SYNC_BATCH_SIZE: usize = 500;

/// Mirrors Symbols, Files, and SymbolEdges for a project into the
/// Graph Store, in batches of [`SYNC_BATCH_SIZE`] (§4.7).
pub struct GraphSyncStage {
    symbols: Arc<dyn SymbolRepository>,
    files: Arc<dyn FileRepository>,
    edges: Arc<dyn SymbolEdgeRepository>,
    graph: Arc<dyn GraphStore>,
}

impl GraphSyncStage {
    #[must_use]
    pub fn new(
        symbols: Arc<dyn SymbolRepository>,
        files: Arc<dyn FileRepository>,
        edges: Arc<dyn SymbolEdgeRepository>,
        graph: Arc<dyn GraphStore>,
    ) -> Self {
        Self {
            symbols,
            files,
            edges,
            graph,
        }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<()> {
        self.graph.ensure_constraints().await?;

        let symbols = self.symbols.list_for_project(ctx.project_id).await?;
        let files = self.files.list_for_project(ctx.project_id).await?;

        for chunk in symbols.chunks(SYNC_BATCH_SIZE) {
            let batch = GraphSyncBatch {
                symbol_nodes: chunk.to_vec(),
                file_nodes: Vec::new(),
                edges: Vec::new(),
            };
            self.graph.sync_batch(ctx.project_id, &batch).await?;
        }
        for chunk in files.chunks(SYNC_BATCH_SIZE) {
            let batch = GraphSyncBatch {
                symbol_nodes: Vec::new(),
                file_nodes: chunk.to_vec(),
                edges: Vec::new(),
            };
            self.graph.sync_batch(ctx.project_id, &batch).await?;
        }

        let mut offset = 0usize;
        let mut total_edges = 0usize;
        loop {
            let page = self
                .edges
                .list_for_project_batched(ctx.project_id, SYNC_BATCH_SIZE, offset)
                .await?;
            if page.is_empty() {
                break;
            }
            total_edges += page.len();
            let batch = GraphSyncBatch {
                symbol_nodes: Vec::new(),
                file_nodes: Vec::new(),
                edges: page,
            };
            self.graph.sync_batch(ctx.project_id, &batch).await?;
            offset += SYNC_BATCH_SIZE;
        }

        info!(
            project_id = %ctx.project_id,
            symbols = symbols.len(),
            files = files.len(),
            edges = total_edges,
            "graph sync stage complete"
        );
        Ok(())
    }
}
