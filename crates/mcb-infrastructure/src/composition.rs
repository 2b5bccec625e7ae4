//! Composition root (§10.5): wires every concrete adapter behind the
//! `Arc<dyn Trait>` handles the application layer's use cases expect,
//! and assembles the stage pipeline that drives an `IndexRun`.
//!
//! This is the only place in the workspace that names both
//! `mcb-application`'s use cases and `mcb-infrastructure`'s adapters —
//! `mcb-providers`' connectors, parsers, and embedder are threaded in
//! by the caller (the `mcb` binary crate) since this crate cannot
//! depend on providers without creating a cycle through `mcb-server`.

use std::sync::Arc;

use mcb_application::registry::ParserRegistry;
use mcb_application::use_cases::{
    AnalyticsStage, EmbedStage, GraphSyncStage, LineageStage, ParseStage, ParseWorker,
    PipelineOrchestrator, ResolveStage,
};
use mcb_domain::error::Result;
use mcb_domain::ports::{Connector, Embedder};
use sea_orm::DatabaseConnection;

use crate::blob::FsBlobStore;
use crate::config::AppConfig;
use crate::db::repos::{
    SeaOrmColumnReferenceRepository, SeaOrmFileRepository, SeaOrmIndexRunRepository,
    SeaOrmParseErrorRepository, SeaOrmProjectAnalyticsRepository, SeaOrmProjectRepository,
    SeaOrmRawReferenceRepository, SeaOrmSourceRepository, SeaOrmSymbolEdgeRepository,
    SeaOrmSymbolRepository,
};
use crate::graph::SeaOrmGraphStore;
use crate::queue::SeaStreamerQueue;

/// Every repository handle, grouped for reuse across the pipeline
/// orchestrator, the parse worker, and the stage objects they own.
pub struct Repositories {
    pub projects: Arc<dyn mcb_domain::ports::ProjectRepository>,
    pub sources: Arc<dyn mcb_domain::ports::SourceRepository>,
    pub files: Arc<dyn mcb_domain::ports::FileRepository>,
    pub symbols: Arc<dyn mcb_domain::ports::SymbolRepository>,
    pub symbol_edges: Arc<dyn mcb_domain::ports::SymbolEdgeRepository>,
    pub column_references: Arc<dyn mcb_domain::ports::ColumnReferenceRepository>,
    pub raw_references: Arc<dyn mcb_domain::ports::RawReferenceRepository>,
    pub index_runs: Arc<dyn mcb_domain::ports::IndexRunRepository>,
    pub parse_errors: Arc<dyn mcb_domain::ports::ParseErrorRepository>,
    pub analytics: Arc<dyn mcb_domain::ports::ProjectAnalyticsRepository>,
}

impl Repositories {
    fn new(db: DatabaseConnection) -> Self {
        Self {
            projects: Arc::new(SeaOrmProjectRepository::new(db.clone())),
            sources: Arc::new(SeaOrmSourceRepository::new(db.clone())),
            files: Arc::new(SeaOrmFileRepository::new(db.clone())),
            symbols: Arc::new(SeaOrmSymbolRepository::new(db.clone())),
            symbol_edges: Arc::new(SeaOrmSymbolEdgeRepository::new(db.clone())),
            column_references: Arc::new(SeaOrmColumnReferenceRepository::new(db.clone())),
            raw_references: Arc::new(SeaOrmRawReferenceRepository::new(db.clone())),
            index_runs: Arc::new(SeaOrmIndexRunRepository::new(db.clone())),
            parse_errors: Arc::new(SeaOrmParseErrorRepository::new(db.clone())),
            analytics: Arc::new(SeaOrmProjectAnalyticsRepository::new(db)),
        }
    }
}

/// Every wired adapter and use case a running worker or CLI command
/// needs, built once at startup (§10.5 "Composition root").
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub repos: Repositories,
    pub graph: Arc<dyn mcb_domain::ports::GraphStore>,
    pub blobs: Arc<dyn mcb_domain::ports::BlobStore>,
    pub queue: Arc<dyn mcb_domain::ports::Queue>,
    pub orchestrator: Arc<PipelineOrchestrator>,
    pub parse_worker: Arc<ParseWorker>,
}

impl AppContext {
    /// Build the full composition root: connect the Relational Store,
    /// wire every repository and the Graph Store atop it, connect the
    /// Queue, mount the Blob Store, and assemble the stage pipeline.
    ///
    /// `connectors`, `embedder`, and `parser_registry` come from the
    /// caller because they live in `mcb-providers`, which this crate
    /// does not depend on (see module docs).
    pub async fn build(
        config: AppConfig,
        connectors: Vec<Arc<dyn Connector>>,
        embedder: Arc<dyn Embedder>,
        parser_registry: Arc<ParserRegistry>,
    ) -> Result<Self> {
        let db = crate::db::pool::connect(&config.database).await?;
        let repos = Repositories::new(db.clone());
        let graph: Arc<dyn mcb_domain::ports::GraphStore> = Arc::new(SeaOrmGraphStore::new(db));
        let blobs: Arc<dyn mcb_domain::ports::BlobStore> =
            Arc::new(FsBlobStore::new(config.workspace_root.clone()));
        let queue: Arc<dyn mcb_domain::ports::Queue> =
            Arc::new(SeaStreamerQueue::connect(config.queue.clone()).await?);

        let parse_stage = ParseStage::new(repos.files.clone(), repos.projects.clone());
        let resolve_stage = ResolveStage::new(
            repos.raw_references.clone(),
            repos.symbols.clone(),
            repos.symbol_edges.clone(),
        );
        let lineage_stage = LineageStage::new(
            repos.column_references.clone(),
            repos.symbols.clone(),
            repos.symbol_edges.clone(),
        );
        let graph_sync_stage = GraphSyncStage::new(
            repos.symbols.clone(),
            repos.files.clone(),
            repos.symbol_edges.clone(),
            graph.clone(),
        );
        let embed_stage = EmbedStage::new(repos.symbols.clone(), embedder);
        let analytics_stage = AnalyticsStage::new(
            repos.symbols.clone(),
            repos.symbol_edges.clone(),
            repos.analytics.clone(),
        );

        let orchestrator = Arc::new(PipelineOrchestrator::new(
            repos.index_runs.clone(),
            repos.projects.clone(),
            repos.sources.clone(),
            repos.files.clone(),
            blobs.clone(),
            queue.clone(),
            connectors,
            parse_stage,
            resolve_stage,
            lineage_stage,
            graph_sync_stage,
            embed_stage,
            analytics_stage,
        ));

        let parse_worker = Arc::new(ParseWorker::new(
            repos.files.clone(),
            repos.symbols.clone(),
            repos.column_references.clone(),
            repos.raw_references.clone(),
            repos.parse_errors.clone(),
            repos.index_runs.clone(),
            blobs.clone(),
            queue.clone(),
            parser_registry,
        ));

        Ok(Self {
            config: Arc::new(config),
            repos,
            graph,
            blobs,
            queue,
            orchestrator,
            parse_worker,
        })
    }
}
