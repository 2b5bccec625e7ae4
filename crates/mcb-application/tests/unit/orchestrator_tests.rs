use std::collections::HashMap;
use std::sync::Arc;

use mcb_application::registry::ParserRegistry;
use mcb_application::use_cases::{
    AnalyticsStage, EmbedStage, GraphSyncStage, LineageStage, ParseStage, ParseWorker,
    PipelineOrchestrator, ResolveStage,
};
use mcb_domain::entities::SymbolKind;
use mcb_domain::ports::{
    BlobStore, ColumnReferenceRepository, FileInput, FileRepository, IndexRunRepository,
    IngestMessage, ParseErrorEntry, ParseErrorRepository, ParseResult, ParseTaskMessage, Parser,
    ProjectAnalyticsRepository, ProjectRepository, Queue, RawReferenceRepository, RawSymbol,
    SourceRepository, SymbolEdgeRepository, SymbolRepository,
};
use mcb_domain::{Language, Project, RunStatus, Source, SourceType};
use tokio_util::sync::CancellationToken;

use crate::utils::{
    EchoEmbedder, FixtureConnector, InMemoryAnalytics, InMemoryBlobs, InMemoryColumnReferences,
    InMemoryEdges, InMemoryFiles, InMemoryGraphStore, InMemoryParseErrors, InMemoryProjects,
    InMemoryQueue, InMemoryRawReferences, InMemoryRuns, InMemorySources, InMemorySymbols,
};

struct FixtureParser;

impl Parser for FixtureParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::CSharp]
    }

    fn parse(&self, input: &FileInput) -> ParseResult {
        ParseResult {
            symbols: vec![RawSymbol {
                local_id: "widget".to_owned(),
                name: "Widget".to_owned(),
                qualified_name: format!("Acme.{}", input.path.replace(['/', '.'], "_")),
                kind: SymbolKind::Class,
                start_line: 1,
                end_line: 10,
                start_col: 0,
                end_col: 0,
                signature: None,
                doc_comment: None,
            }],
            references: vec![],
            column_references: vec![],
            errors: vec![ParseErrorEntry { line: 1, column: None, message: "todo".to_owned() }],
        }
    }
}

fn factory() -> Box<dyn Parser> {
    Box::new(FixtureParser)
}

fn registry() -> Arc<ParserRegistry> {
    let mut map: HashMap<&'static str, fn() -> Box<dyn Parser>> = HashMap::new();
    map.insert(".cs", factory);
    Arc::new(ParserRegistry::from_map(map))
}

/// Exercises the whole `IndexRun → ParseComplete` round trip: the
/// orchestrator clones and fans out, a worker drains every parse task
/// it enqueued, and the resulting `ParseComplete` message drives the
/// post-parse stages through to `Completed`.
#[tokio::test]
async fn full_run_reaches_completed_status() {
    let project = Project::new("acme", "Acme");
    let source = Source::new(project.id, SourceType::Git, "git@example.com:acme.git");
    let run = mcb_domain::IndexRun::new(project.id, Some(source.id));

    let projects = Arc::new(InMemoryProjects::default());
    projects.upsert(&project).await.unwrap();
    let sources = Arc::new(InMemorySources::default());
    sources.upsert(&source).await.unwrap();
    let files = Arc::new(InMemoryFiles::default());
    let symbols = Arc::new(InMemorySymbols::default());
    let edges = Arc::new(InMemoryEdges::default());
    let column_references = Arc::new(InMemoryColumnReferences::default());
    let raw_references = Arc::new(InMemoryRawReferences::default());
    let parse_errors = Arc::new(InMemoryParseErrors::default());
    let analytics = Arc::new(InMemoryAnalytics::default());
    let runs = Arc::new(InMemoryRuns::default());
    runs.insert(&run).await.unwrap();
    let blobs = Arc::new(InMemoryBlobs::default());
    let queue = Arc::new(InMemoryQueue::default());
    let graph = Arc::new(InMemoryGraphStore::default());

    let connector = Arc::new(FixtureConnector {
        source_type: SourceType::Git,
        files: vec![
            ("src/Widget.cs".to_owned(), b"class Widget {}".to_vec()),
            ("src/Gadget.cs".to_owned(), b"class Gadget {}".to_vec()),
        ],
        blobs: blobs.clone(),
    });

    let parse_stage = ParseStage::new(files.clone(), projects.clone());
    let resolve_stage =
        ResolveStage::new(raw_references.clone(), symbols.clone(), edges.clone());
    let lineage_stage =
        LineageStage::new(column_references.clone(), symbols.clone(), edges.clone());
    let graph_sync_stage =
        GraphSyncStage::new(symbols.clone(), files.clone(), edges.clone(), graph.clone());
    let embed_stage = EmbedStage::new(symbols.clone(), Arc::new(EchoEmbedder::default()));
    let analytics_stage =
        AnalyticsStage::new(symbols.clone(), edges.clone(), analytics.clone());

    let orchestrator = PipelineOrchestrator::new(
        runs.clone(),
        projects.clone(),
        sources.clone(),
        files.clone(),
        blobs.clone(),
        queue.clone(),
        vec![connector],
        parse_stage,
        resolve_stage,
        lineage_stage,
        graph_sync_stage,
        embed_stage,
        analytics_stage,
    );

    let cancellation = CancellationToken::new();

    orchestrator
        .handle_ingest_message(
            IngestMessage::IndexRun {
                index_run_id: run.id,
                project_id: project.id,
                source_id: Some(source.id),
                resume_from: None,
            },
            &cancellation,
        )
        .await
        .unwrap();

    // Clone staged two files and the parse stage fanned out one chunk.
    assert_eq!(files.list_for_project(project.id).await.unwrap().len(), 2);
    let chunks = queue.drain_parse_tasks();
    assert_eq!(chunks.len(), 1);

    let worker = ParseWorker::new(
        files.clone(),
        symbols.clone(),
        column_references.clone(),
        raw_references.clone(),
        parse_errors.clone(),
        runs.clone(),
        blobs.clone(),
        queue.clone(),
        registry(),
    );
    for payload in chunks {
        let ParseTaskMessage::ParseChunk { index_run_id, project_id, file_ids, .. } =
            serde_json::from_slice(&payload).unwrap();
        worker
            .process_chunk(index_run_id, project_id, &file_ids)
            .await
            .unwrap();
    }

    // Draining the one chunk published exactly one parse_complete.
    let ingest_messages = queue.drain_ingest();
    assert_eq!(ingest_messages.len(), 1);
    let IngestMessage::ParseComplete { index_run_id, project_id } =
        serde_json::from_slice(&ingest_messages[0]).unwrap()
    else {
        panic!("expected a ParseComplete message");
    };

    orchestrator
        .handle_ingest_message(
            IngestMessage::ParseComplete { index_run_id, project_id },
            &cancellation,
        )
        .await
        .unwrap();

    let finished = runs.get(run.id).await.unwrap();
    assert_eq!(finished.status, RunStatus::Completed);
    assert_eq!(symbols.list_for_project(project.id).await.unwrap().len(), 2);
    assert_eq!(parse_errors.list_for_project(project.id).await.unwrap().len(), 2);
    assert!(*graph.constraints_ensured.lock().unwrap());
    assert!(*graph.synced_nodes.lock().unwrap() > 0);
    assert!(!analytics.list_for_project(project.id).await.unwrap().is_empty());

    // Every symbol picked up an embedding vector via patch_metadata_batch.
    for symbol in symbols.list_for_project(project.id).await.unwrap() {
        assert!(symbol.metadata.contains_key("embedding"));
    }
}

/// A cancellation observed between post-parse stages stops the run at
/// `Cancelled` instead of driving it through to completion.
#[tokio::test]
async fn cancellation_between_stages_cancels_the_run() {
    let project = Project::new("acme", "Acme");
    let run = mcb_domain::IndexRun::new(project.id, None);

    let projects = Arc::new(InMemoryProjects::default());
    projects.upsert(&project).await.unwrap();
    let sources = Arc::new(InMemorySources::default());
    let files = Arc::new(InMemoryFiles::default());
    let symbols = Arc::new(InMemorySymbols::default());
    let edges = Arc::new(InMemoryEdges::default());
    let column_references = Arc::new(InMemoryColumnReferences::default());
    let raw_references = Arc::new(InMemoryRawReferences::default());
    let analytics = Arc::new(InMemoryAnalytics::default());
    let runs = Arc::new(InMemoryRuns::default());
    runs.insert(&run).await.unwrap();
    {
        let mut stored = runs.get(run.id).await.unwrap();
        stored.start().unwrap();
        stored.set_total_chunks(0);
        stored.advance_stage(mcb_domain::RunStage::Clone).unwrap();
        stored.advance_stage(mcb_domain::RunStage::Parse).unwrap();
        runs.save(&stored).await.unwrap();
    }
    let blobs = Arc::new(InMemoryBlobs::default());
    let queue = Arc::new(InMemoryQueue::default());
    let graph = Arc::new(InMemoryGraphStore::default());

    let parse_stage = ParseStage::new(files.clone(), projects.clone());
    let resolve_stage =
        ResolveStage::new(raw_references.clone(), symbols.clone(), edges.clone());
    let lineage_stage =
        LineageStage::new(column_references.clone(), symbols.clone(), edges.clone());
    let graph_sync_stage =
        GraphSyncStage::new(symbols.clone(), files.clone(), edges.clone(), graph.clone());
    let embed_stage = EmbedStage::new(symbols.clone(), Arc::new(EchoEmbedder::default()));
    let analytics_stage =
        AnalyticsStage::new(symbols.clone(), edges.clone(), analytics.clone());

    let orchestrator = PipelineOrchestrator::new(
        runs.clone(),
        projects.clone(),
        sources.clone(),
        files.clone(),
        blobs.clone(),
        queue.clone(),
        vec![],
        parse_stage,
        resolve_stage,
        lineage_stage,
        graph_sync_stage,
        embed_stage,
        analytics_stage,
    );

    let cancellation = CancellationToken::new();
    cancellation.cancel();

    orchestrator
        .handle_ingest_message(
            IngestMessage::ParseComplete { index_run_id: run.id, project_id: project.id },
            &cancellation,
        )
        .await
        .unwrap();

    let finished = runs.get(run.id).await.unwrap();
    assert_eq!(finished.status, RunStatus::Cancelled);
}
