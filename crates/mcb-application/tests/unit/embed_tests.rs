//! Interaction tests for [`EmbedStage`] against a `mockall`-generated
//! [`MockEmbedder`]: these assert call shape (batch count, batch size,
//! input ordering) rather than vector values, since a fake embedder
//! would have to reimplement the batching logic to be worth faking.

use std::sync::Arc;

use mcb_application::use_cases::{EmbedStage, RunContext};
use mcb_domain::ports::{EmbeddingOutput, MockEmbedder, SymbolRepository};
use mcb_domain::{FileId, Language, Project, Symbol, SymbolKind};

use crate::utils::InMemorySymbols;

fn run_context(project_id: mcb_domain::ProjectId) -> RunContext {
    RunContext {
        index_run_id: mcb_domain::IndexRunId::new(),
        project_id,
        source_id: None,
        workspace_dir: std::path::PathBuf::from("/tmp"),
    }
}

#[tokio::test]
async fn embed_stage_chunks_symbols_to_the_embedder_max_batch_size() {
    let project = Project::new("acme", "Acme");
    let file_id = FileId::new();

    let symbols = Arc::new(InMemorySymbols::default());
    let mut seeded = Vec::new();
    for i in 0..5 {
        let symbol = Symbol::new(
            project.id,
            file_id,
            format!("Table{i}"),
            format!("dbo.Table{i}"),
            SymbolKind::Table,
            Language::TSql,
            1,
            1,
        );
        symbols.upsert(&symbol).await.unwrap();
        seeded.push(symbol.id);
    }

    let mut embedder = MockEmbedder::new();
    embedder.expect_max_batch_size().return_const(2_usize);
    embedder.expect_embed_batch().times(3).returning(|inputs| {
        Ok(inputs
            .iter()
            .map(|input| EmbeddingOutput { symbol_id: input.symbol_id, vector: vec![1.0] })
            .collect())
    });

    let stage = EmbedStage::new(symbols.clone(), Arc::new(embedder));
    stage.run(&run_context(project.id)).await.unwrap();

    let embedded = symbols.list_for_project(project.id).await.unwrap();
    assert_eq!(embedded.len(), 5);
    for symbol in embedded {
        assert!(symbol.metadata.contains_key("embedding"));
    }
}

#[tokio::test]
async fn embed_stage_skips_the_embedder_entirely_when_there_are_no_symbols() {
    let project = Project::new("acme", "Acme");
    let symbols = Arc::new(InMemorySymbols::default());

    let mut embedder = MockEmbedder::new();
    embedder.expect_max_batch_size().times(0);
    embedder.expect_embed_batch().times(0);

    let stage = EmbedStage::new(symbols, Arc::new(embedder));
    stage.run(&run_context(project.id)).await.unwrap();
}

#[tokio::test]
async fn embed_stage_propagates_an_embedder_failure_without_patching_any_symbol() {
    let project = Project::new("acme", "Acme");
    let file_id = FileId::new();
    let symbols = Arc::new(InMemorySymbols::default());
    let symbol = Symbol::new(
        project.id,
        file_id,
        "Users",
        "dbo.Users",
        SymbolKind::Table,
        Language::TSql,
        1,
        1,
    );
    symbols.upsert(&symbol).await.unwrap();

    let mut embedder = MockEmbedder::new();
    embedder.expect_max_batch_size().return_const(10_usize);
    embedder.expect_embed_batch().times(1).returning(|_| {
        Err(mcb_domain::error::Error::embedding_with_source(
            "embedding provider unavailable",
            std::io::Error::other("connection reset"),
        ))
    });

    let stage = EmbedStage::new(symbols.clone(), Arc::new(embedder));
    let result = stage.run(&run_context(project.id)).await;
    assert!(result.is_err());

    let unpatched = symbols.get(symbol.id).await.unwrap();
    assert!(!unpatched.metadata.contains_key("embedding"));
}
