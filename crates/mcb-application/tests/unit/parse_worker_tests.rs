use std::collections::HashMap;
use std::sync::Arc;

use mcb_application::registry::ParserRegistry;
use mcb_application::use_cases::ParseWorker;
use mcb_domain::entities::SymbolKind;
use mcb_domain::ports::{
    BlobStore, ColumnReferenceRepository, FileInput, FileRepository, IndexRunRepository,
    ParseErrorEntry, ParseErrorRepository, ParseResult, Parser, Queue, RawReference,
    RawReferenceRepository, RawSymbol, SymbolRepository,
};
use mcb_domain::{EdgeType, File, IndexRun, Language, Project, ProjectId, Source, SourceType};

use crate::utils::{
    InMemoryBlobs, InMemoryColumnReferences, InMemoryFiles, InMemoryParseErrors,
    InMemoryRawReferences, InMemoryRuns, InMemoryQueue, InMemorySymbols,
};

struct FixtureParser;

impl Parser for FixtureParser {
    fn languages(&self) -> &'static [Language] {
        &[Language::CSharp]
    }

    fn parse(&self, _input: &FileInput) -> ParseResult {
        ParseResult {
            symbols: vec![RawSymbol {
                local_id: "widget".to_owned(),
                name: "Widget".to_owned(),
                qualified_name: "Acme.Widget".to_owned(),
                kind: SymbolKind::Class,
                start_line: 1,
                end_line: 20,
                start_col: 0,
                end_col: 0,
                signature: None,
                doc_comment: None,
            }],
            references: vec![RawReference {
                from_symbol: "widget".to_owned(),
                to_name: "Users".to_owned(),
                to_qualified: Some("dbo.Users".to_owned()),
                reference_type: EdgeType::UsesTable,
                confidence: mcb_domain::Confidence::default(),
                context: serde_json::Value::Null,
            }],
            column_references: vec![],
            errors: vec![ParseErrorEntry {
                line: 5,
                column: Some(3),
                message: "unexpected token".to_owned(),
            }],
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

#[tokio::test]
async fn process_chunk_persists_symbols_references_and_errors() {
    let project = Project::new("acme", "Acme");
    let source = Source::new(project.id, SourceType::Git, "git@example.com:acme.git");
    let file = File::new(project.id, source.id, "src/Widget.cs", b"class Widget {}");
    let run = IndexRun::new(project.id, Some(source.id));

    let files = Arc::new(InMemoryFiles::default());
    files.upsert(&file).await.unwrap();

    let symbols = Arc::new(InMemorySymbols::default());
    let column_references = Arc::new(InMemoryColumnReferences::default());
    let raw_references = Arc::new(InMemoryRawReferences::default());
    let parse_errors = Arc::new(InMemoryParseErrors::default());
    let runs = Arc::new(InMemoryRuns::default());
    runs.insert(&run).await.unwrap();
    {
        let mut run = runs.get(run.id).await.unwrap();
        run.start().unwrap();
        run.set_total_chunks(1);
        runs.save(&run).await.unwrap();
    }
    let blobs = Arc::new(InMemoryBlobs::default());
    blobs.put(&file.path, b"class Widget {}").await.unwrap();
    let queue = Arc::new(InMemoryQueue::default());

    let worker = ParseWorker::new(
        files.clone(),
        symbols.clone(),
        column_references,
        raw_references.clone(),
        parse_errors.clone(),
        runs.clone(),
        blobs,
        queue.clone(),
        registry(),
    );

    worker
        .process_chunk(run.id, project.id, &[file.id])
        .await
        .unwrap();

    let stored_symbols = symbols.list_for_project(project.id).await.unwrap();
    assert_eq!(stored_symbols.len(), 1);
    assert_eq!(stored_symbols[0].qualified_name, "Acme.Widget");

    let staged = raw_references.list_for_project(project.id).await.unwrap();
    assert_eq!(staged.len(), 1);
    assert_eq!(staged[0].from_symbol, Some(stored_symbols[0].id));

    let errors = parse_errors.list_for_project(project.id).await.unwrap();
    assert_eq!(errors.len(), 1);

    let refreshed_file = files.get(file.id).await.unwrap();
    assert!(refreshed_file.last_indexed_at.is_some());

    // The lone chunk just drained, so exactly one parse_complete fires.
    let ingest_messages = queue.drain_ingest();
    assert_eq!(ingest_messages.len(), 1);
}
