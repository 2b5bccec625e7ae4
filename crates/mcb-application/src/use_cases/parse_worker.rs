//! Parse Worker (PW, §4.3): consumes one parse-task message, runs
//! parsers on the chunk's files, and persists per-chunk symbols.

use std::collections::HashMap;
use std::sync::Arc;

use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{
    BlobStore, ColumnReferenceRepository, FileInput, FileRepository, IndexRunRepository,
    IngestMessage, ParseErrorRepository, ParseResult, Queue, RawReferenceRecord,
    RawReferenceRepository, Stream, SymbolRepository,
};
use mcb_domain::{ColumnReference, ParseErrorRecord, ProjectId, Symbol};
use tracing::{info, warn};

use crate::registry::ParserRegistry;

/// Runs the Parser Registry against one chunk's files and commits the
/// results to the Relational Store (§4.3).
pub struct ParseWorker {
    files: Arc<dyn FileRepository>,
    symbols: Arc<dyn SymbolRepository>,
    column_references: Arc<dyn ColumnReferenceRepository>,
    raw_references: Arc<dyn RawReferenceRepository>,
    parse_errors: Arc<dyn ParseErrorRepository>,
    runs: Arc<dyn IndexRunRepository>,
    blobs: Arc<dyn BlobStore>,
    queue: Arc<dyn Queue>,
    registry: Arc<ParserRegistry>,
}

impl ParseWorker {
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        files: Arc<dyn FileRepository>,
        symbols: Arc<dyn SymbolRepository>,
        column_references: Arc<dyn ColumnReferenceRepository>,
        raw_references: Arc<dyn RawReferenceRepository>,
        parse_errors: Arc<dyn ParseErrorRepository>,
        runs: Arc<dyn IndexRunRepository>,
        blobs: Arc<dyn BlobStore>,
        queue: Arc<dyn Queue>,
        registry: Arc<ParserRegistry>,
    ) -> Self {
        Self {
            files,
            symbols,
            column_references,
            raw_references,
            parse_errors,
            runs,
            blobs,
            queue,
            registry,
        }
    }

    /// Process one `parse_chunk` message end to end (§4.3 steps 1-6).
    pub async fn process_chunk(
        &self,
        index_run_id: mcb_domain::IndexRunId,
        project_id: ProjectId,
        file_ids: &[mcb_domain::FileId],
    ) -> Result<()> {
        for file_id in file_ids {
            if let Err(err) = self.process_file(index_run_id, project_id, *file_id).await {
                warn!(%file_id, error = %err, "file processing failed, continuing chunk");
            }
        }
        self.finish_chunk(index_run_id, project_id).await
    }

    async fn process_file(
        &self,
        index_run_id: mcb_domain::IndexRunId,
        project_id: ProjectId,
        file_id: mcb_domain::FileId,
    ) -> Result<()> {
        let mut file = self.files.get(file_id).await?;
        let Some(language) = file.language else {
            return Ok(());
        };
        let extension = format!(
            ".{}",
            file.path.rsplit('.').next().unwrap_or_default().to_lowercase()
        );
        let Some(parser) = self.registry.parser_for_extension(&extension) else {
            info!(%file_id, extension, "no parser registered, skipping");
            return Ok(());
        };

        let content = self.blobs.get(&file.path).await?;
        let input = FileInput {
            path: file.path.clone(),
            content_bytes: content,
            language,
            skip_column_lineage: file.skip_column_lineage,
        };
        let ParseResult {
            symbols,
            references,
            column_references,
            errors,
        } = parser.parse(&input);

        for error in &errors {
            let record = ParseErrorRecord::new(project_id, file_id, error.line, error.message.clone());
            self.parse_errors.insert(&record).await?;
        }

        let mut local_scope: HashMap<String, mcb_domain::SymbolId> = HashMap::new();
        let mut domain_symbols = Vec::with_capacity(symbols.len());
        for raw in &symbols {
            let symbol = Symbol::new(
                project_id,
                file_id,
                raw.name.clone(),
                raw.qualified_name.clone(),
                raw.kind,
                language,
                raw.start_line,
                raw.end_line,
            );
            local_scope.insert(raw.local_id.clone(), symbol.id);
            local_scope.insert(raw.qualified_name.clone(), symbol.id);
            local_scope.insert(raw.name.clone(), symbol.id);
            domain_symbols.push(symbol);
        }
        self.symbols.upsert_batch(&domain_symbols).await?;

        // Rewrite references whose from_symbol resolves locally; the
        // rest are staged with an empty from_symbol for the resolver
        // (§4.5) to pick up later.
        if !references.is_empty() {
            let staged: Vec<RawReferenceRecord> = references
                .into_iter()
                .map(|r| RawReferenceRecord {
                    id: mcb_domain::value_objects::RawReferenceId::new(),
                    project_id,
                    file_id,
                    language,
                    from_symbol: local_scope.get(&r.from_symbol).copied(),
                    to_name: r.to_name,
                    to_qualified: r.to_qualified,
                    reference_type: r.reference_type,
                    confidence: r.confidence,
                    context: r.context,
                })
                .collect();
            self.raw_references.insert_batch(&staged).await?;
        }

        if !file.skip_column_lineage && !column_references.is_empty() {
            let rows: Vec<ColumnReference> = column_references
                .into_iter()
                .map(|raw| {
                    ColumnReference::new(
                        project_id,
                        index_run_id,
                        raw.source_column_fqn,
                        raw.target_column_fqn,
                        raw.derivation_type,
                        raw.line,
                    )
                })
                .collect();
            self.column_references.insert_batch(&rows).await?;
        }

        file.last_indexed_at = Some(chrono::Utc::now());
        self.files.upsert(&file).await?;
        Ok(())
    }

    /// Conditionally decrement `chunks_remaining`; emit exactly one
    /// `parse_complete` resume message when it reaches zero (§4.3).
    async fn finish_chunk(&self, index_run_id: mcb_domain::IndexRunId, project_id: ProjectId) -> Result<()> {
        let remaining = self.runs.decrement_chunks_remaining(index_run_id).await?;
        if remaining == 0 {
            let message = IngestMessage::ParseComplete {
                index_run_id,
                project_id,
            };
            let payload = serde_json::to_vec(&message)
                .map_err(|e| Error::Internal { message: e.to_string() })?;
            self.queue.publish(Stream::Ingest, &payload).await?;
        }
        Ok(())
    }
}
