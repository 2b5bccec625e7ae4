//! Embed stage (§4.8): builds deterministic per-symbol text and sends
//! it to the configured [`Embedder`] in bounded, parallel batches.

use std::sync::Arc;

use futures::stream::{self, StreamExt, TryStreamExt};
use mcb_domain::error::Result;
use mcb_domain::ports::{Embedder, EmbeddingInput, SymbolRepository};
use mcb_domain::{Symbol, SymbolKind};
use tracing::info;

use crate::use_cases::orchestrator::RunContext;

/// Upper bound on in-flight `embed_batch` calls (§4.8).
const MAX_IN_FLIGHT_BATCHES: usize = 4;

/// Builds the deterministic embedding text for one symbol from
/// `(kind, qualified_name, signature, doc_comment)` (§4.8).
#[must_use]
pub fn embedding_text(symbol: &Symbol) -> String {
    let mut text = match symbol.kind {
        SymbolKind::Table | SymbolKind::View => {
            format!("{} {}", symbol.kind, symbol.qualified_name)
        }
        SymbolKind::Procedure | SymbolKind::Function | SymbolKind::Method => {
            let signature = symbol.signature.as_deref().unwrap_or("");
            format!("{} {}{signature}", symbol.kind, symbol.qualified_name)
        }
        _ => format!("{} {}", symbol.kind, symbol.qualified_name),
    };
    if let Some(doc) = &symbol.doc_comment {
        text.push('\n');
        text.push_str(doc);
    }
    text
}

/// Turns Symbols into vectors via a pluggable [`Embedder`] (§4.8).
pub struct EmbedStage {
    symbols: Arc<dyn SymbolRepository>,
    embedder: Arc<dyn Embedder>,
}

impl EmbedStage {
    #[must_use]
    pub fn new(symbols: Arc<dyn SymbolRepository>, embedder: Arc<dyn Embedder>) -> Self {
        Self { symbols, embedder }
    }

    pub async fn run(&self, ctx: &RunContext) -> Result<()> {
        let symbols = self.symbols.list_for_project(ctx.project_id).await?;
        if symbols.is_empty() {
            return Ok(());
        }

        let batch_size = self.embedder.max_batch_size().clamp(1, 100);
        let batches: Vec<Vec<EmbeddingInput>> = symbols
            .chunks(batch_size)
            .map(|chunk| {
                chunk
                    .iter()
                    .map(|s| EmbeddingInput {
                        symbol_id: s.id,
                        text: embedding_text(s),
                    })
                    .collect()
            })
            .collect();

        let total_batches = batches.len();
        let mut patches = Vec::with_capacity(symbols.len());
        let outputs: Vec<_> = stream::iter(batches.into_iter().map(|batch| async move {
            self.embedder.embed_batch(&batch).await
        }))
        .buffer_unordered(MAX_IN_FLIGHT_BATCHES)
        .try_collect()
        .await?;

        for batch in outputs {
            for output in batch {
                patches.push((
                    output.symbol_id,
                    serde_json::json!({ "embedding": output.vector }),
                ));
            }
        }
        if !patches.is_empty() {
            self.symbols.patch_metadata_batch(&patches).await?;
        }

        info!(
            project_id = %ctx.project_id,
            symbols = symbols.len(),
            batches = total_batches,
            "embed stage complete"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcb_domain::{FileId, Language, ProjectId};

    #[test]
    fn embedding_text_includes_kind_and_qualified_name() {
        let symbol = Symbol::new(
            ProjectId::new(),
            FileId::new(),
            "Users",
            "dbo.Users",
            SymbolKind::Table,
            Language::TSql,
            1,
            10,
        );
        let text = embedding_text(&symbol);
        assert!(text.contains("table"));
        assert!(text.contains("dbo.Users"));
    }

    #[test]
    fn embedding_text_appends_doc_comment_when_present() {
        let mut symbol = Symbol::new(
            ProjectId::new(),
            FileId::new(),
            "GetUser",
            "Api.Users.GetUser",
            SymbolKind::Method,
            Language::CSharp,
            1,
            5,
        );
        symbol.doc_comment = Some("Fetches a user by id.".to_owned());
        let text = embedding_text(&symbol);
        assert!(text.ends_with("Fetches a user by id."));
    }
}
