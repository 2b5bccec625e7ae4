//! Embedder port (§4.8): the Embed stage's pluggable capability for
//! turning symbol text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// One symbol's deterministic text representation, built from
/// `(kind, qualified_name, signature, doc_comment)` (§4.8).
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub symbol_id: crate::value_objects::SymbolId,
    pub text: String,
}

/// A symbol's embedding vector.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub symbol_id: crate::value_objects::SymbolId,
    pub vector: Vec<f32>,
}

/// External embedding provider, called in batches (provider chunk size
/// 96-100, §4.8). Implementations: Bedrock/Cohere, OpenRouter/
/// OpenAI-compatible.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name, for logging and metrics correlation.
    fn name(&self) -> &'static str;

    /// Maximum inputs per batch call; callers must chunk accordingly.
    fn max_batch_size(&self) -> usize;

    /// Embed one batch. The output order corresponds to the input order.
    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<EmbeddingOutput>>;
}
