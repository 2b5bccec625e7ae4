//! Instrumented Embedder decorator: wraps an [`Embedder`] to emit
//! timing spans for every `embed_batch` call, without modifying
//! provider implementations (SOLID Open/Closed).

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use delegate::delegate;
use mcb_domain::error::Result;
use mcb_domain::ports::{Embedder, EmbeddingInput, EmbeddingOutput};
use tracing::info;

/// Records batch size and elapsed time around the wrapped provider's
/// `embed_batch` calls.
pub struct InstrumentedEmbedder {
    inner: Arc<dyn Embedder>,
}

impl InstrumentedEmbedder {
    #[must_use]
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Embedder for InstrumentedEmbedder {
    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<EmbeddingOutput>> {
        let start = Instant::now();
        let result = self.inner.embed_batch(inputs).await;
        info!(
            provider = self.inner.name(),
            batch_size = inputs.len(),
            ok = result.is_ok(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "embed_batch"
        );
        result
    }

    delegate! {
        to self.inner {
            fn name(&self) -> &'static str;
            fn max_batch_size(&self) -> usize;
        }
    }
}
