//! Embedder adapter (§2 "Embedder", §4.7, §7 "Embedding"): a `reqwest`
//! client against an OpenAI/OpenRouter-compatible `/embeddings`
//! endpoint, retrying 5xx/overload responses with exponential backoff
//! before giving up on a batch.

use std::time::Duration;

use async_trait::async_trait;
use mcb_domain::error::{Error, Result};
use mcb_domain::ports::{Embedder, EmbeddingInput, EmbeddingOutput};
use serde::{Deserialize, Serialize};

const MAX_RETRIES: u32 = 3;
const INITIAL_BACKOFF_MILLIS: u64 = 500;

/// Connection details for an OpenAI/OpenRouter-compatible embeddings
/// endpoint. Populated from `mcb-infrastructure`'s `EmbedConfig` by the
/// composition root, kept as its own type here so this crate doesn't
/// need to depend on `mcb-infrastructure`.
#[derive(Debug, Clone)]
pub struct EmbedderConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub batch_size: usize,
    pub timeout_secs: u64,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

/// OpenAI/OpenRouter-compatible embedding client.
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbedderConfig,
}

impl HttpEmbedder {
    /// Builds the client, failing if `config.timeout_secs` can't be
    /// turned into a valid request timeout.
    pub fn new(config: EmbedderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::embedding_with_source("building http client", e))?;
        Ok(Self { client, config })
    }

    async fn embed_one_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/embeddings", self.config.base_url.trim_end_matches('/'));
        let body = EmbeddingRequest { model: &self.config.model, input: texts.to_vec() };

        let mut last_error = None;
        for attempt in 0..=MAX_RETRIES {
            let response = self
                .client
                .post(&url)
                .bearer_auth(&self.config.api_key)
                .json(&body)
                .send()
                .await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let parsed: EmbeddingResponse = resp
                        .json()
                        .await
                        .map_err(|e| Error::embedding_with_source("decoding embedding response", e))?;
                    return Ok(parsed.data.into_iter().map(|d| d.embedding).collect());
                }
                Ok(resp) if resp.status().is_server_error() || resp.status().as_u16() == 429 => {
                    last_error = Some(format!("embedding provider returned {}", resp.status()));
                }
                Ok(resp) => {
                    return Err(Error::embedding_with_source(
                        format!("embedding provider returned {}", resp.status()),
                        std::io::Error::other(resp.status().to_string()),
                    ));
                }
                Err(e) => last_error = Some(e.to_string()),
            }

            if attempt < MAX_RETRIES {
                let backoff = INITIAL_BACKOFF_MILLIS * 2u64.pow(attempt);
                tracing::warn!(attempt, backoff_ms = backoff, error = ?last_error, "retrying embedding request");
                tokio::time::sleep(Duration::from_millis(backoff)).await;
            }
        }

        Err(Error::embedding_with_source(
            last_error.unwrap_or_else(|| "embedding provider exhausted retries".to_owned()),
            std::io::Error::other("retries exhausted"),
        ))
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &'static str {
        "http_embedder"
    }

    fn max_batch_size(&self) -> usize {
        self.config.batch_size
    }

    async fn embed_batch(&self, inputs: &[EmbeddingInput]) -> Result<Vec<EmbeddingOutput>> {
        let mut outputs = Vec::with_capacity(inputs.len());
        for chunk in inputs.chunks(self.max_batch_size()) {
            let texts: Vec<&str> = chunk.iter().map(|i| i.text.as_str()).collect();
            let vectors = self.embed_one_batch(&texts).await?;
            for (input, vector) in chunk.iter().zip(vectors) {
                outputs.push(EmbeddingOutput { symbol_id: input.symbol_id.clone(), vector });
            }
        }
        Ok(outputs)
    }
}
