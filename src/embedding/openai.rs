//! OpenAI-compatible embeddings implementation.

use super::{embed_in_batches, Embedder};
use crate::error::{DocentError, Result};
use crate::openai::{create_client, is_transient};
use crate::retry::RetryPolicy;
use async_openai::types::{CreateEmbeddingRequestArgs, EmbeddingInput};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

/// Largest batch the OpenAI embeddings endpoint accepts comfortably.
const DEFAULT_BATCH_SIZE: usize = 100;

/// Embedder backed by an OpenAI-compatible `/embeddings` endpoint.
pub struct OpenAIEmbedder {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_concurrent: usize,
    retry: RetryPolicy,
}

impl OpenAIEmbedder {
    /// Create a new embedder for `model` producing `dimensions`-long vectors.
    pub fn new(
        api_base: Option<&str>,
        api_key: &str,
        model: &str,
        dimensions: usize,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client(api_base, api_key, timeout)?,
            model: model.to_string(),
            dimensions,
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent: 1,
            retry: RetryPolicy::default(),
        })
    }

    /// Set the batch size and the number of batch requests in flight.
    pub fn with_batching(mut self, batch_size: usize, max_concurrent: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Set the retry policy applied to each batch request.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Only the text-embedding-3 family accepts a `dimensions` parameter.
    fn supports_dimensions(&self) -> bool {
        self.model.starts_with("text-embedding-3")
    }

    async fn request(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut args = CreateEmbeddingRequestArgs::default();
        args.model(&self.model)
            .input(EmbeddingInput::StringArray(batch.to_vec()));
        if self.supports_dimensions() {
            args.dimensions(self.dimensions as u32);
        }
        let request = args
            .build()
            .map_err(|e| DocentError::embedding(format!("Failed to build request: {}", e)))?;

        let response = self.client.embeddings().create(request).await.map_err(|e| {
            let message = format!("Embedding API error: {}", e);
            if is_transient(&e) {
                DocentError::embedding_transient(message)
            } else {
                DocentError::embedding(message)
            }
        })?;

        // Sort by index to ensure correct order
        let mut embeddings: Vec<_> = response.data.into_iter().collect();
        embeddings.sort_by_key(|e| e.index);

        Ok(embeddings.into_iter().map(|e| e.embedding).collect())
    }

    async fn embed_batch(&self, batch: &[String]) -> Result<Vec<Vec<f32>>> {
        self.retry
            .run("OpenAI embedding request", || self.request(batch))
            .await
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Generating embeddings for {} texts", texts.len());

        let embeddings = embed_in_batches(texts, self.batch_size, self.max_concurrent, |batch| {
            self.embed_batch(batch)
        })
        .await?;

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
