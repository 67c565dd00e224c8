//! Embedding generation for passages and queries.

mod gemini;
mod openai;

pub use gemini::{GeminiEmbedder, TaskType};
pub use openai::OpenAIEmbedder;

use crate::config::{EmbeddingProvider, EmbeddingSettings};
use crate::error::{DocentError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embeddings for many texts. Output order matches input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Generate an embedding for a single query.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocentError::embedding("Empty embedding response"))
    }

    /// Get the embedding dimensions.
    fn dimensions(&self) -> usize;
}

/// Create the embedder named by the settings.
pub fn create_embedder(
    settings: &EmbeddingSettings,
    api_key: &str,
    timeout: Duration,
    retry: RetryPolicy,
) -> Result<Arc<dyn Embedder>> {
    let embedder: Arc<dyn Embedder> = match settings.provider {
        EmbeddingProvider::Gemini => Arc::new(
            GeminiEmbedder::new(api_key, &settings.model, settings.dimensions as usize, timeout)?
                .with_api_base(settings.api_base.as_deref())
                .with_batching(settings.batch_size, settings.max_concurrent_requests)
                .with_retry(retry),
        ),
        EmbeddingProvider::OpenAI => Arc::new(
            OpenAIEmbedder::new(
                settings.api_base.as_deref(),
                api_key,
                &settings.model,
                settings.dimensions as usize,
                timeout,
            )?
            .with_batching(settings.batch_size, settings.max_concurrent_requests)
            .with_retry(retry),
        ),
    };
    Ok(embedder)
}

/// Split `texts` into batches, run up to `concurrency` batch requests at a time,
/// and stitch the results back together in input order.
pub(crate) async fn embed_in_batches<'a, F, Fut>(
    texts: &'a [String],
    batch_size: usize,
    concurrency: usize,
    embed_batch: F,
) -> Result<Vec<Vec<f32>>>
where
    F: Fn(&'a [String]) -> Fut,
    Fut: Future<Output = Result<Vec<Vec<f32>>>>,
{
    if texts.is_empty() {
        return Ok(Vec::new());
    }

    let batch_futures: Vec<_> = texts
        .chunks(batch_size.max(1))
        .map(|batch| {
            let fut = embed_batch(batch);
            async move {
                let embeddings = fut.await?;
                if embeddings.len() != batch.len() {
                    return Err(DocentError::embedding(format!(
                        "service returned {} embeddings for {} inputs",
                        embeddings.len(),
                        batch.len()
                    )));
                }
                Ok(embeddings)
            }
        })
        .collect();

    let batches: Vec<Vec<Vec<f32>>> = stream::iter(batch_futures)
        .buffered(concurrency.max(1))
        .try_collect()
        .await?;

    Ok(batches.into_iter().flatten().collect())
}
