//! Google Generative Language embeddings implementation.
//!
//! Calls `models/{model}:batchEmbedContents`, which accepts up to 100 texts per
//! request and returns one vector per text in request order.

use super::{embed_in_batches, Embedder};
use crate::error::{DocentError, Result};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const MAX_BATCH_SIZE: usize = 100;

/// How the embedding will be used; Gemini models embed documents and queries differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskType {
    RetrievalDocument,
    RetrievalQuery,
}

/// Embedder backed by the Gemini API.
pub struct GeminiEmbedder {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
    max_concurrent: usize,
    retry: RetryPolicy,
}

#[derive(Serialize)]
struct BatchEmbedRequest<'a> {
    requests: Vec<EmbedContentRequest<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbedContentRequest<'a> {
    model: &'a str,
    content: Content<'a>,
    task_type: TaskType,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    #[serde(default)]
    embeddings: Vec<ContentEmbedding>,
}

#[derive(Deserialize)]
struct ContentEmbedding {
    values: Vec<f32>,
}

impl GeminiEmbedder {
    /// Create a new Gemini embedder. `model` may be given with or without the `models/` prefix.
    pub fn new(api_key: &str, model: &str, dimensions: usize, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DocentError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            model: Self::normalize_model(model),
            dimensions,
            batch_size: MAX_BATCH_SIZE,
            max_concurrent: 1,
            retry: RetryPolicy::default(),
        })
    }

    /// Override the API base URL (for proxies and tests).
    pub fn with_api_base(mut self, api_base: Option<&str>) -> Self {
        if let Some(base) = api_base {
            self.api_base = base.trim_end_matches('/').to_string();
        }
        self
    }

    /// Set the batch size (capped at 100) and the number of batch requests in flight.
    pub fn with_batching(mut self, batch_size: usize, max_concurrent: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Set the retry policy applied to each batch request.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn normalize_model(model: &str) -> String {
        if model.starts_with("models/") {
            model.to_string()
        } else {
            format!("models/{}", model)
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/{}:batchEmbedContents", self.api_base, self.model)
    }

    fn build_request<'a>(&'a self, batch: &'a [String], task_type: TaskType) -> BatchEmbedRequest<'a> {
        BatchEmbedRequest {
            requests: batch
                .iter()
                .map(|text| EmbedContentRequest {
                    model: &self.model,
                    content: Content {
                        parts: [Part { text }],
                    },
                    task_type,
                })
                .collect(),
        }
    }

    fn should_retry(status: StatusCode) -> bool {
        status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
    }

    async fn request(&self, batch: &[String], task_type: TaskType) -> Result<Vec<Vec<f32>>> {
        let body = self.build_request(batch, task_type);

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let message = format!("Gemini embedding request failed: {}", e);
                if e.is_timeout() || e.is_connect() {
                    DocentError::embedding_transient(message)
                } else {
                    DocentError::embedding(message)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<body unavailable>".to_string());
            let message = format!("Gemini embedding request failed ({}): {}", status, body);
            return Err(if Self::should_retry(status) {
                DocentError::embedding_transient(message)
            } else {
                DocentError::embedding(message)
            });
        }

        let parsed: BatchEmbedResponse = response.json().await.map_err(|e| {
            DocentError::embedding(format!("Failed to parse Gemini embedding response: {}", e))
        })?;

        Ok(parsed.embeddings.into_iter().map(|e| e.values).collect())
    }

    async fn embed_batch(&self, batch: &[String], task_type: TaskType) -> Result<Vec<Vec<f32>>> {
        self.retry
            .run("Gemini embedding request", || self.request(batch, task_type))
            .await
    }
}

#[async_trait]
impl Embedder for GeminiEmbedder {
    #[instrument(skip(self, texts), fields(count = texts.len(), model = %self.model))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        debug!("Generating embeddings for {} texts", texts.len());

        let embeddings = embed_in_batches(texts, self.batch_size, self.max_concurrent, |batch| {
            self.embed_batch(batch, TaskType::RetrievalDocument)
        })
        .await?;

        debug!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let batch = [text.to_string()];
        self.embed_batch(&batch, TaskType::RetrievalQuery)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DocentError::embedding("Empty embedding response"))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedder() -> GeminiEmbedder {
        GeminiEmbedder::new("key", "embedding-001", 768, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_model_prefix_is_added_once() {
        assert_eq!(embedder().model, "models/embedding-001");

        let e = GeminiEmbedder::new("key", "models/text-embedding-004", 768, Duration::from_secs(5))
            .unwrap();
        assert_eq!(e.model, "models/text-embedding-004");
    }

    #[test]
    fn test_endpoint() {
        let e = embedder().with_api_base(Some("http://localhost:8080/v1beta/"));
        assert_eq!(
            e.endpoint(),
            "http://localhost:8080/v1beta/models/embedding-001:batchEmbedContents"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let e = embedder();
        let batch = vec!["What is the attendance policy?".to_string()];
        let body = serde_json::to_value(e.build_request(&batch, TaskType::RetrievalQuery)).unwrap();

        assert_eq!(body["requests"][0]["model"], "models/embedding-001");
        assert_eq!(body["requests"][0]["taskType"], "RETRIEVAL_QUERY");
        assert_eq!(
            body["requests"][0]["content"]["parts"][0]["text"],
            "What is the attendance policy?"
        );
    }

    #[test]
    fn test_retryable_statuses() {
        assert!(GeminiEmbedder::should_retry(StatusCode::TOO_MANY_REQUESTS));
        assert!(GeminiEmbedder::should_retry(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!GeminiEmbedder::should_retry(StatusCode::UNAUTHORIZED));
        assert!(!GeminiEmbedder::should_retry(StatusCode::BAD_REQUEST));
    }

    #[test]
    fn test_batch_size_is_capped() {
        let e = embedder().with_batching(500, 4);
        assert_eq!(e.batch_size, MAX_BATCH_SIZE);
        assert_eq!(e.max_concurrent, 4);
    }

    #[test]
    fn test_response_parsing() {
        let json = r#"{"embeddings":[{"values":[0.1,0.2]},{"values":[0.3,0.4]}]}"#;
        let parsed: BatchEmbedResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.embeddings.len(), 2);
        assert_eq!(parsed.embeddings[1].values, vec![0.3, 0.4]);
    }
}
