//! Query-time retrieval: embed the question, search the index.

use crate::embedding::Embedder;
use crate::error::Result;
use crate::vector_index::{SearchResult, VectorIndex};
use std::sync::Arc;
use tracing::debug;

/// Retrieves the passages most similar to a query.
pub struct Retriever {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    min_score: Option<f32>,
}

impl Retriever {
    /// Create a new retriever over a built index.
    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            index,
            embedder,
            min_score: None,
        }
    }

    /// Set the minimum similarity score threshold.
    pub fn with_min_score(mut self, min_score: Option<f32>) -> Self {
        self.min_score = min_score;
        self
    }

    /// Return up to `k` passages for `query`, best first.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedder.embed_one(query).await?;

        let results = match self.min_score {
            Some(min_score) => self
                .index
                .search_with_threshold(&query_embedding, k, min_score)?,
            None => self.index.search(&query_embedding, k)?,
        };

        debug!("Retrieved {} passages", results.len());
        Ok(results)
    }
}
