//! In-memory vector index over passage embeddings.
//!
//! The index is built once from a complete set of `(Passage, vector)` pairs
//! and is read-only afterwards. Search is an exact scan over every entry.

mod similarity;

pub use similarity::{cosine_similarity, magnitude};

use crate::chunking::Passage;
use crate::error::{DocentError, Result};
use serde::Serialize;
use similarity::cosine_with_norms;
use std::cmp::Ordering;

/// A passage stored in the index together with its embedding.
#[derive(Debug, Clone)]
pub struct IndexEntry {
    /// Insertion position, stable for the lifetime of the index.
    pub id: usize,
    /// The embedded passage.
    pub passage: Passage,
    /// Embedding vector.
    pub embedding: Vec<f32>,
    norm: f32,
}

/// A search result with score.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// Id of the matched entry.
    pub id: usize,
    /// The matched passage.
    pub passage: Passage,
    /// Cosine similarity to the query (higher is better).
    pub score: f32,
}

/// Immutable brute-force cosine similarity index.
#[derive(Debug)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index. Every vector must have the same, non-zero length and a
    /// non-zero magnitude.
    pub fn build(entries: Vec<(Passage, Vec<f32>)>) -> Result<Self> {
        let dimensions = match entries.first() {
            Some((_, v)) => v.len(),
            None => return Err(DocentError::EmptyIndex),
        };
        if dimensions == 0 {
            return Err(DocentError::DimensionMismatch(
                "embedding vectors must not be empty".to_string(),
            ));
        }

        let entries = entries
            .into_iter()
            .enumerate()
            .map(|(id, (passage, embedding))| {
                if embedding.len() != dimensions {
                    return Err(DocentError::DimensionMismatch(format!(
                        "entry {} has {} dimensions, expected {}",
                        id,
                        embedding.len(),
                        dimensions
                    )));
                }
                let norm = magnitude(&embedding);
                if norm == 0.0 || !norm.is_finite() {
                    return Err(DocentError::DimensionMismatch(format!(
                        "entry {} has a zero or non-finite magnitude",
                        id
                    )));
                }
                Ok(IndexEntry {
                    id,
                    passage,
                    embedding,
                    norm,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            entries,
            dimensions,
        })
    }

    /// Number of indexed entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Dimensionality shared by every vector in the index.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Return up to `k` entries most similar to `query`, best first.
    /// Equal scores keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        self.search_with_threshold(query, k, f32::NEG_INFINITY)
    }

    /// Like [`search`](Self::search) but drops results scoring below `min_score`.
    pub fn search_with_threshold(
        &self,
        query: &[f32],
        k: usize,
        min_score: f32,
    ) -> Result<Vec<SearchResult>> {
        if k == 0 {
            return Err(DocentError::InvalidInput(
                "k must be greater than zero".to_string(),
            ));
        }
        if query.len() != self.dimensions {
            return Err(DocentError::DimensionMismatch(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }
        let query_norm = magnitude(query);
        if query_norm == 0.0 || !query_norm.is_finite() {
            return Err(DocentError::DimensionMismatch(
                "query vector has zero magnitude".to_string(),
            ));
        }

        let mut scored: Vec<(usize, f32)> = self
            .entries
            .iter()
            .map(|entry| {
                let score = cosine_with_norms(&entry.embedding, query, entry.norm, query_norm);
                (entry.id, score)
            })
            .filter(|(_, score)| *score >= min_score)
            .collect();

        // Stable sort: ties stay in insertion order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(scored
            .into_iter()
            .map(|(id, score)| SearchResult {
                id,
                passage: self.entries[id].passage.clone(),
                score,
            })
            .collect())
    }
}
