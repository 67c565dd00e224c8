//! Chunking: splits page-segmented document text into overlapping passages.

mod window;

pub use window::WindowChunker;

use crate::document::Document;
use crate::error::{DocentError, Result};
use serde::{Deserialize, Serialize};

/// A contiguous excerpt of one page of the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Passage {
    /// Text content of this passage.
    pub text: String,
    /// 1-based page the passage was cut from.
    pub source_page: usize,
    /// Start and end offsets in the page text, counted in chars.
    pub char_span: (usize, usize),
}

impl Passage {
    /// Create a new passage.
    pub fn new(text: String, source_page: usize, char_span: (usize, usize)) -> Self {
        Self {
            text,
            source_page,
            char_span,
        }
    }

    /// Length in chars.
    pub fn len(&self) -> usize {
        self.char_span.1 - self.char_span.0
    }

    /// True for a passage that spans no chars.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Configuration for chunking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Maximum passage length in chars.
    pub chunk_size: usize,
    /// Chars repeated at the start of the following passage.
    pub overlap: usize,
}

impl ChunkingConfig {
    /// Create a validated chunking configuration.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(DocentError::InvalidInput(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if overlap >= chunk_size {
            return Err(DocentError::InvalidInput(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            overlap,
        })
    }

    /// Distance between the starts of consecutive windows.
    pub fn stride(&self) -> usize {
        self.chunk_size - self.overlap
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
        }
    }
}

/// Trait for chunking implementations.
pub trait Chunker: Send + Sync {
    /// Split a document into passages, in reading order.
    fn split(&self, document: &Document, config: &ChunkingConfig) -> Result<Vec<Passage>>;
}

/// Split a document with the default fixed-window chunker.
pub fn split(document: &Document, chunk_size: usize, overlap: usize) -> Result<Vec<Passage>> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    WindowChunker::new().split(document, &config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(ChunkingConfig::new(0, 0).is_err());
        assert!(ChunkingConfig::new(100, 100).is_err());
        assert!(ChunkingConfig::new(100, 150).is_err());
        assert_eq!(ChunkingConfig::new(100, 20).unwrap().stride(), 80);
    }

    #[test]
    fn test_split_rejects_bad_overlap() {
        let doc = Document::from_pages(["text"]);
        assert!(matches!(
            split(&doc, 10, 10),
            Err(DocentError::InvalidInput(_))
        ));
    }
}
