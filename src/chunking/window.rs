//! Fixed-size sliding-window chunking.
//!
//! Splits each page into windows of `chunk_size` chars whose starts are
//! `chunk_size - overlap` apart. Windows never cross a page boundary.

use super::{Chunker, ChunkingConfig, Passage};
use crate::document::Document;
use crate::error::Result;
use std::iter;

/// Sliding-window chunker.
pub struct WindowChunker;

impl WindowChunker {
    /// Create a new window chunker.
    pub fn new() -> Self {
        Self
    }

    /// Split a single page's text into windows.
    fn split_page(text: &str, page: usize, config: &ChunkingConfig) -> Vec<Passage> {
        // Byte offset of every char start, plus the end of the string.
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .chain(iter::once(text.len()))
            .collect();
        let char_len = bounds.len() - 1;

        let mut passages = Vec::with_capacity(char_len / config.stride() + 1);
        let mut start = 0;

        loop {
            let end = (start + config.chunk_size).min(char_len);
            passages.push(Passage::new(
                text[bounds[start]..bounds[end]].to_string(),
                page,
                (start, end),
            ));

            if end == char_len {
                break;
            }
            start += config.stride();
        }

        passages
    }
}

impl Default for WindowChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl Chunker for WindowChunker {
    fn split(&self, document: &Document, config: &ChunkingConfig) -> Result<Vec<Passage>> {
        let passages = document
            .pages
            .iter()
            .filter(|page| !page.text.trim().is_empty())
            .flat_map(|page| Self::split_page(&page.text, page.number, config))
            .collect();

        Ok(passages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, overlap: usize) -> ChunkingConfig {
        ChunkingConfig::new(chunk_size, overlap).unwrap()
    }

    /// Rebuild a page from its passages by dropping each repeated prefix.
    fn reconstruct(passages: &[Passage], overlap: usize) -> String {
        let mut out = String::new();
        for (i, p) in passages.iter().enumerate() {
            if i == 0 {
                out.push_str(&p.text);
            } else {
                out.extend(p.text.chars().skip(overlap));
            }
        }
        out
    }

    #[test]
    fn test_two_page_handbook() {
        let doc = Document::from_pages(["A".repeat(1500), "B".repeat(500)]);
        let passages = WindowChunker::new().split(&doc, &config(1000, 200)).unwrap();

        assert_eq!(passages.len(), 3);
        assert_eq!(passages[0].text.len(), 1000);
        assert_eq!(passages[0].source_page, 1);
        assert_eq!(passages[0].char_span, (0, 1000));
        assert_eq!(passages[1].text.len(), 700);
        assert_eq!(passages[1].source_page, 1);
        assert_eq!(passages[1].char_span, (800, 1500));
        assert_eq!(passages[2].text.len(), 500);
        assert_eq!(passages[2].source_page, 2);
        assert_eq!(passages[2].char_span, (0, 500));
    }

    #[test]
    fn test_short_page_is_single_passage() {
        let doc = Document::from_pages(["Attendance is mandatory."]);
        let passages = WindowChunker::new().split(&doc, &config(1000, 200)).unwrap();

        assert_eq!(passages.len(), 1);
        assert_eq!(passages[0].text, "Attendance is mandatory.");
    }

    #[test]
    fn test_page_exactly_chunk_size() {
        let doc = Document::from_pages(["x".repeat(1000)]);
        let passages = WindowChunker::new().split(&doc, &config(1000, 200)).unwrap();
        assert_eq!(passages.len(), 1);
    }

    #[test]
    fn test_deterministic() {
        let text: String = (0..5000).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let doc = Document::from_pages([text.clone(), text]);
        let chunker = WindowChunker::new();

        let first = chunker.split(&doc, &config(300, 50)).unwrap();
        let second = chunker.split(&doc, &config(300, 50)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_consecutive_passages_share_overlap() {
        let text: String = (0..2345).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let doc = Document::from_pages([text]);

        for (size, overlap) in [(100, 0), (100, 1), (100, 37), (250, 249), (1000, 200)] {
            let passages = WindowChunker::new()
                .split(&doc, &config(size, overlap))
                .unwrap();

            for pair in passages.windows(2) {
                let tail: String = pair[0]
                    .text
                    .chars()
                    .skip(pair[0].len() - overlap)
                    .collect();
                let head: String = pair[1].text.chars().take(overlap).collect();
                assert_eq!(tail, head, "size={} overlap={}", size, overlap);
            }
        }
    }

    #[test]
    fn test_passages_reconstruct_page() {
        let page = "The grading policy uses letter grades. ".repeat(80);
        let doc = Document::from_pages([page.clone()]);

        for (size, overlap) in [(64, 0), (64, 16), (500, 499), (1000, 200)] {
            let passages = WindowChunker::new()
                .split(&doc, &config(size, overlap))
                .unwrap();
            assert_eq!(reconstruct(&passages, overlap), page);
        }
    }

    #[test]
    fn test_multibyte_text_is_split_on_chars() {
        let page = "é".repeat(25) + &"日本".repeat(10);
        let doc = Document::from_pages([page.clone()]);
        let passages = WindowChunker::new().split(&doc, &config(10, 3)).unwrap();

        assert!(passages.iter().all(|p| p.text.chars().count() <= 10));
        assert_eq!(reconstruct(&passages, 3), page);
        assert_eq!(passages.last().unwrap().char_span.1, 45);
    }

    #[test]
    fn test_blank_pages_are_skipped() {
        let doc = Document::from_pages(["Intro", "  \n ", "Rules"]);
        let passages = WindowChunker::new().split(&doc, &config(1000, 200)).unwrap();

        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].source_page, 1);
        assert_eq!(passages[1].source_page, 3);
    }
}
