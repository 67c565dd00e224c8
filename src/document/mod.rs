//! Document loading: turns a file on disk into page-segmented plain text.

mod pdf;
mod text;

pub use pdf::PdfLoader;
pub use text::TextLoader;

use crate::error::{DocentError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single page of extracted text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based page number.
    pub number: usize,
    /// Plain text of the page.
    pub text: String,
}

/// A loaded document: ordered pages of plain text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Document {
    pub pages: Vec<Page>,
}

impl Document {
    /// Build a document from page texts, numbering pages from 1.
    pub fn from_pages<I, S>(pages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pages: pages
                .into_iter()
                .enumerate()
                .map(|(i, text)| Page {
                    number: i + 1,
                    text: text.into(),
                })
                .collect(),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Total characters across all pages.
    pub fn char_count(&self) -> usize {
        self.pages.iter().map(|p| p.text.chars().count()).sum()
    }

    /// Fail unless the document has at least one page with some text.
    pub fn ensure_readable(&self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(DocentError::DocumentLoad(
                "document contains no pages".to_string(),
            ));
        }
        if self.pages.iter().all(|p| p.text.trim().is_empty()) {
            return Err(DocentError::DocumentLoad(
                "document contains no extractable text (scanned or image-only?)".to_string(),
            ));
        }
        Ok(())
    }
}

/// Trait for document loaders.
pub trait DocumentLoader: Send + Sync {
    /// Read and parse the document at `path`.
    fn load(&self, path: &Path) -> Result<Document>;
}

/// Loader that dispatches on file extension: `.pdf` to [`PdfLoader`],
/// everything else to [`TextLoader`].
#[derive(Debug, Default, Clone, Copy)]
pub struct FileLoader;

impl FileLoader {
    pub fn new() -> Self {
        Self
    }

    fn is_pdf(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false)
    }
}

impl DocumentLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        if !path.exists() {
            return Err(DocentError::DocumentLoad(format!(
                "file not found: {}",
                path.display()
            )));
        }

        if Self::is_pdf(path) {
            PdfLoader.load(path)
        } else {
            TextLoader.load(path)
        }
    }
}
