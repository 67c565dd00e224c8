//! Plain-text document loading.
//!
//! Pages are separated by form feed (`\x0C`), the convention used by
//! `pdftotext` and most text exports of paginated documents.

use super::{Document, DocumentLoader};
use crate::error::{DocentError, Result};
use std::path::Path;
use tracing::debug;

/// Page separator in plain-text exports.
pub const PAGE_BREAK: char = '\x0C';

/// Loader for `.txt` / `.md` files.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl TextLoader {
    /// Split raw text into pages. A trailing page break does not start a new page.
    pub fn split_pages(content: &str) -> Document {
        if content.is_empty() {
            return Document::default();
        }

        let mut pages: Vec<&str> = content.split(PAGE_BREAK).collect();
        if pages.len() > 1 && pages.last().is_some_and(|p| p.is_empty()) {
            pages.pop();
        }
        Document::from_pages(pages)
    }
}

impl DocumentLoader for TextLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            DocentError::DocumentLoad(format!("failed to read {}: {}", path.display(), e))
        })?;

        let document = Self::split_pages(&content);
        debug!(
            "Loaded {} pages from {}",
            document.page_count(),
            path.display()
        );
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_pages() {
        let doc = TextLoader::split_pages("A\x0CB\x0C");
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0].text, "A");
        assert_eq!(doc.pages[1].text, "B");
    }

    #[test]
    fn test_empty_file_has_no_pages() {
        assert_eq!(TextLoader::split_pages("").page_count(), 0);
    }

    #[test]
    fn test_no_page_breaks_is_one_page() {
        let doc = TextLoader::split_pages("just one page\nwith two lines");
        assert_eq!(doc.page_count(), 1);
        assert_eq!(doc.pages[0].text, "just one page\nwith two lines");
    }

    #[test]
    fn test_non_utf8_is_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0xfd]).unwrap();

        assert!(matches!(
            TextLoader.load(&path),
            Err(DocentError::DocumentLoad(_))
        ));
    }
}
