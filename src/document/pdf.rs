//! PDF document loading via `pdf-extract`.

use super::{Document, DocumentLoader};
use crate::error::{DocentError, Result};
use std::path::Path;
use tracing::{debug, warn};

/// Loader for PDF files, one [`super::Page`] per PDF page.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfLoader;

impl PdfLoader {
    /// Extract page-segmented text from PDF bytes.
    pub fn extract(bytes: &[u8]) -> Result<Document> {
        let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
            .map_err(|e| DocentError::DocumentLoad(format!("PDF extraction failed: {}", e)))?;
        Ok(Document::from_pages(pages))
    }
}

impl DocumentLoader for PdfLoader {
    fn load(&self, path: &Path) -> Result<Document> {
        let bytes = std::fs::read(path).map_err(|e| {
            DocentError::DocumentLoad(format!("failed to read {}: {}", path.display(), e))
        })?;

        let document = Self::extract(&bytes)?;

        let chars = document.char_count();
        if chars == 0 {
            warn!(
                "PDF {:?} produced no text; it may be scanned or image-based",
                path.file_name().unwrap_or_default()
            );
        }
        debug!(
            "Extracted {} pages ({} chars) from {}",
            document.page_count(),
            chars,
            path.display()
        );

        Ok(document)
    }
}
