//! PDF embedded-text extraction using lopdf and pdf-extract.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, warn};

use super::TextSource;
use crate::error::{PdfError, Result};

/// A loaded PDF document.
pub struct PdfDocument {
    document: Document,
    raw_data: Vec<u8>,
}

impl PdfDocument {
    /// Load a PDF from bytes, decrypting documents with an empty password.
    pub fn load(data: &[u8]) -> std::result::Result<Self, PdfError> {
        let mut document = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        let raw_data = if document.is_encrypted() {
            if document.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads bytes, so hand it the decrypted document
            let mut decrypted = Vec::new();
            document
                .save_to(&mut decrypted)
                .map_err(|e| PdfError::Parse(format!("failed to save decrypted PDF: {}", e)))?;
            decrypted
        } else {
            data.to_vec()
        };

        if document.get_pages().is_empty() {
            return Err(PdfError::NoPages);
        }

        Ok(Self { document, raw_data })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.document.get_pages().len() as u32
    }

    /// Extract the embedded text of all pages.
    pub fn extract_text(&self) -> std::result::Result<String, PdfError> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }
}

/// Text source for PDFs with embedded text.
///
/// Scanned PDFs without a text layer yield an empty string.
#[derive(Debug, Clone)]
pub struct PdfTextSource {
    min_text_length: usize,
}

impl PdfTextSource {
    pub fn new() -> Self {
        Self { min_text_length: 1 }
    }

    /// Treat embedded text shorter than `length` (after trimming) as absent.
    pub fn with_min_text_length(mut self, length: usize) -> Self {
        self.min_text_length = length;
        self
    }
}

impl Default for PdfTextSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TextSource for PdfTextSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        let data = std::fs::read(path)?;
        let pdf = PdfDocument::load(&data)?;
        let text = pdf.extract_text()?;

        let length = text.trim().chars().count();
        debug!("PDF {} has {} pages, {} chars of text", path.display(), pdf.page_count(), length);

        if length < self.min_text_length {
            warn!("No embedded text found in {}", path.display());
            return Ok(String::new());
        }

        Ok(text)
    }
}
