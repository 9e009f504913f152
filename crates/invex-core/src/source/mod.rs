//! Document text sources.
//!
//! Sources turn a file into raw text for the extractor. Degraded inputs
//! (a scanned PDF without a text layer, an image with no OCR available)
//! produce empty text rather than an error; only unreadable files fail.

mod ocr;
mod pdf;

pub use ocr::OcrCommandSource;
pub use pdf::{PdfDocument, PdfTextSource};

use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, SourceError};
use crate::models::config::InvexConfig;

/// Trait for producing raw text from a document file.
pub trait TextSource {
    /// Read the text of the document at `path`.
    fn read_text(&self, path: &Path) -> Result<String>;
}

/// Kind of input document, decided by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Plain text, e.g. OCR output saved earlier.
    Text,
    /// PDF with (possibly) embedded text.
    Pdf,
    /// Raster image that needs OCR.
    Image,
    /// Anything else.
    Unsupported,
}

impl DocumentKind {
    /// Detect the kind from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "txt" | "text" => DocumentKind::Text,
            "pdf" => DocumentKind::Pdf,
            "png" | "jpg" | "jpeg" | "tiff" | "tif" | "bmp" => DocumentKind::Image,
            _ => DocumentKind::Unsupported,
        }
    }
}

/// Where the text of a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextOrigin {
    /// Read from a text file or stdin.
    Plain,
    /// Embedded PDF text layer.
    Embedded,
    /// External OCR program.
    Ocr,
    /// No source could produce text.
    Unavailable,
}

/// Text read from a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentText {
    pub kind: DocumentKind,
    pub origin: TextOrigin,
    pub text: String,
}

impl DocumentText {
    /// Wrap text that did not come from a file (e.g. stdin).
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            kind: DocumentKind::Text,
            origin: TextOrigin::Plain,
            text: text.into(),
        }
    }
}

/// Reads plain UTF-8 text files. Invalid UTF-8 is replaced, not rejected.
#[derive(Debug, Clone, Default)]
pub struct PlainTextSource;

impl TextSource for PlainTextSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        let bytes = std::fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Picks a text source per document kind.
#[derive(Debug, Clone, Default)]
pub struct DocumentReader {
    plain: PlainTextSource,
    pdf: PdfTextSource,
    ocr: Option<OcrCommandSource>,
}

impl DocumentReader {
    /// Create a reader with the given OCR source, if any.
    pub fn new(pdf: PdfTextSource, ocr: Option<OcrCommandSource>) -> Self {
        Self {
            plain: PlainTextSource,
            pdf,
            ocr,
        }
    }

    /// Create a reader from configuration.
    pub fn from_config(config: &InvexConfig) -> Self {
        Self::new(
            PdfTextSource::new().with_min_text_length(config.pdf.min_text_length),
            OcrCommandSource::from_config(&config.ocr),
        )
    }

    /// Read the text of a document.
    pub fn read(&self, path: &Path) -> Result<DocumentText> {
        if !path.exists() {
            return Err(SourceError::NotFound(path.display().to_string()).into());
        }

        let kind = DocumentKind::from_path(path);
        debug!("Reading {} as {:?}", path.display(), kind);

        let (origin, text) = match kind {
            DocumentKind::Text => (TextOrigin::Plain, self.plain.read_text(path)?),
            DocumentKind::Pdf => {
                let text = self.pdf.read_text(path)?;
                if text.is_empty() {
                    // Scanned PDFs need page rendering before OCR, which is not done here
                    warn!("{} has no text layer; OCR of scanned PDFs is not supported", path.display());
                    (TextOrigin::Unavailable, text)
                } else {
                    (TextOrigin::Embedded, text)
                }
            }
            DocumentKind::Image => match &self.ocr {
                Some(ocr) => {
                    let text = ocr.read_text(path)?;
                    if text.trim().is_empty() {
                        (TextOrigin::Unavailable, String::new())
                    } else {
                        (TextOrigin::Ocr, text)
                    }
                }
                None => {
                    warn!("OCR is disabled; no text for {}", path.display());
                    (TextOrigin::Unavailable, String::new())
                }
            },
            DocumentKind::Unsupported => {
                let extension = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .unwrap_or("")
                    .to_string();
                return Err(SourceError::UnsupportedFormat(extension).into());
            }
        };

        Ok(DocumentText { kind, origin, text })
    }
}
