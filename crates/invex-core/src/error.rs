//! Error types for the invex-core library.
//!
//! Field extraction itself is total and has no error type; these cover the
//! text sources and configuration around it.

use thiserror::Error;

/// Main error type for the invex library.
#[derive(Error, Debug)]
pub enum InvexError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Text source error.
    #[error("source error: {0}")]
    Source(#[from] SourceError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,
}

/// Errors related to reading document text.
#[derive(Error, Debug)]
pub enum SourceError {
    /// The file extension is not handled by any text source.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// The input file does not exist.
    #[error("input file not found: {0}")]
    NotFound(String),
}

/// Result type for the invex library.
pub type Result<T> = std::result::Result<T, InvexError>;
