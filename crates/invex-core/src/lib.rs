//! Core library for invoice field extraction.
//!
//! This crate provides:
//! - Rule-based extraction of invoice number, date and total amount from raw text
//! - Text sources for plain text, PDF embedded text and external OCR
//! - Configuration shared with the CLI

pub mod error;
pub mod extract;
pub mod models;
pub mod source;

pub use error::{InvexError, Result};
pub use extract::{extract_fields, FieldExtractor, FieldMatch, Rule};
pub use models::config::InvexConfig;
pub use models::fields::{ExtractedFields, Field};
pub use source::{DocumentKind, DocumentReader, DocumentText, TextOrigin, TextSource};
