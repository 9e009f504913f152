//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{InvexError, Result};

/// Main configuration for the invex pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InvexConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// PDF text configuration.
    pub pdf: PdfConfig,

    /// External OCR configuration.
    pub ocr: OcrConfig,

    /// Output configuration.
    pub output: OutputConfig,

    /// Batch processing configuration.
    pub batch: BatchConfig,
}

/// Field extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Accept any token after a bare "Invoice" marker when the
    /// "Invoice No." / "Invoice #" form is absent.
    pub loose_invoice_number: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            loose_invoice_number: true,
        }
    }
}

/// PDF text configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum trimmed length for embedded text to count as present.
    pub min_text_length: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self { min_text_length: 1 }
    }
}

/// External OCR program configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrConfig {
    /// Program invoked as `<command> <input> stdout`. `None` disables OCR.
    pub command: Option<String>,

    /// Language passed with `-l`, if any.
    pub language: Option<String>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            command: Some("tesseract".to_string()),
            language: None,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Pretty-print JSON output.
    pub pretty: bool,

    /// Directory for saved results.
    pub directory: PathBuf,

    /// Add a timestamp to saved result file names.
    pub timestamped_names: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            pretty: true,
            directory: PathBuf::from("processed"),
            timestamped_names: true,
        }
    }
}

/// Batch processing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Number of documents processed in parallel.
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

impl InvexConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| InvexError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| InvexError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load from `path` if given, otherwise from `fallback` if it exists,
    /// otherwise use defaults.
    pub fn load_or_default(path: Option<&Path>, fallback: Option<&Path>) -> Result<Self> {
        match (path, fallback) {
            (Some(path), _) => Self::from_file(path),
            (None, Some(fallback)) if fallback.exists() => Self::from_file(fallback),
            _ => Ok(Self::default()),
        }
    }
}
