//! OCR through an external command-line program.

use std::path::Path;
use std::process::Command;

use tracing::{debug, warn};

use super::TextSource;
use crate::error::Result;
use crate::models::config::OcrConfig;

/// Runs `<program> <image> stdout [-l <language>]` and reads the
/// recognized text from stdout. This is the tesseract calling convention.
///
/// OCR failures never surface as errors: a missing program or a non-zero
/// exit status yields an empty string.
#[derive(Debug, Clone)]
pub struct OcrCommandSource {
    program: String,
    language: Option<String>,
}

impl OcrCommandSource {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Build from configuration; `None` when OCR is disabled.
    pub fn from_config(config: &OcrConfig) -> Option<Self> {
        let program = config.command.as_deref()?.trim();
        if program.is_empty() {
            return None;
        }

        let source = Self::new(program);
        Some(match &config.language {
            Some(language) => source.with_language(language),
            None => source,
        })
    }

    fn command(&self, path: &Path) -> Command {
        let mut command = Command::new(&self.program);
        command.arg(path).arg("stdout");
        if let Some(language) = &self.language {
            command.arg("-l").arg(language);
        }
        command
    }
}

impl TextSource for OcrCommandSource {
    fn read_text(&self, path: &Path) -> Result<String> {
        debug!("Running {} on {}", self.program, path.display());

        let output = match self.command(path).output() {
            Ok(output) => output,
            Err(e) => {
                warn!("OCR not available ({}): {}", self.program, e);
                return Ok(String::new());
            }
        };

        if !output.status.success() {
            warn!(
                "OCR failed for {} ({}): {}",
                path.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return Ok(String::new());
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert!(OcrCommandSource::from_config(&OcrConfig::default()).is_some());

        let disabled = OcrConfig {
            command: None,
            language: None,
        };
        assert!(OcrCommandSource::from_config(&disabled).is_none());

        let blank = OcrConfig {
            command: Some("  ".to_string()),
            language: None,
        };
        assert!(OcrCommandSource::from_config(&blank).is_none());
    }

    #[test]
    fn test_missing_program_yields_empty_text() {
        let source = OcrCommandSource::new("invex-no-such-ocr-program");
        let text = source.read_text(Path::new("scan.png")).unwrap();
        assert_eq!(text, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_failing_program_yields_empty_text() {
        let source = OcrCommandSource::new("false");
        let text = source.read_text(Path::new("scan.png")).unwrap();
        assert_eq!(text, "");
    }

    #[cfg(unix)]
    #[test]
    fn test_reads_stdout() {
        let source = OcrCommandSource::new("echo").with_language("eng");
        let text = source.read_text(Path::new("scan.png")).unwrap();
        assert_eq!(text.trim(), "scan.png stdout -l eng");
    }
}
