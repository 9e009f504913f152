//! Process command - extract fields from a single document.

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Instant;

use chrono::Local;
use clap::Args;
use console::style;
use serde::Serialize;
use tracing::{debug, info};

use invex_core::models::config::OutputConfig;
use invex_core::{DocumentReader, DocumentText, ExtractedFields, FieldExtractor};

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (text, PDF or image), or "-" for stdin
    #[arg(required = true)]
    input: String,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Print the extracted text to stderr
    #[arg(long)]
    show_text: bool,

    /// Print which rule matched each field to stderr
    #[arg(long)]
    explain: bool,

    /// Also save JSON and CSV results to the configured output directory
    #[arg(long)]
    save: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

/// Export view of the fields with display names as keys.
#[derive(Serialize)]
struct ExportRecord<'a> {
    #[serde(rename = "Invoice Number")]
    invoice_number: Option<&'a str>,
    #[serde(rename = "Invoice Date")]
    invoice_date: Option<&'a str>,
    #[serde(rename = "Total Amount")]
    total_amount: Option<&'a str>,
}

impl<'a> From<&'a ExtractedFields> for ExportRecord<'a> {
    fn from(fields: &'a ExtractedFields) -> Self {
        Self {
            invoice_number: fields.invoice_number.as_deref(),
            invoice_date: fields.invoice_date.as_deref(),
            total_amount: fields.total_amount.as_deref(),
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let document = if args.input == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text)?;
        DocumentText::plain(text)
    } else {
        let path = Path::new(&args.input);
        info!("Processing file: {}", path.display());
        DocumentReader::from_config(&config).read(path)?
    };

    debug!(
        "Read {} chars of {:?} text ({:?})",
        document.text.len(),
        document.kind,
        document.origin
    );

    if args.show_text {
        eprintln!("{}", style("Extracted text:").bold());
        if document.text.trim().is_empty() {
            eprintln!("{}", style("No text could be extracted.").yellow());
        } else {
            eprintln!("{}", document.text);
        }
        eprintln!();
    } else if document.text.trim().is_empty() {
        eprintln!(
            "{} No text could be extracted from {}",
            style("⚠").yellow(),
            args.input
        );
    }

    let extractor = FieldExtractor::from_config(&config.extraction);

    if args.explain {
        for m in extractor.explain(&document.text) {
            eprintln!(
                "{} {} = {:?} (rule {}, bytes {}..{})",
                style("ℹ").blue(),
                m.field,
                m.value,
                m.rule,
                m.position.0,
                m.position.1
            );
        }
    }

    let fields = extractor.extract(&document.text);
    let output = format_fields(&fields, args.format, config.output.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.save {
        for path in save_results(&fields, &config.output)? {
            println!("{} Saved {}", style("✓").green(), path.display());
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Render fields in the given output format.
pub fn format_fields(
    fields: &ExtractedFields,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => format_json(fields, pretty),
        OutputFormat::Csv => format_csv(fields),
        OutputFormat::Text => Ok(format_text(fields)),
    }
}

fn format_json(fields: &ExtractedFields, pretty: bool) -> anyhow::Result<String> {
    let record = ExportRecord::from(fields);
    if pretty {
        Ok(serde_json::to_string_pretty(&record)?)
    } else {
        Ok(serde_json::to_string(&record)?)
    }
}

fn format_csv(fields: &ExtractedFields) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.serialize(ExportRecord::from(fields))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

fn format_text(fields: &ExtractedFields) -> String {
    let mut output = String::new();
    for (name, value) in fields.display_pairs() {
        output.push_str(&format!("{}: {}\n", name, value.unwrap_or("-")));
    }
    output
}

/// Write JSON and CSV copies of the fields into the output directory.
pub fn save_results(fields: &ExtractedFields, config: &OutputConfig) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(&config.directory)?;

    let stem = if config.timestamped_names {
        format!("invoice_{}", Local::now().format("%Y%m%d_%H%M%S"))
    } else {
        "invoice".to_string()
    };

    let mut written = Vec::with_capacity(2);
    for format in [OutputFormat::Json, OutputFormat::Csv] {
        let path = config.directory.join(format!("{}.{}", stem, format.extension()));
        fs::write(&path, format_fields(fields, format, config.pretty)?)?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ExtractedFields {
        ExtractedFields {
            invoice_number: Some("ABC-99".to_string()),
            invoice_date: None,
            total_amount: Some("1,234.56".to_string()),
        }
    }

    #[test]
    fn test_format_json_uses_display_keys() {
        let json = format_fields(&sample(), OutputFormat::Json, false).unwrap();
        assert_eq!(
            json,
            r#"{"Invoice Number":"ABC-99","Invoice Date":null,"Total Amount":"1,234.56"}"#
        );
    }

    #[test]
    fn test_format_csv() {
        let csv = format_fields(&sample(), OutputFormat::Csv, false).unwrap();
        assert_eq!(
            csv,
            "Invoice Number,Invoice Date,Total Amount\nABC-99,,\"1,234.56\"\n"
        );
    }

    #[test]
    fn test_format_text() {
        let text = format_fields(&sample(), OutputFormat::Text, false).unwrap();
        assert_eq!(
            text,
            "Invoice Number: ABC-99\nInvoice Date: -\nTotal Amount: 1,234.56\n"
        );
    }

    #[test]
    fn test_save_results() {
        let dir = tempfile::tempdir().unwrap();
        let config = OutputConfig {
            pretty: false,
            directory: dir.path().join("processed"),
            timestamped_names: false,
        };

        let written = save_results(&sample(), &config).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("invoice.json"));
        assert!(written[1].ends_with("invoice.csv"));
        assert!(fs::read_to_string(&written[0]).unwrap().contains("ABC-99"));
    }
}
