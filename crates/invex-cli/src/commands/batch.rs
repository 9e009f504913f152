//! Batch processing command for multiple documents.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use console::style;
use futures_util::stream::{self, StreamExt};
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use rust_decimal::Decimal;
use tracing::{debug, error, warn};

use invex_core::{DocumentKind, DocumentReader, ExtractedFields, FieldExtractor, TextOrigin};

use super::process::{format_fields, OutputFormat};

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory for per-file results
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Number of parallel workers (default: from config)
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,
}

/// Result of processing a single file.
struct ProcessResult {
    path: PathBuf,
    fields: Option<ExtractedFields>,
    origin: Option<TextOrigin>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::load_config(config_path)?;

    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| p.is_file() && DocumentKind::from_path(p) != DocumentKind::Unsupported)
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    let progress = ProgressBar::new(files.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let reader = Arc::new(DocumentReader::from_config(&config));
    let extractor = Arc::new(FieldExtractor::from_config(&config.extraction));
    let jobs = args.jobs.unwrap_or(config.batch.jobs).max(1);
    debug!("Processing {} files with {} workers", files.len(), jobs);

    // Documents are independent, so each one runs on the blocking pool;
    // `buffered` caps concurrency and keeps input order.
    let mut pending = stream::iter(files)
        .map(|path| {
            let reader = Arc::clone(&reader);
            let extractor = Arc::clone(&extractor);
            let progress = progress.clone();
            async move {
                let file_start = Instant::now();
                let task_path = path.clone();
                let outcome = tokio::task::spawn_blocking(move || {
                    process_single_file(&task_path, &reader, &extractor)
                })
                .await;
                progress.inc(1);

                let processing_time_ms = file_start.elapsed().as_millis() as u64;
                match outcome {
                    Ok(Ok((fields, origin))) => ProcessResult {
                        path,
                        fields: Some(fields),
                        origin: Some(origin),
                        error: None,
                        processing_time_ms,
                    },
                    Ok(Err(e)) => ProcessResult {
                        path,
                        fields: None,
                        origin: None,
                        error: Some(format!("{:#}", e)),
                        processing_time_ms,
                    },
                    Err(e) => ProcessResult {
                        path,
                        fields: None,
                        origin: None,
                        error: Some(format!("worker failed: {}", e)),
                        processing_time_ms,
                    },
                }
            }
        })
        .buffered(jobs);

    let mut results = Vec::new();
    while let Some(result) = pending.next().await {
        if let Some(error_msg) = &result.error {
            if args.continue_on_error {
                warn!("Failed to process {}: {}", result.path.display(), error_msg);
            } else {
                progress.abandon();
                error!("Failed to process {}: {}", result.path.display(), error_msg);
                anyhow::bail!("Processing failed: {}", error_msg);
            }
        }
        results.push(result);
    }

    progress.finish_with_message("Complete");

    let successful: Vec<_> = results.iter().filter(|r| r.fields.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for result in &successful {
        let Some(fields) = &result.fields else { continue };

        match &args.output_dir {
            Some(output_dir) => {
                let output_path = output_dir.join(output_file_name(&result.path, args.format));

                fs::write(&output_path, format_fields(fields, args.format, config.output.pretty)?)?;
                debug!("Wrote output to {}", output_path.display());
            }
            None => {
                println!(
                    "  {}: {} | {} | {}",
                    result.path.display(),
                    fields.invoice_number.as_deref().unwrap_or("-"),
                    fields.invoice_date.as_deref().unwrap_or("-"),
                    fields.total_amount.as_deref().unwrap_or("-"),
                );
            }
        }
    }

    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed",
        style(successful.len()).green(),
        style(failed.len()).red()
    );

    let (total, counted) = sum_totals(successful.iter().filter_map(|r| r.fields.as_ref()));
    if counted > 0 {
        println!("   Sum of {} totals: {}", counted, total);
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for result in &failed {
            println!(
                "  - {}: {}",
                result.path.display(),
                result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &Path,
    reader: &DocumentReader,
    extractor: &FieldExtractor,
) -> anyhow::Result<(ExtractedFields, TextOrigin)> {
    let document = reader.read(path)?;
    if document.text.trim().is_empty() {
        warn!("No text extracted from {}", path.display());
    }

    Ok((extractor.extract(&document.text), document.origin))
}

/// Per-file output name. The source extension is kept so `a.txt` and `a.pdf`
/// in one batch write `a.txt.json` and `a.pdf.json`.
fn output_file_name(path: &Path, format: OutputFormat) -> String {
    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("invoice");
    format!("{}.{}", name, format.extension())
}

/// Sum the parseable total amounts, returning the sum and how many were added.
fn sum_totals<'a>(fields: impl Iterator<Item = &'a ExtractedFields>) -> (Decimal, usize) {
    fields
        .filter_map(|f| f.total_amount_value())
        .fold((Decimal::ZERO, 0), |(sum, n), v| (sum + v, n + 1))
}

fn origin_label(origin: Option<TextOrigin>) -> &'static str {
    match origin {
        Some(TextOrigin::Plain) => "text",
        Some(TextOrigin::Embedded) => "pdf",
        Some(TextOrigin::Ocr) => "ocr",
        Some(TextOrigin::Unavailable) => "none",
        None => "",
    }
}

fn write_summary(path: &Path, results: &[ProcessResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "text_source",
        "invoice_number",
        "invoice_date",
        "total_amount",
        "processing_time_ms",
        "error",
    ])?;

    for result in results {
        let filename = result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        let processing_time = result.processing_time_ms.to_string();

        if let Some(fields) = &result.fields {
            wtr.write_record([
                filename,
                "success",
                origin_label(result.origin),
                fields.invoice_number.as_deref().unwrap_or(""),
                fields.invoice_date.as_deref().unwrap_or(""),
                fields.total_amount.as_deref().unwrap_or(""),
                processing_time.as_str(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                processing_time.as_str(),
                result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn with_total(total: Option<&str>) -> ExtractedFields {
        ExtractedFields {
            total_amount: total.map(String::from),
            ..Default::default()
        }
    }

    #[test]
    fn test_sum_totals_skips_missing() {
        let fields = [
            with_total(Some("1,000.50")),
            with_total(None),
            with_total(Some("2.25")),
        ];
        let (sum, counted) = sum_totals(fields.iter());
        assert_eq!(sum, Decimal::from_str("1002.75").unwrap());
        assert_eq!(counted, 2);
    }

    #[test]
    fn test_output_file_name_keeps_source_extension() {
        let text = output_file_name(Path::new("inbox/a.txt"), OutputFormat::Json);
        let pdf = output_file_name(Path::new("inbox/a.pdf"), OutputFormat::Json);

        assert_eq!(text, "a.txt.json");
        assert_eq!(pdf, "a.pdf.json");
        assert_ne!(text, pdf);
        assert_eq!(output_file_name(Path::new("scan.png"), OutputFormat::Csv), "scan.png.csv");
    }

    #[test]
    fn test_write_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        let results = vec![
            ProcessResult {
                path: PathBuf::from("a.txt"),
                fields: Some(ExtractedFields {
                    invoice_number: Some("A-1".to_string()),
                    invoice_date: Some("01/02/2025".to_string()),
                    total_amount: Some("9.99".to_string()),
                }),
                origin: Some(TextOrigin::Plain),
                error: None,
                processing_time_ms: 1,
            },
            ProcessResult {
                path: PathBuf::from("b.pdf"),
                fields: None,
                origin: None,
                error: Some("broken".to_string()),
                processing_time_ms: 2,
            },
        ];

        write_summary(&path, &results).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1], "a.txt,success,text,A-1,01/02/2025,9.99,1,");
        assert_eq!(lines[2], "b.pdf,error,,,,,2,broken");
    }
}
