//! Process command - extract data from a single invoice file.

use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use invox_core::invoice::rules::format_amount;
use invox_core::{ExtractionPipeline, InvoiceExtraction, OcrError, RawDocument};

use super::load_config;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input file (PDF or image, or text with --text-input)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// Treat the input as already recognized text and skip OCR
    #[arg(long)]
    text_input: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Show extraction confidence scores
    #[arg(long)]
    show_confidence: bool,

    /// Validate extracted data
    #[arg(long)]
    validate: bool,
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
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
            OutputFormat::Text => "txt",
        }
    }
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = load_config(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    info!("Processing file: {}", args.input.display());

    let pipeline = ExtractionPipeline::from_config(&config);

    let extraction = if args.text_input {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("Failed to read {}", args.input.display()))?;
        let mut extraction = pipeline.extract_from_text(text);
        extraction.metadata.source_path = Some(args.input.clone());
        extraction
    } else {
        let document = RawDocument::from_path(&args.input);
        if !document.is_supported() {
            anyhow::bail!(
                "Unsupported file format: {} (use --text-input for text files)",
                args.input.display()
            );
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Running OCR...");

        let result = pipeline.extract(&document).await;
        pb.finish_and_clear();

        result.map_err(|e| {
            let hint = match &e {
                invox_core::ExtractionError::Failed {
                    cause: OcrError::EngineUnavailable { .. },
                } => "\n\nInstall Tesseract or run 'invox config set ocr.executable <path>'.",
                _ => "",
            };
            anyhow::anyhow!("{}{}", e, hint)
        })?
    };

    if args.validate {
        let issues = extraction.validate();
        if !issues.is_empty() {
            eprintln!("{}", style("Validation issues:").yellow());
            for issue in &issues {
                eprintln!("  - {}", issue);
            }
        }
    }

    let output = format_extraction(&extraction, args.format, args.pretty)?;

    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        eprintln!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output.trim_end());
    }

    if args.show_confidence {
        eprintln!();
        eprintln!(
            "{} Extraction confidence: {:.1}%",
            style("ℹ").blue(),
            extraction.confidence() * 100.0
        );
        for field in extraction.missing_fields() {
            eprintln!("  {} {}", style("missing").yellow(), field);
        }
        eprintln!(
            "{} Processing time: {}ms",
            style("ℹ").blue(),
            extraction.metadata.processing_time_ms
        );
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

pub fn format_extraction(
    extraction: &InvoiceExtraction,
    format: OutputFormat,
    pretty: bool,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json if pretty => Ok(serde_json::to_string_pretty(extraction)?),
        OutputFormat::Json => Ok(serde_json::to_string(extraction)?),
        OutputFormat::Csv => format_csv(extraction),
        OutputFormat::Text => Ok(format_text(extraction)),
    }
}

/// Header columns shared by the per-file CSV and the batch summary.
pub const CSV_FIELDS: [&str; 7] = [
    "invoice_number",
    "vendor",
    "invoice_date",
    "due_date",
    "total_amount",
    "line_items",
    "confidence",
];

/// Values for [`CSV_FIELDS`]; missing fields are empty cells.
pub fn csv_values(extraction: &InvoiceExtraction) -> [String; 7] {
    [
        extraction
            .invoice_number
            .as_ref()
            .map(|f| f.value.clone())
            .unwrap_or_default(),
        extraction
            .vendor
            .as_ref()
            .map(|f| f.value.clone())
            .unwrap_or_default(),
        extraction
            .invoice_date
            .as_ref()
            .map(|f| f.value.to_string())
            .unwrap_or_default(),
        extraction
            .due_date
            .as_ref()
            .map(|f| f.value.to_string())
            .unwrap_or_default(),
        extraction
            .total_amount
            .as_ref()
            .map(|f| f.value.to_string())
            .unwrap_or_default(),
        extraction.line_items.len().to_string(),
        format!("{:.2}", extraction.confidence()),
    ]
}

fn format_csv(extraction: &InvoiceExtraction) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_FIELDS)?;
    wtr.write_record(csv_values(extraction))?;

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(extraction: &InvoiceExtraction) -> String {
    fn or_dash(value: Option<String>) -> String {
        value.unwrap_or_else(|| "-".to_string())
    }

    let mut output = String::new();

    let _ = writeln!(
        output,
        "Invoice:  {}",
        or_dash(extraction.invoice_number.as_ref().map(|f| f.value.clone()))
    );
    let _ = writeln!(
        output,
        "Vendor:   {}",
        or_dash(extraction.vendor.as_ref().map(|f| f.value.clone()))
    );
    let _ = writeln!(
        output,
        "Date:     {}",
        or_dash(extraction.invoice_date.as_ref().map(|f| f.value.to_string()))
    );
    let _ = writeln!(
        output,
        "Due:      {}",
        or_dash(extraction.due_date.as_ref().map(|f| f.value.to_string()))
    );
    let _ = writeln!(
        output,
        "Total:    {}",
        or_dash(extraction.total_amount.as_ref().map(|f| format_amount(f.value)))
    );

    if !extraction.line_items.is_empty() {
        output.push_str("\nLine items:\n");
        for item in &extraction.line_items {
            let _ = writeln!(
                output,
                "  {:<30} {:>6} x {:>10} = {:>12}",
                item.description(),
                item.quantity(),
                format_amount(item.unit_price()),
                format_amount(item.total())
            );
        }
        let _ = writeln!(
            output,
            "  Items total: {}",
            format_amount(extraction.line_items_total())
        );
    }

    if !extraction.metadata.warnings.is_empty() {
        output.push_str("\nWarnings:\n");
        for warning in &extraction.metadata.warnings {
            let _ = writeln!(output, "  - {}", warning);
        }
    }

    output
}
