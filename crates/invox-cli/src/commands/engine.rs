//! Engine command - inspect the configured OCR engine.

use std::path::Path;

use clap::{Args, Subcommand};
use console::style;
use glob::glob;

use invox_core::{OcrConfig, OcrInvoker};

use super::load_config;

/// File extension of Tesseract language data.
const LANGUAGE_DATA_EXT: &str = "traineddata";

/// Arguments for the engine command.
#[derive(Args)]
pub struct EngineArgs {
    #[command(subcommand)]
    command: Option<EngineCommand>,
}

#[derive(Subcommand)]
enum EngineCommand {
    /// Show engine configuration and availability (default)
    Status,

    /// List language data installed in the engine data directory
    Languages,
}

pub async fn run(args: EngineArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(config_path)?;

    match args.command.unwrap_or(EngineCommand::Status) {
        EngineCommand::Status => show_status(&config.ocr),
        EngineCommand::Languages => list_languages(&config.ocr),
    }
}

fn show_status(ocr: &OcrConfig) -> anyhow::Result<()> {
    let invoker = OcrInvoker::new(ocr.clone());

    println!("{}", style("OCR Engine").bold());
    println!();
    println!("  Executable: {}", ocr.executable.display());
    match invoker.check_executable() {
        Ok(()) => println!("  Status:     {}", style("available").green()),
        Err(e) => println!("  Status:     {} ({})", style("unavailable").red(), e),
    }

    let data_status = if ocr.data_path.is_dir() {
        style("found").green()
    } else {
        style("missing").yellow()
    };
    println!("  Data path:  {} [{}]", ocr.data_path.display(), data_status);
    println!("  Language:   {}", ocr.language);
    println!("  DPI:        {}", ocr.dpi);
    println!("  PSM:        {}", ocr.psm);
    println!("  Timeout:    {}ms", ocr.timeout_ms);
    println!("  Text cap:   {} bytes", ocr.max_text_bytes);
    if let Some(temp_dir) = &ocr.temp_dir {
        println!("  Temp root:  {}", temp_dir.display());
    }
    if !ocr.env.is_empty() {
        println!("  Extra env:");
        for (key, value) in &ocr.env {
            println!("    {}={}", key, value);
        }
    }

    let installed = installed_languages(&ocr.data_path);
    let missing: Vec<&str> = ocr
        .language
        .split('+')
        .filter(|lang| !installed.iter().any(|l| l == lang))
        .collect();
    if ocr.data_path.is_dir() && !missing.is_empty() {
        println!();
        println!(
            "{} No language data for: {}",
            style("⚠").yellow(),
            missing.join(", ")
        );
    }

    Ok(())
}

fn list_languages(ocr: &OcrConfig) -> anyhow::Result<()> {
    if !ocr.data_path.is_dir() {
        anyhow::bail!("Engine data directory not found: {}", ocr.data_path.display());
    }

    let languages = installed_languages(&ocr.data_path);
    if languages.is_empty() {
        println!("No language data found in {}", ocr.data_path.display());
        return Ok(());
    }

    for lang in &languages {
        let marker = if ocr.language.split('+').any(|l| l == lang.as_str()) {
            style("*").green().to_string()
        } else {
            " ".to_string()
        };
        println!("{} {}", marker, lang);
    }

    Ok(())
}

/// Language codes with a `<code>.traineddata` file under `data_path`.
fn installed_languages(data_path: &Path) -> Vec<String> {
    let pattern = data_path.join(format!("*.{}", LANGUAGE_DATA_EXT));
    let Some(pattern) = pattern.to_str() else {
        return Vec::new();
    };

    let mut languages: Vec<String> = match glob(pattern) {
        Ok(paths) => paths
            .filter_map(|r| r.ok())
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect(),
        Err(_) => Vec::new(),
    };
    languages.sort();
    languages
}
