use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use colored::*;
use j1979da_core::{CatalogSet, Config, Extractor, Severity};
use std::fs;
use std::path::PathBuf;

mod render;

#[derive(Parser)]
#[command(name = "j1979da")]
#[command(about = "Extract PID/InfoType sections from the SAE J1979DA spreadsheet", long_about = None)]
#[command(version)]
struct Cli {
    /// OBD command names to include (comma separated, e.g. "SPEED,RPM,FUEL_RATE")
    #[arg(long, value_delimiter = ',', value_name = "NAME")]
    commands: Vec<String>,

    /// Annex B parameter IDs to include (comma separated, e.g. "0x01,0x0F,0xA6")
    #[arg(long, value_delimiter = ',', value_name = "PID")]
    annex_b: Vec<String>,

    /// Annex G InfoType IDs to include (comma separated)
    #[arg(long, value_delimiter = ',', value_name = "PID")]
    annex_g: Vec<String>,

    /// Excel file of the SAE J1979DA standard
    #[arg(long, default_value = "SAE J1979DA_202104.xlsx", value_name = "FILE")]
    xlsx: PathBuf,

    /// Output document path (overwritten if it already exists)
    #[arg(long, default_value = "SAE-J1979DA.md", value_name = "FILE")]
    out: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "markdown")]
    format: OutputFormat,

    /// Path to extraction configuration file (TOML)
    #[arg(long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Path to a replacement command catalog file (TOML)
    #[arg(long, value_name = "CATALOGS")]
    catalogs: Option<PathBuf>,

    /// Print advisory diagnostics to stderr
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Markdown document with one section per PID
    Markdown,
    /// Full extraction as JSON, diagnostics included
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else {
        // Try to load default config from current directory if it exists
        let default_config_path = PathBuf::from("j1979da.toml");
        if default_config_path.exists() {
            Config::from_file(&default_config_path).with_context(|| {
                format!(
                    "Failed to load config from {}",
                    default_config_path.display()
                )
            })?
        } else {
            Config::default()
        }
    };

    // Load catalogs
    let catalogs = if let Some(catalog_path) = &cli.catalogs {
        CatalogSet::from_file(catalog_path)
            .with_context(|| format!("Failed to load catalogs from {}", catalog_path.display()))?
    } else {
        CatalogSet::builtin()
    };

    if cli.verbose {
        eprintln!("commands: {:?}", cli.commands);
        eprintln!("annex_b: {:?}", cli.annex_b);
        eprintln!("annex_g: {:?}", cli.annex_g);
        eprintln!("xlsx: {}", cli.xlsx.display());
        eprintln!("out: {}", cli.out.display());
    }

    let extractor = Extractor::with_config(config.clone(), catalogs);
    let extraction = extractor
        .extract_file(&cli.xlsx, &cli.commands, &cli.annex_b, &cli.annex_g)
        .with_context(|| format!("Failed to extract from {}", cli.xlsx.display()))?;

    if cli.verbose {
        for diagnostic in &extraction.diagnostics {
            let severity_str = match diagnostic.severity {
                Severity::Warning => "WARN".yellow().bold(),
                Severity::Info => "INFO".blue().bold(),
            };
            eprintln!(
                "{} [{}] {}",
                severity_str,
                diagnostic.code.bright_black(),
                diagnostic.message
            );
        }
    }

    let document = match cli.format {
        OutputFormat::Markdown => render::render_markdown(&extraction, &config, &cli.xlsx),
        OutputFormat::Json => render::render_json(&extraction)?,
    };

    fs::write(&cli.out, document)
        .with_context(|| format!("Failed to write output to {}", cli.out.display()))?;

    println!(
        "✓ Wrote {} ({} parameter, {} InfoType sections)",
        cli.out.display(),
        extraction.selection.parameters.len(),
        extraction.selection.infotypes.len()
    );

    Ok(())
}
