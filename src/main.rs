// ==============================================================================
// main.rs - Variant Extractor Entry Point
// ==============================================================================
// Description: Command-line front end for rsID-based genotype extraction
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-17
// Version: 1.1.0
// ==============================================================================

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use variant_extractor::output::{self, OutputFormat, OutputLayout};
use variant_extractor::processor::{ExtractionRequest, TargetSource, VariantExtractor};

#[derive(Parser, Debug)]
#[command(author, version, about = "Extract a user's genotype calls for a list of rsIDs", long_about = None)]
struct Args {
    /// Tab-separated genotype export (.tsv/.txt/.csv, optionally .gz)
    #[arg(short, long, env = "VARIANT_EXTRACTOR_INPUT")]
    input: PathBuf,

    /// User ID used to locate the genotype column (e.g. IG1234)
    #[arg(short, long, env = "VARIANT_EXTRACTOR_USER_ID")]
    user_id: String,

    /// File with target rsIDs (takes precedence over --variants)
    #[arg(long)]
    variants_file: Option<PathBuf>,

    /// Target rsIDs as text, separated by newlines, commas or spaces
    #[arg(long)]
    variants: Option<String>,

    /// Header of the rsID column (auto-detected when omitted)
    #[arg(long, env = "VARIANT_EXTRACTOR_ID_COLUMN")]
    id_column: Option<String>,

    /// Directory for export files
    #[arg(short, long, env = "VARIANT_EXTRACTOR_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Export formats (tsv, json, parquet); repeatable
    #[arg(short, long = "format", default_value = "tsv")]
    formats: Vec<OutputFormat>,

    /// Column layout of the export (full or compact)
    #[arg(long, default_value = "full")]
    layout: OutputLayout,

    /// Maximum accepted input size in megabytes
    #[arg(long, env = "VARIANT_EXTRACTOR_MAX_FILE_SIZE_MB", default_value_t = 500)]
    max_file_size_mb: u64,

    /// Write the extracted table as TSV to stdout
    #[arg(long)]
    stdout: bool,

    /// Print the run report as JSON to stdout
    #[arg(long, conflicts_with = "stdout")]
    report_json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr so --stdout output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "variant_extractor=info,audit=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    info!("Variant Extractor starting...");

    let targets = match (args.variants_file, args.variants) {
        (Some(path), _) => TargetSource::File(path),
        (None, Some(text)) if !text.trim().is_empty() => TargetSource::Text(text),
        _ => anyhow::bail!("No variant list provided. Use --variants-file or --variants"),
    };

    let request = ExtractionRequest {
        table_path: args.input,
        user_id: args.user_id,
        targets,
        id_column: args.id_column,
        layout: args.layout,
        formats: args.formats,
        output_dir: args.output_dir,
    };

    let extractor = VariantExtractor::new(max_file_size_bytes(args.max_file_size_mb)?);
    let outcome = extractor.process(&request)?;

    if args.stdout {
        output::write_tsv(&outcome.table, std::io::stdout().lock())?;
    } else if args.report_json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &outcome.report)?;
        println!();
    } else {
        println!("{}", outcome.report.status);
        for (format, path) in &outcome.report.outputs {
            println!("  {} -> {}", format.extension(), path.display());
        }
        if !outcome.report.unmatched_targets.is_empty() {
            println!(
                "  {} target(s) not present in the table",
                outcome.report.unmatched_targets.len()
            );
        }
    }

    Ok(())
}

fn max_file_size_bytes(megabytes: u64) -> Result<u64> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("--max-file-size-mb too large: {}", megabytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_file_size_bytes() {
        assert_eq!(max_file_size_bytes(500).unwrap(), 500 * 1024 * 1024);
        assert_eq!(max_file_size_bytes(0).unwrap(), 0);
    }

    #[test]
    fn test_max_file_size_overflow_is_rejected() {
        let err = max_file_size_bytes(u64::MAX).unwrap_err();
        assert!(err.to_string().contains("too large"));
    }
}
