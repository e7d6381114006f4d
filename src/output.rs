// ==============================================================================
// output.rs - Multi-Format Output Generation
// ==============================================================================
// Description: Serializes extracted variants for download (TSV, JSON, Parquet)
// Author: Matt Barham
// Created: 2026-10-13
// Modified: 2026-10-16
// Version: 1.1.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

// Apache Arrow/Parquet for columnar data
use arrow::array::{ArrayRef, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;

use crate::validator::sanitize_filename;
use crate::variant_filter::FilteredResult;

/// Headers tried, in order, for the chromosome column of the compact layout
pub const CHROMOSOME_COLUMNS: &[&str] = &["Chr", "Chromosome", "CHROM", "#CHROM"];

/// Headers tried, in order, for the position column of the compact layout
pub const POSITION_COLUMNS: &[&str] = &["Position", "Pos", "POS", "MapInfo"];

/// Column names of the compact layout
pub const COMPACT_HEADERS: [&str; 4] = ["Variant", "Chr", "Pos", "Genotype"];

/// Supported output formats for download
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Tab-separated text, byte-compatible with the input layout
    Tsv,
    /// JSON (best for web APIs and JavaScript)
    Json,
    /// Apache Parquet (best for data science: Python, R, Spark)
    Parquet,
}

impl OutputFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "tsv",
            OutputFormat::Json => "json",
            OutputFormat::Parquet => "parquet",
        }
    }

    /// Get MIME type for HTTP downloads
    pub fn mime_type(&self) -> &'static str {
        match self {
            OutputFormat::Tsv => "text/tab-separated-values",
            OutputFormat::Json => "application/json",
            OutputFormat::Parquet => "application/vnd.apache.parquet",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tsv" | "txt" => Ok(OutputFormat::Tsv),
            "json" => Ok(OutputFormat::Json),
            "parquet" | "pq" => Ok(OutputFormat::Parquet),
            other => Err(format!("Unknown output format '{}' (expected tsv, json or parquet)", other)),
        }
    }
}

/// Which columns end up in the export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputLayout {
    /// Every input column, original names and order
    #[default]
    Full,
    /// `Variant`, `Chr`, `Pos`, `Genotype` only
    Compact,
}

impl std::str::FromStr for OutputLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "full" => Ok(OutputLayout::Full),
            "compact" => Ok(OutputLayout::Compact),
            other => Err(format!("Unknown layout '{}' (expected full or compact)", other)),
        }
    }
}

/// Header row plus data rows, ready to serialize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    /// Shape a filter result according to `layout`
    pub fn from_result(result: &FilteredResult, layout: OutputLayout) -> Result<Self> {
        match layout {
            OutputLayout::Full => Ok(Self {
                columns: result.headers().to_vec(),
                rows: result.rows().to_vec(),
            }),
            OutputLayout::Compact => Self::compact(result),
        }
    }

    fn compact(result: &FilteredResult) -> Result<Self> {
        let headers = result.headers();
        let find = |names: &[&str], what: &str| -> Result<usize> {
            names
                .iter()
                .find_map(|name| headers.iter().position(|h| h.eq_ignore_ascii_case(name)))
                .ok_or_else(|| {
                    anyhow::anyhow!(
                        "Compact layout needs a {} column (one of {:?}); available: {:?}",
                        what,
                        names,
                        headers
                    )
                })
        };

        let id_idx = headers
            .iter()
            .position(|h| h == result.id_column())
            .context("rsID column missing from result")?;
        let chr_idx = find(CHROMOSOME_COLUMNS, "chromosome")?;
        let pos_idx = find(POSITION_COLUMNS, "position")?;
        let geno_idx = result.genotype_column_index();

        Ok(Self {
            columns: COMPACT_HEADERS.iter().map(|s| s.to_string()).collect(),
            rows: result
                .rows()
                .iter()
                .map(|row| {
                    [id_idx, chr_idx, pos_idx, geno_idx]
                        .iter()
                        .map(|&i| row[i].clone())
                        .collect()
                })
                .collect(),
        })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Write `table` as tab-separated text (header row first)
pub fn write_tsv<W: Write>(table: &ExportTable, writer: W) -> Result<()> {
    let mut tsv = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(writer);

    tsv.write_record(&table.columns)
        .context("Failed to write TSV header")?;
    for row in &table.rows {
        tsv.write_record(row).context("Failed to write TSV row")?;
    }
    tsv.flush().context("Failed to flush TSV output")?;

    Ok(())
}

/// TSV bytes for an in-memory download
pub fn to_tsv_bytes(table: &ExportTable) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_tsv(table, &mut buffer)?;
    Ok(buffer)
}

/// JSON document written for [`OutputFormat::Json`]
#[derive(Debug, Serialize)]
pub struct JsonExport<'a> {
    pub user_id: &'a str,
    pub genotype_column: &'a str,
    pub matched: usize,
    pub columns: &'a [String],
    pub rows: &'a [Vec<String>],
}

/// Writes export files named `extracted_variants_<user>.<ext>`
pub struct OutputGenerator {
    user_id: String,
    output_dir: PathBuf,
}

impl OutputGenerator {
    pub fn new(user_id: String, output_dir: PathBuf) -> Self {
        Self {
            user_id,
            output_dir,
        }
    }

    /// Download file name for `format`
    pub fn file_name(&self, format: OutputFormat) -> Result<String> {
        let safe_user = sanitize_filename(&self.user_id)
            .with_context(|| format!("User ID '{}' cannot be used in a file name", self.user_id))?;
        Ok(format!("extracted_variants_{}.{}", safe_user, format.extension()))
    }

    /// Generate output in specified formats
    ///
    /// # Arguments
    /// * `formats` - List of formats to generate
    /// * `table` - Shaped export table
    /// * `genotype_column` - Header of the resolved genotype column (JSON metadata)
    ///
    /// # Returns
    /// * HashMap of format -> file path
    pub fn generate(
        &self,
        formats: &[OutputFormat],
        table: &ExportTable,
        genotype_column: &str,
    ) -> Result<HashMap<OutputFormat, PathBuf>> {
        std::fs::create_dir_all(&self.output_dir)
            .with_context(|| format!("Failed to create output directory {:?}", self.output_dir))?;

        let mut result = HashMap::new();

        for format in formats {
            let path = self.output_dir.join(self.file_name(*format)?);

            match format {
                OutputFormat::Tsv => self.generate_tsv(&path, table)?,
                OutputFormat::Json => self.generate_json(&path, table, genotype_column)?,
                OutputFormat::Parquet => self.generate_parquet(&path, table)?,
            }

            result.insert(*format, path);
        }

        Ok(result)
    }

    fn generate_tsv(&self, path: &Path, table: &ExportTable) -> Result<()> {
        info!("Generating TSV output: {:?}", path);

        let file = std::fs::File::create(path).context("Failed to create TSV output file")?;
        write_tsv(table, std::io::BufWriter::new(file))?;

        info!("TSV output complete: {} variants", table.row_count());
        Ok(())
    }

    fn generate_json(&self, path: &Path, table: &ExportTable, genotype_column: &str) -> Result<()> {
        info!("Generating JSON output: {:?}", path);

        let file = std::fs::File::create(path).context("Failed to create JSON output file")?;

        let document = JsonExport {
            user_id: &self.user_id,
            genotype_column,
            matched: table.row_count(),
            columns: &table.columns,
            rows: &table.rows,
        };

        serde_json::to_writer_pretty(std::io::BufWriter::new(file), &document)
            .context("Failed to write JSON output")?;

        info!("JSON output complete: {} variants", table.row_count());
        Ok(())
    }

    /// Parquet output; every column is stored as nullable Utf8, empty cells as null
    fn generate_parquet(&self, path: &Path, table: &ExportTable) -> Result<()> {
        info!("Generating Parquet output: {:?}", path);

        let schema = Arc::new(Schema::new(
            table
                .columns
                .iter()
                .map(|name| Field::new(name.as_str(), DataType::Utf8, true))
                .collect::<Vec<_>>(),
        ));

        let arrays: Vec<ArrayRef> = (0..table.columns.len())
            .map(|col| {
                Arc::new(StringArray::from(
                    table
                        .rows
                        .iter()
                        .map(|row| Some(row[col].as_str()).filter(|v| !v.is_empty()))
                        .collect::<Vec<Option<&str>>>(),
                )) as ArrayRef
            })
            .collect();

        let batch = RecordBatch::try_new(schema.clone(), arrays)
            .context("Failed to create Arrow RecordBatch")?;

        let file = std::fs::File::create(path).context("Failed to create Parquet file")?;
        let props = WriterProperties::builder()
            .set_compression(parquet::basic::Compression::SNAPPY)
            .build();

        let mut writer = ArrowWriter::try_new(file, schema, Some(props))
            .context("Failed to create Parquet writer")?;

        writer
            .write(&batch)
            .context("Failed to write Parquet data")?;
        writer.close().context("Failed to close Parquet writer")?;

        info!("Parquet output complete: {} variants", table.row_count());
        Ok(())
    }
}
