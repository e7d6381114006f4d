// ==============================================================================
// processor.rs - Extraction Pipeline
// ==============================================================================
// Description: Validates, loads, resolves, filters and exports one extraction request
// Author: Matt Barham
// Created: 2026-10-13
// Modified: 2026-10-17
// Version: 1.2.0
// ==============================================================================

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audit::{self, AuditEventType};
use crate::column_resolver::resolve_genotype_column;
use crate::models::ResolvedGenotypeColumn;
use crate::output::{ExportTable, OutputFormat, OutputGenerator, OutputLayout};
use crate::parsers::{GenotypeTable, TableReader, TargetVariantList};
use crate::validator::{FileValidator, ValidatedFile};
use crate::variant_filter::{filter_with_targets, FilteredResult};

/// Where the target rsID list comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// Uploaded list file (takes precedence when both are given)
    File(PathBuf),
    /// Pasted text
    Text(String),
}

/// Everything one extraction run needs
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub table_path: PathBuf,
    pub user_id: String,
    pub targets: TargetSource,
    /// rsID column header; auto-detected when `None`
    pub id_column: Option<String>,
    pub layout: OutputLayout,
    pub formats: Vec<OutputFormat>,
    /// No files are written when `None`
    pub output_dir: Option<PathBuf>,
}

/// Summary of a finished run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionReport {
    pub run_id: Uuid,
    pub user_id: String,
    pub input_sha256: String,
    pub rows_scanned: usize,
    pub id_column: String,
    pub genotype_column: ResolvedGenotypeColumn,
    pub targets_requested: usize,
    pub unrecognized_target_lines: usize,
    pub matched: usize,
    pub unmatched_targets: Vec<String>,
    pub outputs: HashMap<OutputFormat, PathBuf>,
    pub status: String,
}

/// Result table plus report, handed to the presentation layer
#[derive(Debug, Clone)]
pub struct ExtractionOutcome {
    pub report: ExtractionReport,
    pub table: ExportTable,
}

pub struct VariantExtractor {
    run_id: Uuid,
    validator: FileValidator,
}

impl VariantExtractor {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            validator: FileValidator::with_max_file_size(max_file_size),
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Main processing pipeline
    pub fn process(&self, request: &ExtractionRequest) -> Result<ExtractionOutcome> {
        let result = self.run(request);

        if let Err(e) = &result {
            warn!("Extraction failed: {:#}", e);
            audit::log_event(
                self.run_id,
                AuditEventType::JobFailed,
                &request.user_id,
                Some(request.table_path.display().to_string()),
                serde_json::json!({ "error": format!("{:#}", e) }),
            );
        }

        result
    }

    fn run(&self, request: &ExtractionRequest) -> Result<ExtractionOutcome> {
        info!("Starting variant extraction run {}", self.run_id);

        let user_id = request.user_id.trim();
        if user_id.is_empty() {
            anyhow::bail!("Please enter a valid user ID");
        }

        // 1. Validate the uploaded table
        let validated = self.validate_input(&request.table_path, user_id)?;

        // 2. Parse target list before the (large) table
        info!("Reading variant list");
        let targets = load_targets(&request.targets)?;
        audit::log_event(
            self.run_id,
            AuditEventType::TargetsParsed,
            user_id,
            None,
            serde_json::json!({
                "targets": targets.len(),
                "unrecognized_lines": targets.unrecognized_lines(),
            }),
        );
        if targets.unrecognized_lines() > 0 {
            warn!(
                "{} line(s) of the variant list contain no recognizable rsID",
                targets.unrecognized_lines()
            );
        }

        // 3. Load the table
        let table = self.load_table(&request.table_path, request.id_column.as_deref(), user_id)?;

        // 4. Resolve the genotype column; failure stops the run
        let column = self.resolve_column(&table, user_id)?;

        // 5. Filter
        let filtered = filter_with_targets(&table, &column.header, &targets)
            .context("Failed to filter variants")?;
        info!("{}", filtered.status_message());
        audit::log_event(
            self.run_id,
            AuditEventType::FilterCompleted,
            user_id,
            None,
            serde_json::json!({
                "rows_scanned": table.row_count(),
                "matched": filtered.row_count(),
                "unmatched_targets": filtered.unmatched_targets().len(),
            }),
        );

        // 6. Export
        let export = ExportTable::from_result(&filtered, request.layout)?;
        let outputs = self.write_outputs(request, user_id, &export, &filtered)?;

        let report = ExtractionReport {
            run_id: self.run_id,
            user_id: user_id.to_string(),
            input_sha256: validated.hash_sha256,
            rows_scanned: table.row_count(),
            id_column: table.id_column().to_string(),
            genotype_column: column,
            targets_requested: targets.len(),
            unrecognized_target_lines: targets.unrecognized_lines(),
            matched: filtered.row_count(),
            unmatched_targets: filtered.unmatched_targets().to_vec(),
            outputs,
            status: filtered.status_message(),
        };

        info!("Extraction run {} complete", self.run_id);
        Ok(ExtractionOutcome {
            report,
            table: export,
        })
    }

    fn validate_input(&self, path: &Path, user_id: &str) -> Result<ValidatedFile> {
        match self.validator.validate_upload(path) {
            Ok(validated) => {
                audit::log_event(
                    self.run_id,
                    AuditEventType::FileValidated,
                    user_id,
                    Some(validated.safe_name.clone()),
                    serde_json::json!({
                        "size": validated.size,
                        "sha256": validated.hash_sha256,
                    }),
                );
                Ok(validated)
            }
            Err(e) => {
                audit::log_event(
                    self.run_id,
                    AuditEventType::FileRejected,
                    user_id,
                    Some(path.display().to_string()),
                    serde_json::json!({ "reason": e.to_string() }),
                );
                Err(e.context("Input file failed validation"))
            }
        }
    }

    fn load_table(&self, path: &Path, id_column: Option<&str>, user_id: &str) -> Result<GenotypeTable> {
        info!("Loading genotype table: {:?}", path);

        let reader = match id_column {
            Some(name) => TableReader::with_id_column(name),
            None => TableReader::new(),
        };
        let table = reader
            .read_path(path)
            .with_context(|| format!("Failed to load genotype table {:?}", path))?;

        info!(
            "Loaded {} rows x {} columns (rsID column: '{}')",
            table.row_count(),
            table.headers().len(),
            table.id_column()
        );
        audit::log_event(
            self.run_id,
            AuditEventType::TableLoaded,
            user_id,
            Some(path.display().to_string()),
            serde_json::json!({
                "rows": table.row_count(),
                "columns": table.headers().len(),
                "id_column": table.id_column(),
            }),
        );

        Ok(table)
    }

    fn resolve_column(&self, table: &GenotypeTable, user_id: &str) -> Result<ResolvedGenotypeColumn> {
        match resolve_genotype_column(user_id, table.headers()) {
            Ok(column) => {
                info!(
                    "Genotype column for '{}': '{}' ({})",
                    user_id,
                    column.header,
                    column.rule.as_str()
                );
                audit::log_event(
                    self.run_id,
                    AuditEventType::ColumnResolved,
                    user_id,
                    Some(column.header.clone()),
                    serde_json::json!({ "rule": column.rule, "index": column.index }),
                );
                Ok(column)
            }
            Err(e) => {
                audit::log_event(
                    self.run_id,
                    AuditEventType::ColumnRejected,
                    user_id,
                    None,
                    serde_json::json!({ "reason": e.to_string() }),
                );
                Err(e.into())
            }
        }
    }

    fn write_outputs(
        &self,
        request: &ExtractionRequest,
        user_id: &str,
        export: &ExportTable,
        filtered: &FilteredResult,
    ) -> Result<HashMap<OutputFormat, PathBuf>> {
        let Some(output_dir) = &request.output_dir else {
            debug!("No output directory given, skipping file export");
            return Ok(HashMap::new());
        };

        let generator = OutputGenerator::new(user_id.to_string(), output_dir.clone());
        let outputs = generator.generate(&request.formats, export, filtered.genotype_column())?;

        for (format, path) in &outputs {
            audit::log_event(
                self.run_id,
                AuditEventType::ExportWritten,
                user_id,
                Some(path.display().to_string()),
                serde_json::json!({
                    "format": format,
                    "mime_type": format.mime_type(),
                    "rows": export.row_count(),
                }),
            );
        }

        Ok(outputs)
    }
}

impl Default for VariantExtractor {
    fn default() -> Self {
        Self::new(crate::validator::DEFAULT_MAX_FILE_SIZE)
    }
}

/// Read and parse the target list
pub fn load_targets(source: &TargetSource) -> Result<TargetVariantList> {
    let targets = match source {
        TargetSource::File(path) => {
            debug!("Reading variant list file {:?}", path);
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read variant list {:?}", path))?;
            TargetVariantList::from_bytes(&bytes)?
        }
        TargetSource::Text(text) => TargetVariantList::parse(text)?,
    };

    info!("Parsed {} unique target rsIDs", targets.len());
    Ok(targets)
}
