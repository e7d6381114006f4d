// ==============================================================================
// variant_filter.rs - rsID Target Filtering
// ==============================================================================
// Description: Keeps the table rows whose normalized rsID is in the target list
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-16
// Version: 1.2.0
// ==============================================================================
// Algorithm:
//   - Normalize the rsID column value of every row (see rsid.rs)
//   - Keep the row iff the normalized value is present in the target set
//   - Rows without an rsID never match
//   - Row order and every column are preserved
// ==============================================================================

use std::collections::BTreeSet;

use thiserror::Error;

use crate::parsers::{GenotypeTable, TargetVariantList};
use crate::rsid::normalize_rsid;

/// Errors that can occur while filtering a table
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("No recognizable rsIDs found (e.g., rs12345)")]
    EmptyTargetList,

    #[error("Column '{0}' is not present in the table")]
    UnknownColumn(String),
}

/// Rows of a [`GenotypeTable`] that matched the target list
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredResult {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    /// Index of each kept row in the source table
    source_rows: Vec<usize>,
    id_column: usize,
    genotype_column: usize,
    targets_requested: usize,
    /// Targets with no row in the table, sorted
    unmatched_targets: Vec<String>,
}

impl FilteredResult {
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn source_rows(&self) -> &[usize] {
        &self.source_rows
    }

    pub fn id_column(&self) -> &str {
        &self.headers[self.id_column]
    }

    pub fn genotype_column(&self) -> &str {
        &self.headers[self.genotype_column]
    }

    pub fn genotype_column_index(&self) -> usize {
        self.genotype_column
    }

    pub fn targets_requested(&self) -> usize {
        self.targets_requested
    }

    pub fn unmatched_targets(&self) -> &[String] {
        &self.unmatched_targets
    }

    /// (raw rsID cell, genotype call) for every kept row
    pub fn genotype_calls(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.rows
            .iter()
            .map(move |row| (row[self.id_column].as_str(), row[self.genotype_column].as_str()))
    }

    /// Message shown to the user after a run
    pub fn status_message(&self) -> String {
        if self.rows.is_empty() {
            "No matching variants found.".to_string()
        } else {
            format!("Found {} matching variants!", self.rows.len())
        }
    }
}

/// Filter `table` down to the rows whose rsID appears in `raw_target_text`
///
/// # Arguments
/// * `table` - Loaded table; its rsID column is used for matching
/// * `genotype_column` - Header of the resolved genotype column
/// * `raw_target_text` - Target list as pasted or uploaded
///
/// # Returns
/// * `Ok(FilteredResult)` - Possibly empty; zero matches is not an error
/// * `Err(FilterError::UnknownColumn)` - `genotype_column` is not a table header
/// * `Err(FilterError::EmptyTargetList)` - No rsID could be parsed from the text
pub fn filter_variants(
    table: &GenotypeTable,
    genotype_column: &str,
    raw_target_text: &str,
) -> Result<FilteredResult, FilterError> {
    if table.column_index(genotype_column).is_none() {
        return Err(FilterError::UnknownColumn(genotype_column.to_string()));
    }

    let targets = TargetVariantList::parse(raw_target_text)?;
    filter_with_targets(table, genotype_column, &targets)
}

/// Same as [`filter_variants`] with an already parsed target list
pub fn filter_with_targets(
    table: &GenotypeTable,
    genotype_column: &str,
    targets: &TargetVariantList,
) -> Result<FilteredResult, FilterError> {
    let genotype_idx = table
        .column_index(genotype_column)
        .ok_or_else(|| FilterError::UnknownColumn(genotype_column.to_string()))?;

    if targets.is_empty() {
        return Err(FilterError::EmptyTargetList);
    }

    let id_idx = table.id_column_index();
    let mut rows = Vec::new();
    let mut source_rows = Vec::new();
    let mut matched: BTreeSet<String> = BTreeSet::new();

    for (idx, cell) in table.column_values(id_idx).enumerate() {
        let Some(rsid) = normalize_rsid(cell) else {
            continue;
        };

        if targets.contains(&rsid) {
            rows.push(table.rows()[idx].clone());
            source_rows.push(idx);
            matched.insert(rsid);
        }
    }

    let unmatched_targets = targets
        .iter()
        .filter(|t| !matched.contains(t.as_str()))
        .cloned()
        .collect();

    Ok(FilteredResult {
        headers: table.headers().to_vec(),
        rows,
        source_rows,
        id_column: id_idx,
        genotype_column: genotype_idx,
        targets_requested: targets.len(),
        unmatched_targets,
    })
}
