// ==============================================================================
// parsers/mod.rs - Input parser modules
// ==============================================================================
// Description: Parsers for genotype tables and target rsID lists
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

pub mod genotype_table;
pub mod variant_list;

pub use genotype_table::{GenotypeTable, TableParseError, TableReader, DEFAULT_ID_COLUMNS};
pub use variant_list::TargetVariantList;
