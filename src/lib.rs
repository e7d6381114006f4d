// ==============================================================================
// lib.rs - Variant Extractor Library
// ==============================================================================
// Description: Library interface for genotype column detection and rsID extraction
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-16
// Version: 1.1.0
// ==============================================================================

pub mod rsid;
pub mod models;
pub mod parsers;
pub mod column_resolver;
pub mod variant_filter;
pub mod validator;
pub mod audit;
pub mod output;
pub mod processor;

pub use column_resolver::{resolve_genotype_column, ResolveError};
pub use variant_filter::{filter_variants, filter_with_targets, FilterError, FilteredResult};
