// ==============================================================================
// extract_demo.rs - Example of Column Resolution and rsID Extraction
// ==============================================================================
// Description: Demonstrates resolving a genotype column and filtering by rsID
// Author: Matt Barham
// Created: 2026-10-14
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

use variant_extractor::column_resolver::{column_candidates, resolve_genotype_column};
use variant_extractor::output::{to_tsv_bytes, ExportTable, OutputLayout};
use variant_extractor::parsers::TableReader;
use variant_extractor::rsid::normalize_rsid;
use variant_extractor::variant_filter::filter_variants;

const EXPORT: &str = "\
Name\tChr\tPosition\tIG1234.GC Score\tIG1234.Plus/Minus Alleles\tIG1234-R.Plus/Minus Alleles
rs548049170\t1\t69869\t0.88\tTT\tTT
1:74792-GA;rs13328684\t1\t74792\t0.12\t--\tGA
rs9283150\t1\t565508\t0.93\tAA\tAA
exm-rs1234\t2\t1000\t0.50\tCC\tCC
";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Variant Extractor Example ===\n");

    // Example 1: rsID normalization
    println!("--- Example 1: rsID Normalization ---");
    for raw in ["rs12345", "RS000123", "chr1:123:rs777", "rs5;extra", "mrs123", "rs123abc"] {
        match normalize_rsid(raw) {
            Some(rsid) => println!("  {:<16} -> {}", raw, rsid),
            None => println!("  {:<16} -> (no rsID)", raw),
        }
    }

    // Example 2: Column resolution
    println!("\n--- Example 2: Genotype Column Resolution ---");
    let table = TableReader::new().read_bytes(EXPORT.as_bytes())?;

    for candidate in column_candidates("IG1234", table.headers()) {
        println!("  candidate [{}] {:<32} {}", candidate.index, candidate.header, candidate.rule.as_str());
    }

    let column = resolve_genotype_column("IG1234", table.headers())?;
    println!("  resolved -> '{}'", column.header);

    match resolve_genotype_column("IG", table.headers()) {
        Ok(column) => println!("  'IG' resolved -> '{}'", column.header),
        Err(e) => println!("  'IG' rejected: {}", e),
    }

    // Example 3: Filtering
    println!("\n--- Example 3: Filtering ---");
    let result = filter_variants(&table, &column.header, "rs13328684\nRS1234, rs42")?;
    println!("  {}", result.status_message());
    for (rsid, genotype) in result.genotype_calls() {
        println!("  {:<24} {}", rsid, genotype);
    }
    println!("  not found: {:?}", result.unmatched_targets());

    // Example 4: Download payload
    println!("\n--- Example 4: Compact TSV ---");
    let export = ExportTable::from_result(&result, OutputLayout::Compact)?;
    print!("{}", String::from_utf8(to_tsv_bytes(&export)?)?);

    Ok(())
}
