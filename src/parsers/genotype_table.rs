// ==============================================================================
// genotype_table.rs - Tab-Separated Genotype Table Parser
// ==============================================================================
// Description: Loads VCF-like tab-separated genotype exports into memory
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-16
// Version: 1.2.0
// ==============================================================================
// Format: Tab-delimited text, first row is the header row
// Example:
//   Name    Chr    Position    IG1234.Plus/Minus Alleles    IG1234-R.GC Score
//   rs548049170    1    69869    TT    0.8731
//   1:74792-GA;rs13328684    1    74792    --    0.0000
//   rs9283150    1    565508    AA    0.9102
// ==============================================================================

use csv::ReaderBuilder;
use flate2::read::MultiGzDecoder;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Header names tried, in order, when no rsID column is given explicitly
pub const DEFAULT_ID_COLUMNS: &[&str] = &["Name", "ID", "rsid", "SNP Name", "SNP", "Variant"];

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// In-memory genotype table with a designated rsID-bearing column
#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    id_column: usize,
}

/// Errors that can occur while loading a genotype table
#[derive(Error, Debug)]
pub enum TableParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("File is empty or has no header row")]
    EmptyFile,

    #[error("Duplicate column header: '{0}'")]
    DuplicateHeader(String),

    #[error("No rsID column found (tried {tried:?}); available columns: {available:?}")]
    MissingIdColumn {
        tried: Vec<String>,
        available: Vec<String>,
    },

    #[error("Row at line {line} has {found} fields, header has {expected}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

impl GenotypeTable {
    /// Build a table from headers and rows.
    ///
    /// Every row must have exactly one cell per header. When `id_column` is
    /// `None` the rsID column is picked from [`DEFAULT_ID_COLUMNS`].
    pub fn new(
        headers: Vec<String>,
        rows: Vec<Vec<String>>,
        id_column: Option<&str>,
    ) -> Result<Self, TableParseError> {
        if headers.is_empty() {
            return Err(TableParseError::EmptyFile);
        }

        let mut seen = HashSet::with_capacity(headers.len());
        for header in &headers {
            if !seen.insert(header.as_str()) {
                return Err(TableParseError::DuplicateHeader(header.clone()));
            }
        }

        // Line numbers are 1-based and the header occupies line 1
        if let Some((idx, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != headers.len())
        {
            return Err(TableParseError::RaggedRow {
                line: idx + 2,
                expected: headers.len(),
                found: row.len(),
            });
        }

        let id_column = locate_id_column(&headers, id_column)?;

        Ok(Self {
            headers,
            rows,
            id_column,
        })
    }

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

    /// Position of the column with exactly this header
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Header of the rsID-bearing column
    pub fn id_column(&self) -> &str {
        &self.headers[self.id_column]
    }

    pub fn id_column_index(&self) -> usize {
        self.id_column
    }

    /// Iterate the values of one column in row order
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> + '_ {
        self.rows.iter().map(move |row| row[index].as_str())
    }
}

fn locate_id_column(headers: &[String], requested: Option<&str>) -> Result<usize, TableParseError> {
    let tried: Vec<&str> = match requested {
        Some(name) => vec![name],
        None => DEFAULT_ID_COLUMNS.to_vec(),
    };

    // Exact header match first, then case-insensitive
    if let Some(name) = requested {
        if let Some(idx) = headers.iter().position(|h| h == name) {
            return Ok(idx);
        }
    }

    tried
        .iter()
        .find_map(|name| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        })
        .ok_or_else(|| TableParseError::MissingIdColumn {
            tried: tried.iter().map(|s| s.to_string()).collect(),
            available: headers.to_vec(),
        })
}

/// Reader for tab-separated genotype tables (plain or gzip-compressed)
#[derive(Debug, Clone, Default)]
pub struct TableReader {
    /// Explicit rsID column header; auto-detected when `None`
    pub id_column: Option<String>,
}

impl TableReader {
    /// Create a reader that auto-detects the rsID column
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a reader that uses a specific rsID column
    pub fn with_id_column(name: impl Into<String>) -> Self {
        Self {
            id_column: Some(name.into()),
        }
    }

    /// Load a table from disk
    ///
    /// # Arguments
    /// * `path` - Path to a `.tsv`/`.txt`/`.csv` file, optionally gzip-compressed
    ///
    /// # Returns
    /// * `Ok(GenotypeTable)` - Parsed table
    /// * `Err(TableParseError)` - IO, format or header error
    ///
    /// Compression is detected from the magic number, not the extension.
    pub fn read_path(&self, path: impl AsRef<Path>) -> Result<GenotypeTable, TableParseError> {
        let mut reader = BufReader::new(File::open(path.as_ref())?);

        if reader.fill_buf()?.starts_with(&GZIP_MAGIC) {
            self.read(MultiGzDecoder::new(reader))
        } else {
            self.read(reader)
        }
    }

    /// Load a table from an in-memory upload
    pub fn read_bytes(&self, bytes: &[u8]) -> Result<GenotypeTable, TableParseError> {
        if bytes.starts_with(&GZIP_MAGIC) {
            self.read(MultiGzDecoder::new(bytes))
        } else {
            self.read(bytes)
        }
    }

    /// Load a table from any uncompressed tab-separated stream
    pub fn read<R: Read>(&self, source: R) -> Result<GenotypeTable, TableParseError> {
        let mut reader = ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.is_empty() || (headers.len() == 1 && headers[0].trim().is_empty()) {
            return Err(TableParseError::EmptyFile);
        }

        let width = headers.len();
        let mut rows = Vec::new();

        for result in reader.records() {
            let record = result?;

            if record.len() > width {
                let line = record.position().map_or(0, |p| p.line() as usize);
                return Err(TableParseError::RaggedRow {
                    line,
                    expected: width,
                    found: record.len(),
                });
            }

            // Short rows are padded with empty cells
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(width, String::new());
            rows.push(row);
        }

        GenotypeTable::new(headers, rows, self.id_column.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Create a temporary test file with sample table data
    fn create_test_file(contents: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        file.flush().unwrap();
        file
    }

    const SAMPLE: &str = "\
Name\tChr\tPosition\tIG1234.Plus/Minus Alleles
rs548049170\t1\t69869\tTT
1:74792-GA;rs13328684\t1\t74792\t--
rs9283150\t1\t565508\tAA
";

    #[test]
    fn test_read_valid_file() {
        let file = create_test_file(SAMPLE.as_bytes());
        let table = TableReader::new().read_path(file.path()).unwrap();

        assert_eq!(table.headers().len(), 4);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.id_column(), "Name");
        assert_eq!(table.rows()[1][0], "1:74792-GA;rs13328684");
        assert_eq!(table.rows()[2][3], "AA");
    }

    #[test]
    fn test_read_gzip_file() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(SAMPLE.as_bytes()).unwrap();
        let compressed = encoder.finish().unwrap();

        let file = create_test_file(&compressed);
        let table = TableReader::new().read_path(file.path()).unwrap();
        assert_eq!(table.row_count(), 3);

        let from_bytes = TableReader::new().read_bytes(&compressed).unwrap();
        assert_eq!(from_bytes, table);
    }

    #[test]
    fn test_explicit_id_column() {
        let contents = "chr\tpos\tid\tJDOE.Plus/Minus Alleles\nchr1\t10\trs1\tAG\n";
        let table = TableReader::with_id_column("id")
            .read_bytes(contents.as_bytes())
            .unwrap();
        assert_eq!(table.id_column(), "id");
        assert_eq!(table.id_column_index(), 2);
    }

    #[test]
    fn test_id_column_detected_case_insensitively() {
        let contents = "CHR\trsID\tX.Plus/Minus Alleles\n1\trs5\tCC\n";
        let table = TableReader::new().read_bytes(contents.as_bytes()).unwrap();
        assert_eq!(table.id_column(), "rsID");
    }

    #[test]
    fn test_missing_id_column() {
        let contents = "chr\tpos\n1\t2\n";
        match TableReader::new().read_bytes(contents.as_bytes()) {
            Err(TableParseError::MissingIdColumn { available, .. }) => {
                assert_eq!(available, vec!["chr", "pos"]);
            }
            other => panic!("Expected MissingIdColumn error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_explicit_id_column() {
        let result = TableReader::with_id_column("Marker").read_bytes(SAMPLE.as_bytes());
        assert!(matches!(result, Err(TableParseError::MissingIdColumn { .. })));
    }

    #[test]
    fn test_duplicate_header() {
        let contents = "Name\tA\tA\nrs1\t1\t2\n";
        match TableReader::new().read_bytes(contents.as_bytes()) {
            Err(TableParseError::DuplicateHeader(h)) => assert_eq!(h, "A"),
            other => panic!("Expected DuplicateHeader error, got {:?}", other),
        }
    }

    #[test]
    fn test_short_rows_are_padded() {
        let contents = "Name\tChr\tGeno\nrs1\t1\nrs2\t2\tAA\n";
        let table = TableReader::new().read_bytes(contents.as_bytes()).unwrap();
        assert_eq!(table.rows()[0], vec!["rs1", "1", ""]);
        assert_eq!(table.rows()[1], vec!["rs2", "2", "AA"]);
    }

    #[test]
    fn test_long_row_is_rejected() {
        let contents = "Name\tChr\nrs1\t1\nrs2\t2\textra\n";
        match TableReader::new().read_bytes(contents.as_bytes()) {
            Err(TableParseError::RaggedRow { line, expected, found }) => {
                assert_eq!(line, 3);
                assert_eq!(expected, 2);
                assert_eq!(found, 3);
            }
            other => panic!("Expected RaggedRow error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_input() {
        let result = TableReader::new().read_bytes(b"");
        assert!(matches!(result, Err(TableParseError::EmptyFile)));
    }

    #[test]
    fn test_header_only_table_is_valid() {
        let table = TableReader::new().read_bytes(b"Name\tChr\n").unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers(), ["Name", "Chr"]);
    }

    #[test]
    fn test_new_rejects_mismatched_row() {
        let result = GenotypeTable::new(
            vec!["Name".into(), "G".into()],
            vec![vec!["rs1".into()]],
            None,
        );
        assert!(matches!(result, Err(TableParseError::RaggedRow { line: 2, .. })));
    }

    #[test]
    fn test_column_values() {
        let table = TableReader::new().read_bytes(SAMPLE.as_bytes()).unwrap();
        let chr: Vec<&str> = table.column_values(1).collect();
        assert_eq!(chr, vec!["1", "1", "1"]);
        assert_eq!(table.column_index("Position"), Some(2));
        assert_eq!(table.column_index("position"), None);
    }
}
