// ==============================================================================
// validator.rs - Input File Validation
// ==============================================================================
// Description: Validates uploaded genotype tables (size, type, format) before loading
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-17
// Version: 1.2.0
// Security: Allowlist-only file types, magic number verification
// ==============================================================================

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

pub const DEFAULT_MAX_FILE_SIZE: u64 = 500 * 1024 * 1024; // 500 MB

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

#[derive(Debug, Clone)]
pub struct ValidatedFile {
    pub original_name: String,
    pub safe_name: String,
    pub extension: String,
    pub size: u64,
    pub hash_sha256: String,
    pub validated_at: chrono::DateTime<chrono::Utc>,
}

pub struct FileValidator {
    max_file_size: u64,
    allowed_types: HashMap<String, Vec<u8>>,
}

impl FileValidator {
    pub fn new() -> Self {
        Self::with_max_file_size(DEFAULT_MAX_FILE_SIZE)
    }

    pub fn with_max_file_size(max_file_size: u64) -> Self {
        let mut allowed_types = HashMap::new();

        // Plain tab-separated exports (no specific magic number)
        for ext in ["tsv", "txt", "csv"] {
            allowed_types.insert(ext.to_string(), vec![]);
            allowed_types.insert(format!("{}.gz", ext), GZIP_MAGIC.to_vec());
        }

        Self {
            max_file_size,
            allowed_types,
        }
    }

    pub fn validate_upload(&self, file_path: &Path) -> Result<ValidatedFile> {
        let file_name = file_path
            .file_name()
            .ok_or_else(|| anyhow::anyhow!("Invalid file path"))?
            .to_string_lossy()
            .to_string();

        info!("Validating file: {}", file_name);

        // 1. Size check
        let metadata = std::fs::metadata(file_path)
            .with_context(|| format!("Failed to get file metadata for {:?}", file_path))?;
        let size = metadata.len();

        if size > self.max_file_size {
            anyhow::bail!(
                "File too large: {} bytes (max: {} bytes)",
                size,
                self.max_file_size
            );
        }
        debug!("Size check passed: {} bytes", size);

        // 2. Filename sanitization
        let safe_name = sanitize_filename(&file_name)?;
        debug!("Sanitized filename: {}", safe_name);

        // 3. Extension check (allowlist)
        let ext = get_extension(&safe_name)?;
        let expected_magic = self
            .allowed_types
            .get(&ext)
            .ok_or_else(|| anyhow::anyhow!("Invalid file type: {}", ext))?;
        debug!("Extension check passed: {}", ext);

        // 4. Magic number verification
        if !expected_magic.is_empty() {
            let actual_magic = read_magic_number(file_path)?;
            if !actual_magic.starts_with(expected_magic) {
                anyhow::bail!("Magic number mismatch for .{} file", ext);
            }
            debug!("Magic number check passed");
        }

        // 5. Content validation (header row must be tab-separated)
        validate_header_line(file_path)?;
        debug!("Content validation passed");

        // 6. Compute SHA-256 hash
        let hash = compute_sha256(file_path)?;
        debug!("SHA-256: {}", hash);

        Ok(ValidatedFile {
            original_name: file_name,
            safe_name,
            extension: ext,
            size,
            hash_sha256: hash,
            validated_at: chrono::Utc::now(),
        })
    }
}

impl Default for FileValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Reduce `name` to a safe file name component (ASCII alphanumerics, `_`, `.`, `-`)
pub fn sanitize_filename(name: &str) -> Result<String> {
    // Remove path separators, null bytes, control characters
    let safe = name
        .replace(['/', '\\', '\0'], "_")
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '.' || *c == '-')
        .collect::<String>();

    // Limit length to 255 characters
    let truncated: String = safe.chars().take(255).collect();

    if truncated.is_empty() {
        anyhow::bail!("Invalid filename after sanitization");
    }

    Ok(truncated)
}

fn get_extension(filename: &str) -> Result<String> {
    let lower = filename.to_lowercase();

    // Handle compound extensions like .tsv.gz
    if let Some(stem) = lower.strip_suffix(".gz") {
        let inner = stem
            .rsplit_once('.')
            .map(|(_, ext)| ext)
            .ok_or_else(|| anyhow::anyhow!("No file extension found"))?;
        return Ok(format!("{}.gz", inner));
    }

    lower
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_string())
        .ok_or_else(|| anyhow::anyhow!("No file extension found"))
}

fn read_magic_number(path: &Path) -> Result<Vec<u8>> {
    let mut file = File::open(path)?;
    let mut buffer = Vec::with_capacity(4);
    file.by_ref().take(4).read_to_end(&mut buffer)?;
    Ok(buffer)
}

fn validate_header_line(path: &Path) -> Result<()> {
    // Decompress by content, not extension, the same way the table reader does
    let compressed = read_magic_number(path)?.starts_with(&GZIP_MAGIC);
    let file = File::open(path)?;
    let mut reader: Box<dyn BufRead> = if compressed {
        Box::new(BufReader::new(MultiGzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };

    let mut first_line = String::new();
    reader
        .read_line(&mut first_line)
        .context("Failed to read header line")?;

    if first_line.trim().is_empty() {
        anyhow::bail!("File is empty");
    }

    if !first_line.contains('\t') {
        anyhow::bail!("Invalid format: header row is not tab-separated");
    }

    Ok(())
}

fn compute_sha256(path: &Path) -> Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::tempdir;

    fn write_file(dir: &Path, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("genotypes.tsv").unwrap(), "genotypes.tsv");

        assert_eq!(
            sanitize_filename("../../../etc/passwd").unwrap(),
            ".._.._.._etc_passwd"
        );

        assert_eq!(
            sanitize_filename("IG 1234\n").unwrap(),
            "IG1234"
        );

        assert!(sanitize_filename("\n\t ").is_err());
    }

    #[test]
    fn test_get_extension() {
        assert_eq!(get_extension("export.tsv.gz").unwrap(), "tsv.gz");
        assert_eq!(get_extension("export.TXT").unwrap(), "txt");
        assert_eq!(get_extension("report.final.csv").unwrap(), "csv");
        assert!(get_extension("noextension").is_err());
    }

    #[test]
    fn test_validate_plain_tsv() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.tsv", b"Name\tChr\nrs1\t1\n");

        let validated = FileValidator::new().validate_upload(&path).unwrap();
        assert_eq!(validated.extension, "tsv");
        assert_eq!(validated.size, 15);
        assert_eq!(validated.hash_sha256.len(), 64);
    }

    #[test]
    fn test_validate_gzip_tsv() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Name\tChr\nrs1\t1\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.txt.gz", &compressed);
        assert!(FileValidator::new().validate_upload(&path).is_ok());
    }

    #[test]
    fn test_validate_gzip_content_with_plain_extension() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(b"Name\tChr\nrs1\t1\n").unwrap();
        let compressed = encoder.finish().unwrap();

        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.tsv", &compressed);

        let validated = FileValidator::new().validate_upload(&path).unwrap();
        assert_eq!(validated.extension, "tsv");
    }

    #[test]
    fn test_reject_fake_gzip() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.tsv.gz", b"Name\tChr\n");
        let err = FileValidator::new().validate_upload(&path).unwrap_err();
        assert!(err.to_string().contains("Magic number mismatch"));
    }

    #[test]
    fn test_reject_unknown_extension() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.xlsx", b"Name\tChr\n");
        let err = FileValidator::new().validate_upload(&path).unwrap_err();
        assert!(err.to_string().contains("Invalid file type"));
    }

    #[test]
    fn test_reject_comma_separated_content() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.csv", b"Name,Chr\nrs1,1\n");
        let err = FileValidator::new().validate_upload(&path).unwrap_err();
        assert!(err.to_string().contains("not tab-separated"));
    }

    #[test]
    fn test_reject_oversized_file() {
        let dir = tempdir().unwrap();
        let path = write_file(dir.path(), "export.tsv", b"Name\tChr\nrs1\t1\n");
        let err = FileValidator::with_max_file_size(8)
            .validate_upload(&path)
            .unwrap_err();
        assert!(err.to_string().contains("File too large"));
    }
}
