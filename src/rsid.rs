// ==============================================================================
// rsid.rs - Reference SNP Identifier Normalization
// ==============================================================================
// Description: Extracts and canonicalizes rsIDs from free-form cell text
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-14
// Version: 1.1.0
// ==============================================================================
// Algorithm:
//   - Find the first "rs" + ASCII digits token (any case)
//   - Token must not touch another alphanumeric character on either side
//   - Return the token lowercased ("RS000123" -> "rs000123")
//   Examples:
//     "rs12345"           -> Some("rs12345")
//     "chr1:123:rs12345"  -> Some("rs12345")
//     "rs12345;extra"     -> Some("rs12345")
//     "mrs123" / "rs1a"   -> None
// ==============================================================================

use once_cell::sync::Lazy;
use regex::Regex;

static RSID_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[Rr][Ss][0-9]+").expect("rsID pattern is valid"));

/// Extract the canonical rsID embedded in `text`, if any.
///
/// Candidates glued to a letter or digit (e.g. `mrs123`, `rs123abc`) are
/// skipped and the search continues further along the string.
///
/// # Examples
/// ```
/// use variant_extractor::rsid::normalize_rsid;
///
/// assert_eq!(normalize_rsid("RS000123").as_deref(), Some("rs000123"));
/// assert_eq!(normalize_rsid("chr1:123:rs42").as_deref(), Some("rs42"));
/// assert_eq!(normalize_rsid("mrs123"), None);
/// ```
pub fn normalize_rsid(text: &str) -> Option<String> {
    RSID_CANDIDATE
        .find_iter(text)
        .find(|m| {
            is_boundary(text[..m.start()].chars().next_back())
                && is_boundary(text[m.end()..].chars().next())
        })
        .map(|m| m.as_str().to_ascii_lowercase())
}

fn is_boundary(neighbour: Option<char>) -> bool {
    neighbour.map_or(true, |c| !c.is_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_rsid() {
        assert_eq!(normalize_rsid("rs12345").as_deref(), Some("rs12345"));
    }

    #[test]
    fn test_uppercase_is_canonicalized() {
        assert_eq!(normalize_rsid("RS000123").as_deref(), Some("rs000123"));
        assert_eq!(normalize_rsid("Rs7").as_deref(), Some("rs7"));
    }

    #[test]
    fn test_idempotent() {
        for raw in ["rs1", "RS000123", "chr1:5:rs99", "x;rs4;y"] {
            let once = normalize_rsid(raw).unwrap();
            assert_eq!(normalize_rsid(&once).as_deref(), Some(once.as_str()));
            assert!(once.starts_with("rs"));
        }
    }

    #[test]
    fn test_composite_fields() {
        assert_eq!(normalize_rsid("rs12345;otherdata").as_deref(), Some("rs12345"));
        assert_eq!(normalize_rsid("chr1:123:rs12345").as_deref(), Some("rs12345"));
        assert_eq!(normalize_rsid("variant rs5 here").as_deref(), Some("rs5"));
    }

    #[test]
    fn test_rejects_non_boundary_matches() {
        assert_eq!(normalize_rsid("mrs123"), None);
        assert_eq!(normalize_rsid("rs123abc"), None);
        assert_eq!(normalize_rsid("xrs3"), None);
        assert_eq!(normalize_rsid("rs"), None);
        assert_eq!(normalize_rsid(""), None);
    }

    #[test]
    fn test_skips_glued_candidate_and_takes_next() {
        assert_eq!(normalize_rsid("mrs1 rs2").as_deref(), Some("rs2"));
        assert_eq!(normalize_rsid("rs1a,rs22").as_deref(), Some("rs22"));
    }

    #[test]
    fn test_first_valid_token_wins() {
        assert_eq!(normalize_rsid("rs10|rs20").as_deref(), Some("rs10"));
    }

    #[test]
    fn test_non_ascii_letters_block_boundary() {
        assert_eq!(normalize_rsid("ärs12"), None);
        assert_eq!(normalize_rsid("—rs12—").as_deref(), Some("rs12"));
    }
}
