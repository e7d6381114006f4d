// ==============================================================================
// variant_list.rs - Target rsID List Parser
// ==============================================================================
// Description: Builds the deduplicated target rsID set from pasted or uploaded text
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-15
// Version: 1.1.0
// ==============================================================================
// Format: Free text. Any non-alphanumeric character separates tokens.
// Example:
//   rs12345
//   RS67890, rs13328684
//   chr1:69869:rs548049170
// ==============================================================================

use std::collections::btree_set;
use std::collections::BTreeSet;

use crate::rsid::normalize_rsid;
use crate::variant_filter::FilterError;

/// Deduplicated set of canonical (lowercase) rsIDs to extract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVariantList {
    rsids: BTreeSet<String>,
    /// Non-blank input lines that yielded no rsID
    unrecognized_lines: usize,
}

impl TargetVariantList {
    /// Parse a target list from the full text of a file or text area
    ///
    /// Lines are split on every non-alphanumeric character, so newline,
    /// comma, tab, semicolon and whitespace separated lists all work. Tokens
    /// that are not an rsID are dropped.
    ///
    /// # Returns
    /// * `Ok(TargetVariantList)` - At least one valid rsID was found
    /// * `Err(FilterError::EmptyTargetList)` - No valid rsID in the input
    ///
    /// # Example
    /// ```
    /// use variant_extractor::parsers::TargetVariantList;
    ///
    /// let targets = TargetVariantList::parse("rs1, RS2\nnot-an-id\nrs1").unwrap();
    /// assert_eq!(targets.len(), 2);
    /// assert!(targets.contains("rs2"));
    /// assert_eq!(targets.unrecognized_lines(), 1);
    /// ```
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let mut rsids = BTreeSet::new();
        let mut unrecognized_lines = 0;

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let mut tokens = 0;

            for token in line
                .split(|c: char| !c.is_alphanumeric())
                .filter(|t| !t.is_empty())
            {
                if let Some(rsid) = normalize_rsid(token) {
                    rsids.insert(rsid);
                    tokens += 1;
                }
            }

            // Duplicates still count as recognized
            if tokens == 0 {
                unrecognized_lines += 1;
            }
        }

        if rsids.is_empty() {
            return Err(FilterError::EmptyTargetList);
        }

        Ok(Self {
            rsids,
            unrecognized_lines,
        })
    }

    /// Parse an uploaded list; invalid UTF-8 is replaced rather than rejected
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FilterError> {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    /// Membership test; `rsid` must already be canonical
    pub fn contains(&self, rsid: &str) -> bool {
        self.rsids.contains(rsid)
    }

    pub fn len(&self) -> usize {
        self.rsids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsids.is_empty()
    }

    pub fn unrecognized_lines(&self) -> usize {
        self.unrecognized_lines
    }

    /// Iterate the targets in sorted order
    pub fn iter(&self) -> btree_set::Iter<'_, String> {
        self.rsids.iter()
    }
}

impl<'a> IntoIterator for &'a TargetVariantList {
    type Item = &'a String;
    type IntoIter = btree_set::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newline_separated() {
        let targets = TargetVariantList::parse("rs1\nrs2\n").unwrap();
        let collected: Vec<&String> = targets.iter().collect();
        assert_eq!(collected, vec!["rs1", "rs2"]);
        assert_eq!(targets.unrecognized_lines(), 0);
    }

    #[test]
    fn test_single_line_separators() {
        let targets = TargetVariantList::parse("rs1,rs2 rs3;rs4\trs5|rs6").unwrap();
        assert_eq!(targets.len(), 6);
    }

    #[test]
    fn test_crlf_and_case() {
        let targets = TargetVariantList::parse("RS10\r\nrs10\r\nRs20\r\n").unwrap();
        assert_eq!(targets.len(), 2);
        assert!(targets.contains("rs10"));
        assert!(targets.contains("rs20"));
        assert!(!targets.contains("RS10"));
    }

    #[test]
    fn test_composite_lines() {
        let targets = TargetVariantList::parse("chr1:123:rs12345\nrs777;extra").unwrap();
        assert!(targets.contains("rs12345"));
        assert!(targets.contains("rs777"));
    }

    #[test]
    fn test_noise_is_dropped() {
        let targets = TargetVariantList::parse("header\nmrs123\nrs9abc\nrs42\n").unwrap();
        assert_eq!(targets.len(), 1);
        assert!(targets.contains("rs42"));
        assert_eq!(targets.unrecognized_lines(), 3);
    }

    #[test]
    fn test_duplicate_line_not_unrecognized() {
        let targets = TargetVariantList::parse("rs1\nrs1\n").unwrap();
        assert_eq!(targets.len(), 1);
        assert_eq!(targets.unrecognized_lines(), 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(TargetVariantList::parse(""), Err(FilterError::EmptyTargetList));
        assert_eq!(
            TargetVariantList::parse("  \n\t\n   "),
            Err(FilterError::EmptyTargetList)
        );
    }

    #[test]
    fn test_no_valid_ids() {
        assert_eq!(
            TargetVariantList::parse("foo\nbar, baz\nmrs1"),
            Err(FilterError::EmptyTargetList)
        );
    }

    #[test]
    fn test_from_bytes_with_invalid_utf8() {
        let bytes = b"rs1\n\xff\xfe\nrs2\n";
        let targets = TargetVariantList::from_bytes(bytes).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.unrecognized_lines(), 1);
    }
}
