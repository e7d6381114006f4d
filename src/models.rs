// ==============================================================================
// models.rs - Column Resolution Data Models
// ==============================================================================
// Description: Data structures shared by the column resolver and its callers
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-14
// Version: 1.0.0
// ==============================================================================

use serde::{Deserialize, Serialize};

/// Suffix of structured genotype column headers (`<USER>.Plus/Minus Alleles`)
pub const ALLELE_COLUMN_SUFFIX: &str = ".Plus/Minus Alleles";

/// Marker inserted before the suffix for replicate columns (`<USER>-R.Plus/Minus Alleles`)
pub const REPLICATE_MARKER: &str = "-R";

/// Rule that matched a header, in descending priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchRule {
    /// `<USER>.Plus/Minus Alleles`
    ExactPattern,
    /// `<USER>-R.Plus/Minus Alleles`
    ReplicatePattern,
    /// Header contains the user identifier (case-insensitive)
    Containment,
}

impl MatchRule {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchRule::ExactPattern => "exact_pattern",
            MatchRule::ReplicatePattern => "replicate_pattern",
            MatchRule::Containment => "containment",
        }
    }

    /// Full header a structured rule expects for `user_id`; `None` for containment
    pub fn expected_header(&self, user_id: &str) -> Option<String> {
        match self {
            MatchRule::ExactPattern => Some(format!("{}{}", user_id, ALLELE_COLUMN_SUFFIX)),
            MatchRule::ReplicatePattern => Some(format!(
                "{}{}{}",
                user_id, REPLICATE_MARKER, ALLELE_COLUMN_SUFFIX
            )),
            MatchRule::Containment => None,
        }
    }
}

/// Header that matched one of the resolution rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnCandidate {
    pub header: String,
    /// Position of the header in the table
    pub index: usize,
    pub rule: MatchRule,
}

/// The single column chosen to hold a user's genotype calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedGenotypeColumn {
    pub header: String,
    pub index: usize,
    pub rule: MatchRule,
}

impl From<ColumnCandidate> for ResolvedGenotypeColumn {
    fn from(candidate: ColumnCandidate) -> Self {
        Self {
            header: candidate.header,
            index: candidate.index,
            rule: candidate.rule,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_header() {
        assert_eq!(
            MatchRule::ExactPattern.expected_header("IG1234").as_deref(),
            Some("IG1234.Plus/Minus Alleles")
        );
        assert_eq!(
            MatchRule::ReplicatePattern.expected_header("IG1234").as_deref(),
            Some("IG1234-R.Plus/Minus Alleles")
        );
        assert_eq!(MatchRule::Containment.expected_header("IG1234"), None);
    }

    #[test]
    fn test_rule_priority_order() {
        assert!(MatchRule::ExactPattern < MatchRule::ReplicatePattern);
        assert!(MatchRule::ReplicatePattern < MatchRule::Containment);
    }

    #[test]
    fn test_match_rule_serde() {
        let json = serde_json::to_string(&MatchRule::ReplicatePattern).unwrap();
        assert_eq!(json, "\"replicate_pattern\"");
        assert_eq!(MatchRule::Containment.as_str(), "containment");
    }
}
