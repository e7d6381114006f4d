// ==============================================================================
// column_resolver.rs - Genotype Column Detection
// ==============================================================================
// Description: Locates the column holding a user's allele calls by header name
// Author: Matt Barham
// Created: 2026-10-12
// Modified: 2026-10-17
// Version: 1.3.0
// ==============================================================================
// Rules (first rule with exactly one match wins):
//   1. <USER>.Plus/Minus Alleles
//   2. <USER>-R.Plus/Minus Alleles
//   3. any header containing <USER> (case-insensitive)
// Structured rules prefer a byte-exact header and accept an ASCII
// case-insensitive match otherwise. Case variants without a byte-exact header
// fall through to the next rule. Several loose matches are never guessed.
// ==============================================================================

use thiserror::Error;

use crate::models::{ColumnCandidate, MatchRule, ResolvedGenotypeColumn};

/// Errors that can occur while resolving a genotype column
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("User identifier is empty")]
    EmptyIdentifier,

    #[error("Unable to find genotype column for user '{user_id}'. Available columns: {available:?}")]
    NotFound {
        user_id: String,
        available: Vec<String>,
    },

    #[error("Several columns match user '{user_id}': {candidates:?}. Use a more specific identifier")]
    Ambiguous {
        user_id: String,
        candidates: Vec<String>,
    },
}

/// Resolve the genotype column for `user_identifier`
///
/// # Arguments
/// * `user_identifier` - User ID as typed; surrounding whitespace is ignored
/// * `headers` - Table headers in file order
///
/// # Returns
/// * `Ok(ResolvedGenotypeColumn)` - The single chosen header and the rule that chose it
/// * `Err(ResolveError)` - Empty identifier, no match, or several loose matches
///
/// # Example
/// ```
/// use variant_extractor::column_resolver::resolve_genotype_column;
///
/// let headers = ["chr", "pos", "id", "JDOE.Plus/Minus Alleles", "other"];
/// let column = resolve_genotype_column("JDOE", &headers).unwrap();
/// assert_eq!(column.header, "JDOE.Plus/Minus Alleles");
/// assert_eq!(column.index, 3);
/// ```
pub fn resolve_genotype_column<S: AsRef<str>>(
    user_identifier: &str,
    headers: &[S],
) -> Result<ResolvedGenotypeColumn, ResolveError> {
    let user_id = user_identifier.trim();
    if user_id.is_empty() {
        return Err(ResolveError::EmptyIdentifier);
    }

    for rule in [MatchRule::ExactPattern, MatchRule::ReplicatePattern] {
        let mut candidates = rule_candidates(rule, user_id, headers);

        match candidates.len() {
            0 => continue,
            1 => return Ok(candidates.remove(0).into()),
            _ => {
                if let Some(column) = pick_byte_exact(rule, user_id, candidates) {
                    return Ok(column);
                }
            }
        }
    }

    let mut loose = rule_candidates(MatchRule::Containment, user_id, headers);
    match loose.len() {
        0 => Err(ResolveError::NotFound {
            user_id: user_id.to_string(),
            available: headers.iter().map(|h| AsRef::<str>::as_ref(h).to_string()).collect(),
        }),
        1 => Ok(loose.remove(0).into()),
        _ => Err(ambiguous(user_id, loose)),
    }
}

/// All headers matching any rule, ordered by rule priority then header position
///
/// Intended for diagnostics; [`resolve_genotype_column`] is the decision point.
pub fn column_candidates<S: AsRef<str>>(user_identifier: &str, headers: &[S]) -> Vec<ColumnCandidate> {
    let user_id = user_identifier.trim();
    if user_id.is_empty() {
        return Vec::new();
    }

    [
        MatchRule::ExactPattern,
        MatchRule::ReplicatePattern,
        MatchRule::Containment,
    ]
    .into_iter()
    .flat_map(|rule| rule_candidates(rule, user_id, headers))
    .collect()
}

fn rule_candidates<S: AsRef<str>>(rule: MatchRule, user_id: &str, headers: &[S]) -> Vec<ColumnCandidate> {
    let expected = rule.expected_header(user_id);
    let needle = user_id.to_lowercase();

    headers
        .iter()
        .enumerate()
        .filter(|(_, h)| {
            let h = AsRef::<str>::as_ref(*h);
            match &expected {
                Some(expected) => h.eq_ignore_ascii_case(expected),
                None => h.to_lowercase().contains(&needle),
            }
        })
        .map(|(index, h)| ColumnCandidate {
            header: AsRef::<str>::as_ref(h).to_string(),
            index,
            rule,
        })
        .collect()
}

/// Several case variants of a structured header: only a byte-exact one may win
fn pick_byte_exact(
    rule: MatchRule,
    user_id: &str,
    mut candidates: Vec<ColumnCandidate>,
) -> Option<ResolvedGenotypeColumn> {
    let expected = rule.expected_header(user_id)?;
    let pos = candidates.iter().position(|c| c.header == expected)?;
    Some(candidates.swap_remove(pos).into())
}

fn ambiguous(user_id: &str, candidates: Vec<ColumnCandidate>) -> ResolveError {
    ResolveError::Ambiguous {
        user_id: user_id.to_string(),
        candidates: candidates.into_iter().map(|c| c.header).collect(),
    }
}
