//! Order-independent comparison of two record collections.

use crate::domain::Category;
use crate::records::InteractionRecord;
use tracing::trace;

#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    Matched,
    /// Per-element comparison is skipped when the counts differ.
    CountMismatch { expected: usize, found: usize },
    /// (candidate, reference) pairs at aligned sorted positions that disagree.
    FieldMismatches(Vec<(InteractionRecord, InteractionRecord)>),
}

#[cfg(test)]
impl MatchResult {
    fn is_match(&self) -> bool {
        matches!(self, Self::Matched)
    }
}

/// Sorts both collections by canonical order and pairs them positionally.
///
/// Both sides are expected to hold canonicalized records of `category`.
pub fn match_records(
    category: Category,
    mut candidate: Vec<InteractionRecord>,
    mut reference: Vec<InteractionRecord>,
    tolerance: f64,
) -> MatchResult {
    if candidate.len() != reference.len() {
        return MatchResult::CountMismatch {
            expected: reference.len(),
            found: candidate.len(),
        };
    }

    candidate.sort_by(InteractionRecord::canonical_order);
    reference.sort_by(InteractionRecord::canonical_order);

    let mismatches: Vec<_> = candidate
        .into_iter()
        .zip(reference)
        .filter(|(found, expected)| {
            !found
                .interaction
                .agrees_with(&expected.interaction, tolerance)
        })
        .collect();

    trace!(%category, mismatches = mismatches.len(), "matched records");
    if mismatches.is_empty() {
        MatchResult::Matched
    } else {
        MatchResult::FieldMismatches(mismatches)
    }
}
