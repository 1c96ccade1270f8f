//! Before/after matching.
//!
//! An "after" finding is *existing* when some "before" finding has the same
//! rule, message, category, provider, resource, number of sources and
//! position-stripped reference. Positions are ignored because unrelated edits
//! shift line numbers in the analyzed document.
//!
//! Matching is first-match-wins and never consumes the "before" finding, so
//! one pre-existing finding can cover several identical "after" findings
//! reported at different lines.

use crate::models::{Issue, Partition};
use crate::reference::strip_position;

/// Whether `after` is the same finding as `before`, ignoring position.
pub fn same_finding(before: &Issue, after: &Issue) -> bool {
    let (b, a) = (&before.raw, &after.raw);

    b.issue_type == a.issue_type
        && b.code == a.code
        && b.message == a.message
        && b.id == a.id
        && b.validation_category == a.validation_category
        && b.provider_namespace == a.provider_namespace
        && b.resource_type == a.resource_type
        && b.sources.len() == a.sources.len()
        && strip_position(before.jsonref()) == strip_position(after.jsonref())
}

/// Partition `after` into new and existing findings against `before`.
///
/// Every element of `after` lands in exactly one side, in input order.
pub fn partition(before: &[Issue], after: &[Issue]) -> Partition {
    let mut result = Partition::default();

    for candidate in after {
        if before.iter().any(|b| same_finding(b, candidate)) {
            result.existing.push(candidate.clone());
        } else {
            result.new.push(candidate.clone());
        }
    }

    result
}
