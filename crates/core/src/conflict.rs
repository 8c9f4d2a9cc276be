//! Room-occupancy overlap predicate.

use crate::types::Timestamp;

/// Half-open interval overlap: `[a_start, a_end)` and `[b_start, b_end)`
/// conflict iff `a_start < b_end && b_start < a_end`.
///
/// Back-to-back windows, where one booking ends exactly when the next
/// begins, do not conflict. The SQL conflict queries in the repository
/// layer encode this same predicate.
pub fn overlaps(
    a_start: Timestamp,
    a_end: Timestamp,
    b_start: Timestamp,
    b_end: Timestamp,
) -> bool {
    a_start < b_end && b_start < a_end
}
