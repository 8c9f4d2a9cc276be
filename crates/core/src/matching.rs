//! Character-to-person matching rules.

use std::collections::BTreeSet;

use crate::types::DbId;

/// How a DM participates in a booking.
///
/// A DM either runs a specific DM-only character or holds an unassigned
/// seat. The storage layer keeps this as a nullable character column with
/// partial unique indexes; this variant makes the rule explicit: one row
/// per (booking, character) when assigned, at most one unassigned seat per
/// (booking, dm).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmAssignment {
    /// Runs the DM-only character with this id.
    Character(DbId),
    /// Holds a seat without a character yet.
    Unassigned,
}

impl DmAssignment {
    /// Build from the nullable `character_id` column.
    pub fn from_column(character_id: Option<DbId>) -> Self {
        match character_id {
            Some(id) => DmAssignment::Character(id),
            None => DmAssignment::Unassigned,
        }
    }

    /// The assigned character id, if any.
    pub fn character_id(self) -> Option<DbId> {
        match self {
            DmAssignment::Character(id) => Some(id),
            DmAssignment::Unassigned => None,
        }
    }

    pub fn is_unassigned(self) -> bool {
        matches!(self, DmAssignment::Unassigned)
    }
}

/// Verify that `matches` (character id, client id pairs) form a strict
/// bijection between the script's active non-DM cast and the booking's
/// clients: every character matched to exactly one client and vice versa,
/// nobody left out, nobody matched twice.
///
/// Returns a descriptive reason on failure.
pub fn verify_bijection(
    cast: &[DbId],
    clients: &[DbId],
    matches: &[(DbId, DbId)],
) -> Result<(), String> {
    let cast: BTreeSet<DbId> = cast.iter().copied().collect();
    let clients: BTreeSet<DbId> = clients.iter().copied().collect();

    if matches.len() != cast.len() {
        return Err(format!(
            "expected {} character-client matches, found {}",
            cast.len(),
            matches.len()
        ));
    }

    let matched_characters: BTreeSet<DbId> = matches.iter().map(|&(c, _)| c).collect();
    let matched_clients: BTreeSet<DbId> = matches.iter().map(|&(_, c)| c).collect();

    if matched_characters.len() != matches.len() {
        return Err("a character is matched more than once".into());
    }
    if matched_clients.len() != matches.len() {
        return Err("a client is matched more than once".into());
    }
    if matched_characters != cast {
        return Err("matched characters do not cover the script's active cast".into());
    }
    if matched_clients != clients {
        return Err("matched clients do not cover the booking's clients".into());
    }

    Ok(())
}
