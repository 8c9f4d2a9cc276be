//! Booking-scoped match rows: characters to clients, DMs to characters.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::matching::DmAssignment;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `character_client_match` table: one non-DM character of
/// the booking's script filled by one of the booking's clients.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterClientMatch {
    pub character_client_match_id: DbId,
    pub booking_id: DbId,
    pub character_id: DbId,
    pub client_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a character-client match.
#[derive(Debug, Deserialize)]
pub struct CreateCharacterClientMatch {
    pub character_id: DbId,
    pub client_id: DbId,
}

/// DTO for partially updating a character-client match.
#[derive(Debug, Deserialize)]
pub struct UpdateCharacterClientMatch {
    pub character_id: Option<DbId>,
    pub client_id: Option<DbId>,
}

/// A row from the `character_dm_match` table: a DM either running a
/// specific DM-only character or holding an unassigned seat.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CharacterDmMatch {
    pub character_dm_match_id: DbId,
    pub booking_id: DbId,
    pub dm_id: DbId,
    pub character_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl CharacterDmMatch {
    /// Tagged view of the nullable character column.
    pub fn assignment(&self) -> DmAssignment {
        DmAssignment::from_column(self.character_id)
    }
}

/// DTO for creating a character-DM match. Without a `character_id` the DM
/// holds an unassigned seat.
#[derive(Debug, Deserialize)]
pub struct CreateCharacterDmMatch {
    pub dm_id: DbId,
    pub character_id: Option<DbId>,
}

/// DTO for updating a character-DM match. `clear_character` moves the DM
/// back to an unassigned seat; it is mutually exclusive with `character_id`.
#[derive(Debug, Deserialize)]
pub struct UpdateCharacterDmMatch {
    pub dm_id: Option<DbId>,
    pub character_id: Option<DbId>,
    #[serde(default)]
    pub clear_character: bool,
}
