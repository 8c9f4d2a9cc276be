use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `script_character` table.
///
/// `is_dm` characters are run by staff and never matched to clients;
/// only active non-DM characters count toward the confirmation bijection.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScriptCharacter {
    pub character_id: DbId,
    pub script_id: DbId,
    pub character_name: String,
    pub is_dm: bool,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for adding a character to a script.
#[derive(Debug, Deserialize)]
pub struct CreateScriptCharacter {
    pub character_name: String,
    #[serde(default)]
    pub is_dm: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// DTO for partially updating a character.
#[derive(Debug, Deserialize)]
pub struct UpdateScriptCharacter {
    pub character_name: Option<String>,
    pub is_dm: Option<bool>,
    pub is_active: Option<bool>,
}

fn default_true() -> bool {
    true
}
