use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `script` table (global catalog entry).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Script {
    pub script_id: DbId,
    pub name: String,
    pub estimated_minutes: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a script.
#[derive(Debug, Deserialize)]
pub struct CreateScript {
    pub name: String,
    pub estimated_minutes: i32,
}

/// DTO for partially updating a script.
#[derive(Debug, Deserialize)]
pub struct UpdateScript {
    pub name: Option<String>,
    pub estimated_minutes: Option<i32>,
}

/// A row from the `store_script` activation table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoreScript {
    pub store_id: DbId,
    pub script_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for activating a script for a store.
#[derive(Debug, Deserialize)]
pub struct CreateStoreScript {
    pub script_id: DbId,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// DTO for updating an activation.
#[derive(Debug, Deserialize)]
pub struct UpdateStoreScript {
    pub is_active: Option<bool>,
}

/// A script joined with its activation flag for one store, the shape the
/// store-facing script list returns.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoreScriptListing {
    pub script_id: DbId,
    pub name: String,
    pub estimated_minutes: i32,
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}
