use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `slot` table: a deduplicated (store, start time) pair
/// shared by every booking starting at that instant.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Slot {
    pub slot_id: DbId,
    pub store_id: DbId,
    pub start_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a slot.
#[derive(Debug, Deserialize)]
pub struct CreateSlot {
    pub start_at: Timestamp,
}

/// DTO for moving a slot.
#[derive(Debug, Deserialize)]
pub struct UpdateSlot {
    pub start_at: Option<Timestamp>,
}
