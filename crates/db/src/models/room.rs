use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `store_room` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StoreRoom {
    pub store_room_id: DbId,
    pub store_id: DbId,
    pub name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a room.
#[derive(Debug, Deserialize)]
pub struct CreateRoom {
    pub name: String,
}

/// DTO for partially updating a room.
#[derive(Debug, Deserialize)]
pub struct UpdateRoom {
    pub name: Option<String>,
    pub is_active: Option<bool>,
}
