use serde::Serialize;
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `dm` table: a staff person eligible to run DM-only
/// characters. Roster management lives outside the scheduler.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Dm {
    pub dm_id: DbId,
    pub display_name: String,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
