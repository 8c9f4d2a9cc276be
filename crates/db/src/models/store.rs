use serde::Serialize;
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `store` table.
///
/// Stores are provisioned by the surrounding platform; the scheduler only
/// reads them.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Store {
    pub store_id: DbId,
    pub name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
