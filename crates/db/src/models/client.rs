use serde::Serialize;
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

/// A row from the `client` table.
///
/// Clients are managed by the surrounding platform; the scheduler links
/// them to bookings and character matches.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Client {
    pub client_id: DbId,
    pub display_name: String,
    pub phone: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
