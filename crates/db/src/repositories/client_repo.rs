//! Repository for the `client` table (existence probes only; client
//! management lives outside the scheduler).

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::types::DbId;

use crate::models::client::Client;

const COLUMNS: &str = "client_id, display_name, phone, created_at, updated_at";

pub struct ClientRepo;

impl ClientRepo {
    /// Find a client by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Client>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM client WHERE client_id = $1");
        sqlx::query_as::<_, Client>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `true` if the client exists.
    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<i32> = sqlx::query_scalar("SELECT 1 FROM client WHERE client_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }

    /// Return the first id from `ids` that does not exist, if any.
    pub async fn first_missing(
        executor: impl PgExecutor<'_>,
        ids: &[DbId],
    ) -> Result<Option<DbId>, sqlx::Error> {
        let existing: Vec<DbId> =
            sqlx::query_scalar("SELECT client_id FROM client WHERE client_id = ANY($1)")
                .bind(ids)
                .fetch_all(executor)
                .await?;
        Ok(ids.iter().copied().find(|id| !existing.contains(id)))
    }
}
