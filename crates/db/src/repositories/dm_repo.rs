//! Repository for the `dm` table (existence probes only; roster
//! management lives outside the scheduler).

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::types::DbId;

use crate::models::dm::Dm;

const COLUMNS: &str = "dm_id, display_name, is_active, created_at, updated_at";

pub struct DmRepo;

impl DmRepo {
    /// Find a DM by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Dm>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dm WHERE dm_id = $1");
        sqlx::query_as::<_, Dm>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `true` if the DM exists.
    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<i32> = sqlx::query_scalar("SELECT 1 FROM dm WHERE dm_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }
}
