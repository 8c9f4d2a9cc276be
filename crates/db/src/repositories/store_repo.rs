//! Repository for the `store` table.
//!
//! Stores are provisioned by the surrounding platform; the scheduler only
//! needs lookups and existence probes.

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::types::DbId;

use crate::models::store::Store;

const COLUMNS: &str = "store_id, name, created_at, updated_at";

pub struct StoreRepo;

impl StoreRepo {
    /// Find a store by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Store>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM store WHERE store_id = $1");
        sqlx::query_as::<_, Store>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// `true` if the store exists. Accepts any executor so transactional
    /// flows can reuse it.
    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<i32> = sqlx::query_scalar("SELECT 1 FROM store WHERE store_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }
}
