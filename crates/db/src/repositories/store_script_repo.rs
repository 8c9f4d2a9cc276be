//! Repository for the `store_script` activation table.

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::script::{
    CreateStoreScript, StoreScript, StoreScriptListing, UpdateStoreScript,
};
use crate::repositories::{clamp_limit, clamp_offset, ScriptRepo, StoreRepo};

const COLUMNS: &str = "store_id, script_id, is_active, created_at, updated_at";

pub struct StoreScriptRepo;

impl StoreScriptRepo {
    /// Scripts activated for a store, joined with catalog fields, with the
    /// unpaged total.
    pub async fn list_for_store(
        pool: &PgPool,
        store_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<StoreScriptListing>, i64), CoreError> {
        require_store(pool, store_id).await?;

        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);
        let items = sqlx::query_as::<_, StoreScriptListing>(
            "SELECT s.script_id, s.name, s.estimated_minutes, ss.is_active \
             FROM store_script AS ss \
             JOIN script AS s USING (script_id) \
             WHERE ss.store_id = $1 \
             ORDER BY s.script_id \
             LIMIT $2 OFFSET $3",
        )
        .bind(store_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await
        .map_err(error::internal)?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM store_script WHERE store_id = $1")
                .bind(store_id)
                .fetch_one(pool)
                .await
                .map_err(error::internal)?;
        Ok((items, total))
    }

    /// Activate a script for a store.
    pub async fn create(
        pool: &PgPool,
        store_id: DbId,
        input: &CreateStoreScript,
    ) -> Result<StoreScript, CoreError> {
        require_store(pool, store_id).await?;
        if !ScriptRepo::exists(pool, input.script_id)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "Script",
                id: input.script_id,
            });
        }

        let query = format!(
            "INSERT INTO store_script (store_id, script_id, is_active) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoreScript>(&query)
            .bind(store_id)
            .bind(input.script_id)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
            .map_err(error::map_write_error)
    }

    /// Update an activation's flag.
    pub async fn update(
        pool: &PgPool,
        store_id: DbId,
        script_id: DbId,
        input: &UpdateStoreScript,
    ) -> Result<StoreScript, CoreError> {
        let Some(is_active) = input.is_active else {
            return Err(CoreError::Validation("is_active must be provided".into()));
        };
        let query = format!(
            "UPDATE store_script SET is_active = $3, updated_at = now() \
             WHERE store_id = $1 AND script_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoreScript>(&query)
            .bind(store_id)
            .bind(script_id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "Script",
                id: script_id,
            })
    }

    /// Remove an activation. Blocked while any booking of this store
    /// references the script.
    pub async fn delete(
        pool: &PgPool,
        store_id: DbId,
        script_id: DbId,
    ) -> Result<(), CoreError> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM booking WHERE store_id = $1 AND script_id = $2)",
        )
        .bind(store_id)
        .bind(script_id)
        .fetch_one(pool)
        .await
        .map_err(error::internal)?;
        if referenced {
            return Err(CoreError::Conflict(
                "script is still referenced by bookings of this store".into(),
            ));
        }

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM store_script \
             WHERE store_id = $1 AND script_id = $2 \
             RETURNING script_id",
        )
        .bind(store_id)
        .bind(script_id)
        .fetch_optional(pool)
        .await
        .map_err(error::internal)?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Script",
                id: script_id,
            }),
        }
    }

    /// Find one activation row.
    pub async fn find(
        executor: impl PgExecutor<'_>,
        store_id: DbId,
        script_id: DbId,
    ) -> Result<Option<StoreScript>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM store_script WHERE store_id = $1 AND script_id = $2"
        );
        sqlx::query_as::<_, StoreScript>(&query)
            .bind(store_id)
            .bind(script_id)
            .fetch_optional(executor)
            .await
    }
}

async fn require_store(pool: &PgPool, store_id: DbId) -> Result<(), CoreError> {
    if StoreRepo::exists(pool, store_id)
        .await
        .map_err(error::internal)?
    {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "Store",
            id: store_id,
        })
    }
}
