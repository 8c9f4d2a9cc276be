//! Repository for the `slot` table.
//!
//! Slots are deduplicated (store, start time) pairs. Ad-hoc CRUD lives
//! here; confirmation reuses the same table through [`SlotRepo::resolve`],
//! whose upsert makes concurrent confirmations at the same instant share
//! one row.

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::error::CoreError;
use stagedoor_core::types::{DbId, Timestamp};

use crate::error;
use crate::models::slot::{CreateSlot, Slot, UpdateSlot};
use crate::repositories::{clamp_limit, clamp_offset, StoreRepo};

const COLUMNS: &str = "slot_id, store_id, start_at, created_at, updated_at";

pub struct SlotRepo;

impl SlotRepo {
    /// List a store's slots with the unpaged total.
    pub async fn list_by_store(
        pool: &PgPool,
        store_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<Slot>, i64), CoreError> {
        require_store(pool, store_id).await?;

        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM slot \
             WHERE store_id = $1 \
             ORDER BY start_at, slot_id \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, Slot>(&query)
            .bind(store_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(error::internal)?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM slot WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(pool)
            .await
            .map_err(error::internal)?;
        Ok((items, total))
    }

    /// Create a slot.
    pub async fn create(
        pool: &PgPool,
        store_id: DbId,
        input: &CreateSlot,
    ) -> Result<Slot, CoreError> {
        require_store(pool, store_id).await?;

        let query = format!(
            "INSERT INTO slot (store_id, start_at) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(store_id)
            .bind(input.start_at)
            .fetch_one(pool)
            .await
            .map_err(error::map_write_error)
    }

    /// Move a slot to another start time.
    pub async fn update(
        pool: &PgPool,
        store_id: DbId,
        slot_id: DbId,
        input: &UpdateSlot,
    ) -> Result<Slot, CoreError> {
        let Some(start_at) = input.start_at else {
            return Err(CoreError::Validation("start_at must be provided".into()));
        };
        let query = format!(
            "UPDATE slot SET start_at = $3, updated_at = now() \
             WHERE slot_id = $1 AND store_id = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Slot>(&query)
            .bind(slot_id)
            .bind(store_id)
            .bind(start_at)
            .fetch_optional(pool)
            .await
            .map_err(error::map_write_error)?
            .ok_or(CoreError::NotFound {
                entity: "Slot",
                id: slot_id,
            })
    }

    /// Delete a slot. Blocked while any booking references it.
    pub async fn delete(pool: &PgPool, store_id: DbId, slot_id: DbId) -> Result<(), CoreError> {
        let referenced: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM booking WHERE slot_id = $1)")
                .bind(slot_id)
                .fetch_one(pool)
                .await
                .map_err(error::internal)?;
        if referenced {
            return Err(CoreError::Conflict(
                "slot is still referenced by bookings".into(),
            ));
        }

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM slot WHERE slot_id = $1 AND store_id = $2 RETURNING slot_id",
        )
        .bind(slot_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await
        .map_err(error::internal)?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Slot",
                id: slot_id,
            }),
        }
    }

    /// Get or create the slot for (store, start time). The upsert leans on
    /// `uq_slot_store_id_start_at` so concurrent callers converge on one
    /// row.
    pub async fn resolve(
        executor: impl PgExecutor<'_>,
        store_id: DbId,
        start_at: Timestamp,
    ) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar(
            "INSERT INTO slot (store_id, start_at) \
             VALUES ($1, $2) \
             ON CONFLICT ON CONSTRAINT uq_slot_store_id_start_at \
             DO UPDATE SET updated_at = now() \
             RETURNING slot_id",
        )
        .bind(store_id)
        .bind(start_at)
        .fetch_one(executor)
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
