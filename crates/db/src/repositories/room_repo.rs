//! Repository for the `store_room` table.

use sqlx::PgPool;
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::room::{CreateRoom, StoreRoom, UpdateRoom};
use crate::repositories::{clamp_limit, clamp_offset, StoreRepo};

const COLUMNS: &str = "store_room_id, store_id, name, is_active, created_at, updated_at";

pub struct RoomRepo;

impl RoomRepo {
    /// List a store's rooms with the unpaged total.
    pub async fn list_by_store(
        pool: &PgPool,
        store_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<StoreRoom>, i64), CoreError> {
        require_store(pool, store_id).await?;

        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM store_room \
             WHERE store_id = $1 \
             ORDER BY store_room_id \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, StoreRoom>(&query)
            .bind(store_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(error::internal)?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM store_room WHERE store_id = $1")
            .bind(store_id)
            .fetch_one(pool)
            .await
            .map_err(error::internal)?;
        Ok((items, total))
    }

    /// Create a room. Room names are unique per store.
    pub async fn create(
        pool: &PgPool,
        store_id: DbId,
        input: &CreateRoom,
    ) -> Result<StoreRoom, CoreError> {
        require_store(pool, store_id).await?;

        let query = format!(
            "INSERT INTO store_room (store_id, name) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, StoreRoom>(&query)
            .bind(store_id)
            .bind(&input.name)
            .fetch_one(pool)
            .await
            .map_err(error::map_write_error)
    }

    /// Partially update a room.
    pub async fn update(
        pool: &PgPool,
        store_id: DbId,
        room_id: DbId,
        input: &UpdateRoom,
    ) -> Result<StoreRoom, CoreError> {
        // Build the SET clause and track the next bind parameter index.
        let mut updates = vec!["updated_at = now()".to_string()];
        let mut bind_idx: u32 = 3;

        if input.name.is_some() {
            updates.push(format!("name = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.is_active.is_some() {
            updates.push(format!("is_active = ${bind_idx}"));
        }

        let query = format!(
            "UPDATE store_room SET {} \
             WHERE store_room_id = $1 AND store_id = $2 \
             RETURNING {COLUMNS}",
            updates.join(", "),
        );
        let mut update = sqlx::query_as::<_, StoreRoom>(&query)
            .bind(room_id)
            .bind(store_id);
        if let Some(name) = &input.name {
            update = update.bind(name);
        }
        if let Some(is_active) = input.is_active {
            update = update.bind(is_active);
        }
        update
            .fetch_optional(pool)
            .await
            .map_err(error::map_write_error)?
            .ok_or(CoreError::NotFound {
                entity: "Room",
                id: room_id,
            })
    }

    /// Delete a room. Blocked while any booking references it.
    pub async fn delete(pool: &PgPool, store_id: DbId, room_id: DbId) -> Result<(), CoreError> {
        let referenced: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM booking WHERE store_room_id = $1)",
        )
        .bind(room_id)
        .fetch_one(pool)
        .await
        .map_err(error::internal)?;
        if referenced {
            return Err(CoreError::Conflict(
                "room is still referenced by bookings".into(),
            ));
        }

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM store_room \
             WHERE store_room_id = $1 AND store_id = $2 \
             RETURNING store_room_id",
        )
        .bind(room_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await
        .map_err(error::internal)?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Room",
                id: room_id,
            }),
        }
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
