//! Room selection policy for booking confirmation.
//!
//! Candidates are the store's active rooms in ascending id order. A
//! preferred room must reference an active room of the store and wins when
//! its window is free; otherwise the first free room in order is taken.
//! When every room is occupied the allocation fails with Conflict instead
//! of double-booking a room.

use sqlx::PgConnection;
use stagedoor_core::error::CoreError;
use stagedoor_core::types::{DbId, Timestamp};

use crate::error;
use crate::repositories::ConflictRepo;

pub struct RoomAllocator;

impl RoomAllocator {
    /// Pick a room for the `[start_at, end_at)` window. Runs on the
    /// confirmation transaction's connection so the probes and the final
    /// booking write see the same snapshot.
    pub async fn select_room(
        conn: &mut PgConnection,
        store_id: DbId,
        start_at: Timestamp,
        end_at: Timestamp,
        preferred_room_id: Option<DbId>,
    ) -> Result<DbId, CoreError> {
        let rooms: Vec<DbId> = sqlx::query_scalar(
            "SELECT store_room_id FROM store_room \
             WHERE store_id = $1 AND is_active = true \
             ORDER BY store_room_id",
        )
        .bind(store_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(error::internal)?;

        if let Some(preferred) = preferred_room_id {
            if !rooms.contains(&preferred) {
                return Err(CoreError::NotFound {
                    entity: "Room",
                    id: preferred,
                });
            }
            if !ConflictRepo::room_is_occupied(&mut *conn, preferred, start_at, end_at)
                .await
                .map_err(error::internal)?
            {
                return Ok(preferred);
            }
        }

        for room_id in rooms {
            if preferred_room_id == Some(room_id) {
                // Already probed above.
                continue;
            }
            if !ConflictRepo::room_is_occupied(&mut *conn, room_id, start_at, end_at)
                .await
                .map_err(error::internal)?
            {
                return Ok(room_id);
            }
        }

        Err(CoreError::Conflict(
            "no free room for the requested time window".into(),
        ))
    }
}
