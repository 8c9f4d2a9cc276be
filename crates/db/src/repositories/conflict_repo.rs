//! Conflict detection over confirmed room occupancy.
//!
//! Only scheduled and completed bookings with a room and a time window
//! participate; incomplete and cancelled bookings never conflict. Two
//! bookings sharing a room conflict iff their half-open `[start, end)`
//! windows overlap — the SQL below is the storage-side twin of
//! `stagedoor_core::conflict::overlaps`.

use std::collections::HashMap;

use sqlx::PgExecutor;
use stagedoor_core::types::{DbId, Timestamp};

use crate::models::booking::{Booking, ConflictSummary};
use crate::models::status::BookingStatus;

pub struct ConflictRepo;

impl ConflictRepo {
    /// Conflict summary for one booking: ids (ascending) of other
    /// scheduled/completed bookings in the same room with an overlapping
    /// window.
    pub async fn summary_for(
        executor: impl PgExecutor<'_>,
        booking: &Booking,
    ) -> Result<ConflictSummary, sqlx::Error> {
        let (Some(room_id), Some(start_at), Some(end_at)) =
            (booking.store_room_id, booking.start_at, booking.end_at)
        else {
            return Ok(ConflictSummary::default());
        };
        if !matches!(
            BookingStatus::from_id(booking.booking_status_id),
            Some(BookingStatus::Scheduled | BookingStatus::Completed)
        ) {
            return Ok(ConflictSummary::default());
        }

        let ids: Vec<DbId> = sqlx::query_scalar(
            "SELECT booking_id FROM booking \
             WHERE store_room_id = $1 \
               AND booking_id <> $2 \
               AND booking_status_id IN ($3, $4) \
               AND start_at < $6 AND $5 < end_at \
             ORDER BY booking_id",
        )
        .bind(room_id)
        .bind(booking.booking_id)
        .bind(BookingStatus::Scheduled.id())
        .bind(BookingStatus::Completed.id())
        .bind(start_at)
        .bind(end_at)
        .fetch_all(executor)
        .await?;

        Ok(ConflictSummary {
            has_conflict: !ids.is_empty(),
            conflict_count: ids.len() as i64,
            conflict_booking_ids: ids,
        })
    }

    /// Conflicting booking ids for a whole page of bookings in one query,
    /// keyed by booking id. Bookings without conflicts are absent from the
    /// map.
    pub async fn conflict_ids_for_page(
        executor: impl PgExecutor<'_>,
        booking_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<DbId>>, sqlx::Error> {
        let pairs: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT b.booking_id, other.booking_id \
             FROM booking AS b \
             JOIN booking AS other \
               ON other.store_room_id = b.store_room_id \
              AND other.booking_id <> b.booking_id \
              AND other.booking_status_id IN ($2, $3) \
              AND other.start_at < b.end_at AND b.start_at < other.end_at \
             WHERE b.booking_id = ANY($1) \
               AND b.booking_status_id IN ($2, $3) \
             ORDER BY b.booking_id, other.booking_id",
        )
        .bind(booking_ids)
        .bind(BookingStatus::Scheduled.id())
        .bind(BookingStatus::Completed.id())
        .fetch_all(executor)
        .await?;

        let mut map: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (booking_id, other_id) in pairs {
            map.entry(booking_id).or_default().push(other_id);
        }
        Ok(map)
    }

    /// Does any scheduled/completed booking occupy `room_id` with a window
    /// overlapping `[start_at, end_at)`?
    pub async fn room_is_occupied(
        executor: impl PgExecutor<'_>,
        room_id: DbId,
        start_at: Timestamp,
        end_at: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM booking \
                 WHERE store_room_id = $1 \
                   AND booking_status_id IN ($2, $3) \
                   AND start_at < $5 AND $4 < end_at \
             )",
        )
        .bind(room_id)
        .bind(BookingStatus::Scheduled.id())
        .bind(BookingStatus::Completed.id())
        .bind(start_at)
        .bind(end_at)
        .fetch_one(executor)
        .await
    }

    /// SQL fragment for the `has_conflict` list filter, applying the same
    /// existence predicate per row of `booking AS b`. Uses no bind
    /// parameters so callers can splice it into dynamically composed WHERE
    /// clauses.
    pub(crate) fn list_predicate_sql() -> String {
        let scheduled = BookingStatus::Scheduled.id();
        let completed = BookingStatus::Completed.id();
        format!(
            "(b.booking_status_id IN ({scheduled}, {completed}) AND EXISTS ( \
                 SELECT 1 FROM booking AS other \
                 WHERE other.store_room_id = b.store_room_id \
                   AND other.booking_id <> b.booking_id \
                   AND other.booking_status_id IN ({scheduled}, {completed}) \
                   AND other.start_at < b.end_at AND b.start_at < other.end_at \
             ))"
        )
    }
}
