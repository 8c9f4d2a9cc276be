//! Repository for the `booking` table: the booking lifecycle state machine.
//!
//! Every multi-row operation runs inside a single transaction, and every
//! status gate is re-checked inside that transaction (`SELECT ... FOR
//! UPDATE` row locks plus conditional `UPDATE ... WHERE booking_status_id =
//! ...` writes) so two concurrent transitions cannot both win. Uniqueness
//! constraints are the backstop against racing inserts and surface as
//! Conflict through the error boundary in `crate::error`.

use std::collections::HashMap;

use sqlx::{PgConnection, PgExecutor, PgPool};
use stagedoor_core::booking::{effective_minutes, end_at};
use stagedoor_core::error::CoreError;
use stagedoor_core::matching::verify_bijection;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::booking::{
    AddBookingClient, Booking, BookingDetail, BookingListQuery, ConfirmBooking, ConflictSummary,
    CreateIncompleteBooking, UpdateIncompleteBooking,
};
use crate::models::status::BookingStatus;
use crate::repositories::{
    clamp_limit, clamp_offset, ClientRepo, ConflictRepo, RoomAllocator, ScriptCharacterRepo,
    SlotRepo, StoreRepo, StoreScriptRepo,
};

/// Column list for `booking` queries.
const COLUMNS: &str = "\
    booking_id, store_id, script_id, slot_id, store_room_id, \
    booking_status_id, target_month, start_at, end_at, \
    duration_override_minutes, created_at, updated_at";

/// Provides the booking lifecycle operations.
pub struct BookingRepo;

impl BookingRepo {
    /// Create a booking in status incomplete with a target month and its
    /// initial set of clients.
    pub async fn create_incomplete(
        pool: &PgPool,
        store_id: DbId,
        input: &CreateIncompleteBooking,
    ) -> Result<BookingDetail, CoreError> {
        if input.client_ids.is_empty() {
            return Err(CoreError::Validation(
                "client_ids must include at least one client".into(),
            ));
        }

        let mut tx = pool.begin().await.map_err(error::internal)?;

        if !StoreRepo::exists(&mut *tx, store_id)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "Store",
                id: store_id,
            });
        }

        if let Some(script_id) = input.script_id {
            require_active_store_script(&mut tx, store_id, script_id).await?;
        }

        if let Some(missing) = ClientRepo::first_missing(&mut *tx, &input.client_ids)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "Client",
                id: missing,
            });
        }

        let query = format!(
            "INSERT INTO booking (store_id, script_id, booking_status_id, target_month) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(store_id)
            .bind(input.script_id)
            .bind(BookingStatus::Incomplete.id())
            .bind(input.target_month)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::internal)?;

        sqlx::query(
            "INSERT INTO booking_client (booking_id, client_id) \
             SELECT DISTINCT $1::bigint, ids.client_id \
             FROM unnest($2::bigint[]) AS ids (client_id)",
        )
        .bind(booking.booking_id)
        .bind(&input.client_ids)
        .execute(&mut *tx)
        .await
        .map_err(error::map_write_error)?;

        let detail = Self::detail(&mut *tx, booking).await?;
        tx.commit().await.map_err(error::internal)?;
        Ok(detail)
    }

    /// Fetch one booking of a store with its clients and conflict view.
    pub async fn find_detail(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
    ) -> Result<BookingDetail, CoreError> {
        let mut conn = pool.acquire().await.map_err(error::internal)?;
        let query = format!("SELECT {COLUMNS} FROM booking WHERE booking_id = $1 AND store_id = $2");
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(store_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "Booking",
                id: booking_id,
            })?;
        Self::detail(&mut *conn, booking).await
    }

    /// List a store's bookings with optional status, target-month, and
    /// conflict-flag filters. Returns the page and the unpaged total.
    pub async fn list(
        pool: &PgPool,
        store_id: DbId,
        params: &BookingListQuery,
    ) -> Result<(Vec<BookingDetail>, i64), CoreError> {
        let limit = clamp_limit(params.limit);
        let offset = clamp_offset(params.offset);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["b.store_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if params.booking_status_id.is_some() {
            conditions.push(format!("b.booking_status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.target_month.is_some() {
            conditions.push(format!("b.target_month = ${bind_idx}"));
            bind_idx += 1;
        }
        if let Some(flag) = params.has_conflict {
            let predicate = ConflictRepo::list_predicate_sql();
            conditions.push(if flag {
                predicate
            } else {
                format!("NOT {predicate}")
            });
        }

        let where_clause = conditions.join(" AND ");

        let count_query = format!("SELECT COUNT(*) FROM booking AS b WHERE {where_clause}");
        let mut count = sqlx::query_scalar::<_, i64>(&count_query).bind(store_id);
        if let Some(status_id) = params.booking_status_id {
            count = count.bind(status_id);
        }
        if let Some(month) = params.target_month {
            count = count.bind(month);
        }
        let total = count.fetch_one(pool).await.map_err(error::internal)?;

        let page_query = format!(
            "SELECT {COLUMNS} FROM booking AS b \
             WHERE {where_clause} \
             ORDER BY b.booking_id DESC \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1,
        );
        let mut page = sqlx::query_as::<_, Booking>(&page_query).bind(store_id);
        if let Some(status_id) = params.booking_status_id {
            page = page.bind(status_id);
        }
        if let Some(month) = params.target_month {
            page = page.bind(month);
        }
        let bookings = page
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(error::internal)?;

        let ids: Vec<DbId> = bookings.iter().map(|b| b.booking_id).collect();
        let mut clients = Self::client_ids_for_page(pool, &ids)
            .await
            .map_err(error::internal)?;
        let mut conflicts = ConflictRepo::conflict_ids_for_page(pool, &ids)
            .await
            .map_err(error::internal)?;

        let items = bookings
            .into_iter()
            .map(|booking| {
                let client_ids = clients.remove(&booking.booking_id).unwrap_or_default();
                let conflict_ids = conflicts.remove(&booking.booking_id).unwrap_or_default();
                let summary = ConflictSummary {
                    has_conflict: !conflict_ids.is_empty(),
                    conflict_count: conflict_ids.len() as i64,
                    conflict_booking_ids: conflict_ids,
                };
                BookingDetail::from_parts(booking, client_ids, summary)
            })
            .collect();

        Ok((items, total))
    }

    /// Update target month and/or script while the booking is incomplete.
    pub async fn update_incomplete(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        input: &UpdateIncompleteBooking,
    ) -> Result<BookingDetail, CoreError> {
        if input.clear_script && input.script_id.is_some() {
            return Err(CoreError::Conflict(
                "clear_script and script_id are mutually exclusive".into(),
            ));
        }

        let mut tx = pool.begin().await.map_err(error::internal)?;

        if let Some(script_id) = input.script_id {
            require_active_store_script(&mut tx, store_id, script_id).await?;
        }

        // Build the SET clause and track the next bind parameter index.
        let mut updates = vec!["updated_at = now()".to_string()];
        let mut bind_idx: u32 = 3;

        if input.target_month.is_some() {
            updates.push(format!("target_month = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.clear_script {
            updates.push("script_id = NULL".to_string());
        } else if input.script_id.is_some() {
            updates.push(format!("script_id = ${bind_idx}"));
        }

        let query = format!(
            "UPDATE booking SET {} \
             WHERE booking_id = $1 AND store_id = $2 AND booking_status_id = {} \
             RETURNING {COLUMNS}",
            updates.join(", "),
            BookingStatus::Incomplete.id(),
        );
        let mut update = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(store_id);
        if let Some(month) = input.target_month {
            update = update.bind(month);
        }
        if !input.clear_script {
            if let Some(script_id) = input.script_id {
                update = update.bind(script_id);
            }
        }
        let booking = update
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::internal)?
            .ok_or_else(|| {
                CoreError::Conflict("booking is not incomplete or was not found".into())
            })?;

        let detail = Self::detail(&mut *tx, booking).await?;
        tx.commit().await.map_err(error::internal)?;
        Ok(detail)
    }

    /// Confirm an incomplete booking into a room and time window.
    ///
    /// Validates the script activation, the client count against the
    /// script's active non-DM cast, and the character-client bijection;
    /// then allocates a room, resolves the deduplicated slot, and flips
    /// the status with a conditional write. All inside one transaction.
    pub async fn confirm(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        input: &ConfirmBooking,
    ) -> Result<BookingDetail, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;

        let query = format!(
            "SELECT {COLUMNS} FROM booking \
             WHERE booking_id = $1 AND store_id = $2 \
             FOR UPDATE"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(store_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "Booking",
                id: booking_id,
            })?;

        if booking.booking_status_id != BookingStatus::Incomplete.id() {
            return Err(CoreError::Conflict(
                "only incomplete bookings can be confirmed".into(),
            ));
        }
        let script_id = booking
            .script_id
            .ok_or_else(|| CoreError::Conflict("booking has no script assigned".into()))?;
        require_active_script_for_confirm(&mut tx, store_id, script_id).await?;

        let client_ids = Self::client_ids(&mut *tx, booking_id)
            .await
            .map_err(error::internal)?;
        if client_ids.is_empty() {
            return Err(CoreError::Conflict("booking has no linked clients".into()));
        }

        let cast = ScriptCharacterRepo::active_cast(&mut *tx, script_id)
            .await
            .map_err(error::internal)?;
        if cast.len() != client_ids.len() {
            return Err(CoreError::Conflict(format!(
                "script requires exactly {} clients, booking has {}",
                cast.len(),
                client_ids.len()
            )));
        }

        let matches: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT character_id, client_id FROM character_client_match \
             WHERE booking_id = $1 \
             ORDER BY character_client_match_id",
        )
        .bind(booking_id)
        .fetch_all(&mut *tx)
        .await
        .map_err(error::internal)?;

        verify_bijection(&cast, &client_ids, &matches).map_err(|reason| {
            CoreError::Conflict(format!("matches must be a strict bijection: {reason}"))
        })?;

        let estimated: i32 = sqlx::query_scalar(
            "SELECT estimated_minutes FROM script WHERE script_id = $1",
        )
        .bind(script_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(error::internal)?;
        let minutes = effective_minutes(booking.duration_override_minutes, estimated);
        let window_end = end_at(input.start_at, minutes);

        let room_id = RoomAllocator::select_room(
            &mut *tx,
            store_id,
            input.start_at,
            window_end,
            input.preferred_room_id,
        )
        .await?;

        let slot_id = SlotRepo::resolve(&mut *tx, store_id, input.start_at)
            .await
            .map_err(error::internal)?;

        // The FOR UPDATE lock above already serializes confirmations of one
        // booking; the status predicate here is the concurrency backstop.
        let query = format!(
            "UPDATE booking \
             SET booking_status_id = $3, target_month = NULL, \
                 start_at = $4, end_at = $5, slot_id = $6, store_room_id = $7, \
                 updated_at = now() \
             WHERE booking_id = $1 AND booking_status_id = $2 \
             RETURNING {COLUMNS}"
        );
        let confirmed = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(BookingStatus::Incomplete.id())
            .bind(BookingStatus::Scheduled.id())
            .bind(input.start_at)
            .bind(window_end)
            .bind(slot_id)
            .bind(room_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::map_write_error)?
            .ok_or_else(|| CoreError::Conflict("booking is no longer incomplete".into()))?;

        let detail = Self::detail(&mut *tx, confirmed).await?;
        tx.commit().await.map_err(error::internal)?;

        tracing::info!(
            booking_id,
            store_id,
            room_id,
            slot_id,
            "Booking confirmed"
        );
        Ok(detail)
    }

    /// Cancel a booking from any status. Existing time and room data is
    /// kept (frozen), only the status changes.
    pub async fn cancel(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
    ) -> Result<BookingDetail, CoreError> {
        let mut conn = pool.acquire().await.map_err(error::internal)?;
        let query = format!(
            "UPDATE booking SET booking_status_id = $3, updated_at = now() \
             WHERE booking_id = $1 AND store_id = $2 \
             RETURNING {COLUMNS}"
        );
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(store_id)
            .bind(BookingStatus::Cancelled.id())
            .fetch_optional(&mut *conn)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "Booking",
                id: booking_id,
            })?;
        Self::detail(&mut *conn, booking).await
    }

    /// Complete a scheduled booking.
    pub async fn complete(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
    ) -> Result<BookingDetail, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let query = format!(
            "UPDATE booking SET booking_status_id = $3, updated_at = now() \
             WHERE booking_id = $1 AND store_id = $2 AND booking_status_id = $4 \
             RETURNING {COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Booking>(&query)
            .bind(booking_id)
            .bind(store_id)
            .bind(BookingStatus::Completed.id())
            .bind(BookingStatus::Scheduled.id())
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::internal)?;

        let Some(booking) = updated else {
            // Distinguish wrong-state from absent inside the same transaction.
            let exists: bool = sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM booking WHERE booking_id = $1 AND store_id = $2)",
            )
            .bind(booking_id)
            .bind(store_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::internal)?;
            return Err(if exists {
                CoreError::Conflict("only scheduled bookings can be completed".into())
            } else {
                CoreError::NotFound {
                    entity: "Booking",
                    id: booking_id,
                }
            });
        };

        let detail = Self::detail(&mut *tx, booking).await?;
        tx.commit().await.map_err(error::internal)?;
        Ok(detail)
    }

    /// Link one more client to an incomplete booking.
    pub async fn add_client(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        input: &AddBookingClient,
    ) -> Result<BookingDetail, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let booking = require_incomplete(
            &mut tx,
            store_id,
            booking_id,
            "clients can only be modified while the booking is incomplete",
        )
        .await?;

        if !ClientRepo::exists(&mut *tx, input.client_id)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "Client",
                id: input.client_id,
            });
        }

        sqlx::query("INSERT INTO booking_client (booking_id, client_id) VALUES ($1, $2)")
            .bind(booking_id)
            .bind(input.client_id)
            .execute(&mut *tx)
            .await
            .map_err(error::map_write_error)?;

        let detail = Self::detail(&mut *tx, booking).await?;
        tx.commit().await.map_err(error::internal)?;
        Ok(detail)
    }

    /// Unlink a client from an incomplete booking; at least one client must
    /// remain afterwards.
    pub async fn remove_client(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        client_id: DbId,
    ) -> Result<BookingDetail, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let booking = require_incomplete(
            &mut tx,
            store_id,
            booking_id,
            "clients can only be modified while the booking is incomplete",
        )
        .await?;

        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM booking_client WHERE booking_id = $1")
                .bind(booking_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(error::internal)?;
        if count <= 1 {
            return Err(CoreError::Conflict(
                "booking must keep at least one client".into(),
            ));
        }

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM booking_client \
             WHERE booking_id = $1 AND client_id = $2 \
             RETURNING booking_client_id",
        )
        .bind(booking_id)
        .bind(client_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(error::internal)?;
        if deleted.is_none() {
            return Err(CoreError::NotFound {
                entity: "Client",
                id: client_id,
            });
        }

        let detail = Self::detail(&mut *tx, booking).await?;
        tx.commit().await.map_err(error::internal)?;
        Ok(detail)
    }

    /// Client ids linked to a booking, ascending.
    pub async fn client_ids(
        executor: impl PgExecutor<'_>,
        booking_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT client_id FROM booking_client WHERE booking_id = $1 ORDER BY client_id",
        )
        .bind(booking_id)
        .fetch_all(executor)
        .await
    }

    /// Client ids for a whole page of bookings in one query.
    async fn client_ids_for_page(
        executor: impl PgExecutor<'_>,
        booking_ids: &[DbId],
    ) -> Result<HashMap<DbId, Vec<DbId>>, sqlx::Error> {
        let rows: Vec<(DbId, DbId)> = sqlx::query_as(
            "SELECT booking_id, client_id FROM booking_client \
             WHERE booking_id = ANY($1) \
             ORDER BY booking_id, client_id",
        )
        .bind(booking_ids)
        .fetch_all(executor)
        .await?;
        let mut map: HashMap<DbId, Vec<DbId>> = HashMap::new();
        for (booking_id, client_id) in rows {
            map.entry(booking_id).or_default().push(client_id);
        }
        Ok(map)
    }

    /// Enrich a booking row with its clients and conflict view. The row is
    /// re-read for operations that mutated it after loading.
    async fn detail(
        conn: &mut PgConnection,
        booking: Booking,
    ) -> Result<BookingDetail, CoreError> {
        let query = format!("SELECT {COLUMNS} FROM booking WHERE booking_id = $1");
        let booking = sqlx::query_as::<_, Booking>(&query)
            .bind(booking.booking_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(error::internal)?;
        let client_ids = Self::client_ids(&mut *conn, booking.booking_id)
            .await
            .map_err(error::internal)?;
        let conflicts = ConflictRepo::summary_for(&mut *conn, &booking)
            .await
            .map_err(error::internal)?;
        Ok(BookingDetail::from_parts(booking, client_ids, conflicts))
    }
}

/// Load the booking inside the caller's transaction and require status
/// incomplete. Missing booking → NotFound; any other status → Conflict with
/// the supplied message.
async fn require_incomplete(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    store_id: DbId,
    booking_id: DbId,
    conflict_message: &str,
) -> Result<Booking, CoreError> {
    let query = format!(
        "SELECT {COLUMNS} FROM booking \
         WHERE booking_id = $1 AND store_id = $2 \
         FOR UPDATE"
    );
    let booking = sqlx::query_as::<_, Booking>(&query)
        .bind(booking_id)
        .bind(store_id)
        .fetch_optional(&mut **tx)
        .await
        .map_err(error::internal)?
        .ok_or(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        })?;
    if booking.booking_status_id != BookingStatus::Incomplete.id() {
        return Err(CoreError::Conflict(conflict_message.into()));
    }
    Ok(booking)
}

/// The script must be activated (and active) for the store. Missing or
/// inactive activation → NotFound, matching the create/update semantics
/// where the script is simply "not offered here".
async fn require_active_store_script(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    store_id: DbId,
    script_id: DbId,
) -> Result<(), CoreError> {
    match StoreScriptRepo::find(&mut **tx, store_id, script_id)
        .await
        .map_err(error::internal)?
    {
        Some(activation) if activation.is_active => Ok(()),
        _ => Err(CoreError::NotFound {
            entity: "Script",
            id: script_id,
        }),
    }
}

/// Same activation check, but at confirmation time a missing or disabled
/// activation is a Conflict: the booking references a script its store no
/// longer offers.
async fn require_active_script_for_confirm(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    store_id: DbId,
    script_id: DbId,
) -> Result<(), CoreError> {
    match StoreScriptRepo::find(&mut **tx, store_id, script_id)
        .await
        .map_err(error::internal)?
    {
        Some(activation) if activation.is_active => Ok(()),
        _ => Err(CoreError::Conflict(
            "script is not active for this store".into(),
        )),
    }
}
