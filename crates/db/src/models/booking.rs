//! Booking entity, the detail view every booking endpoint returns, and the
//! DTOs for the lifecycle operations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use stagedoor_core::types::{DbId, Timestamp};

use super::status::StatusId;

/// A row from the `booking` table.
///
/// The nullable column pattern follows the state-shape invariant enforced
/// by `ck_booking_state_shape`: incomplete bookings carry only
/// `target_month`; scheduled and completed ones carry script, window, slot
/// and room; cancelled bookings are frozen in whichever shape they held.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Booking {
    pub booking_id: DbId,
    pub store_id: DbId,
    pub script_id: Option<DbId>,
    pub slot_id: Option<DbId>,
    pub store_room_id: Option<DbId>,
    pub booking_status_id: StatusId,
    pub target_month: Option<NaiveDate>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub duration_override_minutes: Option<i32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Denormalized conflict view for one booking. Never stored; recomputed
/// from scheduled/completed bookings sharing the room.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConflictSummary {
    pub has_conflict: bool,
    pub conflict_count: i64,
    pub conflict_booking_ids: Vec<DbId>,
}

/// A booking enriched with its linked clients and conflict view.
#[derive(Debug, Clone, Serialize)]
pub struct BookingDetail {
    pub booking_id: DbId,
    pub store_id: DbId,
    pub script_id: Option<DbId>,
    pub slot_id: Option<DbId>,
    pub store_room_id: Option<DbId>,
    pub booking_status_id: StatusId,
    pub target_month: Option<NaiveDate>,
    pub start_at: Option<Timestamp>,
    pub end_at: Option<Timestamp>,
    pub duration_override_minutes: Option<i32>,
    pub client_ids: Vec<DbId>,
    pub has_conflict: bool,
    pub conflict_count: i64,
    pub conflict_booking_ids: Vec<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookingDetail {
    pub fn from_parts(
        booking: Booking,
        client_ids: Vec<DbId>,
        conflicts: ConflictSummary,
    ) -> Self {
        Self {
            booking_id: booking.booking_id,
            store_id: booking.store_id,
            script_id: booking.script_id,
            slot_id: booking.slot_id,
            store_room_id: booking.store_room_id,
            booking_status_id: booking.booking_status_id,
            target_month: booking.target_month,
            start_at: booking.start_at,
            end_at: booking.end_at,
            duration_override_minutes: booking.duration_override_minutes,
            client_ids,
            has_conflict: conflicts.has_conflict,
            conflict_count: conflicts.conflict_count,
            conflict_booking_ids: conflicts.conflict_booking_ids,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        }
    }
}

/// DTO for creating an incomplete booking.
#[derive(Debug, Deserialize)]
pub struct CreateIncompleteBooking {
    pub target_month: NaiveDate,
    pub client_ids: Vec<DbId>,
    pub script_id: Option<DbId>,
}

/// DTO for updating an incomplete booking. `clear_script` removes the
/// script; it is mutually exclusive with `script_id`.
#[derive(Debug, Deserialize)]
pub struct UpdateIncompleteBooking {
    pub target_month: Option<NaiveDate>,
    pub script_id: Option<DbId>,
    #[serde(default)]
    pub clear_script: bool,
}

/// DTO for confirming a booking into a room and time window.
#[derive(Debug, Deserialize)]
pub struct ConfirmBooking {
    pub start_at: Timestamp,
    pub preferred_room_id: Option<DbId>,
}

/// DTO for linking one more client to an incomplete booking.
#[derive(Debug, Deserialize)]
pub struct AddBookingClient {
    pub client_id: DbId,
}

/// Query filters for the booking list endpoint.
#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub booking_status_id: Option<StatusId>,
    pub target_month: Option<NaiveDate>,
    pub has_conflict: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
