//! Handlers for the store-scoped `/bookings` resource: the booking
//! lifecycle plus the client links.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{Datelike, NaiveDate};
use stagedoor_core::types::DbId;
use stagedoor_db::models::booking::{
    AddBookingClient, BookingDetail, BookingListQuery, ConfirmBooking, CreateIncompleteBooking,
    UpdateIncompleteBooking,
};
use stagedoor_db::repositories::BookingRepo;

use crate::auth::ActorContext;
use crate::error::{AppError, AppResult};
use crate::response::PageResponse;
use crate::state::AppState;

/// POST /api/v1/stores/{store_id}/bookings/incomplete
///
/// Create a booking in status incomplete with a target month and at least
/// one client.
pub async fn create_incomplete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Json(input): Json<CreateIncompleteBooking>,
) -> AppResult<(StatusCode, Json<BookingDetail>)> {
    actor.require_store(store_id)?;
    require_first_of_month(input.target_month)?;
    let booking = BookingRepo::create_incomplete(&state.pool, store_id, &input).await?;
    Ok((StatusCode::CREATED, Json(booking)))
}

/// GET /api/v1/stores/{store_id}/bookings
///
/// List bookings with optional `booking_status_id`, `target_month`, and
/// `has_conflict` filters.
pub async fn list(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Query(params): Query<BookingListQuery>,
) -> AppResult<Json<PageResponse<BookingDetail>>> {
    actor.require_store(store_id)?;
    let (items, total) = BookingRepo::list(&state.pool, store_id, &params).await?;
    Ok(Json(PageResponse::new(
        items,
        params.limit,
        params.offset,
        total,
    )))
}

/// GET /api/v1/stores/{store_id}/bookings/{booking_id}
pub async fn get(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking = BookingRepo::find_detail(&state.pool, store_id, booking_id).await?;
    Ok(Json(booking))
}

/// PATCH /api/v1/stores/{store_id}/bookings/{booking_id}
///
/// Update target month and/or script while the booking is incomplete.
pub async fn update_incomplete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateIncompleteBooking>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    if let Some(month) = input.target_month {
        require_first_of_month(month)?;
    }
    let booking =
        BookingRepo::update_incomplete(&state.pool, store_id, booking_id, &input).await?;
    Ok(Json(booking))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/confirm
pub async fn confirm(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
    Json(input): Json<ConfirmBooking>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking = BookingRepo::confirm(&state.pool, store_id, booking_id, &input).await?;
    Ok(Json(booking))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/cancel
pub async fn cancel(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking = BookingRepo::cancel(&state.pool, store_id, booking_id).await?;
    Ok(Json(booking))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/complete
pub async fn complete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking = BookingRepo::complete(&state.pool, store_id, booking_id).await?;
    Ok(Json(booking))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/clients
pub async fn add_client(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
    Json(input): Json<AddBookingClient>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking = BookingRepo::add_client(&state.pool, store_id, booking_id, &input).await?;
    Ok(Json(booking))
}

/// DELETE /api/v1/stores/{store_id}/bookings/{booking_id}/clients/{client_id}
pub async fn remove_client(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id, client_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<Json<BookingDetail>> {
    actor.require_store(store_id)?;
    let booking =
        BookingRepo::remove_client(&state.pool, store_id, booking_id, client_id).await?;
    Ok(Json(booking))
}

fn require_first_of_month(date: NaiveDate) -> Result<(), AppError> {
    if date.day() == 1 {
        Ok(())
    } else {
        Err(AppError::BadRequest(
            "target_month must be the first day of a month (YYYY-MM-01)".into(),
        ))
    }
}
