//! Route definitions for the booking lifecycle and its sub-resources.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::{bookings, matches};
use crate::state::AppState;

/// Routes mounted under `/stores/{store_id}/bookings`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/stores/{store_id}/bookings",
            get(bookings::list),
        )
        .route(
            "/stores/{store_id}/bookings/incomplete",
            post(bookings::create_incomplete),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}",
            get(bookings::get).patch(bookings::update_incomplete),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/confirm",
            post(bookings::confirm),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/cancel",
            post(bookings::cancel),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/complete",
            post(bookings::complete),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/clients",
            post(bookings::add_client),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/clients/{client_id}",
            delete(bookings::remove_client),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/character-client-matches",
            get(matches::list_client_matches).post(matches::create_client_match),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/character-client-matches/{match_id}",
            patch(matches::update_client_match).delete(matches::delete_client_match),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/character-dm-matches",
            get(matches::list_dm_matches).post(matches::create_dm_match),
        )
        .route(
            "/stores/{store_id}/bookings/{booking_id}/character-dm-matches/{match_id}",
            patch(matches::update_dm_match).delete(matches::delete_dm_match),
        )
}
