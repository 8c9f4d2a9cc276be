//! Route modules, one per resource, each exposing a `router()` merged into
//! the `/api/v1` tree.

pub mod bookings;
pub mod health;
pub mod rooms;
pub mod script_characters;
pub mod scripts;
pub mod slots;
pub mod store_scripts;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /stores/{store_id}/bookings                      list
/// /stores/{store_id}/bookings/incomplete           create (POST, 201)
/// /stores/{store_id}/bookings/{id}                 get, update-incomplete (PATCH)
/// /stores/{store_id}/bookings/{id}/confirm         confirm (POST)
/// /stores/{store_id}/bookings/{id}/cancel          cancel (POST)
/// /stores/{store_id}/bookings/{id}/complete        complete (POST)
/// /stores/{store_id}/bookings/{id}/clients         add client (POST)
/// /stores/{store_id}/bookings/{id}/clients/{cid}   remove client (DELETE)
/// /stores/{store_id}/bookings/{id}/character-client-matches        list, create
/// /stores/{store_id}/bookings/{id}/character-client-matches/{mid}  update, delete
/// /stores/{store_id}/bookings/{id}/character-dm-matches            list, create
/// /stores/{store_id}/bookings/{id}/character-dm-matches/{mid}      update, delete
///
/// /stores/{store_id}/rooms                         list, create
/// /stores/{store_id}/rooms/{id}                    update, delete
/// /stores/{store_id}/slots                         list, create
/// /stores/{store_id}/slots/{id}                    update, delete
/// /stores/{store_id}/scripts                       list activations, activate
/// /stores/{store_id}/scripts/{script_id}           update, remove activation
///
/// /scripts                                         create (admin)
/// /scripts/{script_id}                             get, update, delete (admin)
/// /scripts/{script_id}/characters                  list, create
/// /scripts/{script_id}/characters/{id}             get, update, delete
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(bookings::router())
        .merge(rooms::router())
        .merge(slots::router())
        .merge(store_scripts::router())
        .merge(scripts::router())
        .merge(script_characters::router())
}
