use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::rooms;
use crate::state::AppState;

/// Routes mounted under `/stores/{store_id}/rooms`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/stores/{store_id}/rooms",
            get(rooms::list).post(rooms::create),
        )
        .route(
            "/stores/{store_id}/rooms/{store_room_id}",
            patch(rooms::update).delete(rooms::delete),
        )
}
