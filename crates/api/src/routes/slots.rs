use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::slots;
use crate::state::AppState;

/// Routes mounted under `/stores/{store_id}/slots`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/stores/{store_id}/slots",
            get(slots::list).post(slots::create),
        )
        .route(
            "/stores/{store_id}/slots/{slot_id}",
            patch(slots::update).delete(slots::delete),
        )
}
