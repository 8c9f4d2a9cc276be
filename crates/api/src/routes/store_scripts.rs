use axum::routing::{get, patch};
use axum::Router;

use crate::handlers::store_scripts;
use crate::state::AppState;

/// Routes mounted under `/stores/{store_id}/scripts` (activation of
/// catalog scripts for one store).
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/stores/{store_id}/scripts",
            get(store_scripts::list).post(store_scripts::create),
        )
        .route(
            "/stores/{store_id}/scripts/{script_id}",
            patch(store_scripts::update).delete(store_scripts::delete),
        )
}
