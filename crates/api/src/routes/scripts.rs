use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scripts;
use crate::state::AppState;

/// Routes mounted under `/scripts` (global catalog, admin surface).
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/scripts", post(scripts::create))
        .route(
            "/scripts/{script_id}",
            get(scripts::get)
                .patch(scripts::update)
                .delete(scripts::delete),
        )
}
