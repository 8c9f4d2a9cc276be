use axum::routing::get;
use axum::Router;

use crate::handlers::script_characters;
use crate::state::AppState;

/// Routes mounted under `/scripts/{script_id}/characters`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/scripts/{script_id}/characters",
            get(script_characters::list).post(script_characters::create),
        )
        .route(
            "/scripts/{script_id}/characters/{character_id}",
            get(script_characters::get)
                .patch(script_characters::update)
                .delete(script_characters::delete),
        )
}
