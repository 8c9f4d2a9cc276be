//! Handlers for the global `/scripts` catalog (admin surface).
//!
//! Catalog routes require an authenticated actor but are not scoped to a
//! store; per-store activation lives under `/stores/{store_id}/scripts`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;
use stagedoor_db::models::script::{CreateScript, Script, UpdateScript};
use stagedoor_db::repositories::ScriptRepo;

use crate::auth::ActorContext;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// POST /api/v1/scripts
pub async fn create(
    _actor: ActorContext,
    State(state): State<AppState>,
    Json(input): Json<CreateScript>,
) -> AppResult<(StatusCode, Json<Script>)> {
    let script = ScriptRepo::create(&state.pool, &input).await?;
    Ok((StatusCode::CREATED, Json(script)))
}

/// GET /api/v1/scripts/{script_id}
pub async fn get(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
) -> AppResult<Json<Script>> {
    let script = ScriptRepo::find_by_id(&state.pool, script_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Script",
            id: script_id,
        }))?;
    Ok(Json(script))
}

/// PATCH /api/v1/scripts/{script_id}
pub async fn update(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
    Json(input): Json<UpdateScript>,
) -> AppResult<Json<Script>> {
    let script = ScriptRepo::update(&state.pool, script_id, &input).await?;
    Ok(Json(script))
}

/// DELETE /api/v1/scripts/{script_id}
///
/// Blocked while any booking references the script or any store still has
/// it active; a successful delete also removes its activation rows.
pub async fn delete(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
) -> AppResult<StatusCode> {
    ScriptRepo::delete(&state.pool, script_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
