//! Handlers for the `/scripts/{script_id}/characters` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::types::DbId;
use stagedoor_db::models::script_character::{
    CreateScriptCharacter, ScriptCharacter, UpdateScriptCharacter,
};
use stagedoor_db::repositories::ScriptCharacterRepo;

use crate::auth::ActorContext;
use crate::error::{AppError, AppResult};
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/v1/scripts/{script_id}/characters
pub async fn list(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<ScriptCharacter>>> {
    let (items, total) =
        ScriptCharacterRepo::list_by_script(&state.pool, script_id, params.limit, params.offset)
            .await?;
    Ok(Json(PageResponse::new(
        items,
        params.limit,
        params.offset,
        total,
    )))
}

/// POST /api/v1/scripts/{script_id}/characters
pub async fn create(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path(script_id): Path<DbId>,
    Json(input): Json<CreateScriptCharacter>,
) -> AppResult<(StatusCode, Json<ScriptCharacter>)> {
    let character = ScriptCharacterRepo::create(&state.pool, script_id, &input).await?;
    Ok((StatusCode::CREATED, Json(character)))
}

/// GET /api/v1/scripts/{script_id}/characters/{character_id}
pub async fn get(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path((script_id, character_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<ScriptCharacter>> {
    let character = ScriptCharacterRepo::get(&state.pool, script_id, character_id).await?;
    Ok(Json(character))
}

/// PATCH /api/v1/scripts/{script_id}/characters/{character_id}
pub async fn update(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path((script_id, character_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateScriptCharacter>,
) -> AppResult<Json<ScriptCharacter>> {
    if input.character_name.is_none() && input.is_dm.is_none() && input.is_active.is_none() {
        return Err(AppError::BadRequest(
            "at least one field must be provided".into(),
        ));
    }
    let character =
        ScriptCharacterRepo::update(&state.pool, script_id, character_id, &input).await?;
    Ok(Json(character))
}

/// DELETE /api/v1/scripts/{script_id}/characters/{character_id}
pub async fn delete(
    _actor: ActorContext,
    State(state): State<AppState>,
    Path((script_id, character_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    ScriptCharacterRepo::delete(&state.pool, script_id, character_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
