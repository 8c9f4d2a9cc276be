//! Handlers for the store-scoped `/scripts` resource: which catalog
//! scripts a store offers.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::types::DbId;
use stagedoor_db::models::script::{
    CreateStoreScript, StoreScript, StoreScriptListing, UpdateStoreScript,
};
use stagedoor_db::repositories::StoreScriptRepo;

use crate::auth::ActorContext;
use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/v1/stores/{store_id}/scripts
///
/// Scripts activated for the store, joined with catalog fields.
pub async fn list(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<StoreScriptListing>>> {
    actor.require_store(store_id)?;
    let (items, total) =
        StoreScriptRepo::list_for_store(&state.pool, store_id, params.limit, params.offset)
            .await?;
    Ok(Json(PageResponse::new(
        items,
        params.limit,
        params.offset,
        total,
    )))
}

/// POST /api/v1/stores/{store_id}/scripts
pub async fn create(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Json(input): Json<CreateStoreScript>,
) -> AppResult<(StatusCode, Json<StoreScript>)> {
    actor.require_store(store_id)?;
    let activation = StoreScriptRepo::create(&state.pool, store_id, &input).await?;
    Ok((StatusCode::CREATED, Json(activation)))
}

/// PATCH /api/v1/stores/{store_id}/scripts/{script_id}
pub async fn update(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, script_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateStoreScript>,
) -> AppResult<Json<StoreScript>> {
    actor.require_store(store_id)?;
    let activation = StoreScriptRepo::update(&state.pool, store_id, script_id, &input).await?;
    Ok(Json(activation))
}

/// DELETE /api/v1/stores/{store_id}/scripts/{script_id}
pub async fn delete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, script_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    actor.require_store(store_id)?;
    StoreScriptRepo::delete(&state.pool, store_id, script_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
