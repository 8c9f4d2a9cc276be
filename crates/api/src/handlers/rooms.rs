//! Handlers for the store-scoped `/rooms` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::types::DbId;
use stagedoor_db::models::room::{CreateRoom, StoreRoom, UpdateRoom};
use stagedoor_db::repositories::RoomRepo;

use crate::auth::ActorContext;
use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/v1/stores/{store_id}/rooms
pub async fn list(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<StoreRoom>>> {
    actor.require_store(store_id)?;
    let (items, total) =
        RoomRepo::list_by_store(&state.pool, store_id, params.limit, params.offset).await?;
    Ok(Json(PageResponse::new(
        items,
        params.limit,
        params.offset,
        total,
    )))
}

/// POST /api/v1/stores/{store_id}/rooms
pub async fn create(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Json(input): Json<CreateRoom>,
) -> AppResult<(StatusCode, Json<StoreRoom>)> {
    actor.require_store(store_id)?;
    let room = RoomRepo::create(&state.pool, store_id, &input).await?;
    Ok((StatusCode::CREATED, Json(room)))
}

/// PATCH /api/v1/stores/{store_id}/rooms/{store_room_id}
pub async fn update(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, room_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateRoom>,
) -> AppResult<Json<StoreRoom>> {
    actor.require_store(store_id)?;
    let room = RoomRepo::update(&state.pool, store_id, room_id, &input).await?;
    Ok(Json(room))
}

/// DELETE /api/v1/stores/{store_id}/rooms/{store_room_id}
pub async fn delete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, room_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    actor.require_store(store_id)?;
    RoomRepo::delete(&state.pool, store_id, room_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
