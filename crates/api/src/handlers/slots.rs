//! Handlers for the store-scoped `/slots` resource.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::types::DbId;
use stagedoor_db::models::slot::{CreateSlot, Slot, UpdateSlot};
use stagedoor_db::repositories::SlotRepo;

use crate::auth::ActorContext;
use crate::error::AppResult;
use crate::query::PaginationParams;
use crate::response::PageResponse;
use crate::state::AppState;

/// GET /api/v1/stores/{store_id}/slots
pub async fn list(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<PageResponse<Slot>>> {
    actor.require_store(store_id)?;
    let (items, total) =
        SlotRepo::list_by_store(&state.pool, store_id, params.limit, params.offset).await?;
    Ok(Json(PageResponse::new(
        items,
        params.limit,
        params.offset,
        total,
    )))
}

/// POST /api/v1/stores/{store_id}/slots
pub async fn create(
    actor: ActorContext,
    State(state): State<AppState>,
    Path(store_id): Path<DbId>,
    Json(input): Json<CreateSlot>,
) -> AppResult<(StatusCode, Json<Slot>)> {
    actor.require_store(store_id)?;
    let slot = SlotRepo::create(&state.pool, store_id, &input).await?;
    Ok((StatusCode::CREATED, Json(slot)))
}

/// PATCH /api/v1/stores/{store_id}/slots/{slot_id}
pub async fn update(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, slot_id)): Path<(DbId, DbId)>,
    Json(input): Json<UpdateSlot>,
) -> AppResult<Json<Slot>> {
    actor.require_store(store_id)?;
    let slot = SlotRepo::update(&state.pool, store_id, slot_id, &input).await?;
    Ok(Json(slot))
}

/// DELETE /api/v1/stores/{store_id}/slots/{slot_id}
pub async fn delete(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, slot_id)): Path<(DbId, DbId)>,
) -> AppResult<StatusCode> {
    actor.require_store(store_id)?;
    SlotRepo::delete(&state.pool, store_id, slot_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
