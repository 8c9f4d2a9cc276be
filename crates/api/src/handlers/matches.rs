//! Handlers for the booking-scoped match sub-resources.
//!
//! Matches can only be modified while the owning booking is incomplete;
//! the repository re-checks that inside each transaction.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use stagedoor_core::types::DbId;
use stagedoor_db::models::matches::{
    CharacterClientMatch, CharacterDmMatch, CreateCharacterClientMatch, CreateCharacterDmMatch,
    UpdateCharacterClientMatch, UpdateCharacterDmMatch,
};
use stagedoor_db::repositories::{CharacterClientMatchRepo, CharacterDmMatchRepo};

use crate::auth::ActorContext;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Character-client matches
// ---------------------------------------------------------------------------

/// GET /api/v1/stores/{store_id}/bookings/{booking_id}/character-client-matches
pub async fn list_client_matches(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Vec<CharacterClientMatch>>> {
    actor.require_store(store_id)?;
    let matches = CharacterClientMatchRepo::list(&state.pool, store_id, booking_id).await?;
    Ok(Json(matches))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/character-client-matches
pub async fn create_client_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateCharacterClientMatch>,
) -> AppResult<(StatusCode, Json<CharacterClientMatch>)> {
    actor.require_store(store_id)?;
    let row = CharacterClientMatchRepo::create(&state.pool, store_id, booking_id, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/stores/{store_id}/bookings/{booking_id}/character-client-matches/{match_id}
pub async fn update_client_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id, match_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateCharacterClientMatch>,
) -> AppResult<Json<CharacterClientMatch>> {
    actor.require_store(store_id)?;
    if input.character_id.is_none() && input.client_id.is_none() {
        return Err(AppError::BadRequest(
            "at least one of character_id or client_id must be set".into(),
        ));
    }
    let row =
        CharacterClientMatchRepo::update(&state.pool, store_id, booking_id, match_id, &input)
            .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/stores/{store_id}/bookings/{booking_id}/character-client-matches/{match_id}
pub async fn delete_client_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id, match_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    actor.require_store(store_id)?;
    CharacterClientMatchRepo::delete(&state.pool, store_id, booking_id, match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Character-DM matches
// ---------------------------------------------------------------------------

/// GET /api/v1/stores/{store_id}/bookings/{booking_id}/character-dm-matches
pub async fn list_dm_matches(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
) -> AppResult<Json<Vec<CharacterDmMatch>>> {
    actor.require_store(store_id)?;
    let matches = CharacterDmMatchRepo::list(&state.pool, store_id, booking_id).await?;
    Ok(Json(matches))
}

/// POST /api/v1/stores/{store_id}/bookings/{booking_id}/character-dm-matches
pub async fn create_dm_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id)): Path<(DbId, DbId)>,
    Json(input): Json<CreateCharacterDmMatch>,
) -> AppResult<(StatusCode, Json<CharacterDmMatch>)> {
    actor.require_store(store_id)?;
    let row = CharacterDmMatchRepo::create(&state.pool, store_id, booking_id, &input).await?;
    Ok((StatusCode::CREATED, Json(row)))
}

/// PATCH /api/v1/stores/{store_id}/bookings/{booking_id}/character-dm-matches/{match_id}
pub async fn update_dm_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id, match_id)): Path<(DbId, DbId, DbId)>,
    Json(input): Json<UpdateCharacterDmMatch>,
) -> AppResult<Json<CharacterDmMatch>> {
    actor.require_store(store_id)?;
    if input.dm_id.is_none() && input.character_id.is_none() && !input.clear_character {
        return Err(AppError::BadRequest(
            "provide dm_id, character_id, or clear_character".into(),
        ));
    }
    if input.clear_character && input.character_id.is_some() {
        return Err(AppError::BadRequest(
            "clear_character and character_id are mutually exclusive".into(),
        ));
    }
    let row = CharacterDmMatchRepo::update(&state.pool, store_id, booking_id, match_id, &input)
        .await?;
    Ok(Json(row))
}

/// DELETE /api/v1/stores/{store_id}/bookings/{booking_id}/character-dm-matches/{match_id}
pub async fn delete_dm_match(
    actor: ActorContext,
    State(state): State<AppState>,
    Path((store_id, booking_id, match_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<StatusCode> {
    actor.require_store(store_id)?;
    CharacterDmMatchRepo::delete(&state.pool, store_id, booking_id, match_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
