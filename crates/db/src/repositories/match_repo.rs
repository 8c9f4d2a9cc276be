//! Repositories for the booking-scoped match tables.
//!
//! Every create/update/delete first re-loads the owning booking inside the
//! transaction: matches can only be modified while the booking is
//! incomplete. Scope rules (character belongs to the booking's script,
//! client matches never use DM-only characters, DM matches only use them,
//! matched clients must be linked to the booking) are enforced here; the
//! unique constraints remain the backstop against racing inserts.

use sqlx::{PgConnection, PgPool};
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::matches::{
    CharacterClientMatch, CharacterDmMatch, CreateCharacterClientMatch, CreateCharacterDmMatch,
    UpdateCharacterClientMatch, UpdateCharacterDmMatch,
};
use crate::models::status::BookingStatus;
use crate::repositories::{ClientRepo, DmRepo};

const CLIENT_MATCH_COLUMNS: &str = "\
    character_client_match_id, booking_id, character_id, client_id, created_at, updated_at";

const DM_MATCH_COLUMNS: &str = "\
    character_dm_match_id, booking_id, dm_id, character_id, created_at, updated_at";

// ===========================================================================
// CharacterClientMatchRepo
// ===========================================================================

/// Assignments of non-DM characters to the booking's clients.
pub struct CharacterClientMatchRepo;

impl CharacterClientMatchRepo {
    /// List a booking's character-client matches.
    pub async fn list(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
    ) -> Result<Vec<CharacterClientMatch>, CoreError> {
        let mut conn = pool.acquire().await.map_err(error::internal)?;
        require_booking(&mut *conn, store_id, booking_id).await?;
        let query = format!(
            "SELECT {CLIENT_MATCH_COLUMNS} FROM character_client_match \
             WHERE booking_id = $1 \
             ORDER BY character_client_match_id"
        );
        sqlx::query_as::<_, CharacterClientMatch>(&query)
            .bind(booking_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(error::internal)
    }

    /// Match a character to a client.
    pub async fn create(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        input: &CreateCharacterClientMatch,
    ) -> Result<CharacterClientMatch, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let script_id = require_incomplete_booking(&mut tx, store_id, booking_id).await?;
        require_cast_member(&mut tx, script_id, input.character_id, false).await?;
        require_linked_client(&mut tx, booking_id, input.client_id).await?;

        let query = format!(
            "INSERT INTO character_client_match (booking_id, character_id, client_id) \
             VALUES ($1, $2, $3) \
             RETURNING {CLIENT_MATCH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CharacterClientMatch>(&query)
            .bind(booking_id)
            .bind(input.character_id)
            .bind(input.client_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::map_write_error)?;

        tx.commit().await.map_err(error::internal)?;
        Ok(row)
    }

    /// Partially update one match row.
    pub async fn update(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        match_id: DbId,
        input: &UpdateCharacterClientMatch,
    ) -> Result<CharacterClientMatch, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let script_id = require_incomplete_booking(&mut tx, store_id, booking_id).await?;

        let query = format!(
            "SELECT {CLIENT_MATCH_COLUMNS} FROM character_client_match \
             WHERE character_client_match_id = $1 AND booking_id = $2 \
             FOR UPDATE"
        );
        let existing = sqlx::query_as::<_, CharacterClientMatch>(&query)
            .bind(match_id)
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "CharacterClientMatch",
                id: match_id,
            })?;

        let character_id = input.character_id.unwrap_or(existing.character_id);
        let client_id = input.client_id.unwrap_or(existing.client_id);
        if input.character_id.is_some() {
            require_cast_member(&mut tx, script_id, character_id, false).await?;
        }
        if input.client_id.is_some() {
            require_linked_client(&mut tx, booking_id, client_id).await?;
        }

        let query = format!(
            "UPDATE character_client_match \
             SET character_id = $3, client_id = $4, updated_at = now() \
             WHERE character_client_match_id = $1 AND booking_id = $2 \
             RETURNING {CLIENT_MATCH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CharacterClientMatch>(&query)
            .bind(match_id)
            .bind(booking_id)
            .bind(character_id)
            .bind(client_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::map_write_error)?;

        tx.commit().await.map_err(error::internal)?;
        Ok(row)
    }

    /// Delete one match row.
    pub async fn delete(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        match_id: DbId,
    ) -> Result<(), CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        require_incomplete_booking(&mut tx, store_id, booking_id).await?;

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM character_client_match \
             WHERE character_client_match_id = $1 AND booking_id = $2 \
             RETURNING character_client_match_id",
        )
        .bind(match_id)
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(error::internal)?;
        if deleted.is_none() {
            return Err(CoreError::NotFound {
                entity: "CharacterClientMatch",
                id: match_id,
            });
        }

        tx.commit().await.map_err(error::internal)?;
        Ok(())
    }
}

// ===========================================================================
// CharacterDmMatchRepo
// ===========================================================================

/// Assignments of DMs to DM-only characters (or unassigned seats).
pub struct CharacterDmMatchRepo;

impl CharacterDmMatchRepo {
    /// List a booking's character-DM matches.
    pub async fn list(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
    ) -> Result<Vec<CharacterDmMatch>, CoreError> {
        let mut conn = pool.acquire().await.map_err(error::internal)?;
        require_booking(&mut *conn, store_id, booking_id).await?;
        let query = format!(
            "SELECT {DM_MATCH_COLUMNS} FROM character_dm_match \
             WHERE booking_id = $1 \
             ORDER BY character_dm_match_id"
        );
        sqlx::query_as::<_, CharacterDmMatch>(&query)
            .bind(booking_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(error::internal)
    }

    /// Add a DM to the booking, optionally already assigned to a DM-only
    /// character.
    pub async fn create(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        input: &CreateCharacterDmMatch,
    ) -> Result<CharacterDmMatch, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let script_id = require_incomplete_booking(&mut tx, store_id, booking_id).await?;

        if !DmRepo::exists(&mut *tx, input.dm_id)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "DM",
                id: input.dm_id,
            });
        }
        if let Some(character_id) = input.character_id {
            require_cast_member(&mut tx, script_id, character_id, true).await?;
        }

        let query = format!(
            "INSERT INTO character_dm_match (booking_id, dm_id, character_id) \
             VALUES ($1, $2, $3) \
             RETURNING {DM_MATCH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CharacterDmMatch>(&query)
            .bind(booking_id)
            .bind(input.dm_id)
            .bind(input.character_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::map_write_error)?;

        tx.commit().await.map_err(error::internal)?;
        Ok(row)
    }

    /// Partially update one match row. `clear_character` releases the DM
    /// back to an unassigned seat.
    pub async fn update(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        match_id: DbId,
        input: &UpdateCharacterDmMatch,
    ) -> Result<CharacterDmMatch, CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        let script_id = require_incomplete_booking(&mut tx, store_id, booking_id).await?;

        let query = format!(
            "SELECT {DM_MATCH_COLUMNS} FROM character_dm_match \
             WHERE character_dm_match_id = $1 AND booking_id = $2 \
             FOR UPDATE"
        );
        let existing = sqlx::query_as::<_, CharacterDmMatch>(&query)
            .bind(match_id)
            .bind(booking_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "CharacterDmMatch",
                id: match_id,
            })?;

        let dm_id = input.dm_id.unwrap_or(existing.dm_id);
        if input.dm_id.is_some() && !DmRepo::exists(&mut *tx, dm_id).await.map_err(error::internal)? {
            return Err(CoreError::NotFound {
                entity: "DM",
                id: dm_id,
            });
        }

        let character_id = if input.clear_character {
            None
        } else if let Some(character_id) = input.character_id {
            require_cast_member(&mut tx, script_id, character_id, true).await?;
            Some(character_id)
        } else {
            existing.character_id
        };

        let query = format!(
            "UPDATE character_dm_match \
             SET dm_id = $3, character_id = $4, updated_at = now() \
             WHERE character_dm_match_id = $1 AND booking_id = $2 \
             RETURNING {DM_MATCH_COLUMNS}"
        );
        let row = sqlx::query_as::<_, CharacterDmMatch>(&query)
            .bind(match_id)
            .bind(booking_id)
            .bind(dm_id)
            .bind(character_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(error::map_write_error)?;

        tx.commit().await.map_err(error::internal)?;
        Ok(row)
    }

    /// Delete one match row.
    pub async fn delete(
        pool: &PgPool,
        store_id: DbId,
        booking_id: DbId,
        match_id: DbId,
    ) -> Result<(), CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;
        require_incomplete_booking(&mut tx, store_id, booking_id).await?;

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM character_dm_match \
             WHERE character_dm_match_id = $1 AND booking_id = $2 \
             RETURNING character_dm_match_id",
        )
        .bind(match_id)
        .bind(booking_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(error::internal)?;
        if deleted.is_none() {
            return Err(CoreError::NotFound {
                entity: "CharacterDmMatch",
                id: match_id,
            });
        }

        tx.commit().await.map_err(error::internal)?;
        Ok(())
    }
}

// ===========================================================================
// Shared gates
// ===========================================================================

/// The booking must exist in this store.
async fn require_booking(
    conn: &mut PgConnection,
    store_id: DbId,
    booking_id: DbId,
) -> Result<(), CoreError> {
    let row: Option<i32> =
        sqlx::query_scalar("SELECT 1 FROM booking WHERE booking_id = $1 AND store_id = $2")
            .bind(booking_id)
            .bind(store_id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(error::internal)?;
    match row {
        Some(_) => Ok(()),
        None => Err(CoreError::NotFound {
            entity: "Booking",
            id: booking_id,
        }),
    }
}

/// Lock the owning booking and require status incomplete. Returns the
/// booking's script id for the scope checks.
async fn require_incomplete_booking(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    store_id: DbId,
    booking_id: DbId,
) -> Result<Option<DbId>, CoreError> {
    let row: Option<(i16, Option<DbId>)> = sqlx::query_as(
        "SELECT booking_status_id, script_id FROM booking \
         WHERE booking_id = $1 AND store_id = $2 \
         FOR UPDATE",
    )
    .bind(booking_id)
    .bind(store_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(error::internal)?;

    let (status_id, script_id) = row.ok_or(CoreError::NotFound {
        entity: "Booking",
        id: booking_id,
    })?;
    if status_id != BookingStatus::Incomplete.id() {
        return Err(CoreError::Conflict(
            "matches can only be modified for incomplete bookings".into(),
        ));
    }
    Ok(script_id)
}

/// The character must exist, belong to the booking's script, and carry the
/// required DM flag.
async fn require_cast_member(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking_script_id: Option<DbId>,
    character_id: DbId,
    want_dm: bool,
) -> Result<(), CoreError> {
    let booking_script_id = booking_script_id
        .ok_or_else(|| CoreError::Conflict("booking has no script assigned".into()))?;

    let row: Option<(DbId, bool)> =
        sqlx::query_as("SELECT script_id, is_dm FROM script_character WHERE character_id = $1")
            .bind(character_id)
            .fetch_optional(&mut **tx)
            .await
            .map_err(error::internal)?;
    let (script_id, is_dm) = row.ok_or(CoreError::NotFound {
        entity: "Character",
        id: character_id,
    })?;

    if script_id != booking_script_id {
        return Err(CoreError::Conflict(
            "character does not belong to the booking's script".into(),
        ));
    }
    if is_dm != want_dm {
        return Err(CoreError::Conflict(if want_dm {
            "character is not DM-only and cannot be used in a DM match".into()
        } else {
            "character is DM-only and cannot be matched to a client".into()
        }));
    }
    Ok(())
}

/// The client must exist and be linked to the booking.
async fn require_linked_client(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking_id: DbId,
    client_id: DbId,
) -> Result<(), CoreError> {
    if !ClientRepo::exists(&mut **tx, client_id)
        .await
        .map_err(error::internal)?
    {
        return Err(CoreError::NotFound {
            entity: "Client",
            id: client_id,
        });
    }
    let linked: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM booking_client WHERE booking_id = $1 AND client_id = $2",
    )
    .bind(booking_id)
    .bind(client_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(error::internal)?;
    if linked.is_none() {
        return Err(CoreError::Conflict(
            "client is not linked to this booking".into(),
        ));
    }
    Ok(())
}
