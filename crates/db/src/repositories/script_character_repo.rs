//! Repository for the `script_character` table.

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::script_character::{
    CreateScriptCharacter, ScriptCharacter, UpdateScriptCharacter,
};
use crate::repositories::{clamp_limit, clamp_offset, ScriptRepo};

const COLUMNS: &str = "\
    character_id, script_id, character_name, is_dm, is_active, created_at, updated_at";

pub struct ScriptCharacterRepo;

impl ScriptCharacterRepo {
    /// List a script's characters, most recently touched first, with the
    /// unpaged total.
    pub async fn list_by_script(
        pool: &PgPool,
        script_id: DbId,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<ScriptCharacter>, i64), CoreError> {
        require_script(pool, script_id).await?;

        let limit = clamp_limit(limit);
        let offset = clamp_offset(offset);
        let query = format!(
            "SELECT {COLUMNS} FROM script_character \
             WHERE script_id = $1 \
             ORDER BY updated_at DESC, character_id DESC \
             LIMIT $2 OFFSET $3"
        );
        let items = sqlx::query_as::<_, ScriptCharacter>(&query)
            .bind(script_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
            .map_err(error::internal)?;
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM script_character WHERE script_id = $1")
                .bind(script_id)
                .fetch_one(pool)
                .await
                .map_err(error::internal)?;
        Ok((items, total))
    }

    /// Add a character to a script. Names are unique per script.
    pub async fn create(
        pool: &PgPool,
        script_id: DbId,
        input: &CreateScriptCharacter,
    ) -> Result<ScriptCharacter, CoreError> {
        require_script(pool, script_id).await?;

        let query = format!(
            "INSERT INTO script_character (script_id, character_name, is_dm, is_active) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScriptCharacter>(&query)
            .bind(script_id)
            .bind(&input.character_name)
            .bind(input.is_dm)
            .bind(input.is_active)
            .fetch_one(pool)
            .await
            .map_err(error::map_write_error)
    }

    /// Fetch one character of a script.
    pub async fn get(
        pool: &PgPool,
        script_id: DbId,
        character_id: DbId,
    ) -> Result<ScriptCharacter, CoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM script_character \
             WHERE script_id = $1 AND character_id = $2"
        );
        sqlx::query_as::<_, ScriptCharacter>(&query)
            .bind(script_id)
            .bind(character_id)
            .fetch_optional(pool)
            .await
            .map_err(error::internal)?
            .ok_or(CoreError::NotFound {
                entity: "Character",
                id: character_id,
            })
    }

    /// Partially update a character.
    pub async fn update(
        pool: &PgPool,
        script_id: DbId,
        character_id: DbId,
        input: &UpdateScriptCharacter,
    ) -> Result<ScriptCharacter, CoreError> {
        // Build the SET clause and track the next bind parameter index.
        let mut updates = vec!["updated_at = now()".to_string()];
        let mut bind_idx: u32 = 3;

        if input.character_name.is_some() {
            updates.push(format!("character_name = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.is_dm.is_some() {
            updates.push(format!("is_dm = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.is_active.is_some() {
            updates.push(format!("is_active = ${bind_idx}"));
        }

        let query = format!(
            "UPDATE script_character SET {} \
             WHERE script_id = $1 AND character_id = $2 \
             RETURNING {COLUMNS}",
            updates.join(", "),
        );
        let mut update = sqlx::query_as::<_, ScriptCharacter>(&query)
            .bind(script_id)
            .bind(character_id);
        if let Some(name) = &input.character_name {
            update = update.bind(name);
        }
        if let Some(is_dm) = input.is_dm {
            update = update.bind(is_dm);
        }
        if let Some(is_active) = input.is_active {
            update = update.bind(is_active);
        }
        update
            .fetch_optional(pool)
            .await
            .map_err(error::map_write_error)?
            .ok_or(CoreError::NotFound {
                entity: "Character",
                id: character_id,
            })
    }

    /// Remove a character. Blocked while any match row references it.
    pub async fn delete(
        pool: &PgPool,
        script_id: DbId,
        character_id: DbId,
    ) -> Result<(), CoreError> {
        let matched: bool = sqlx::query_scalar(
            "SELECT EXISTS( \
                 SELECT 1 FROM character_client_match WHERE character_id = $1 \
                 UNION ALL \
                 SELECT 1 FROM character_dm_match WHERE character_id = $1 \
             )",
        )
        .bind(character_id)
        .fetch_one(pool)
        .await
        .map_err(error::internal)?;
        if matched {
            return Err(CoreError::Conflict(
                "character is still referenced by booking matches".into(),
            ));
        }

        let deleted: Option<DbId> = sqlx::query_scalar(
            "DELETE FROM script_character \
             WHERE script_id = $1 AND character_id = $2 \
             RETURNING character_id",
        )
        .bind(script_id)
        .bind(character_id)
        .fetch_optional(pool)
        .await
        .map_err(error::internal)?;
        match deleted {
            Some(_) => Ok(()),
            None => Err(CoreError::NotFound {
                entity: "Character",
                id: character_id,
            }),
        }
    }

    /// Ids of the script's active non-DM characters, ascending — the cast
    /// the confirmation bijection is checked against.
    pub async fn active_cast(
        executor: impl PgExecutor<'_>,
        script_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT character_id FROM script_character \
             WHERE script_id = $1 AND is_dm = false AND is_active = true \
             ORDER BY character_id",
        )
        .bind(script_id)
        .fetch_all(executor)
        .await
    }
}

async fn require_script(pool: &PgPool, script_id: DbId) -> Result<(), CoreError> {
    if ScriptRepo::exists(pool, script_id)
        .await
        .map_err(error::internal)?
    {
        Ok(())
    } else {
        Err(CoreError::NotFound {
            entity: "Script",
            id: script_id,
        })
    }
}
