//! Repository for the `script` table (global catalog).

use sqlx::{PgExecutor, PgPool};
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error;
use crate::models::script::{CreateScript, Script, UpdateScript};

const COLUMNS: &str = "script_id, name, estimated_minutes, created_at, updated_at";

pub struct ScriptRepo;

impl ScriptRepo {
    /// Create a catalog script.
    pub async fn create(pool: &PgPool, input: &CreateScript) -> Result<Script, CoreError> {
        if input.estimated_minutes <= 0 {
            return Err(CoreError::Validation(
                "estimated_minutes must be positive".into(),
            ));
        }
        let query = format!(
            "INSERT INTO script (name, estimated_minutes) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Script>(&query)
            .bind(&input.name)
            .bind(input.estimated_minutes)
            .fetch_one(pool)
            .await
            .map_err(error::map_write_error)
    }

    /// Find a script by its primary key.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Script>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM script WHERE script_id = $1");
        sqlx::query_as::<_, Script>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Partially update a script.
    pub async fn update(
        pool: &PgPool,
        script_id: DbId,
        input: &UpdateScript,
    ) -> Result<Script, CoreError> {
        if matches!(input.estimated_minutes, Some(minutes) if minutes <= 0) {
            return Err(CoreError::Validation(
                "estimated_minutes must be positive".into(),
            ));
        }

        // Build the SET clause and track the next bind parameter index.
        let mut updates = vec!["updated_at = now()".to_string()];
        let mut bind_idx: u32 = 2;

        if input.name.is_some() {
            updates.push(format!("name = ${bind_idx}"));
            bind_idx += 1;
        }
        if input.estimated_minutes.is_some() {
            updates.push(format!("estimated_minutes = ${bind_idx}"));
        }

        let query = format!(
            "UPDATE script SET {} \
             WHERE script_id = $1 \
             RETURNING {COLUMNS}",
            updates.join(", "),
        );
        let mut update = sqlx::query_as::<_, Script>(&query).bind(script_id);
        if let Some(name) = &input.name {
            update = update.bind(name);
        }
        if let Some(minutes) = input.estimated_minutes {
            update = update.bind(minutes);
        }
        update
            .fetch_optional(pool)
            .await
            .map_err(error::map_write_error)?
            .ok_or(CoreError::NotFound {
                entity: "Script",
                id: script_id,
            })
    }

    /// Delete a script and its store activations.
    ///
    /// Blocked while any booking references the script or any store still
    /// has it active; deactivate everywhere first.
    pub async fn delete(pool: &PgPool, script_id: DbId) -> Result<(), CoreError> {
        let mut tx = pool.begin().await.map_err(error::internal)?;

        if !Self::exists(&mut *tx, script_id)
            .await
            .map_err(error::internal)?
        {
            return Err(CoreError::NotFound {
                entity: "Script",
                id: script_id,
            });
        }

        let booked: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM booking WHERE script_id = $1)")
                .bind(script_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(error::internal)?;
        if booked {
            return Err(CoreError::Conflict(
                "script is still referenced by bookings".into(),
            ));
        }

        let active_somewhere: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM store_script WHERE script_id = $1 AND is_active = true)",
        )
        .bind(script_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(error::internal)?;
        if active_somewhere {
            return Err(CoreError::Conflict(
                "script is still active for at least one store".into(),
            ));
        }

        sqlx::query("DELETE FROM store_script WHERE script_id = $1")
            .bind(script_id)
            .execute(&mut *tx)
            .await
            .map_err(error::internal)?;
        sqlx::query("DELETE FROM script WHERE script_id = $1")
            .bind(script_id)
            .execute(&mut *tx)
            .await
            .map_err(error::internal)?;

        tx.commit().await.map_err(error::internal)?;
        Ok(())
    }

    /// `true` if the script exists.
    pub async fn exists(executor: impl PgExecutor<'_>, id: DbId) -> Result<bool, sqlx::Error> {
        let row: Option<i32> = sqlx::query_scalar("SELECT 1 FROM script WHERE script_id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(row.is_some())
    }
}
