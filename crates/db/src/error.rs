//! Translation boundary from sqlx driver errors to domain errors.
//!
//! Uniqueness violations are the only storage failure with domain meaning:
//! they become [`CoreError::Conflict`] with a message derived from the
//! violated constraint, mapped here and nowhere else. Everything else is an
//! internal storage failure that aborts the surrounding transaction.

use stagedoor_core::error::CoreError;

/// PostgreSQL unique-violation SQLSTATE.
const UNIQUE_VIOLATION: &str = "23505";

/// Conflict message for a violated unique constraint.
fn conflict_message(constraint: &str) -> &'static str {
    match constraint {
        "uq_store_room_store_id_name" => "room name already exists for this store",
        "uq_script_name" => "script name already exists",
        "pk_store_script" => "script is already activated for this store",
        "uq_script_character_script_id_name" => "character name already exists for this script",
        "uq_slot_store_id_start_at" => "slot already exists for this store and start time",
        "uq_booking_client_booking_id_client_id" => "client is already linked to this booking",
        "uq_character_client_match_booking_character" => {
            "character is already matched for this booking"
        }
        "uq_character_client_match_booking_client" => "client is already matched for this booking",
        "uq_character_dm_match_booking_character" => {
            "character already has a DM assigned for this booking"
        }
        "uq_character_dm_match_booking_dm_free" => {
            "DM already holds an unassigned seat for this booking"
        }
        _ => "duplicate value violates a unique constraint",
    }
}

/// Translate an error raised by an insert or update into a domain error.
pub(crate) fn map_write_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            return CoreError::Conflict(conflict_message(constraint).to_string());
        }
    }
    internal(err)
}

/// Wrap any other storage failure.
pub(crate) fn internal(err: sqlx::Error) -> CoreError {
    CoreError::Internal(err.to_string())
}
