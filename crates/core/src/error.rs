use crate::types::DbId;

/// Domain error kinds shared by the repository and API layers.
///
/// `NotFound` and `Conflict` are the two client-facing failures every
/// scheduler operation can produce. `Validation` covers malformed field
/// values, `Forbidden` store-scope rejections, and `Internal` unrecoverable
/// storage failures.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal error: {0}")]
    Internal(String),
}
