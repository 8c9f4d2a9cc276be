//! Actor scoping extracted from gateway-provided headers.
//!
//! The surrounding platform authenticates the caller and forwards its
//! identity as `X-Actor-Id` plus the store ids it may operate on as
//! `X-Allowed-Store-Ids` (comma-separated). The API trusts these headers
//! and only enforces the scoping: store-scoped routes reject any store id
//! outside the allowed set.

use std::collections::HashSet;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use stagedoor_core::error::CoreError;
use stagedoor_core::types::DbId;

use crate::error::AppError;

/// The authenticated caller and its store scope.
#[derive(Debug, Clone)]
pub struct ActorContext {
    pub actor_id: String,
    pub allowed_store_ids: HashSet<DbId>,
}

impl ActorContext {
    /// Reject the request unless `store_id` is in the actor's scope.
    pub fn require_store(&self, store_id: DbId) -> Result<(), AppError> {
        if self.allowed_store_ids.contains(&store_id) {
            Ok(())
        } else {
            Err(AppError::Core(CoreError::Forbidden(format!(
                "actor is not allowed to access store_id={store_id}"
            ))))
        }
    }
}

impl<S> FromRequestParts<S> for ActorContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor_id = required_header(parts, "x-actor-id")?;
        let raw_store_ids = required_header(parts, "x-allowed-store-ids")?;

        let mut allowed_store_ids = HashSet::new();
        for item in raw_store_ids.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let id: DbId = item.parse().map_err(|_| {
                AppError::BadRequest(
                    "X-Allowed-Store-Ids must be a comma-separated integer list".into(),
                )
            })?;
            allowed_store_ids.insert(id);
        }
        if allowed_store_ids.is_empty() {
            return Err(AppError::BadRequest(
                "X-Allowed-Store-Ids must include at least one store id".into(),
            ));
        }

        Ok(ActorContext {
            actor_id,
            allowed_store_ids,
        })
    }
}

fn required_header(parts: &Parts, name: &'static str) -> Result<String, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .ok_or_else(|| AppError::BadRequest(format!("missing or invalid {name} header")))
}
