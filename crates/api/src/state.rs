use std::sync::Arc;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via
/// `State<AppState>`. Cheaply cloneable.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: stagedoor_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}
