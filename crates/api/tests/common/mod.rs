//! Shared test harness: builds the full app router over a lazy pool so
//! routing, extractors, and middleware can be exercised without a live
//! database (no request in these tests reaches a query).

use std::sync::Arc;

use axum::Router;
use sqlx::postgres::PgPoolOptions;

use stagedoor_api::config::ServerConfig;
use stagedoor_api::router::build_app_router;
use stagedoor_api::state::AppState;

pub fn test_app() -> Router {
    let config = ServerConfig {
        host: "127.0.0.1".into(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".into()],
        request_timeout_secs: 5,
    };
    let pool = PgPoolOptions::new()
        .connect_lazy("postgres://localhost/stagedoor_test_unused")
        .expect("lazy pool");
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}
