// src/system/routes.rs

use axum::{routing::get, Router};

use super::handlers;

pub fn system_routes() -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/api/debug/env", get(handlers::debug_env))
}
