// src/admin/routes.rs

use axum::{
    routing::{get, patch, put},
    Router,
};

use super::handlers;

pub fn admin_routes() -> Router {
    Router::new()
        .route(
            "/api/admin/dashboard/metrics",
            get(handlers::dashboard::get_dashboard_metrics),
        )
        // User management
        .route("/api/users", get(handlers::users::list_users))
        .route("/api/admin/users", get(handlers::users::list_users))
        .route("/api/admin/users/:id", put(handlers::users::update_user))
        .route(
            "/api/admin/users/:id/toggle-status",
            patch(handlers::users::toggle_user_status),
        )
}
