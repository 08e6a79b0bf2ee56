use super::handlers;
use axum::{routing::get, Router};

/// Creates the payments router
pub fn payments_routes() -> Router {
    Router::new()
        .route(
            "/api/payments",
            get(handlers::list_payments).post(handlers::submit_payment),
        )
        .route("/api/payments/stats", get(handlers::payment_stats))
        .route(
            "/api/payments/verify/:reference",
            get(handlers::verify_payment),
        )
        .route("/api/payments/:id", get(handlers::get_payment))
}
