use super::handlers;
use axum::{
    routing::{get, post},
    Router,
};

/// Creates the collections router
pub fn collections_routes() -> Router {
    Router::new()
        .route(
            "/api/collections",
            get(handlers::list_public_collections).post(handlers::create_collection),
        )
        .route(
            "/api/admin/collections",
            get(handlers::list_all_collections),
        )
        .route(
            "/api/collections/my-collections",
            get(handlers::list_my_collections).post(handlers::create_my_collection),
        )
        .route(
            "/api/collections/:id",
            get(handlers::get_collection)
                .put(handlers::update_collection)
                .delete(handlers::delete_collection),
        )
        .route(
            "/api/collections/:id/amount",
            post(handlers::increment_collection_amount),
        )
}
