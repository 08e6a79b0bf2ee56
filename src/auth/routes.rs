//! Authentication routes

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers;

/// Creates and returns the authentication router
///
/// # Routes
/// - `GET /api/auth/google/init` - Google consent URL
/// - `GET /api/auth/google/callback` - Google redirect target (also `/api/auth/google`)
/// - `GET /api/auth/apple/init` - Apple consent URL
/// - `POST /api/auth/apple` - Apple sign-in with an authorization code
/// - `POST /api/auth/apple/callback` - Apple form-post redirect target
/// - `GET /api/auth/me` - Current user information
/// - `POST /api/auth/verify` - Decode a session token
/// - `POST /api/auth/refresh` - Re-issue the session token
/// - `POST /api/auth/logout` - Clear session cookies
pub fn auth_routes() -> Router {
    Router::new()
        .route("/api/auth/google/init", get(handlers::google_init))
        .route("/api/auth/google/callback", get(handlers::google_callback))
        .route("/api/auth/google", get(handlers::google_callback))
        .route("/api/auth/apple/init", get(handlers::apple_init))
        .route("/api/auth/apple", post(handlers::apple_auth))
        .route("/api/auth/apple/callback", post(handlers::apple_callback))
        .route("/api/auth/me", get(handlers::me_handler))
        .route("/api/auth/verify", post(handlers::verify_handler))
        .route("/api/auth/refresh", post(handlers::refresh_handler))
        .route("/api/auth/logout", post(handlers::logout_handler))
}
