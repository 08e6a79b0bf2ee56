// src/main.rs
use axum::{extract::Extension, middleware, Router};
use dotenv::dotenv;
use std::env;
use std::{net::SocketAddr, sync::Arc};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// MODULE IMPORTS
// ============================================================================

mod admin;
mod auth;
mod collections;
mod common;
mod logging_middleware;
mod payments;
mod rate_limit_middleware;
mod services;
mod system;

// ============================================================================
// COMMON IMPORTS
// ============================================================================

use auth::session::SessionTokens;
use common::database::{self, DEFAULT_DATABASE_URL};
use common::dev_mode::{apply_cli_override, ensure_dev_user, print_dev_mode_status, DevModeConfig};
use common::migrations::{run_migrations, seed_demo_data};
use common::state::parse_admin_emails;
use common::AppState;
use rate_limit_middleware::rate_limit_middleware;
use services::oauth::{OAuthConfig, OAuthProvider};
use services::rate_limit::RateLimitConfig;
use services::{OAuthService, RateLimitService};

const DEFAULT_JWT_SECRET: &str = "replace_with_strong_secret";
const DEFAULT_SEED_ADMIN_EMAIL: &str = "admin@agapay.local";

fn env_flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

// ============================================================================
// MAIN APPLICATION ENTRY POINT
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // ========================================================================
    // ENVIRONMENT CONFIGURATION
    // ========================================================================

    let database_url =
        env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
        warn!("JWT_SECRET not set, using the built-in development secret");
        DEFAULT_JWT_SECRET.to_string()
    });
    let frontend_url =
        env::var("FRONTEND_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let secure_cookies = env::var("APP_ENV")
        .map(|v| v.eq_ignore_ascii_case("production"))
        .unwrap_or(false);

    let admin_emails_raw = env::var("ADMIN_EMAILS").unwrap_or_default();
    let admin_emails = parse_admin_emails(&admin_emails_raw);
    info!(admin_email_count = admin_emails.len(), "Loaded admin allow-list");

    // ========================================================================
    // DEV MODE CONFIGURATION
    // ========================================================================

    let dev_mode = apply_cli_override(DevModeConfig::from_env());
    print_dev_mode_status(&dev_mode);

    // ========================================================================
    // DATABASE SETUP
    // ========================================================================

    let pool = database::connect(&database_url).await?;
    run_migrations(&pool).await?;

    if env_flag("SEED_DEMO_DATA", true) {
        let seed_admin = admin_emails_raw
            .split(',')
            .map(str::trim)
            .find(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEED_ADMIN_EMAIL);
        if seed_demo_data(&pool, seed_admin).await? {
            info!("Demo data seeded");
        }
    }

    if dev_mode.is_enabled() {
        ensure_dev_user(&pool, &dev_mode).await?;
    }

    // ========================================================================
    // SERVICE INITIALIZATION
    // ========================================================================

    let oauth_service = Arc::new(OAuthService::new(OAuthConfig::from_env()));
    info!(
        google = oauth_service.is_configured(OAuthProvider::Google),
        apple = oauth_service.is_configured(OAuthProvider::Apple),
        "OAuthService initialized"
    );

    let rate_limit_service = Arc::new(RateLimitService::new(RateLimitConfig::from_env()));
    rate_limit_service.spawn_cleanup_task();
    info!("RateLimitService initialized");

    // ========================================================================
    // APPLICATION STATE
    // ========================================================================

    let app_state = AppState {
        db: pool,
        sessions: SessionTokens::new(jwt_secret),
        admin_emails,
        dev_mode,
        frontend_url,
        secure_cookies,
        oauth_service,
        rate_limit_service: rate_limit_service.clone(),
    };

    let shared = Arc::new(RwLock::new(app_state));

    // ========================================================================
    // ROUTER COMPOSITION
    // ========================================================================

    let app = Router::new()
        .merge(system::system_routes())
        .merge(auth::auth_routes())
        .merge(collections::collections_routes())
        .merge(payments::payments_routes())
        .merge(admin::admin_routes())
        // ====================================================================
        // MIDDLEWARE AND LAYERS
        // ====================================================================
        .layer(middleware::from_fn(logging_middleware::log_request_response))
        .layer(middleware::from_fn(rate_limit_middleware))
        .layer(Extension(rate_limit_service))
        .layer(Extension(shared.clone()))
        .layer({
            let cors_origins = env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "http://localhost:3000,http://localhost:3001".to_string());

            let origins: Vec<axum::http::HeaderValue> = cors_origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::PUT,
                    axum::http::Method::DELETE,
                    axum::http::Method::PATCH,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([
                    axum::http::header::CONTENT_TYPE,
                    axum::http::header::AUTHORIZATION,
                    axum::http::HeaderName::from_static(logging_middleware::REQUEST_ID_HEADER),
                ])
                .expose_headers([
                    axum::http::HeaderName::from_static(logging_middleware::REQUEST_ID_HEADER),
                    axum::http::header::RETRY_AFTER,
                ])
                .allow_credentials(true)
        })
        .layer(TraceLayer::new_for_http());

    // ========================================================================
    // SERVER STARTUP
    // ========================================================================

    let port = env::var("PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
