// src/common/testing.rs
//! Shared fixtures for handler and service tests

use axum::extract::Extension;
use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::database::test_pool;
use super::dev_mode::DevModeConfig;
use super::state::AppState;
use crate::auth::models::User;
use crate::auth::session::SessionTokens;
use crate::auth::AuthedUser;
use crate::services::oauth::{OAuthConfig, ProviderEndpoints};
use crate::services::rate_limit::{RateLimitConfig, RateLimitService};
use crate::services::OAuthService;

pub const TEST_SECRET: &str = "test_secret_key";
pub const TEST_FRONTEND: &str = "http://frontend.test";

pub fn oauth_config_without_credentials() -> OAuthConfig {
    OAuthConfig {
        public_base_url: "http://localhost:8080".to_string(),
        google: None,
        apple: None,
        google_endpoints: ProviderEndpoints::google(),
        apple_endpoints: ProviderEndpoints::apple(),
    }
}

pub fn state_with(db: SqlitePool, oauth: OAuthConfig) -> AppState {
    AppState {
        db,
        sessions: SessionTokens::new(TEST_SECRET),
        admin_emails: HashSet::from(["boss@agapay.test".to_string()]),
        dev_mode: DevModeConfig::disabled(),
        frontend_url: TEST_FRONTEND.to_string(),
        secure_cookies: false,
        oauth_service: Arc::new(OAuthService::new(oauth)),
        rate_limit_service: Arc::new(RateLimitService::new(RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        })),
    }
}

/// Fresh state over an empty, migrated in-memory database
pub async fn test_state() -> AppState {
    state_with(test_pool().await, oauth_config_without_credentials())
}

pub fn shared(state: AppState) -> Extension<Arc<RwLock<AppState>>> {
    Extension(Arc::new(RwLock::new(state)))
}

pub async fn insert_user(db: &SqlitePool, id: &str, email: &str, role: &str) -> User {
    sqlx::query(
        r#"
        INSERT INTO users (id, email, full_name, role, is_active, provider, provider_id, created_at)
        VALUES (?, ?, ?, ?, 1, 'google', ?, '2024-01-01T00:00:00Z')
        "#,
    )
    .bind(id)
    .bind(email)
    .bind(format!("User {}", id))
    .bind(role)
    .bind(format!("g-{}", id))
    .execute(db)
    .await
    .unwrap();

    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await
        .unwrap()
}

pub fn admin_user() -> AuthedUser {
    AuthedUser {
        id: "U_ADMIN1".to_string(),
        email: "admin@agapay.test".to_string(),
        is_admin: true,
    }
}

pub fn regular_user(id: &str) -> AuthedUser {
    AuthedUser {
        id: id.to_string(),
        email: format!("{}@agapay.test", id.to_lowercase()),
        is_admin: false,
    }
}
