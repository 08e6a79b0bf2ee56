//! Authentication extractors for Axum

use async_trait::async_trait;
use axum::{
    extract::{Extension, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, error, warn};

use super::cookies::{read_cookie, ADMIN_TOKEN_COOKIE};
use super::models::User;
use crate::common::{safe_email_log, safe_token_log, ApiError, AppState};

/// Authenticated user extractor
///
/// Accepts `Authorization: Bearer <token>`, a raw token in `Authorization`,
/// or the `admin_token` cookie. The user is reloaded from the database so a
/// deactivated account loses access immediately.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub id: String,
    pub email: String,
    pub is_admin: bool,
}

/// Like [`AuthedUser`] but yields `None` for anonymous callers
#[derive(Debug, Clone)]
pub struct MaybeAuthedUser(pub Option<AuthedUser>);

/// Pull the session token from the header or the admin cookie
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.strip_prefix("Bearer ").unwrap_or(s).trim().to_string())
        .filter(|s| !s.is_empty());

    from_header.or_else(|| read_cookie(headers, ADMIN_TOKEN_COOKIE))
}

async fn app_state<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<AppState, ApiError> {
    let Extension(state_lock): Extension<Arc<RwLock<AppState>>> =
        Extension::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::InternalServer("missing app state".to_string()))?;
    let app_state = state_lock.read().await.clone();
    Ok(app_state)
}

fn dev_user(app_state: &AppState) -> AuthedUser {
    let user = app_state.dev_mode.create_dev_user();
    let is_admin = user.is_admin_role() || app_state.is_admin_email(&user.email);

    debug!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        is_admin = is_admin,
        "DEV MODE: Authentication bypassed"
    );

    AuthedUser {
        id: user.id,
        email: user.email,
        is_admin,
    }
}

/// Resolve `token` to an active user
async fn authenticate(app_state: &AppState, token: &str) -> Result<AuthedUser, ApiError> {
    let Some(session) = app_state.sessions.verify(token) else {
        warn!(token = %safe_token_log(token), "Session token validation failed");
        return Err(ApiError::Unauthorized("invalid token".into()));
    };

    let user: Option<User> = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(&session.id)
        .fetch_optional(&app_state.db)
        .await
        .map_err(|e| {
            error!(
                error = %e,
                user_id = %session.id,
                "Database error during user lookup in authentication"
            );
            ApiError::DatabaseError(e)
        })?;

    match user {
        Some(u) if !u.is_active => {
            warn!(user_id = %u.id, "Authentication refused: account is deactivated");
            Err(ApiError::Forbidden("account is deactivated".into()))
        }
        Some(u) => {
            let is_admin = u.is_admin_role() || app_state.is_admin_email(&u.email);
            debug!(
                user_id = %u.id,
                email = %safe_email_log(&u.email),
                is_admin = is_admin,
                "User authentication successful via extractor"
            );
            Ok(AuthedUser {
                id: u.id,
                email: u.email,
                is_admin,
            })
        }
        None => {
            warn!(user_id = %session.id, "Authentication failed: user not found in database");
            Err(ApiError::Unauthorized("user not found".into()))
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;

        if app_state.dev_mode.is_enabled() {
            return Ok(dev_user(&app_state));
        }

        let Some(token) = extract_token(&parts.headers) else {
            warn!("Authentication failed: missing Authorization header or admin_token cookie");
            return Err(ApiError::Unauthorized("missing auth".into()));
        };

        authenticate(&app_state, &token).await
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = app_state(parts, state).await?;

        if app_state.dev_mode.is_enabled() {
            return Ok(MaybeAuthedUser(Some(dev_user(&app_state))));
        }

        let Some(token) = extract_token(&parts.headers) else {
            return Ok(MaybeAuthedUser(None));
        };

        // A stale token on a public page is treated as anonymous
        match authenticate(&app_state, &token).await {
            Ok(user) => Ok(MaybeAuthedUser(Some(user))),
            Err(ApiError::DatabaseError(e)) => Err(ApiError::DatabaseError(e)),
            Err(_) => Ok(MaybeAuthedUser(None)),
        }
    }
}
