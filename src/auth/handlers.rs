//! Authentication handlers

use axum::{
    extract::{Extension, Form, Json, Query},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use super::cookies::{
    clear_oauth_state_cookie, clear_session_cookies, read_cookie, set_oauth_state_cookie,
    set_session_cookies, OAUTH_STATE_COOKIE,
};
use super::extractors::AuthedUser;
use super::models::{
    AppleAuthPayload, AppleCallbackForm, OAuthCallbackQuery, User, VerifyTokenRequest,
};
use super::services::{public_user, AuthService};
use crate::common::{generate_oauth_state, safe_email_log, ApiError, AppState};
use crate::services::oauth::{OAuthProfile, OAuthProvider};

/// Outcome of a completed provider login
struct LoginSuccess {
    user: User,
    token: String,
    is_admin: bool,
}

impl LoginSuccess {
    /// Cookies for the new session, plus clearing the used state
    fn cookie_headers(&self, state: &AppState) -> HeaderMap {
        let mut headers = HeaderMap::new();
        let user_json = serde_json::to_string(&public_user(&self.user, self.is_admin))
            .unwrap_or_else(|_| "{}".to_string());
        set_session_cookies(&mut headers, &self.token, &user_json, state.secure_cookies);
        clear_oauth_state_cookie(&mut headers, state_cookie_secure(state));
        headers
    }
}

/// The state cookie must survive Apple's cross-site POST, which needs
/// `SameSite=None; Secure` whenever the callback is served over HTTPS
fn state_cookie_secure(state: &AppState) -> bool {
    state.secure_cookies || state.oauth_service.config().uses_https()
}

/// Store the profile's user and mint a session token
async fn complete_login(state: &AppState, profile: OAuthProfile) -> Result<LoginSuccess, ApiError> {
    let promote = profile
        .email
        .as_deref()
        .map(|e| state.is_admin_email(e))
        .unwrap_or(false);

    let user = AuthService::new(state.db.clone())
        .upsert_oauth_user(&profile, promote)
        .await?;
    let token = state.sessions.issue(&user)?;
    let is_admin = user.is_admin_role() || state.is_admin_email(&user.email);

    info!(
        user_id = %user.id,
        email = %safe_email_log(&user.email),
        provider = profile.provider.as_str(),
        is_admin = is_admin,
        "User authentication successful via OAuth"
    );

    Ok(LoginSuccess {
        user,
        token,
        is_admin,
    })
}

fn login_error_redirect(state: &AppState, error: &str) -> Response {
    let mut headers = HeaderMap::new();
    clear_oauth_state_cookie(&mut headers, state_cookie_secure(state));
    let target = format!(
        "{}/admin/login?error={}",
        state.frontend_url,
        urlencoding::encode(error)
    );
    (headers, Redirect::to(&target)).into_response()
}

/// True when the callback's `state` matches the cookie set at init
fn state_matches(headers: &HeaderMap, returned: Option<&str>) -> bool {
    match (read_cookie(headers, OAUTH_STATE_COOKIE), returned) {
        (Some(expected), Some(returned)) => expected == returned,
        _ => false,
    }
}

/// Shared tail of both redirect-style callbacks
async fn finish_callback(
    state: &AppState,
    provider: OAuthProvider,
    profile: Result<OAuthProfile, ApiError>,
) -> Response {
    let login = match profile {
        Ok(profile) => complete_login(state, profile).await,
        Err(e) => Err(e),
    };

    match login {
        Ok(success) => {
            let target = format!("{}/admin/dashboard", state.frontend_url);
            (
                success.cookie_headers(state),
                Redirect::to(&target),
            )
                .into_response()
        }
        Err(e) => {
            error!(provider = provider.as_str(), error = %e, "OAuth callback failed");
            login_error_redirect(state, "server_error")
        }
    }
}

fn init_response(state: &AppState, provider: OAuthProvider) -> Result<Response, ApiError> {
    let oauth_state = generate_oauth_state();
    let auth_url = state
        .oauth_service
        .authorization_url(provider, &oauth_state)?;

    let mut headers = HeaderMap::new();
    set_oauth_state_cookie(&mut headers, &oauth_state, state_cookie_secure(state));

    info!(provider = provider.as_str(), "OAuth flow initiated");
    Ok((headers, Json(serde_json::json!({ "authUrl": auth_url }))).into_response())
}

/// GET /api/auth/google/init
/// Returns the Google consent URL and sets the `oauth_state` cookie
///
/// # Response
/// ```json
/// { "authUrl": "https://accounts.google.com/o/oauth2/v2/auth?..." }
/// ```
pub async fn google_init(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    init_response(&state, OAuthProvider::Google)
}

/// GET /api/auth/google/callback
/// Google redirects here with `code` and `state`; always answers with a redirect
pub async fn google_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
    Query(query): Query<OAuthCallbackQuery>,
) -> Response {
    let state = state_lock.read().await.clone();

    if let Some(error) = query.error.as_deref() {
        warn!(provider = "google", error = %error, "OAuth provider returned an error");
        return login_error_redirect(&state, error);
    }

    let Some(code) = query.code.as_deref().filter(|c| !c.is_empty()) else {
        warn!(provider = "google", "OAuth callback without code");
        return login_error_redirect(&state, "missing_code");
    };

    if !state_matches(&headers, query.state.as_deref()) {
        warn!(provider = "google", "OAuth state mismatch");
        return login_error_redirect(&state, "invalid_state");
    }

    let profile = state
        .oauth_service
        .exchange_google_code(code)
        .await
        .map_err(ApiError::from);
    finish_callback(&state, OAuthProvider::Google, profile).await
}

/// GET /api/auth/apple/init
pub async fn apple_init(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();
    init_response(&state, OAuthProvider::Apple)
}

/// POST /api/auth/apple/callback
/// Apple posts the authorization result as a form (`response_mode=form_post`)
pub async fn apple_callback(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    headers: HeaderMap,
    Form(form): Form<AppleCallbackForm>,
) -> Response {
    let state = state_lock.read().await.clone();

    if let Some(error) = form.error.as_deref() {
        warn!(provider = "apple", error = %error, "OAuth provider returned an error");
        return login_error_redirect(&state, error);
    }

    let Some(code) = form.code.as_deref().filter(|c| !c.is_empty()) else {
        warn!(provider = "apple", "OAuth callback without code");
        return login_error_redirect(&state, "missing_code");
    };

    if !state_matches(&headers, form.state.as_deref()) {
        warn!(provider = "apple", "OAuth state mismatch");
        return login_error_redirect(&state, "invalid_state");
    }

    let profile = state
        .oauth_service
        .exchange_apple_code(code, form.user.map(serde_json::Value::String).as_ref())
        .await
        .map_err(ApiError::from);
    finish_callback(&state, OAuthProvider::Apple, profile).await
}

/// POST /api/auth/apple
/// Client-driven Apple sign-in (e.g. Sign in with Apple JS)
///
/// # Request Body
/// ```json
/// { "code": "<authorization code>", "user": "<optional user string or object>" }
/// ```
///
/// # Response
/// ```json
/// { "success": true, "user": { ... }, "token": "oauth_..." }
/// ```
pub async fn apple_auth(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<AppleAuthPayload>,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let code = payload
        .code
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Authorization code is required".to_string()))?;

    let profile = state
        .oauth_service
        .exchange_apple_code(code, payload.user.as_ref())
        .await?;
    let success = complete_login(&state, profile).await?;

    let body = serde_json::json!({
        "success": true,
        "user": public_user(&success.user, success.is_admin),
        "token": success.token,
    });
    Ok((success.cookie_headers(&state), Json(body)).into_response())
}

/// GET /api/auth/me
/// Returns the current authenticated user's information
///
/// # Response
/// ```json
/// { "user": { ... }, "is_admin": true }
/// ```
pub async fn me_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = if state.dev_mode.is_enabled() {
        state.dev_mode.create_dev_user()
    } else {
        AuthService::new(state.db.clone())
            .find_by_id(&authed.id)
            .await?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?
    };

    Ok(Json(serde_json::json!({
        "user": user,
        "is_admin": authed.is_admin
    })))
}

/// POST /api/auth/verify
/// Decodes a session token without touching cookies
pub async fn verify_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    Json(payload): Json<VerifyTokenRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let state = state_lock.read().await.clone();

    let user = state
        .sessions
        .verify(&payload.token)
        .ok_or_else(|| ApiError::Unauthorized("Invalid or expired token".to_string()))?;

    Ok(Json(serde_json::json!({ "valid": true, "user": user })))
}

/// POST /api/auth/refresh
/// Issues a fresh 7-day token for the current user
pub async fn refresh_handler(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
    authed: AuthedUser,
) -> Result<Response, ApiError> {
    let state = state_lock.read().await.clone();

    let user = if state.dev_mode.is_enabled() {
        state.dev_mode.create_dev_user()
    } else {
        AuthService::new(state.db.clone())
            .find_by_id(&authed.id)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("user not found".to_string()))?
    };

    let token = state.sessions.issue(&user)?;
    let user_json = serde_json::to_string(&public_user(&user, authed.is_admin))
        .unwrap_or_else(|_| "{}".to_string());

    let mut headers = HeaderMap::new();
    set_session_cookies(&mut headers, &token, &user_json, state.secure_cookies);

    info!(user_id = %user.id, "Session token refreshed");
    Ok((headers, Json(serde_json::json!({ "token": token }))).into_response())
}

/// POST /api/auth/logout
/// Clears the session cookies; bearer tokens are dropped client-side
pub async fn logout_handler(Extension(state_lock): Extension<Arc<RwLock<AppState>>>) -> Response {
    let state = state_lock.read().await.clone();

    let mut headers = HeaderMap::new();
    clear_session_cookies(&mut headers, state.secure_cookies);

    info!("User logout successful");
    (
        headers,
        Json(serde_json::json!({ "message": "Logout successful" })),
    )
        .into_response()
}
