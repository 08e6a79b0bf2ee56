//! Authentication data models

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

/// Session token claims
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Claims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub provider: String,
    pub iat: i64,
    pub exp: i64,
}

/// User database model
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub provider: String,
    pub provider_id: String,
    pub avatar: Option<String>,
    pub created_at: String,
    pub last_login: Option<String>,
}

impl User {
    pub fn is_admin_role(&self) -> bool {
        self.role == ROLE_ADMIN
    }
}

/// Identity carried by a verified session token
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SessionUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub provider: String,
}

impl From<Claims> for SessionUser {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            email: claims.email,
            name: claims.name,
            provider: claims.provider,
        }
    }
}

/// Trimmed user shape stored in the `admin_user` cookie and login responses
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar: Option<String>,
    pub provider: String,
    pub role: String,
    pub is_admin: bool,
}

/// Query string Google appends to the callback
#[derive(Deserialize, Debug, Default)]
pub struct OAuthCallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Form body Apple posts to the callback (`response_mode=form_post`)
#[derive(Deserialize, Debug, Default)]
pub struct AppleCallbackForm {
    pub code: Option<String>,
    pub state: Option<String>,
    pub user: Option<String>,
    pub error: Option<String>,
}

/// JSON body for the client-driven Apple sign-in
///
/// `user` is whatever the client received from Apple: the JS SDK hands
/// over an object, the web flow a (possibly base64) string.
#[derive(Deserialize, Debug)]
pub struct AppleAuthPayload {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub user: Option<serde_json::Value>,
}

#[derive(Deserialize, Debug)]
pub struct VerifyTokenRequest {
    pub token: String,
}
