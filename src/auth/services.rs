//! User persistence for the OAuth login flow

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::models::{PublicUser, User, ROLE_ADMIN, ROLE_USER};
use crate::common::{generate_user_id, safe_email_log, ApiError};
use crate::services::oauth::OAuthProfile;

pub struct AuthService {
    db: SqlitePool,
}

impl AuthService {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_by_id(&self, user_id: &str) -> Result<Option<User>, ApiError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.db)
            .await
            .map_err(ApiError::DatabaseError)
    }

    /// Create or refresh the user behind an OAuth profile
    ///
    /// Matches on provider + provider_id first, then on email (so a Google
    /// account and an Apple account with the same address are one user).
    /// `promote_to_admin` upgrades the role, it never downgrades.
    pub async fn upsert_oauth_user(
        &self,
        profile: &OAuthProfile,
        promote_to_admin: bool,
    ) -> Result<User, ApiError> {
        let Some(email) = profile
            .email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
        else {
            warn!(
                provider = profile.provider.as_str(),
                provider_id = %profile.provider_id,
                "OAuth profile has no email address"
            );
            return Err(ApiError::BadRequest(
                "Email address is required to sign in".to_string(),
            ));
        };

        let provider = profile.provider.as_str();
        let now = Utc::now().to_rfc3339();

        let existing = match sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE provider = ? AND provider_id = ?",
        )
        .bind(provider)
        .bind(&profile.provider_id)
        .fetch_optional(&self.db)
        .await?
        {
            Some(user) => Some(user),
            None => sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
                .bind(&email)
                .fetch_optional(&self.db)
                .await?,
        };

        let user_id = match existing {
            Some(user) => {
                if !user.is_active {
                    warn!(user_id = %user.id, "Login refused: account is deactivated");
                    return Err(ApiError::Forbidden("account is deactivated".to_string()));
                }

                let role = if promote_to_admin {
                    ROLE_ADMIN
                } else {
                    user.role.as_str()
                };

                sqlx::query(
                    r#"
                    UPDATE users
                    SET full_name = ?, avatar = COALESCE(?, avatar), role = ?, last_login = ?
                    WHERE id = ?
                    "#,
                )
                .bind(&profile.name)
                .bind(&profile.picture)
                .bind(role)
                .bind(&now)
                .bind(&user.id)
                .execute(&self.db)
                .await?;

                debug!(user_id = %user.id, provider = provider, "Updated existing user on login");
                user.id
            }
            None => {
                let id = generate_user_id();
                let role = if promote_to_admin { ROLE_ADMIN } else { ROLE_USER };

                sqlx::query(
                    r#"
                    INSERT INTO users
                        (id, email, full_name, role, is_active, provider, provider_id,
                         avatar, created_at, last_login)
                    VALUES (?, ?, ?, ?, 1, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&id)
                .bind(&email)
                .bind(&profile.name)
                .bind(role)
                .bind(provider)
                .bind(&profile.provider_id)
                .bind(&profile.picture)
                .bind(&now)
                .bind(&now)
                .execute(&self.db)
                .await?;

                info!(
                    user_id = %id,
                    email = %safe_email_log(&email),
                    provider = provider,
                    role = role,
                    "Created new user account via OAuth"
                );
                id
            }
        };

        self.find_by_id(&user_id)
            .await?
            .ok_or_else(|| ApiError::InternalServer("user vanished after upsert".to_string()))
    }
}

pub fn public_user(user: &User, is_admin: bool) -> PublicUser {
    PublicUser {
        id: user.id.clone(),
        email: user.email.clone(),
        name: user.full_name.clone(),
        avatar: user.avatar.clone(),
        provider: user.provider.clone(),
        role: user.role.clone(),
        is_admin,
    }
}
