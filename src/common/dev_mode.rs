// src/common/dev_mode.rs
//! Development mode configuration and utilities
//! Allows bypassing OAuth sign-in while working on the admin dashboard locally

use chrono::Utc;
use sqlx::SqlitePool;
use std::env;

use crate::auth::models::User;

/// Fixed id so the dev user owns the same collections across restarts
pub const DEV_USER_ID: &str = "U_DEV000";

#[derive(Debug, Clone)]
pub struct DevModeConfig {
    pub enabled: bool,
    pub user_email: String,
    pub user_name: String,
    pub user_is_admin: bool,
}

impl DevModeConfig {
    pub fn from_env() -> Self {
        let enabled = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .to_lowercase()
            == "true";

        let user_email =
            env::var("DEV_USER_EMAIL").unwrap_or_else(|_| "dev@agapay.test".to_string());

        let user_name = env::var("DEV_USER_NAME").unwrap_or_else(|_| "Dev Admin".to_string());

        let user_is_admin = env::var("DEV_USER_IS_ADMIN")
            .unwrap_or_else(|_| "true".to_string())
            .to_lowercase()
            == "true";

        Self {
            enabled,
            user_email,
            user_name,
            user_is_admin,
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            user_email: String::new(),
            user_name: String::new(),
            user_is_admin: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Create the dev user every request is attributed to
    pub fn create_dev_user(&self) -> User {
        User {
            id: DEV_USER_ID.to_string(),
            email: self.user_email.clone(),
            full_name: self.user_name.clone(),
            phone: None,
            role: if self.user_is_admin { "admin" } else { "user" }.to_string(),
            is_active: true,
            provider: "dev".to_string(),
            provider_id: DEV_USER_ID.to_string(),
            avatar: None,
            created_at: Utc::now().to_rfc3339(),
            last_login: None,
        }
    }
}

/// Make sure the dev user has a row, so ownership checks and the user list see it
pub async fn ensure_dev_user(pool: &SqlitePool, config: &DevModeConfig) -> Result<(), sqlx::Error> {
    let user = config.create_dev_user();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users
            (id, email, full_name, role, is_active, provider, provider_id, created_at)
        VALUES (?, ?, ?, ?, 1, ?, ?, ?)
        "#,
    )
    .bind(&user.id)
    .bind(user.email.to_lowercase())
    .bind(&user.full_name)
    .bind(&user.role)
    .bind(&user.provider)
    .bind(&user.provider_id)
    .bind(&user.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Print dev mode status on startup
pub fn print_dev_mode_status(config: &DevModeConfig) {
    if config.enabled {
        println!("⚠️  🔓 DEV MODE ENABLED 🔓 ⚠️");
        println!("   OAuth sign-in bypassed");
        println!("   Dev User: {} ({})", config.user_name, config.user_email);
        println!(
            "   Admin: {}",
            if config.user_is_admin { "Yes" } else { "No" }
        );
        println!("   ⚠️  DO NOT USE IN PRODUCTION ⚠️");
        println!();
    } else {
        println!("🔒 Production mode - OAuth sign-in required");
    }
}

/// CLI argument parsing for dev mode
pub fn parse_dev_mode_args<I>(args: I) -> Option<bool>
where
    I: IntoIterator<Item = String>,
{
    let mut result = None;
    for arg in args {
        match arg.as_str() {
            "--dev" | "--dev-mode" => result = Some(true),
            "--no-dev" | "--prod" | "--production" => result = Some(false),
            _ => {}
        }
    }
    result
}

/// Override dev mode from CLI args
pub fn apply_cli_override(mut config: DevModeConfig) -> DevModeConfig {
    if let Some(cli_dev_mode) = parse_dev_mode_args(env::args()) {
        println!("🔧 CLI override: DEV_MODE = {}", cli_dev_mode);
        config.enabled = cli_dev_mode;
    }

    config
}
