// Application state shared across all modules

use sqlx::SqlitePool;
use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::session::SessionTokens;
use crate::common::dev_mode::DevModeConfig;
use crate::services::{OAuthService, RateLimitService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub sessions: SessionTokens,
    pub admin_emails: HashSet<String>,
    pub dev_mode: DevModeConfig,
    /// Where OAuth callbacks send the browser afterwards
    pub frontend_url: String,
    /// Adds `Secure` to auth cookies (APP_ENV=production)
    pub secure_cookies: bool,
    pub oauth_service: Arc<OAuthService>,
    pub rate_limit_service: Arc<RateLimitService>,
}

impl AppState {
    /// Emails on the ADMIN_EMAILS allow-list, compared case-insensitively
    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails.contains(&email.trim().to_lowercase())
    }
}

/// Parse the comma separated ADMIN_EMAILS value
pub fn parse_admin_emails(raw: &str) -> HashSet<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}
