// src/system/handlers.rs

use axum::{extract::Extension, Json};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::common::{ApiError, AppState};

pub const SERVICE_NAME: &str = "AgaPay API";
const HIDDEN: &str = "***HIDDEN***";

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct EnvReport {
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<&'static str>,
    pub apple_client_id: Option<String>,
    pub apple_client_secret: Option<&'static str>,
    pub public_base_url: String,
    pub frontend_url: String,
    pub app_env: &'static str,
    pub rate_limit_enabled: bool,
}

#[derive(Debug, Serialize)]
pub struct DebugEnvResponse {
    pub message: &'static str,
    #[serde(rename = "envVars")]
    pub env_vars: EnvReport,
    pub timestamp: String,
}

/// GET /
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: format!("{} is running", SERVICE_NAME),
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// GET /health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: SERVICE_NAME,
    })
}

/// GET /api/debug/env - Which OAuth settings are present (dev mode only)
pub async fn debug_env(
    Extension(state_lock): Extension<Arc<RwLock<AppState>>>,
) -> Result<Json<DebugEnvResponse>, ApiError> {
    let state = state_lock.read().await.clone();

    if !state.dev_mode.is_enabled() {
        warn!("Environment report requested outside dev mode");
        return Err(ApiError::NotFound("Not found".to_string()));
    }

    let oauth = state.oauth_service.config();
    info!("Serving environment report");

    Ok(Json(DebugEnvResponse {
        message: "Environment variables check",
        env_vars: EnvReport {
            google_client_id: oauth.google.as_ref().map(|c| c.client_id.clone()),
            google_client_secret: oauth.google.as_ref().map(|_| HIDDEN),
            apple_client_id: oauth.apple.as_ref().map(|c| c.client_id.clone()),
            apple_client_secret: oauth.apple.as_ref().map(|_| HIDDEN),
            public_base_url: oauth.public_base_url.clone(),
            frontend_url: state.frontend_url.clone(),
            app_env: if state.secure_cookies {
                "production"
            } else {
                "development"
            },
            rate_limit_enabled: state.rate_limit_service.config().enabled,
        },
        timestamp: Utc::now().to_rfc3339(),
    }))
}
