//! Tests for system endpoints

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::common::dev_mode::DevModeConfig;
    use crate::common::testing::{oauth_config_without_credentials, shared, state_with, test_state};
    use crate::common::{database::test_pool, ApiError};
    use crate::services::oauth::ProviderCredentials;

    #[tokio::test]
    async fn test_root_and_health() {
        let root = handlers::root().await;
        assert_eq!(root.message, "AgaPay API is running");
        assert_eq!(root.version, env!("CARGO_PKG_VERSION"));

        let health = serde_json::to_value(handlers::health().await.0).unwrap();
        assert_eq!(
            health,
            serde_json::json!({ "status": "healthy", "service": "AgaPay API" })
        );
    }

    #[tokio::test]
    async fn test_debug_env_hidden_outside_dev_mode() {
        let state = shared(test_state().await);
        assert!(matches!(
            handlers::debug_env(state).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_debug_env_masks_secrets() {
        let mut oauth = oauth_config_without_credentials();
        oauth.google = Some(ProviderCredentials {
            client_id: "google-client".to_string(),
            client_secret: "super-secret".to_string(),
        });
        let mut state = state_with(test_pool().await, oauth);
        state.dev_mode = DevModeConfig {
            enabled: true,
            ..DevModeConfig::disabled()
        };

        let report = handlers::debug_env(shared(state)).await.unwrap();
        let body = serde_json::to_value(&report.0).unwrap();

        assert_eq!(body["envVars"]["GOOGLE_CLIENT_ID"], "google-client");
        assert_eq!(body["envVars"]["GOOGLE_CLIENT_SECRET"], "***HIDDEN***");
        assert!(body["envVars"]["APPLE_CLIENT_ID"].is_null());
        assert!(body["envVars"]["APPLE_CLIENT_SECRET"].is_null());
        assert_eq!(body["envVars"]["RATE_LIMIT_ENABLED"], false);
        assert!(!body.to_string().contains("super-secret"));
    }
}
