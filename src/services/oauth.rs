// src/services/oauth.rs
//! Google and Apple sign-in: authorization URLs and code exchange.
//!
//! The service never stores provider tokens. A successful exchange yields an
//! [`OAuthProfile`]; minting our own session token is the auth module's job.

use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::Utc;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;
use tracing::{debug, error, info, warn};

pub const GOOGLE_SCOPES: [&str; 2] = [
    "https://www.googleapis.com/auth/userinfo.email",
    "https://www.googleapis.com/auth/userinfo.profile",
];

pub const APPLE_SCOPES: [&str; 2] = ["name", "email"];

#[derive(Debug, Error)]
pub enum OAuthError {
    #[error("{0} OAuth not configured")]
    NotConfigured(&'static str),

    #[error("Failed to exchange code for token: {0}")]
    TokenExchange(String),

    #[error("Failed to get user info: {0}")]
    UserInfo(String),

    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid provider response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OAuthProvider {
    Google,
    Apple,
}

impl OAuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
            OAuthProvider::Apple => "apple",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "Google",
            OAuthProvider::Apple => "Apple",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProviderCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl ProviderCredentials {
    /// Both halves must be present and non-empty
    fn from_env(id_var: &str, secret_var: &str) -> Option<Self> {
        let client_id = env::var(id_var).ok().filter(|v| !v.trim().is_empty())?;
        let client_secret = env::var(secret_var).ok().filter(|v| !v.trim().is_empty())?;
        Some(Self {
            client_id,
            client_secret,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub auth: String,
    pub token: String,
    /// Apple has none; its identity arrives in the `id_token`
    pub userinfo: Option<String>,
}

impl ProviderEndpoints {
    pub fn google() -> Self {
        Self {
            auth: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token: "https://oauth2.googleapis.com/token".to_string(),
            userinfo: Some("https://www.googleapis.com/oauth2/v2/userinfo".to_string()),
        }
    }

    pub fn apple() -> Self {
        Self {
            auth: "https://appleid.apple.com/auth/authorize".to_string(),
            token: "https://appleid.apple.com/auth/token".to_string(),
            userinfo: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// Base URL this API is reachable at; callbacks hang off it
    pub public_base_url: String,
    pub google: Option<ProviderCredentials>,
    pub apple: Option<ProviderCredentials>,
    pub google_endpoints: ProviderEndpoints,
    pub apple_endpoints: ProviderEndpoints,
}

impl OAuthConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let public_base_url = env::var("PUBLIC_BASE_URL")
            .or_else(|_| env::var("NEXTAUTH_URL"))
            .unwrap_or_else(|_| "http://localhost:8080".to_string());

        let config = Self {
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            google: ProviderCredentials::from_env("GOOGLE_CLIENT_ID", "GOOGLE_CLIENT_SECRET"),
            apple: ProviderCredentials::from_env("APPLE_CLIENT_ID", "APPLE_CLIENT_SECRET"),
            google_endpoints: ProviderEndpoints::google(),
            apple_endpoints: ProviderEndpoints::apple(),
        };

        if config.google.is_none() {
            warn!("GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET not set, Google sign-in disabled");
        }
        if config.apple.is_none() {
            warn!("APPLE_CLIENT_ID / APPLE_CLIENT_SECRET not set, Apple sign-in disabled");
        }

        config
    }

    pub fn uses_https(&self) -> bool {
        self.public_base_url
            .get(..8)
            .map(|scheme| scheme.eq_ignore_ascii_case("https://"))
            .unwrap_or(false)
    }

    pub fn redirect_uri(&self, provider: OAuthProvider) -> String {
        format!(
            "{}/api/auth/{}/callback",
            self.public_base_url,
            provider.as_str()
        )
    }

    fn credentials(&self, provider: OAuthProvider) -> Result<&ProviderCredentials, OAuthError> {
        match provider {
            OAuthProvider::Google => self.google.as_ref(),
            OAuthProvider::Apple => self.apple.as_ref(),
        }
        .ok_or(OAuthError::NotConfigured(provider.display_name()))
    }

    fn endpoints(&self, provider: OAuthProvider) -> &ProviderEndpoints {
        match provider {
            OAuthProvider::Google => &self.google_endpoints,
            OAuthProvider::Apple => &self.apple_endpoints,
        }
    }
}

/// Identity returned by a provider after a successful code exchange
#[derive(Debug, Clone, Serialize)]
pub struct OAuthProfile {
    pub provider: OAuthProvider,
    pub provider_id: String,
    pub email: Option<String>,
    pub name: String,
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    id: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct IdTokenClaims {
    sub: Option<String>,
    email: Option<String>,
}

/// What Apple posts back in the `user` field on first sign-in
#[derive(Debug, Default, PartialEq)]
pub struct AppleUserInfo {
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OAuthService {
    config: OAuthConfig,
    client: Client,
}

impl OAuthService {
    pub fn new(config: OAuthConfig) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self { config, client }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    pub fn is_configured(&self, provider: OAuthProvider) -> bool {
        self.config.credentials(provider).is_ok()
    }

    /// Build the provider consent-screen URL
    pub fn authorization_url(
        &self,
        provider: OAuthProvider,
        state: &str,
    ) -> Result<String, OAuthError> {
        let credentials = self.config.credentials(provider)?;
        let redirect_uri = self.config.redirect_uri(provider);
        let endpoints = self.config.endpoints(provider);

        let mut params: Vec<(&str, String)> = vec![
            ("client_id", credentials.client_id.clone()),
            ("redirect_uri", redirect_uri),
            ("response_type", "code".to_string()),
        ];
        match provider {
            OAuthProvider::Google => {
                params.push(("scope", GOOGLE_SCOPES.join(" ")));
                params.push(("access_type", "offline".to_string()));
                params.push(("prompt", "consent".to_string()));
            }
            OAuthProvider::Apple => {
                params.push(("scope", APPLE_SCOPES.join(" ")));
                params.push(("response_mode", "form_post".to_string()));
            }
        }
        params.push(("state", state.to_string()));

        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");

        debug!(provider = provider.as_str(), "Generated OAuth authorization URL");
        Ok(format!("{}?{}", endpoints.auth, query))
    }

    /// POST the authorization code to the provider's token endpoint
    async fn exchange_code(
        &self,
        provider: OAuthProvider,
        code: &str,
    ) -> Result<TokenResponse, OAuthError> {
        let credentials = self.config.credentials(provider)?;
        let redirect_uri = self.config.redirect_uri(provider);

        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        debug!(provider = provider.as_str(), "Exchanging authorization code for tokens");

        let response = self
            .client
            .post(&self.config.endpoints(provider).token)
            .form(&params)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            error!(
                provider = provider.as_str(),
                status = %status,
                error = %error_text,
                "Token exchange failed"
            );
            return Err(OAuthError::TokenExchange(format!("HTTP {}", status)));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))
    }

    /// Exchange a Google authorization code and fetch the user's profile
    pub async fn exchange_google_code(&self, code: &str) -> Result<OAuthProfile, OAuthError> {
        let tokens = self.exchange_code(OAuthProvider::Google, code).await?;

        let userinfo_url = self
            .config
            .google_endpoints
            .userinfo
            .as_deref()
            .ok_or_else(|| OAuthError::UserInfo("no userinfo endpoint".to_string()))?;

        let response = self
            .client
            .get(userinfo_url)
            .bearer_auth(&tokens.access_token)
            .send()
            .await
            .map_err(|e| OAuthError::RequestFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = %status, "Google userinfo request failed");
            return Err(OAuthError::UserInfo(format!("HTTP {}", status)));
        }

        let info = response
            .json::<GoogleUserInfo>()
            .await
            .map_err(|e| OAuthError::InvalidResponse(e.to_string()))?;

        info!(provider = "google", provider_id = %info.id, "Fetched Google profile");

        Ok(OAuthProfile {
            provider: OAuthProvider::Google,
            name: info
                .name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| "Google User".to_string()),
            provider_id: info.id,
            email: info.email,
            picture: info.picture,
        })
    }

    /// Exchange an Apple authorization code
    ///
    /// Apple has no userinfo call worth making: the subject and email come
    /// from the returned `id_token`, the display name from the `user` blob
    /// Apple posts on the very first sign-in only.
    pub async fn exchange_apple_code(
        &self,
        code: &str,
        user: Option<&serde_json::Value>,
    ) -> Result<OAuthProfile, OAuthError> {
        let tokens = self.exchange_code(OAuthProvider::Apple, code).await?;

        let claims = tokens.id_token.as_deref().and_then(decode_id_token_claims);
        let user_info = user.map(parse_apple_user).unwrap_or_default();

        let provider_id = claims
            .as_ref()
            .and_then(|c| c.sub.clone())
            .unwrap_or_else(|| format!("apple_{}", Utc::now().timestamp_millis()));

        let email = claims
            .and_then(|c| c.email)
            .or(user_info.email)
            .filter(|e| !e.trim().is_empty());

        info!(provider = "apple", provider_id = %provider_id, "Resolved Apple identity");

        Ok(OAuthProfile {
            provider: OAuthProvider::Apple,
            provider_id,
            email,
            name: user_info.name.unwrap_or_else(|| "Apple User".to_string()),
            picture: None,
        })
    }
}

/// Read the claims of a JWT without checking its signature
///
/// Only used on an `id_token` we just received over TLS from the provider's
/// token endpoint.
fn decode_id_token_claims(id_token: &str) -> Option<IdTokenClaims> {
    let mut validation = Validation::new(Algorithm::RS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    match decode::<IdTokenClaims>(id_token, &DecodingKey::from_secret(&[]), &validation) {
        Ok(data) => Some(data.claims),
        Err(e) => {
            warn!(error = %e, "Failed to decode id_token");
            None
        }
    }
}

/// Parse Apple's `user` field
///
/// The web flow posts it as a string (base64 encoded JSON or plain JSON),
/// the JS SDK sends a JSON object. The name is either a string or
/// `{ "firstName", "lastName" }`.
pub fn parse_apple_user(raw: &serde_json::Value) -> AppleUserInfo {
    let decoded;
    let value = match raw {
        serde_json::Value::String(text) => {
            let parsed = STANDARD
                .decode(text.trim())
                .ok()
                .and_then(|bytes| serde_json::from_slice::<serde_json::Value>(&bytes).ok())
                .or_else(|| serde_json::from_str::<serde_json::Value>(text).ok());
            match parsed {
                Some(v) => {
                    decoded = v;
                    &decoded
                }
                None => {
                    warn!("Failed to parse Apple user data");
                    return AppleUserInfo::default();
                }
            }
        }
        other => other,
    };

    let email = value
        .get("email")
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let name = match value.get("name") {
        Some(serde_json::Value::String(s)) => Some(s.trim().to_string()),
        Some(serde_json::Value::Object(parts)) => {
            let joined = ["firstName", "lastName"]
                .iter()
                .filter_map(|k| parts.get(*k).and_then(|v| v.as_str()))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            Some(joined)
        }
        _ => None,
    }
    .filter(|n| !n.is_empty());

    AppleUserInfo { email, name }
}
