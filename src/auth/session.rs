//! Session token minting and verification
//!
//! Wire format: `oauth_` followed by an HS256 JWT of [`Claims`].

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::{debug, error};

use super::models::{Claims, SessionUser, User};
use crate::common::ApiError;

pub const TOKEN_PREFIX: &str = "oauth_";
pub const SESSION_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct SessionTokens {
    secret: String,
}

impl std::fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionTokens").finish_non_exhaustive()
    }
}

impl SessionTokens {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn issue(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            email: user.email.clone(),
            name: user.full_name.clone(),
            provider: user.provider.clone(),
            iat: now.timestamp(),
            exp: (now + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };
        self.encode_claims(&claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, ApiError> {
        let jwt = encode(
            &Header::new(Algorithm::HS256),
            claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| {
            error!(error = %e, user_id = %claims.sub, "Session token encoding failed");
            ApiError::InternalServer("jwt error".to_string())
        })?;
        Ok(format!("{}{}", TOKEN_PREFIX, jwt))
    }

    /// `None` for a missing prefix, bad signature or expired token
    pub fn verify(&self, token: &str) -> Option<SessionUser> {
        let jwt = token.trim().strip_prefix(TOKEN_PREFIX)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        match decode::<Claims>(
            jwt,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        ) {
            Ok(data) => Some(data.claims.into()),
            Err(e) => {
                debug!(error = %e, "Session token rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "U_ABC123".to_string(),
            email: "ama@example.com".to_string(),
            full_name: "Ama Mensah".to_string(),
            phone: None,
            role: "user".to_string(),
            is_active: true,
            provider: "google".to_string(),
            provider_id: "g-1".to_string(),
            avatar: None,
            created_at: "2024-01-01T00:00:00Z".to_string(),
            last_login: None,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let sessions = SessionTokens::new("secret");
        let token = sessions.issue(&sample_user()).unwrap();
        assert!(token.starts_with(TOKEN_PREFIX));

        let user = sessions.verify(&token).unwrap();
        assert_eq!(user.id, "U_ABC123");
        assert_eq!(user.email, "ama@example.com");
        assert_eq!(user.name, "Ama Mensah");
        assert_eq!(user.provider, "google");
    }

    #[test]
    fn test_verify_rejects_missing_prefix() {
        let sessions = SessionTokens::new("secret");
        let token = sessions.issue(&sample_user()).unwrap();
        let bare = token.trim_start_matches(TOKEN_PREFIX);
        assert!(sessions.verify(bare).is_none());
    }

    #[test]
    fn test_verify_rejects_wrong_secret() {
        let token = SessionTokens::new("secret").issue(&sample_user()).unwrap();
        assert!(SessionTokens::new("other").verify(&token).is_none());
    }

    #[test]
    fn test_verify_rejects_expired() {
        let sessions = SessionTokens::new("secret");
        let past = Utc::now() - Duration::days(8);
        let claims = Claims {
            sub: "U_ABC123".to_string(),
            email: "ama@example.com".to_string(),
            name: "Ama".to_string(),
            provider: "google".to_string(),
            iat: past.timestamp(),
            exp: (past + Duration::days(SESSION_TTL_DAYS)).timestamp(),
        };
        let token = sessions.encode_claims(&claims).unwrap();
        assert!(sessions.verify(&token).is_none());
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let sessions = SessionTokens::new("secret");
        assert!(sessions.verify("oauth_not-a-jwt").is_none());
        assert!(sessions.verify("").is_none());
    }
}
