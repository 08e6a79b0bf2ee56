// rate_limit_middleware.rs
use crate::auth::extractors::extract_token;
use crate::services::rate_limit::{RateLimitResult, RateLimitService};
use axum::{
    extract::{ConnectInfo, Extension, Request},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

/// Trailing characters of the session token used as the limiter key
const TOKEN_KEY_LEN: usize = 24;

#[derive(Serialize)]
struct RateLimitErrorResponse {
    error: String,
    code: String,
    retry_after: u32,
}

/// Extract IP address from request
fn extract_ip_address(
    headers: &HeaderMap,
    connect_info: Option<&ConnectInfo<SocketAddr>>,
) -> Option<String> {
    // Try X-Forwarded-For header first (for proxied requests)
    if let Some(forwarded) = headers.get("x-forwarded-for") {
        if let Ok(forwarded_str) = forwarded.to_str() {
            // Take the first IP in the chain
            if let Some(first_ip) = forwarded_str.split(',').next() {
                let first_ip = first_ip.trim();
                if !first_ip.is_empty() {
                    return Some(first_ip.to_string());
                }
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(ip_str) = real_ip.to_str() {
            return Some(ip_str.trim().to_string());
        }
    }

    connect_info.map(|info| info.0.ip().to_string())
}

/// Key authenticated callers by the tail of their session token
///
/// Session tokens share a common header prefix, so the signature end is what
/// tells two callers apart.
fn extract_user_identifier(headers: &HeaderMap) -> Option<String> {
    extract_token(headers).map(|token| {
        let tail: String = token
            .chars()
            .rev()
            .take(TOKEN_KEY_LEN)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("token:{}", tail)
    })
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    Extension(rate_limit_service): Extension<Arc<RateLimitService>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let headers = request.headers();

    let ip_address = extract_ip_address(headers, connect_info.as_ref());
    let user_identifier = extract_user_identifier(headers);
    let is_authenticated = user_identifier.is_some();

    // Use IP as identifier if no user token is present
    let identifier = user_identifier
        .or_else(|| ip_address.clone().map(|ip| format!("anon:{}", ip)))
        .unwrap_or_else(|| "unknown".to_string());

    let path = request.uri().path().to_string();

    match rate_limit_service
        .check_rate_limit(&identifier, ip_address.as_deref(), is_authenticated)
        .await
    {
        RateLimitResult::Allowed => {
            debug!(
                identifier = %identifier,
                ip = ?ip_address,
                path = %path,
                "Request allowed by rate limiter"
            );
            Ok(next.run(request).await)
        }
        RateLimitResult::Limited { retry_after } => {
            warn!(
                identifier = %identifier,
                ip = ?ip_address,
                path = %path,
                retry_after = retry_after,
                "Request blocked by rate limiter"
            );

            rate_limit_service.log_violation(&identifier, ip_address.as_deref(), &path);

            let error_response = RateLimitErrorResponse {
                error: "Rate limit exceeded. Please try again later.".to_string(),
                code: "RATE_LIMIT_EXCEEDED".to_string(),
                retry_after,
            };

            let mut response =
                (StatusCode::TOO_MANY_REQUESTS, Json(error_response)).into_response();

            if let Ok(retry_header) = HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("retry-after", retry_header);
            }

            Err(response)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::rate_limit::RateLimitConfig;
    use axum::{middleware, routing::get, Router};

    #[test]
    fn test_extract_ip_from_x_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            "203.0.113.1, 198.51.100.1".parse().unwrap(),
        );

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_from_x_real_ip() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", "203.0.113.1".parse().unwrap());

        let ip = extract_ip_address(&headers, None);
        assert_eq!(ip, Some("203.0.113.1".to_string()));
    }

    #[test]
    fn test_extract_ip_falls_back_to_peer_address() {
        let peer = ConnectInfo(SocketAddr::from(([192, 0, 2, 7], 4242)));
        let ip = extract_ip_address(&HeaderMap::new(), Some(&peer));
        assert_eq!(ip, Some("192.0.2.7".to_string()));
    }

    #[test]
    fn test_user_identifier_uses_token_tail() {
        let mut first = HeaderMap::new();
        first.insert(
            "authorization",
            "Bearer oauth_eyJhbGciOiJIUzI1NiJ9.payload.signatureAAAAAAAAAAAAAAAA"
                .parse()
                .unwrap(),
        );
        let mut second = HeaderMap::new();
        second.insert(
            "authorization",
            "Bearer oauth_eyJhbGciOiJIUzI1NiJ9.payload.signatureBBBBBBBBBBBBBBBB"
                .parse()
                .unwrap(),
        );

        let a = extract_user_identifier(&first).unwrap();
        let b = extract_user_identifier(&second).unwrap();
        assert!(a.starts_with("token:"));
        assert_eq!(a.len(), "token:".len() + TOKEN_KEY_LEN);
        assert_ne!(a, b);
    }

    #[test]
    fn test_extract_user_identifier_no_token() {
        let headers = HeaderMap::new();
        let identifier = extract_user_identifier(&headers);
        assert!(identifier.is_none());
    }

    #[tokio::test]
    async fn test_middleware_returns_429_with_retry_after() {
        let limiter = Arc::new(RateLimitService::new(RateLimitConfig {
            enabled: true,
            anonymous_limit: 2,
            whitelist_ips: Vec::new(),
            ..RateLimitConfig::default()
        }));
        let app = Router::new()
            .route("/ping", get(|| async { "pong" }))
            .layer(middleware::from_fn(rate_limit_middleware))
            .layer(Extension(limiter));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/ping", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        for _ in 0..2 {
            let ok = client.get(&url).send().await.unwrap();
            assert_eq!(ok.status(), reqwest::StatusCode::OK);
        }

        let limited = client.get(&url).send().await.unwrap();
        assert_eq!(limited.status(), reqwest::StatusCode::TOO_MANY_REQUESTS);
        let retry_after: u32 = limited.headers()["retry-after"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(retry_after >= 1);
        let body: serde_json::Value = limited.json().await.unwrap();
        assert_eq!(body["code"], "RATE_LIMIT_EXCEEDED");
    }
}
