// src/logging_middleware.rs
//! Request id tagging and debug-level body logging

use axum::body::to_bytes;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::Next,
    response::Response,
};
use tracing::debug;
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Bodies under this prefix carry authorization codes and session tokens
const SENSITIVE_PATH_PREFIX: &str = "/api/auth";

fn render_body(bytes: &[u8]) -> Option<String> {
    if bytes.is_empty() {
        return None;
    }
    let body_str = std::str::from_utf8(bytes).ok()?;
    // Try to parse as JSON for pretty printing
    Some(
        serde_json::from_str::<serde_json::Value>(body_str)
            .ok()
            .and_then(|json| serde_json::to_string_pretty(&json).ok())
            .unwrap_or_else(|| body_str.to_string()),
    )
}

/// Tag the request with an `x-request-id` and log bodies in debug mode
pub async fn log_request_response(request: Request, next: Next) -> Result<Response, StatusCode> {
    let (mut parts, body) = request.into_parts();

    let request_id = parts
        .headers
        .get(REQUEST_ID_HEADER)
        .cloned()
        .or_else(|| HeaderValue::from_str(&Uuid::new_v4().to_string()).ok());
    if let Some(id) = &request_id {
        parts
            .headers
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), id.clone());
    }
    let request_id_log = request_id
        .as_ref()
        .and_then(|id| id.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let sensitive = parts.uri.path().starts_with(SENSITIVE_PATH_PREFIX);

    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if sensitive {
        debug!(
            request_id = %request_id_log,
            method = %parts.method,
            uri = %parts.uri,
            "📥 Request (body omitted)"
        );
    } else if let Some(request_body) = render_body(&bytes) {
        debug!(
            request_id = %request_id_log,
            method = %parts.method,
            uri = %parts.uri,
            request_body = %request_body,
            "📥 Request"
        );
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    let response = next.run(request).await;

    let (mut parts, body) = response.into_parts();
    let bytes = to_bytes(body, usize::MAX)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    if !sensitive {
        if let Some(response_body) = render_body(&bytes) {
            debug!(
                request_id = %request_id_log,
                status = %parts.status,
                response_body = %response_body,
                "📤 Response"
            );
        }
    }

    if let Some(id) = request_id {
        parts
            .headers
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), id);
    }

    Ok(Response::from_parts(parts, Body::from(bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, middleware, routing::post, Router};

    #[test]
    fn test_render_body() {
        assert_eq!(render_body(b""), None);
        assert_eq!(render_body(b"plain").as_deref(), Some("plain"));
        assert_eq!(
            render_body(br#"{"a":1}"#).as_deref(),
            Some("{\n  \"a\": 1\n}")
        );
    }

    #[tokio::test]
    async fn test_request_id_is_generated_or_echoed() {
        // Handler echoes the id it saw so both request and response sides are covered
        let app = Router::new()
            .route(
                "/echo",
                post(|headers: HeaderMap, body: String| async move {
                    let seen = headers
                        .get(REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default()
                        .to_string();
                    format!("{}|{}", seen, body)
                }),
            )
            .layer(middleware::from_fn(log_request_response));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/echo", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        let client = reqwest::Client::builder().no_proxy().build().unwrap();

        let generated = client.post(&url).body("hello").send().await.unwrap();
        let header = generated.headers()[REQUEST_ID_HEADER]
            .to_str()
            .unwrap()
            .to_string();
        assert!(Uuid::parse_str(&header).is_ok());
        assert_eq!(generated.text().await.unwrap(), format!("{}|hello", header));

        let echoed = client
            .post(&url)
            .header(REQUEST_ID_HEADER, "req-123")
            .body("again")
            .send()
            .await
            .unwrap();
        assert_eq!(echoed.headers()[REQUEST_ID_HEADER], "req-123");
        assert_eq!(echoed.text().await.unwrap(), "req-123|again");
    }
}
