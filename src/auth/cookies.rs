//! Auth cookie helpers
//!
//! `admin_token` holds the session token, `admin_user` a url-encoded JSON
//! copy of the public user for the front end, `oauth_state` the CSRF state
//! between the init and callback legs.

use axum::http::{header, HeaderMap, HeaderValue};

use super::session::SESSION_TTL_DAYS;

pub const ADMIN_TOKEN_COOKIE: &str = "admin_token";
pub const ADMIN_USER_COOKIE: &str = "admin_user";
pub const OAUTH_STATE_COOKIE: &str = "oauth_state";

const OAUTH_STATE_MAX_AGE: i64 = 10 * 60;

fn build_cookie(name: &str, value: &str, max_age: i64, same_site: &str, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite={}",
        name, value, max_age, same_site
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

fn append(headers: &mut HeaderMap, cookie: String) {
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}

/// Set `admin_token` and `admin_user` for a fresh session
pub fn set_session_cookies(headers: &mut HeaderMap, token: &str, user_json: &str, secure: bool) {
    let max_age = SESSION_TTL_DAYS * 24 * 60 * 60;
    append(
        headers,
        build_cookie(ADMIN_TOKEN_COOKIE, token, max_age, "Strict", secure),
    );
    append(
        headers,
        build_cookie(
            ADMIN_USER_COOKIE,
            &urlencoding::encode(user_json),
            max_age,
            "Strict",
            secure,
        ),
    );
}

pub fn clear_session_cookies(headers: &mut HeaderMap, secure: bool) {
    append(headers, build_cookie(ADMIN_TOKEN_COOKIE, "", 0, "Strict", secure));
    append(headers, build_cookie(ADMIN_USER_COOKIE, "", 0, "Strict", secure));
}

/// The provider comes back cross-site (Apple with a form POST), so over
/// HTTPS the state cookie must be `SameSite=None`. Callers pass whether the
/// callback URL is HTTPS, not whether this is a production build.
fn oauth_state_same_site(secure: bool) -> &'static str {
    if secure {
        "None"
    } else {
        "Lax"
    }
}

pub fn set_oauth_state_cookie(headers: &mut HeaderMap, state: &str, secure: bool) {
    append(
        headers,
        build_cookie(
            OAUTH_STATE_COOKIE,
            state,
            OAUTH_STATE_MAX_AGE,
            oauth_state_same_site(secure),
            secure,
        ),
    );
}

pub fn clear_oauth_state_cookie(headers: &mut HeaderMap, secure: bool) {
    append(
        headers,
        build_cookie(OAUTH_STATE_COOKIE, "", 0, oauth_state_same_site(secure), secure),
    );
}

/// Value of cookie `name` from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}
