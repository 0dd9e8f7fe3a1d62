//! Session cookie handling, the `CurrentSession` extractor, and logout.

use anyhow::anyhow;
use axum::{
    async_trait,
    extract::{Extension, FromRequestParts},
    http::{
        header::{InvalidHeaderValue, AUTHORIZATION, COOKIE, SET_COOKIE},
        request::Parts,
        HeaderMap, HeaderValue,
    },
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    error::AuthError,
    state::{AuthConfig, AuthState},
    types::MessageResponse,
};
use crate::store::{Session, SessionToken};

pub const SESSION_COOKIE_NAME: &str = "gatehouse_session";

/// The session attached to the request, if any.
///
/// Resolved from the session cookie (or a bearer token) against the session
/// store. Unknown and expired tokens resolve to `None`.
#[derive(Debug)]
pub struct CurrentSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = extract_session_token(&parts.headers) else {
            return Ok(Self(None));
        };
        let auth_state = parts
            .extensions
            .get::<Arc<AuthState>>()
            .cloned()
            .ok_or_else(|| anyhow!("auth state extension missing"))?;
        let session = auth_state.sessions().lookup(&token).await?;
        Ok(Self(session))
    }
}

#[utoipa::path(
    get,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Session destroyed, or no session was present", body = MessageResponse)
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn logout(
    auth_state: Extension<Arc<AuthState>>,
    CurrentSession(current): CurrentSession,
) -> Result<impl IntoResponse, AuthError> {
    // Always clear the cookie, even if the session record was missing.
    let mut headers = HeaderMap::new();
    if let Ok(cookie) = clear_session_cookie(auth_state.config()) {
        headers.insert(SET_COOKIE, cookie);
    }

    let Some(session) = current else {
        return Ok((headers, Json(MessageResponse::new("no session"))));
    };

    auth_state.sessions().destroy(&session.token).await?;
    info!(user_id = session.user.id, "session destroyed");

    Ok((headers, Json(MessageResponse::new("logged out"))))
}

/// Build the `HttpOnly` cookie carrying the session token.
pub(super) fn session_cookie(
    config: &AuthConfig,
    token: &SessionToken,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}",
        token.as_str()
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AuthConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<SessionToken> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    for header in headers.get_all(COOKIE) {
        let Ok(value) = header.to_str() else {
            continue;
        };
        for pair in value.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let key = parts.next().map(str::trim);
            let val = parts.next().map(str::trim);
            if let (Some(SESSION_COOKIE_NAME), Some(val)) = (key, val) {
                if !val.is_empty() {
                    return Some(SessionToken::new(val.to_string()));
                }
            }
        }
    }
    None
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<SessionToken> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(SessionToken::new(token.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    fn headers_with(name: axum::http::HeaderName, value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(name, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn extracts_token_from_cookie_among_others() {
        let headers = headers_with(COOKIE, "theme=dark; gatehouse_session=abc123; lang=en");
        let token = extract_session_token(&headers);
        assert_eq!(token.as_ref().map(SessionToken::as_str), Some("abc123"));
    }

    #[test]
    fn ignores_empty_cookie_value() {
        let headers = headers_with(COOKIE, "gatehouse_session=");
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn ignores_other_cookies() {
        let headers = headers_with(COOKIE, "gatehouse_sessionx=abc; other=1");
        assert!(extract_session_token(&headers).is_none());
    }

    #[test]
    fn bearer_token_takes_precedence() {
        let mut headers = headers_with(COOKIE, "gatehouse_session=from-cookie");
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        let token = extract_session_token(&headers);
        assert_eq!(token.as_ref().map(SessionToken::as_str), Some("from-header"));
    }

    #[test]
    fn empty_bearer_is_ignored() {
        let headers = headers_with(AUTHORIZATION, "Bearer   ");
        assert!(extract_bearer_token(&headers).is_none());
    }

    #[test]
    fn session_cookie_attributes() -> Result<()> {
        let config = AuthConfig::new().with_session_ttl_seconds(60);
        let token = SessionToken::new("abc".to_string());
        let cookie = session_cookie(&config, &token)?;
        assert_eq!(
            cookie.to_str()?,
            "gatehouse_session=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );

        let secure = session_cookie(&config.with_session_cookie_secure(true), &token)?;
        assert!(secure.to_str()?.ends_with("; Secure"));
        Ok(())
    }

    #[test]
    fn clear_cookie_expires_immediately() -> Result<()> {
        let cookie = clear_session_cookie(&AuthConfig::new())?;
        assert!(cookie.to_str()?.contains("Max-Age=0"));
        assert!(cookie.to_str()?.starts_with("gatehouse_session=;"));
        Ok(())
    }
}
