use anyhow::anyhow;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

use super::{
    error::AuthError,
    guards,
    password::verify_password,
    session::{session_cookie, CurrentSession},
    state::AuthState,
    types::{Credentials, CredentialsRequest, MessageResponse},
};

#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "Session established; sets the session cookie", body = MessageResponse),
        (status = 400, description = "Missing payload", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    CurrentSession(current): CurrentSession,
    payload: Option<Json<CredentialsRequest>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::MissingPayload);
    };
    let credentials = Credentials::from(request);

    let user = guards::run(guards::LOGIN, &credentials, auth_state.users())
        .await?
        .ok_or_else(|| anyhow!("login guards did not attach a user"))?;

    let matched = verify_password(
        auth_state.hasher(),
        credentials.password,
        user.password_hash.clone(),
    )
    .await?;
    if !matched {
        warn!(user_id = user.id, "password mismatch");
        return Err(AuthError::InvalidCredentials);
    }

    // Rotate: a successful login never reuses the caller's previous token.
    if let Some(previous) = current {
        auth_state.sessions().destroy(&previous.token).await?;
    }

    let token = auth_state
        .sessions()
        .create(&user, auth_state.config().session_ttl())
        .await?;
    let cookie = session_cookie(auth_state.config(), &token)
        .map_err(|err| anyhow!("failed to build session cookie: {err}"))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    info!(user_id = user.id, "session created");

    Ok((
        headers,
        Json(MessageResponse::new(format!("Welcome {}!", user.username))),
    ))
}
