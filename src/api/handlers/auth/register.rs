use axum::{extract::Extension, Json};
use std::sync::Arc;
use tracing::{info, instrument};

use super::{
    error::AuthError,
    guards,
    password::hash_password,
    state::AuthState,
    types::{Credentials, CredentialsRequest, MessageResponse, RegisterResponse},
};
use crate::store::{NewUser, StoreError};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = CredentialsRequest,
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Missing payload", body = MessageResponse),
        (status = 422, description = "Username taken or password too short", body = MessageResponse),
        (status = 500, description = "Store failure")
    ),
    tag = "auth"
)]
#[instrument(skip_all)]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<CredentialsRequest>>,
) -> Result<Json<RegisterResponse>, AuthError> {
    let Some(Json(request)) = payload else {
        return Err(AuthError::MissingPayload);
    };
    let credentials = Credentials::from(request);

    guards::run(guards::REGISTER, &credentials, auth_state.users()).await?;

    let password_hash = hash_password(auth_state.hasher(), credentials.password).await?;

    // A concurrent registration can still win the race after the guard passed.
    let user = match auth_state
        .users()
        .add(NewUser {
            username: credentials.username,
            password_hash,
        })
        .await
    {
        Ok(user) => user,
        Err(StoreError::Conflict) => return Err(AuthError::UsernameTaken),
        Err(err) => return Err(AuthError::StoreFailure(err)),
    };

    info!(user_id = user.id, "user registered");

    Ok(Json(RegisterResponse {
        user_id: user.id,
        username: user.username,
    }))
}
